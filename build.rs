//! Rebuild when the README embedded by `linctl docs` changes.

fn main() {
    println!("cargo:rerun-if-changed=README.md");
}
