//! Output modes and the printers shared by every command.

use std::io::{self, Write};

use colored::Colorize;
use serde::Serialize;
use serde_json::json;

/// How a command renders its result. Chosen once from the global flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Rich,
    Plain,
    Json,
}

impl OutputMode {
    /// `--json` wins over `--plaintext`; rich is the default.
    pub fn from_flags(json: bool, plaintext: bool) -> Self {
        if json {
            OutputMode::Json
        } else if plaintext {
            OutputMode::Plain
        } else {
            OutputMode::Rich
        }
    }

    pub fn is_json(self) -> bool {
        self == OutputMode::Json
    }
}

pub fn json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> io::Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(out, "{}", text)
}

/// Print a result to stdout as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    json(&mut io::stdout().lock(), value)
}

/// Informational line, not an error.
pub fn info(out: &mut dyn Write, message: &str, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => json(out, &json!({ "message": message })),
        OutputMode::Plain | OutputMode::Rich => writeln!(out, "{}", message),
    }
}

/// `✓ message` in rich mode, bare message otherwise.
pub fn success(out: &mut dyn Write, message: &str, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Json => json(out, &json!({ "success": true, "message": message })),
        OutputMode::Plain => writeln!(out, "{}", message),
        OutputMode::Rich => writeln!(out, "{} {}", "✓".green(), message),
    }
}

/// Single-line error report: JSON on stdout, red text on stderr otherwise.
pub fn error(message: &str, mode: OutputMode) {
    let result = match mode {
        OutputMode::Json => json(&mut io::stdout().lock(), &json!({ "error": message })),
        OutputMode::Plain => writeln!(io::stderr().lock(), "Error: {}", message),
        OutputMode::Rich => writeln!(io::stderr().lock(), "{} {}", "Error:".red().bold(), message),
    };
    // Nothing sensible left to do if stdout/stderr is gone.
    let _ = result;
}

/// Cut a line longer than `max_chars` to `max_chars - 3` characters plus `...`.
pub fn truncate(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn render(f: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_mode_from_flags() {
        assert_eq!(OutputMode::from_flags(false, false), OutputMode::Rich);
        assert_eq!(OutputMode::from_flags(false, true), OutputMode::Plain);
        assert_eq!(OutputMode::from_flags(true, false), OutputMode::Json);
        assert_eq!(OutputMode::from_flags(true, true), OutputMode::Json);
    }

    #[test]
    fn test_info_modes() {
        assert_eq!(render(|o| info(o, "nothing here", OutputMode::Rich)), "nothing here\n");
        let out = render(|o| info(o, "nothing here", OutputMode::Json));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["message"], "nothing here");
    }

    #[test]
    fn test_success_rich_has_check() {
        assert_eq!(render(|o| success(o, "done", OutputMode::Rich)), "✓ done\n");
        assert_eq!(render(|o| success(o, "done", OutputMode::Plain)), "done\n");
    }

    #[test]
    fn test_truncate_boundaries() {
        let exact = "a".repeat(80);
        assert_eq!(truncate(&exact, 80), exact);

        let over = "b".repeat(81);
        let cut = truncate(&over, 80);
        assert_eq!(cut.chars().count(), 80);
        assert_eq!(cut, format!("{}...", "b".repeat(77)));
    }

    #[test]
    fn test_truncate_multibyte() {
        let line = "日本語".repeat(30);
        let cut = truncate(&line, 80);
        assert_eq!(cut.chars().count(), 80);
        assert!(cut.ends_with("..."));
    }

    proptest! {
        #[test]
        fn prop_truncate_never_exceeds(s in "\\PC{0,200}") {
            let cut = truncate(&s, 80);
            prop_assert!(cut.chars().count() <= 80);
            if s.chars().count() <= 80 {
                prop_assert_eq!(cut, s);
            }
        }
    }
}
