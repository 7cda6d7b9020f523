//! Diagnostic logging to stderr. Stdout is reserved for command output.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `LINCTL_LOG` is unset.
pub fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber. `LINCTL_LOG` overrides `-v`;
/// `LINCTL_LOG_FORMAT=json` switches to JSON lines.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env("LINCTL_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("linctl={}", default_level(verbosity))));

    let use_json = std::env::var("LINCTL_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = if use_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .without_time(),
            )
            .try_init()
    };
}
