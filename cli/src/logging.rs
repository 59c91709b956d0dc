//! # Structured Logging
//!
//! Installs the `tracing` subscriber with a pretty or JSON format.
//!
//! `--log-level` scopes to the ledger's own targets (`utxo_ledger`, shared
//! by the library and the binary). Everything else stays at `warn`, so
//! `--log-level debug` shows every validation outcome without pulling in
//! dependency chatter. `RUST_LOG` replaces the whole filter when set.
//!
//! Logs go to stderr. Stdout carries command output only, so `keygen` and
//! `inspect` can be piped into `jq`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, colored output.
    Pretty,
    /// One JSON object per line.
    Json,
}

impl LogFormat {
    /// Parse a format string. Accepts "json" or "pretty" (case-insensitive).
    /// Returns `Pretty` for any unrecognized value.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Target shared by the library crate and the `utxo-ledger` binary.
const LEDGER_TARGET: &str = "utxo_ledger";

/// Filter directives for `level` applied to the ledger only.
///
/// An unparsable level falls back to `warn` for the ledger too.
pub fn ledger_directives(level: &str) -> String {
    let level = level.trim().to_lowercase();
    let level = match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" | "off" => level.as_str(),
        _ => "warn",
    };
    format!("warn,{}={}", LEDGER_TARGET, level)
}

/// Initialize the global tracing subscriber. Call once, early in `main()`.
pub fn init_logging(level: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(ledger_directives(level)));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_file(false),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
    }

    tracing::debug!(?format, ledger_level = level, "logging initialized");
}
