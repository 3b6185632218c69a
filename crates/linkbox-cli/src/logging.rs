//! Tracing setup
//!
//! `RUST_LOG` wins when set. Otherwise the configured `log_level` applies to
//! the linkbox crates only.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use linkbox_core::Config;

/// Install the global subscriber
///
/// Logs go to `log_file` when configured, stderr otherwise. Failing to open
/// the log file is reported and logging falls back to stderr.
pub fn init(config: &Config) {
    let log_file = config.log_file.as_ref().and_then(|path| {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Some(file),
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", path, e);
                None
            }
        }
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&config.log_level))
        .with_target(false);

    // Ignore error if already initialized
    let _ = match log_file {
        Some(file) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init(),
        None => builder.with_writer(std::io::stderr).try_init(),
    };

    debug!("Logging initialized (level {})", config.log_level);
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(level)))
}

fn default_directives(level: &str) -> String {
    format!("linkbox_core={},linkbox_cli={}", level, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        assert_eq!(default_directives("debug"), "linkbox_core=debug,linkbox_cli=debug");
    }
}
