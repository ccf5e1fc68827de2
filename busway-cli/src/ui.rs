//! Connection spinner
//!
//! The spinner only shows while the database connection is being opened.
//! It stays hidden with `--quiet`, with `BUSWAY_QUIET=1`, or when stderr is
//! not a terminal, so piped sessions see nothing but the menu.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Whether progress output should be suppressed.
pub fn quiet_mode(quiet_flag: bool) -> bool {
    quiet_flag
        || std::env::var("BUSWAY_QUIET").is_ok_and(|v| v == "1")
        || !std::io::stderr().is_terminal()
}

/// Spinner shown while connecting to `target`; `None` when quiet.
pub fn connect_spinner(target: &str, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(format!("Connecting to {target}..."));
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_flag_always_wins() {
        assert!(quiet_mode(true));
    }

    #[test]
    fn no_spinner_when_quiet() {
        assert!(connect_spinner("postgres@localhost:5432/busway", true).is_none());
    }
}
