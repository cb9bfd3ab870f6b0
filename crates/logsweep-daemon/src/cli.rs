//! Command-line arguments for the daemon.

use clap::Parser;
use std::path::PathBuf;

/// Deletes stale web-server log files on a schedule.
#[derive(Debug, Parser)]
#[command(name = "logsweep", version)]
pub struct Cli {
    /// Settings file, re-read before every pass
    #[arg(short, long, env = "LOGSWEEP_CONFIG", default_value = "logsweep.toml")]
    pub config: PathBuf,

    /// Run a single pass and exit
    #[arg(long)]
    pub once: bool,

    /// Log filter used when RUST_LOG is not set (e.g. "debug", "logsweep_janitor=trace")
    #[arg(long, env = "LOGSWEEP_LOG", default_value = "info")]
    pub log_level: String,

    /// Arguments handed to the service when it starts
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["logsweep"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("logsweep.toml"));
        assert!(!cli.once);
        assert_eq!(cli.log_level, "info");
        assert!(cli.args.is_empty());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "logsweep",
            "--config",
            "/etc/logsweep.toml",
            "--once",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/logsweep.toml"));
        assert!(cli.once);
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn test_trailing_args() {
        let cli = Cli::try_parse_from(["logsweep", "-c", "a.toml", "site1", "site2"]).unwrap();
        assert_eq!(cli.args, vec!["site1", "site2"]);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["logsweep", "--install"]).is_err());
    }
}
