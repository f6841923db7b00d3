//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Next Meal - mood-driven meal suggestions and a weekly plan
#[derive(Parser)]
#[command(
    name = "nm",
    about = "Mood-driven meal suggestions and a weekly meal plan",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the interactive shell (default)
    Shell,

    /// Check that the backend is reachable
    Ping,

    /// List the meal catalog
    Meals {
        /// Entries to skip
        #[arg(long, default_value_t = 0)]
        skip: u32,

        /// Maximum entries to show
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
}

/// Log file location
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nextmeal")
        .join("logs")
        .join("nextmeal.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_meals_with_globals() {
        let cli = Cli::parse_from(["nm", "meals", "--limit", "5", "-l", "debug"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Some(Command::Meals { skip, limit }) => {
                assert_eq!(skip, 0);
                assert_eq!(limit, 5);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_no_subcommand_means_shell() {
        let cli = Cli::parse_from(["nm"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_log_path_is_under_nextmeal() {
        assert!(get_log_path().ends_with("nextmeal/logs/nextmeal.log"));
    }
}
