use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::DEFAULT_CONFIG_FILE;

#[derive(Parser, Debug)]
#[command(name = "kinogate")]
#[command(author, version, about = "Telegram bot that hands out files by code to members of the required channels", long_about = None)]
pub struct Cli {
    /// Path to the TOML config file (optional, environment variables override it)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot (long polling) and the liveness server
    Run,

    /// Load and validate the configuration, log a summary and exit
    CheckConfig,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["kinogate"]).unwrap();
        assert_eq!(cli.command, None);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn test_check_config_with_path() {
        let cli = Cli::try_parse_from(["kinogate", "check-config", "--config", "/etc/kinogate.toml"]).unwrap();
        assert_eq!(cli.command, Some(Commands::CheckConfig));
        assert_eq!(cli.config, PathBuf::from("/etc/kinogate.toml"));
    }

    #[test]
    fn test_rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["kinogate", "download"]).is_err());
    }
}
