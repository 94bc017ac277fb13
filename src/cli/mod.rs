//! Command-line interface for reelstrata.

mod commands;

use clap::{Parser, Subcommand};

/// Reelstrata - a movie catalog served through five API versions over
/// three schema-evolution strategies
#[derive(Parser)]
#[command(name = "reelstrata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    #[command(alias = "web")]
    Serve {
        /// Port to listen on, overriding the config file
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Apply the schema of every strategy and exit
    Migrate,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_with_port() {
        let cli = Cli::try_parse_from(["reelstrata", "serve", "--port", "4100"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve { port: Some(4100) })));
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::try_parse_from(["reelstrata"]).unwrap();
        assert!(cli.command.is_none());
    }
}
