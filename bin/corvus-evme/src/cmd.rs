use clap::{Parser, Subcommand};
use tracing::error;

use crate::logging::LogArgs;

/// Main CLI for the corvus-evme tool
#[derive(Parser, Debug)]
#[command(name = "corvus-evme", infer_subcommands = true, version = "0.1")]
pub struct MainCmd {
    /// Logging configuration
    #[command(flatten)]
    pub log: LogArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// State transition tool
    T8n(crate::t8n::Cmd),
}

/// Error types for the main command system
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// T8n tool error
    #[error("T8n error: {0}")]
    T8n(#[from] crate::t8n::T8nError),
}

impl MainCmd {
    /// Execute the main command
    pub fn run(self) -> Result<(), Error> {
        // Initialize logging first
        self.log.init();

        match self.command {
            Commands::T8n(cmd) => cmd.run().map_err(Error::T8n),
        }
        .inspect_err(|e| {
            error!(err = ?e, "Error executing command");
            eprintln!("{e}");
            std::process::exit(1);
        })
    }
}
