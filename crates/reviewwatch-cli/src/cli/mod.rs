use clap::{Parser, Subcommand};

mod args;

#[cfg(test)]
mod tests;

pub use args::RunArgs;

#[derive(Debug, Parser)]
#[command(name = "reviewwatch")]
#[command(about = "Reports review status changes to a Telegram chat", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Poll the status source and notify about changes until stopped.
    Run(RunArgs),
    /// Report which required environment variables are set, then exit.
    Check,
}
