use std::path::PathBuf;

use clap::Args;
use reviewwatch_core::config::RETRY_PERIOD_SECS;
use reviewwatch_core::poll_log::DEFAULT_LOG_FILE;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Pause after every cycle, in seconds.
    #[arg(long, default_value_t = RETRY_PERIOD_SECS)]
    pub period_secs: u64,
    /// Stop after this many cycles (0 runs forever).
    #[arg(long, default_value_t = 0)]
    pub max_cycles: u32,
    /// JSON-lines log destination.
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,
    /// Initial window as a unix timestamp. Defaults to the current time.
    #[arg(long)]
    pub from_date: Option<u64>,
}
