// Public fallible APIs in this crate share one concrete error contract (`WatchError`).
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod channel;
pub mod config;
pub mod cycle;
pub mod detector;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod notifier;
pub mod poll_log;
pub mod validator;

pub use channel::{NotificationChannel, TelegramChannel};
pub use config::WatchConfig;
pub use cycle::{CycleOutcome, CycleReport, WatchState, run_cycle};
pub use error::{FetchFailure, Result, ValidationError, WatchError};
pub use fetcher::{HttpStatusSource, StatusSource};
pub use models::{ChangeState, PollWindow, ResponseEnvelope, ReviewStatus, StatusRecord};
pub use notifier::Delivery;
pub use poll_log::PollLog;
