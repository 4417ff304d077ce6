use std::time::Instant;

use serde_json::json;
use uuid::Uuid;

use crate::channel::NotificationChannel;
use crate::detector::detect_change;
use crate::error::WatchError;
use crate::fetcher::StatusSource;
use crate::models::{ChangeState, PollWindow};
use crate::notifier::{Delivery, failure_message, notify_change, notify_failure};
use crate::poll_log::PollLog;
use crate::validator::validate_response;

/// Everything carried from one cycle to the next.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WatchState {
    pub window: PollWindow,
    pub change: ChangeState,
}

impl WatchState {
    pub fn starting_at(window: PollWindow) -> Self {
        Self {
            window,
            change: ChangeState::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Fetched and validated, nothing new to report.
    Idle,
    StatusChanged { message: String, delivery: Delivery },
    Failure { message: String, delivery: Delivery },
}

impl CycleOutcome {
    pub fn delivery(&self) -> Option<&Delivery> {
        match self {
            Self::Idle => None,
            Self::StatusChanged { delivery, .. } | Self::Failure { delivery, .. } => {
                Some(delivery)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub cycle_id: String,
    pub state: WatchState,
    pub outcome: CycleOutcome,
}

/// Runs fetch, validate, detect and notify once.
///
/// Takes the previous state and returns the next one. Every error raised on
/// the way becomes a single failure text that goes through failure
/// deduplication; nothing escapes, so the caller can always sleep and call
/// again.
pub fn run_cycle<S, C>(source: &S, channel: &C, log: &PollLog, state: WatchState) -> CycleReport
where
    S: StatusSource + ?Sized,
    C: NotificationChannel + ?Sized,
{
    let cycle_id = Uuid::new_v4().to_string();
    let started = Instant::now();
    let WatchState { window, change } = state;

    let (window, detected) = match source
        .fetch(window)
        .map_err(WatchError::from)
        .and_then(|raw| validate_response(&raw).map_err(WatchError::from))
    {
        Ok(envelope) => {
            let next = window.advance(envelope.current_date);
            (next, detect_change(&envelope, &change))
        }
        Err(err) => (window, Err(err)),
    };

    let (change, outcome) = match detected {
        Ok(None) => {
            log.log_status(&cycle_id, "cycle", started, window, None);
            (change, CycleOutcome::Idle)
        }
        Ok(Some(status_change)) => {
            let (change, delivery) = notify_change(channel, change, &status_change);
            let details = json!({
                "homework_name": status_change.homework_name,
                "status": status_change.status,
            });
            match &delivery {
                Delivery::Failed { reason } => log.log_warning(
                    &cycle_id,
                    "notify_change",
                    started,
                    window,
                    reason,
                    Some(details),
                ),
                _ => log.log_status(&cycle_id, "notify_change", started, window, Some(details)),
            }
            let outcome = CycleOutcome::StatusChanged {
                message: status_change.message,
                delivery,
            };
            (change, outcome)
        }
        Err(err) => {
            let message = failure_message(&err);
            let (change, delivery) = notify_failure(channel, change, &message);
            log.log_error(
                &cycle_id,
                "cycle",
                started,
                window,
                &err,
                Some(json!({ "delivery": delivery })),
            );
            if let Delivery::Failed { reason } = &delivery {
                log.log_warning(&cycle_id, "notify_failure", started, window, reason, None);
            }
            (change, CycleOutcome::Failure { message, delivery })
        }
    };

    CycleReport {
        cycle_id,
        state: WatchState { window, change },
        outcome,
    }
}
