use serde::Serialize;

use crate::channel::NotificationChannel;
use crate::detector::StatusChange;
use crate::error::WatchError;
use crate::models::ChangeState;

pub const FAILURE_MESSAGE_PREFIX: &str = "Сбой в работе программы: ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Delivery {
    Delivered,
    /// Same failure text as the last delivered one; the channel was not called.
    Suppressed,
    Failed { reason: String },
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

pub fn failure_message(err: &WatchError) -> String {
    format!("{FAILURE_MESSAGE_PREFIX}{err}")
}

/// Status changes are always sent. The new status is remembered only once
/// the channel confirms delivery.
pub fn notify_change<C>(
    channel: &C,
    state: ChangeState,
    change: &StatusChange,
) -> (ChangeState, Delivery)
where
    C: NotificationChannel + ?Sized,
{
    match channel.send(&change.message) {
        Ok(()) => (state.with_status(change.status), Delivery::Delivered),
        Err(err) => (
            state,
            Delivery::Failed {
                reason: err.to_string(),
            },
        ),
    }
}

/// Failure texts are deduplicated against the last delivered failure. An
/// undelivered text is not remembered, so it is retried next cycle.
pub fn notify_failure<C>(
    channel: &C,
    state: ChangeState,
    text: &str,
) -> (ChangeState, Delivery)
where
    C: NotificationChannel + ?Sized,
{
    if state.is_repeat_failure(text) {
        return (state, Delivery::Suppressed);
    }
    match channel.send(text) {
        Ok(()) => (state.with_failure(text), Delivery::Delivered),
        Err(err) => (
            state,
            Delivery::Failed {
                reason: err.to_string(),
            },
        ),
    }
}
