use crate::error::Result;
use crate::models::{ChangeState, ResponseEnvelope, ReviewStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub homework_name: String,
    pub status: ReviewStatus,
    pub message: String,
}

/// Edge-triggered: only the most recent record is consulted, and only a tag
/// different from the last notified one yields a change. Does not touch
/// `state`; the notifier records the new status once it is delivered.
pub fn detect_change(
    envelope: &ResponseEnvelope,
    state: &ChangeState,
) -> Result<Option<StatusChange>> {
    let Some(latest) = envelope.latest() else {
        return Ok(None);
    };
    let status = latest.status.parse::<ReviewStatus>()?;
    if state.last_status == Some(status) {
        return Ok(None);
    }
    Ok(Some(StatusChange {
        homework_name: latest.homework_name.clone(),
        status,
        message: change_message(&latest.homework_name, status),
    }))
}

pub fn change_message(homework_name: &str, status: ReviewStatus) -> String {
    format!(
        "Изменился статус проверки работы \"{homework_name}\". {}",
        status.verdict()
    )
}
