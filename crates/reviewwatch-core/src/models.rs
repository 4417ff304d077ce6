use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::WatchError;

/// Lower bound (seconds since epoch) of the records requested from the
/// status source. Unsigned, so a negative window is unrepresentable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PollWindow(u64);

impl PollWindow {
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn now() -> Self {
        Self(u64::try_from(Utc::now().timestamp()).unwrap_or(0))
    }

    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// Moves forward to `reported` if it is newer; never moves backward.
    #[must_use]
    pub fn advance(self, reported: Self) -> Self {
        self.max(reported)
    }
}

impl fmt::Display for PollWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl ReviewStatus {
    pub const ALL: [Self; 3] = [Self::Approved, Self::Reviewing, Self::Rejected];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    pub fn verdict(self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = WatchError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == raw)
            .ok_or_else(|| WatchError::UnknownStatus(raw.to_string()))
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submission as reported by the source. `status` stays the raw tag so
/// that an unknown value reaches change detection and is reported there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub homework_name: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope {
    pub records: Vec<StatusRecord>,
    pub current_date: PollWindow,
}

impl ResponseEnvelope {
    /// The source lists the most recent record first.
    pub fn latest(&self) -> Option<&StatusRecord> {
        self.records.first()
    }
}

/// What has already reached the chat. Both fields change only after a
/// confirmed delivery, so an undelivered message is retried next cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeState {
    pub last_status: Option<ReviewStatus>,
    pub last_failure: String,
}

impl ChangeState {
    #[must_use]
    pub fn with_status(self, status: ReviewStatus) -> Self {
        Self {
            last_status: Some(status),
            ..self
        }
    }

    #[must_use]
    pub fn with_failure(self, text: impl Into<String>) -> Self {
        Self {
            last_failure: text.into(),
            ..self
        }
    }

    pub fn is_repeat_failure(&self, text: &str) -> bool {
        !self.last_failure.is_empty() && self.last_failure == text
    }
}
