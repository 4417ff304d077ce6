use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::WatchError;
use crate::models::PollWindow;

pub const DEFAULT_LOG_FILE: &str = "reviewwatch.log.jsonl";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PollLogEntry {
    pub cycle_id: String,
    pub operation: String,
    pub status: String,
    pub latency_ms: u128,
    pub created_at: String,
    pub window: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Append-only JSON-lines log. Writing is best-effort: a log that cannot
/// be written never interrupts polling.
#[derive(Debug, Clone, Default)]
pub struct PollLog {
    path: Option<PathBuf>,
}

impl PollLog {
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn append(&self, entry: &PollLogEntry) {
        let Some(path) = self.path.as_deref() else {
            return;
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(serialized) = serde_json::to_string(entry)
            && let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path)
        {
            let mut line = serialized;
            line.push('\n');
            let _ = file.write_all(line.as_bytes());
        }
    }

    pub fn log_status(
        &self,
        cycle_id: &str,
        operation: &str,
        started: Instant,
        window: PollWindow,
        details: Option<serde_json::Value>,
    ) {
        self.append(&entry(cycle_id, operation, "ok", started, window, details));
    }

    pub fn log_warning(
        &self,
        cycle_id: &str,
        operation: &str,
        started: Instant,
        window: PollWindow,
        warning_message: &str,
        details: Option<serde_json::Value>,
    ) {
        let mut entry = entry(cycle_id, operation, "warning", started, window, details);
        entry.error_message = Some(warning_message.to_string());
        self.append(&entry);
    }

    pub fn log_error(
        &self,
        cycle_id: &str,
        operation: &str,
        started: Instant,
        window: PollWindow,
        err: &WatchError,
        details: Option<serde_json::Value>,
    ) {
        let status = if err.is_recoverable() {
            "error"
        } else {
            "critical"
        };
        let mut entry = entry(cycle_id, operation, status, started, window, details);
        entry.error_code = Some(err.code().to_string());
        entry.error_message = Some(err.to_string());
        self.append(&entry);
    }
}

fn entry(
    cycle_id: &str,
    operation: &str,
    status: &str,
    started: Instant,
    window: PollWindow,
    details: Option<serde_json::Value>,
) -> PollLogEntry {
    PollLogEntry {
        cycle_id: cycle_id.to_string(),
        operation: operation.to_string(),
        status: status.to_string(),
        latency_ms: started.elapsed().as_millis(),
        created_at: Utc::now().to_rfc3339(),
        window: window.as_secs(),
        error_code: None,
        error_message: None,
        details,
    }
}
