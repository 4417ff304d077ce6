use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WatchError>;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Отсутствует обязательная переменная окружения: {0}")]
    MissingConfig(String),

    #[error("Некорректная конфигурация: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Неизвестный статус проверки работы: {0}")]
    UnknownStatus(String),

    #[error("Не удалось отправить сообщение: {0}")]
    Delivery(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl WatchError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingConfig(_) => "MISSING_CONFIG",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Fetch(_) => "FETCH_FAILED",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::UnknownStatus(_) => "UNKNOWN_STATUS",
            Self::Delivery(_) => "DELIVERY_FAILED",
            Self::Http(_) => "HTTP_ERROR",
        }
    }

    /// Startup-only errors end the process; everything else is reported
    /// through the notifier and the loop carries on.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::MissingConfig(_) | Self::InvalidConfig(_) | Self::Http(_)
        )
    }
}

/// One failed request to the status source.
///
/// `status` is `None` when no HTTP response was received at all (timeout,
/// refused connection, DNS) or the body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub address: String,
    pub status: Option<u16>,
    pub reason: String,
}

impl FetchFailure {
    pub fn transport(address: impl Into<String>, err: &(dyn std::error::Error + 'static)) -> Self {
        Self {
            address: address.into(),
            status: None,
            reason: error_chain_text(err),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(
                f,
                "Эндпоинт {} недоступен по причине {} {code}",
                self.address, self.reason
            ),
            None => write!(f, "Эндпоинт {} недоступен: {}", self.address, self.reason),
        }
    }
}

impl std::error::Error for FetchFailure {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Ошибка в типе ответа API, ожидается словарь - получен: {found}")]
    NotAMapping { found: &'static str },

    #[error("Ошибка в ответе API, отсутствует ключ - {field}")]
    MissingField { field: String },

    #[error("Ошибка в ответе API, ключ {field} должен быть списком - получен: {found}")]
    NotASequence { field: String, found: &'static str },

    #[error("Ошибка в ответе API, некорректное значение ключа {field}: ожидается {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },

    #[error("Ошибка в ответе API, неожиданный ключ - {field}")]
    UnexpectedField { field: String },
}

impl ValidationError {
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::NotAMapping { .. } => None,
            Self::MissingField { field }
            | Self::NotASequence { field, .. }
            | Self::InvalidField { field, .. }
            | Self::UnexpectedField { field } => Some(field),
        }
    }
}

/// Flattens an error and its `source()` chain into one line.
///
/// HTTP client errors keep the useful part ("connection refused") in the
/// source chain, not in their own `Display`.
pub fn error_chain_text(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}
