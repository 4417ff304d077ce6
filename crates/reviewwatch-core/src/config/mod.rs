use std::fmt;

use reqwest::Url;
use serde::Serialize;

use crate::error::{Result, WatchError};

mod env;

pub const PRACTICUM_TOKEN_ENV: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";
pub const REQUIRED_ENV: [&str; 3] = [PRACTICUM_TOKEN_ENV, TELEGRAM_TOKEN_ENV, TELEGRAM_CHAT_ID_ENV];

pub const ENDPOINT_ENV: &str = "REVIEWWATCH_ENDPOINT";
pub const TELEGRAM_API_URL_ENV: &str = "REVIEWWATCH_TELEGRAM_API_URL";
pub const HTTP_TIMEOUT_MS_ENV: &str = "REVIEWWATCH_HTTP_TIMEOUT_MS";

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;

/// Pause appended after every cycle, in seconds.
pub const RETRY_PERIOD_SECS: u64 = 600;

/// Everything the loop needs, resolved once at startup.
#[derive(Clone)]
pub struct WatchConfig {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
    pub endpoint: String,
    pub telegram_api_url: String,
    pub http_timeout_ms: u64,
}

impl fmt::Debug for WatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchConfig")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("endpoint", &self.endpoint)
            .field("telegram_api_url", &self.telegram_api_url)
            .field("http_timeout_ms", &self.http_timeout_ms)
            .finish_non_exhaustive()
    }
}

impl WatchConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env::read_raw_env)
    }

    /// Resolves the configuration through `lookup`. Every missing required
    /// variable is named in the returned `MissingConfig` error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let missing = missing_required(&lookup);
        if !missing.is_empty() {
            return Err(WatchError::MissingConfig(missing.join(", ")));
        }
        let required = |name: &str| {
            env::non_empty(lookup(name)).ok_or_else(|| WatchError::MissingConfig(name.to_string()))
        };

        let endpoint = env::non_empty(lookup(ENDPOINT_ENV))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        parse_http_url(&endpoint, ENDPOINT_ENV)?;
        let telegram_api_url = env::non_empty(lookup(TELEGRAM_API_URL_ENV))
            .map(|raw| raw.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string());
        parse_http_url(&telegram_api_url, TELEGRAM_API_URL_ENV)?;

        Ok(Self {
            practicum_token: required(PRACTICUM_TOKEN_ENV)?,
            telegram_token: required(TELEGRAM_TOKEN_ENV)?,
            telegram_chat_id: required(TELEGRAM_CHAT_ID_ENV)?,
            endpoint,
            telegram_api_url,
            http_timeout_ms: env::parse_u64_at_least(lookup(HTTP_TIMEOUT_MS_ENV), 1)
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_MS),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredEnvStatus {
    pub name: &'static str,
    pub present: bool,
}

/// Presence of each required variable. Values are never exposed.
pub fn required_env_report<F>(lookup: F) -> Vec<RequiredEnvStatus>
where
    F: Fn(&str) -> Option<String>,
{
    REQUIRED_ENV
        .into_iter()
        .map(|name| RequiredEnvStatus {
            name,
            present: env::non_empty(lookup(name)).is_some(),
        })
        .collect()
}

pub fn required_env_report_from_env() -> Vec<RequiredEnvStatus> {
    required_env_report(env::read_raw_env)
}

fn missing_required<F>(lookup: &F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    REQUIRED_ENV
        .into_iter()
        .filter(|&name| env::non_empty(lookup(name)).is_none())
        .collect()
}

pub(crate) fn parse_http_url(raw: &str, label: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|err| {
        WatchError::InvalidConfig(format!("недопустимый адрес {label}: {err}"))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(WatchError::InvalidConfig(format!(
            "неподдерживаемая схема {label}: {other}"
        ))),
    }
}
