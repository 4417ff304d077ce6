use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use serde_json::{Value, json};

use crate::config::{TELEGRAM_API_URL_ENV, WatchConfig, parse_http_url};
use crate::error::{Result, WatchError, error_chain_text};

/// Where notifications go. `Ok(())` means the message was delivered.
pub trait NotificationChannel {
    fn send(&self, text: &str) -> Result<()>;
}

/// Telegram Bot API `sendMessage` for a single chat.
pub struct TelegramChannel {
    send_url: Url,
    chat_id: String,
    http: Client,
}

impl std::fmt::Debug for TelegramChannel {
    // The bot token is part of `send_url`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramChannel")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramChannel {
    pub fn new(
        api_url: &str,
        token: &str,
        chat_id: impl Into<String>,
        timeout_ms: u64,
    ) -> Result<Self> {
        let base = api_url.trim_end_matches('/');
        let send_url = parse_http_url(
            &format!("{base}/bot{token}/sendMessage"),
            TELEGRAM_API_URL_ENV,
        )?;
        let http = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            send_url,
            chat_id: chat_id.into(),
            http,
        })
    }

    pub fn from_config(config: &WatchConfig) -> Result<Self> {
        Self::new(
            &config.telegram_api_url,
            &config.telegram_token,
            config.telegram_chat_id.clone(),
            config.http_timeout_ms,
        )
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }
}

impl NotificationChannel for TelegramChannel {
    fn send(&self, text: &str) -> Result<()> {
        let body = json!({
            "chat_id": self.chat_id,
            "text": text,
        });
        let resp = self
            .http
            .post(self.send_url.clone())
            .json(&body)
            .send()
            .map_err(|err| WatchError::Delivery(error_chain_text(&err.without_url())))?;

        let status = resp.status();
        let value = resp.json::<Value>().unwrap_or(Value::Null);
        let accepted = value.get("ok").and_then(Value::as_bool).unwrap_or(false);
        if status.is_success() && accepted {
            return Ok(());
        }

        let description = value
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("без описания");
        Err(WatchError::Delivery(format!(
            "Telegram отклонил сообщение, статус {status}: {description}"
        )))
    }
}
