//! Telegram Bot API notifier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatNotifier, NotifyError};
use crate::config::TelegramConfig;

/// Upper bound for one `sendMessage` call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const PARSE_MODE: &str = "HTML";

pub struct TelegramNotifier {
    http: reqwest::Client,
    base_url: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("outage-report/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.token)
    }
}

#[derive(Debug, Serialize)]
struct SendMessageForm<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    description: Option<String>,
}

#[async_trait]
impl ChatNotifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        let form = SendMessageForm {
            chat_id: &self.chat_id,
            text,
            parse_mode: PARSE_MODE,
        };

        let response = self.http.post(self.endpoint()).form(&form).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let raw = response.text().await.unwrap_or_default();
            let body = serde_json::from_str::<ErrorBody>(&raw)
                .ok()
                .and_then(|b| b.description)
                .unwrap_or(raw);
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        log::info!("Telegram notification sent");
        Ok(())
    }
}
