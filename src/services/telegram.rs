use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::alert_sink::{AlertSink, SinkError};

const BASE_URL: &str = "https://api.telegram.org";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends alerts through the Telegram Bot API. `destination` is the chat id.
#[derive(Clone)]
pub struct TelegramSink {
    http: Client,
    token: String,
    base_url: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramSink {
    pub fn new(token: String) -> Self {
        Self {
            http: Client::new(),
            token,
            base_url: BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl AlertSink for TelegramSink {
    async fn deliver(&self, destination: &str, text: &str) -> Result<(), SinkError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);

        // reqwest errors are stripped of the url, it embeds the bot token
        let res = self
            .http
            .post(url)
            .json(&json!({ "chat_id": destination, "text": text }))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| SinkError::Transport(e.without_url().to_string()))?;

        let status = res.status();
        let body = res
            .json::<ApiResponse>()
            .await
            .map_err(|e| SinkError::Transport(format!("{status}: {}", e.without_url())))?;

        if !status.is_success() || !body.ok {
            let why = body.description.unwrap_or_else(|| status.to_string());
            return Err(SinkError::Rejected(why));
        }

        Ok(())
    }
}
