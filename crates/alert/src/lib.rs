//! # sheetbridge-alert
//!
//! Post plain-text alerts to a Google Chat space through an incoming
//! webhook.
//!
//! Delivery is best effort: one attempt, no retry, and failures are
//! reported as a [`Delivery`] value instead of an error so that alerting
//! never breaks the caller's flow.

use reqwest::Client;
use serde::Serialize;
use sheetbridge_core::{BridgeConfig, BridgeError, BridgeResult};
use sheetbridge_http::build_client;

const CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Outcome of one alert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The webhook answered; the status is reported as-is.
    Sent { status: u16 },
    /// The request never completed.
    Failed { reason: String },
}

impl Delivery {
    /// True when the webhook answered at all.
    #[must_use]
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    text: &'a str,
}

/// Sends alerts to one Google Chat webhook.
#[derive(Debug, Clone)]
pub struct ChatNotifier {
    client: Client,
    webhook_url: String,
}

impl ChatNotifier {
    /// Create a notifier for a webhook URL (including its `key` and `token`).
    pub fn new(webhook_url: impl Into<String>) -> BridgeResult<Self> {
        Ok(Self {
            client: build_client()?,
            webhook_url: webhook_url.into(),
        })
    }

    /// Create a notifier from `chat_webhook_url` in the configuration.
    pub fn from_config(config: &BridgeConfig) -> BridgeResult<Self> {
        let url = config.chat_webhook_url.as_deref().ok_or_else(|| {
            BridgeError::Config(format!(
                "chat_webhook_url is not set (config file or {})",
                sheetbridge_core::config::CHAT_WEBHOOK_ENV
            ))
        })?;
        Self::new(url)
    }

    /// Post `text` to the space.
    pub async fn notify(&self, text: &str) -> Delivery {
        let body = match serde_json::to_vec(&ChatMessage { text }) {
            Ok(body) => body,
            Err(e) => return failed(e.to_string()),
        };

        let result = self
            .client
            .post(&self.webhook_url)
            .header("Content-Type", CONTENT_TYPE)
            .body(body)
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    tracing::info!("Alert delivered ({status})");
                } else {
                    tracing::warn!("Alert webhook answered {status}");
                }
                Delivery::Sent {
                    status: status.as_u16(),
                }
            }
            Err(e) => failed(e.to_string()),
        }
    }
}

fn failed(reason: String) -> Delivery {
    tracing::warn!("Alert not delivered: {reason}");
    Delivery::Failed { reason }
}
