//! Telegram Bot API dispatcher.
//!
//! One `sendMessage` call per recipient chat, all issued concurrently. Each
//! outcome is collected on its own; the dispatch succeeds only if all of them
//! did. No retries.
//!
//! The bot token is part of the request URL, so transport errors are logged
//! with the URL stripped.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::future::join_all;
use samsa_config::secrets::TelegramSecrets;
use samsa_config::TelegramSettings;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{NotificationError, Notifier};

/// Telegram parse mode used for every message.
const PARSE_MODE: &str = "HTML";

#[derive(Debug, Serialize)]
struct SendMessageBody<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
}

/// Per-recipient outcomes of one dispatch, in recipient order.
#[derive(Debug)]
pub struct DispatchReport {
    pub outcomes: Vec<Result<(), NotificationError>>,
}

impl DispatchReport {
    fn not_configured() -> Self {
        Self {
            outcomes: vec![Err(NotificationError::NotConfigured)],
        }
    }

    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    /// Logical AND over the recipients.
    pub fn all_delivered(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(Result::is_ok)
    }
}

/// `Debug` is safe to print: [`TelegramSecrets`] redacts itself.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http: reqwest::Client,
    base_url: String,
    secrets: TelegramSecrets,
}

impl TelegramNotifier {
    /// Build a notifier with the configured API base and request timeout.
    pub fn new(settings: &TelegramSettings, secrets: TelegramSecrets) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("telegram http client build failed")?;

        Ok(Self {
            http,
            base_url: settings.api_base.clone(),
            secrets,
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.secrets.is_incomplete()
    }

    pub fn recipient_count(&self) -> usize {
        self.secrets.chat_ids.len()
    }

    fn send_message_url(&self, token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.base_url.trim_end_matches('/'), token)
    }

    /// Send `text` to every recipient and report each outcome.
    ///
    /// Fails closed without any network call when the token or the recipient
    /// list is missing.
    pub async fn dispatch(&self, text: &str) -> DispatchReport {
        let token = match self.secrets.bot_token.as_deref() {
            Some(t) if !self.secrets.chat_ids.is_empty() => t,
            _ => {
                error!("telegram env not set: bot token or chat ids missing");
                return DispatchReport::not_configured();
            }
        };

        let url = self.send_message_url(token);
        let sends = self
            .secrets
            .chat_ids
            .iter()
            .enumerate()
            .map(|(i, chat_id)| self.send_one(&url, i, chat_id, text));

        let outcomes = join_all(sends).await;
        for err in outcomes.iter().filter_map(|o| o.as_ref().err()) {
            error!(error = %err, "telegram send failed");
        }

        DispatchReport { outcomes }
    }

    async fn send_one(
        &self,
        url: &str,
        recipient: usize,
        chat_id: &str,
        text: &str,
    ) -> Result<(), NotificationError> {
        let body = SendMessageBody {
            chat_id,
            text,
            parse_mode: PARSE_MODE,
        };

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotificationError::Transport {
                recipient,
                source: e.without_url(),
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body = resp
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e.without_url()));
        Err(NotificationError::Status {
            recipient,
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn channel(&self) -> &'static str {
        "telegram"
    }

    async fn notify(&self, text: &str) -> bool {
        let report = self.dispatch(text).await;
        let ok = report.all_delivered();
        if ok {
            info!(recipients = report.outcomes.len(), "telegram message delivered");
        } else if report.delivered() > 0 {
            warn!(
                delivered = report.delivered(),
                recipients = report.outcomes.len(),
                "telegram message only partially delivered"
            );
        }
        ok
    }
}
