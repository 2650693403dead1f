//! samsa-notify
//!
//! Outbound notifications for accepted orders.
//!
//! [`Notifier`] is the seam the daemon depends on; [`TelegramNotifier`] is the
//! production implementation over the Telegram Bot API. Delivery is
//! best-effort: failures are logged and reported as `false`, never raised to
//! the HTTP caller.

pub mod telegram;

pub use telegram::{DispatchReport, TelegramNotifier};

use async_trait::async_trait;
use thiserror::Error;

/// Sends a text message to every configured recipient.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short channel name for logs.
    fn channel(&self) -> &'static str;

    /// `true` only if every recipient accepted the message.
    async fn notify(&self, text: &str) -> bool;
}

/// Why one recipient did not get the message.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notifier not configured: missing bot token or recipients")]
    NotConfigured,
    #[error("recipient #{recipient} rejected: http {status}: {body}")]
    Status {
        recipient: usize,
        status: u16,
        body: String,
    },
    #[error("recipient #{recipient} transport error: {source}")]
    Transport {
        recipient: usize,
        #[source]
        source: reqwest::Error,
    },
}
