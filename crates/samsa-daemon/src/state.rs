//! Shared runtime state for samsa-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. The state holds no
//! per-request data: the notifier, the order log handle and static paths.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use samsa_config::{secrets, Settings};
use samsa_notify::{Notifier, TelegramNotifier};
use samsa_orders::OrderLog;
use tracing::{info, warn};

/// Static build metadata included in health responses.
#[derive(Clone, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// Cloneable (Arc) handle shared across all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub build: BuildInfo,
    /// Where order summaries and probe messages go.
    pub notifier: Arc<dyn Notifier>,
    /// Single-writer handle on the orders file.
    pub orders: Arc<OrderLog>,
    /// Bundled single-page app; `index.html` inside is the fallback page.
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(notifier: Arc<dyn Notifier>, orders: OrderLog, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            build: BuildInfo {
                service: "samsa-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            notifier,
            orders: Arc::new(orders),
            static_dir: static_dir.into(),
        }
    }

    /// Production wiring: resolve Telegram secrets from the environment and
    /// build the real notifier. Missing secrets degrade notifications to
    /// always-failing; they do not stop the daemon.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let resolved = secrets::resolve_telegram_secrets(&settings.telegram.keys_env);
        let telegram = TelegramNotifier::new(&settings.telegram, resolved)?;

        if telegram.is_configured() {
            info!(recipients = telegram.recipient_count(), "telegram notifier configured");
        } else {
            warn!(
                token_var = %settings.telegram.keys_env.bot_token,
                "telegram not configured; orders will be stored with telegramSent=false"
            );
        }

        Ok(Self::new(
            Arc::new(telegram),
            OrderLog::new(&settings.orders.file),
            &settings.server.static_dir,
        ))
    }

    pub fn index_html(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }
}
