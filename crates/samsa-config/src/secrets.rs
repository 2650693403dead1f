//! Runtime secret resolution for the Telegram notifier.
//!
//! # Contract
//! - Settings store only **env var NAMES** (see [`crate::TelegramKeysEnv`]).
//! - The daemon calls [`resolve_telegram_secrets`] once at startup and hands the
//!   result to the notifier constructor. No other code reads these env vars.
//! - `Debug` output **redacts** the bot token and chat ids.
//!
//! Missing values are not an error: the notifier fails closed on an empty
//! token or an empty recipient list, and orders are still accepted.

use crate::TelegramKeysEnv;

/// Telegram credentials resolved from the environment.
#[derive(Clone, Default)]
pub struct TelegramSecrets {
    /// `None` if the named env var was absent or blank.
    pub bot_token: Option<String>,
    /// Recipients in configuration order; absent or blank vars are skipped.
    pub chat_ids: Vec<String>,
}

impl TelegramSecrets {
    /// True when there is nothing to send with or nobody to send to.
    pub fn is_incomplete(&self) -> bool {
        self.bot_token.is_none() || self.chat_ids.is_empty()
    }
}

impl std::fmt::Debug for TelegramSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Bot tokens grant full control of the bot; chat ids identify people.
        f.debug_struct("TelegramSecrets")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<REDACTED>"))
            .field("chat_ids", &format!("<{} REDACTED>", self.chat_ids.len()))
            .finish()
    }
}

/// Resolve the Telegram secrets from the real process environment.
pub fn resolve_telegram_secrets(names: &TelegramKeysEnv) -> TelegramSecrets {
    resolve_telegram_secrets_with(names, |k| std::env::var(k).ok())
}

/// Same as [`resolve_telegram_secrets`] with an injectable lookup, so tests
/// never have to mutate the process environment.
pub fn resolve_telegram_secrets_with<F>(names: &TelegramKeysEnv, lookup: F) -> TelegramSecrets
where
    F: Fn(&str) -> Option<String>,
{
    let resolve = |var_name: &str| -> Option<String> {
        match lookup(var_name) {
            Some(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
            _ => None,
        }
    };

    TelegramSecrets {
        bot_token: resolve(&names.bot_token),
        chat_ids: names.chat_ids.iter().filter_map(|n| resolve(n)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let s = TelegramSecrets {
            bot_token: Some("123456:very-secret".to_string()),
            chat_ids: vec!["-100123".to_string()],
        };
        let dbg = format!("{s:?}");
        assert!(!dbg.contains("very-secret"));
        assert!(!dbg.contains("-100123"));
        assert!(dbg.contains("<REDACTED>"));
    }
}
