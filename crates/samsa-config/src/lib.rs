//! samsa-config
//!
//! Layered settings for the order intake daemon.
//!
//! Layers, lowest precedence first:
//! 1. built-in defaults ([`Settings::default`])
//! 2. zero or more YAML documents, deep-merged in order
//! 3. environment overrides for the bind address (`PORT`, `SAMSA_ADDR`)
//!
//! YAML stores only env var NAMES for secrets. The values are resolved once at
//! startup by [`secrets::resolve_telegram_secrets`].

pub mod secrets;

use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Env var holding the path of an optional YAML settings file.
pub const CONFIG_PATH_ENV: &str = "SAMSA_CONFIG";

/// Env var holding a full socket address; wins over `PORT`.
pub const ADDR_ENV: &str = "SAMSA_ADDR";

/// Env var holding a bare port; binds on all interfaces.
pub const PORT_ENV: &str = "PORT";

const DEFAULT_PORT: u16 = 5000;

// ---------------------------------------------------------------------------
// Typed settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub server: ServerSettings,
    pub orders: OrdersSettings,
    pub telegram: TelegramSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    pub bind_addr: SocketAddr,
    /// Directory holding the bundled single-page app (`index.html` + assets).
    pub static_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            static_dir: PathBuf::from("dist"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrdersSettings {
    /// JSON array file every accepted order is appended to.
    pub file: PathBuf,
}

impl Default for OrdersSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("orders.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelegramSettings {
    pub api_base: String,
    pub timeout_secs: u64,
    pub keys_env: TelegramKeysEnv,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            timeout_secs: 10,
            keys_env: TelegramKeysEnv::default(),
        }
    }
}

/// Env var NAMES (never values) for the Telegram credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelegramKeysEnv {
    pub bot_token: String,
    pub chat_ids: Vec<String>,
}

impl Default for TelegramKeysEnv {
    fn default() -> Self {
        Self {
            bot_token: "TELEGRAM_BOT_TOKEN".to_string(),
            chat_ids: vec![
                "TELEGRAM_CHAT_ID_1".to_string(),
                "TELEGRAM_CHAT_ID_2".to_string(),
            ],
        }
    }
}

impl Settings {
    /// Deserialize typed settings from a merged config document.
    /// Missing sections fall back to defaults; unknown keys are rejected.
    pub fn from_config_json(config_json: &Value) -> Result<Self> {
        serde_json::from_value(config_json.clone())
            .context("CONFIG_INVALID: settings decode failed")
    }

    /// Apply bind-address overrides. `lookup` abstracts `std::env::var` so
    /// tests never mutate the process environment.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = non_blank(lookup(ADDR_ENV)) {
            self.server.bind_addr = addr.parse().with_context(|| {
                format!("CONFIG_INVALID: {ADDR_ENV}='{addr}' is not a socket address")
            })?;
            return Ok(());
        }
        if let Some(port) = non_blank(lookup(PORT_ENV)) {
            let port: u16 = port.parse().with_context(|| {
                format!("CONFIG_INVALID: {PORT_ENV}='{port}' is not a port number")
            })?;
            self.server.bind_addr = SocketAddr::from(([0, 0, 0, 0], port));
        }
        Ok(())
    }
}

/// Load settings the way the daemon does at startup: optional YAML file named
/// by `SAMSA_CONFIG`, then env overrides from the real process environment.
pub fn load_settings_from_env() -> Result<Settings> {
    let lookup = |k: &str| std::env::var(k).ok();
    let loaded = match non_blank(lookup(CONFIG_PATH_ENV)) {
        Some(path) => load_layered_yaml(&[path.as_str()])?,
        None => load_layered_yaml_from_strings(&[])?,
    };
    let mut settings = Settings::from_config_json(&loaded.config_json)?;
    settings.apply_env_overrides(lookup)?;
    Ok(settings)
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

// ---------------------------------------------------------------------------
// YAML layering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_json: Value,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    // Earlier docs are base, later docs override.
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        // An empty document parses to null; treat it as "no overrides".
        if v_yaml.is_null() {
            continue;
        }
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    enforce_no_secret_literals(&merged)?;

    Ok(LoadedConfig {
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

// ---------------------------------------------------------------------------
// Secret literal guard
// ---------------------------------------------------------------------------

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            let p = if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            };
            out.push(p);
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    collect_leaf_pointers(v, "", &mut leaves);

    for ptr in leaves {
        if let Some(s) = v.pointer(&ptr).and_then(Value::as_str) {
            if looks_like_bot_token(s) {
                bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", ptr);
            }
        }
    }
    Ok(())
}

/// Telegram bot tokens are `<bot id digits>:<35+ url-safe chars>`.
fn looks_like_bot_token(s: &str) -> bool {
    let Some((id, secret)) = s.trim().split_once(':') else {
        return false;
    };
    !id.is_empty()
        && id.chars().all(|c| c.is_ascii_digit())
        && secret.len() >= 35
        && secret
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_token_shape_is_detected() {
        assert!(looks_like_bot_token(
            "123456789:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsawQ"
        ));
        // One char short of a real token.
        assert!(!looks_like_bot_token(
            "123456789:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw"
        ));
        assert!(!looks_like_bot_token("TELEGRAM_BOT_TOKEN"));
        assert!(!looks_like_bot_token("0.0.0.0:5000"));
        assert!(!looks_like_bot_token("https://api.telegram.org"));
    }

    #[test]
    fn deep_merge_overrides_leaves_and_keeps_siblings() {
        let a = serde_json::json!({"server": {"bind_addr": "0.0.0.0:5000", "static_dir": "dist"}});
        let b = serde_json::json!({"server": {"static_dir": "public"}});
        let m = deep_merge(a, b);
        assert_eq!(m["server"]["bind_addr"], "0.0.0.0:5000");
        assert_eq!(m["server"]["static_dir"], "public");
    }
}
