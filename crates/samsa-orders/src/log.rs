//! The order log: one JSON file holding an array of every accepted [`Order`].
//!
//! Each append reads the whole array, pushes the new record, and replaces the
//! file. Appends are serialized through an async mutex so two concurrent
//! submissions cannot lose each other's record, and the new contents are
//! written to a sibling temp file and renamed over the live file so a crash
//! never leaves a truncated array behind.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::order::Order;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("read order log {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parse order log {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("serialize order log: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("write order log {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Single-writer handle on the order log file.
#[derive(Debug)]
pub struct OrderLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl OrderLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored order, oldest first. A missing or blank file is an
    /// empty log.
    pub async fn load(&self) -> Result<Vec<Order>, PersistenceError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&raw).map_err(|source| PersistenceError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Append `order` as the last record. Returns the new record count.
    ///
    /// If the existing file cannot be parsed it is left untouched and the
    /// order is not stored.
    pub async fn append(&self, order: &Order) -> Result<usize, PersistenceError> {
        let _guard = self.write_lock.lock().await;

        let mut orders = self.load().await?;
        orders.push(order.clone());

        let body = serde_json::to_string_pretty(&orders).map_err(PersistenceError::Serialize)?;
        self.replace_contents(body.as_bytes()).await?;

        debug!(order_id = order.order_id, records = orders.len(), path = ?self.path, "order log appended");
        Ok(orders.len())
    }

    async fn replace_contents(&self, bytes: &[u8]) -> Result<(), PersistenceError> {
        let write_err = |source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        let tmp = self.temp_path();
        fs::write(&tmp, bytes).await.map_err(write_err)?;
        fs::rename(&tmp, &self.path).await.map_err(write_err)?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "orders.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
