//! Namespaced key-value store bridge.
//!
//! # Responsibility
//! - Define the string-keyed backend contract (`KvBackend`).
//! - Scope every key by a fixed namespace prefix.
//! - Round-trip values through JSON text.
//!
//! # Invariants
//! - Failures never cross this boundary: reads degrade to `None`, writes
//!   degrade to `false`. Each degraded call is logged.
//! - Values are stored as JSON text, one entry per namespaced key.

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory_store;
mod sqlite_store;

pub use memory_store::MemoryKvStore;
pub use sqlite_store::SqliteKvStore;

/// Well-known keys of the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    CurrentUser,
    UserData,
    Notifications,
}

impl StoreKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CurrentUser => "currentUser",
            Self::UserData => "userData",
            Self::Notifications => "notifications",
        }
    }
}

impl AsRef<str> for StoreKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Backend failure. Only visible to backend implementations and tests;
/// `NamespacedStore` absorbs it.
#[derive(Debug)]
pub enum StoreError {
    Unavailable(String),
    QuotaExceeded { needed: usize, remaining: usize },
    Backend(String),
    /// SQLite rejected a key-value operation (`get_item`, `set_item`, ...).
    Sqlite {
        op: &'static str,
        source: rusqlite::Error,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
            Self::QuotaExceeded { needed, remaining } => write!(
                f,
                "store quota exceeded: needed {needed} bytes, {remaining} remaining"
            ),
            Self::Backend(message) => write!(f, "store backend error: {message}"),
            Self::Sqlite { op, source } => write!(f, "sqlite {op} failed: {source}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// String-keyed persistent storage, the shape of a browser `localStorage`.
pub trait KvBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;
    /// Cheap capability check run once at session start.
    fn probe(&self) -> Result<(), StoreError>;
}

/// JSON value store scoped to one namespace prefix.
pub struct NamespacedStore<B: KvBackend> {
    backend: B,
    namespace: String,
}

impl<B: KvBackend> NamespacedStore<B> {
    pub fn new(backend: B, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_available(&self) -> bool {
        match self.backend.probe() {
            Ok(()) => true,
            Err(err) => {
                warn!("event=store_probe module=store status=error error={err}");
                false
            }
        }
    }

    /// Reads and parses the value stored under `key`.
    pub fn get(&self, key: impl AsRef<str>) -> Option<Value> {
        let key = key.as_ref();
        let raw = match self.backend.get_item(&self.scoped(key)) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!("event=store_get module=store status=error key={key} error={err}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(
                    "event=store_get module=store status=error key={key} error_code=invalid_json error={err}"
                );
                None
            }
        }
    }

    /// Serializes and writes `value` under `key`. Returns whether it persisted.
    pub fn set(&self, key: impl AsRef<str>, value: &Value) -> bool {
        let key = key.as_ref();
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    "event=store_set module=store status=error key={key} error_code=serialize_failed error={err}"
                );
                return false;
            }
        };
        match self.backend.set_item(&self.scoped(key), &raw) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "event=store_set module=store status=error key={key} bytes={} error={err}",
                    raw.len()
                );
                false
            }
        }
    }

    pub fn remove(&self, key: impl AsRef<str>) -> bool {
        let key = key.as_ref();
        match self.backend.remove_item(&self.scoped(key)) {
            Ok(()) => true,
            Err(err) => {
                warn!("event=store_remove module=store status=error key={key} error={err}");
                false
            }
        }
    }

    /// Typed read. A stored value of the wrong shape reads as absent.
    pub fn load<T: DeserializeOwned>(&self, key: impl AsRef<str>) -> Option<T> {
        let key = key.as_ref();
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(
                    "event=store_get module=store status=error key={key} error_code=shape_mismatch error={err}"
                );
                None
            }
        }
    }

    /// Typed write.
    pub fn save<T: Serialize>(&self, key: impl AsRef<str>, value: &T) -> bool {
        let key = key.as_ref();
        match serde_json::to_value(value) {
            Ok(value) => self.set(key, &value),
            Err(err) => {
                warn!(
                    "event=store_set module=store status=error key={key} error_code=serialize_failed error={err}"
                );
                false
            }
        }
    }

    fn scoped(&self, key: &str) -> String {
        format!("{}{key}", self.namespace)
    }
}
