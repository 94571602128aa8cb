//! SQLite bootstrap for the key-value persistence backend.
//!
//! # Responsibility
//! - Open and configure SQLite connections backing `SqliteKvStore`.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No key-value read/write happens before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while bringing up the key-value database. Each variant names the
/// bootstrap step that failed; per-key reads and writes report `StoreError`.
#[derive(Debug)]
pub enum DbError {
    Connect {
        mode: &'static str,
        source: rusqlite::Error,
    },
    Configure(rusqlite::Error),
    ReadSchemaVersion(rusqlite::Error),
    Migrate {
        version: u32,
        source: rusqlite::Error,
    },
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Stable code used in `db_open` log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "kv_connect_failed",
            Self::Configure(_) => "kv_configure_failed",
            Self::ReadSchemaVersion(_) => "kv_schema_read_failed",
            Self::Migrate { .. } => "kv_migration_failed",
            Self::UnsupportedSchemaVersion { .. } => "kv_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect { mode, source } => {
                write!(f, "cannot open {mode} key-value database: {source}")
            }
            Self::Configure(source) => {
                write!(f, "cannot configure key-value connection: {source}")
            }
            Self::ReadSchemaVersion(source) => {
                write!(f, "cannot read key-value schema version: {source}")
            }
            Self::Migrate { version, source } => {
                write!(f, "key-value migration {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "key-value schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connect { source, .. } | Self::Migrate { source, .. } => Some(source),
            Self::Configure(source) | Self::ReadSchemaVersion(source) => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}
