//! Core of the TransCoope shell.
//! Navigation, persistence and simulated workflows live here; hosts only render.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod nav;
pub mod service;
pub mod session;
pub mod store;

pub use config::{ConfigError, InFlightPolicy, ShellConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::notification::{Notification, NotificationId, NotificationKind, Toast};
pub use model::profile::{CurrentUser, UserProfile, UserStats};
pub use model::section::{Section, APP_TITLE};
pub use model::upload::AudioFile;
pub use nav::loader::{LoadError, SectionContent, SectionLoader, SimulatedLoader};
pub use nav::navigator::{LoadTicket, Navigator, NavigatorState};
pub use nav::renderer::ContentRenderer;
pub use service::notification_service::NotificationError;
pub use service::upload_service::{UploadError, UploadPolicy};
pub use session::{InitError, QuickAction, Session, ShellEvent};
pub use store::{KvBackend, MemoryKvStore, NamespacedStore, SqliteKvStore, StoreError, StoreKey};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
