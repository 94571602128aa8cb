//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose shell use-cases (routing, upload checks, notifications, profile)
//!   to Dart via FRB.
//! - Translate core results into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Store failures come back as `ok=false` envelopes, never as panics.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use transcoope_core::config::DEFAULT_NAMESPACE;
use transcoope_core::model::notification::Notification;
use transcoope_core::service::clock::Greeting;
use transcoope_core::service::notification_service::{
    unread_count, NotificationError, NotificationService,
};
use transcoope_core::service::profile_service::{ProfileService, ProfileView};
use transcoope_core::service::search::{normalize_query, search_catalog as search_catalog_inner};
use transcoope_core::service::upload_service::format_file_size as format_file_size_inner;
use transcoope_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AudioFile, NamespacedStore, Section, SqliteKvStore, UploadPolicy,
};

const SHELL_DB_FILE_NAME: &str = "transcoope_shell.sqlite3";
static SHELL_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
/// Safe to repeat with the same `level + log_dir`.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Routing metadata of one section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionInfo {
    /// Stable id, also the address fragment.
    pub id: String,
    pub title: String,
    /// Document title, e.g. `Home | TransCoope`.
    pub window_title: String,
}

impl SectionInfo {
    fn from_section(section: Section) -> Self {
        Self {
            id: section.id().to_string(),
            title: section.title().to_string(),
            window_title: section.window_title(),
        }
    }
}

/// Resolves a raw fragment (`#library`, `library`, empty) to a section.
///
/// Unknown or missing fragments resolve to the dashboard.
#[flutter_rust_bridge::frb(sync)]
pub fn resolve_section(fragment: Option<String>) -> SectionInfo {
    SectionInfo::from_section(Section::resolve(fragment.as_deref()))
}

/// All sections in navigation-bar order.
#[flutter_rust_bridge::frb(sync)]
pub fn list_sections() -> Vec<SectionInfo> {
    Section::ALL.into_iter().map(SectionInfo::from_section).collect()
}

/// Result of checking a selected file against the upload policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCheckResponse {
    pub ok: bool,
    /// User-facing rejection message; empty when accepted.
    pub message: String,
    pub size_label: String,
}

#[flutter_rust_bridge::frb(sync)]
pub fn validate_upload(name: String, media_type: String, size_bytes: u64) -> UploadCheckResponse {
    let file = AudioFile::new(name, media_type, size_bytes);
    let size_label = format_file_size_inner(file.size_bytes);
    match UploadPolicy::default().validate(&file) {
        Ok(()) => UploadCheckResponse {
            ok: true,
            message: String::new(),
            size_label,
        },
        Err(err) => UploadCheckResponse {
            ok: false,
            message: err.user_message(),
            size_label,
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn format_file_size(bytes: u64) -> String {
    format_file_size_inner(bytes)
}

/// Notification-center entry in FFI-friendly shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    pub id: u64,
    /// `success|error|warning|info`.
    pub kind: String,
    pub icon: String,
    pub title: String,
    pub message: String,
    pub time: String,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationListResponse {
    pub ok: bool,
    pub items: Vec<NotificationItem>,
    pub unread: u32,
    pub message: String,
}

/// Generic action envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Lists notifications, seeding the welcome set on first use.
#[flutter_rust_bridge::frb(sync)]
pub fn list_notifications() -> NotificationListResponse {
    list_notifications_at(&resolve_shell_db_path())
}

/// Removes one notification, keeping the order of the rest.
#[flutter_rust_bridge::frb(sync)]
pub fn dismiss_notification(id: u64) -> ActionResponse {
    dismiss_notification_at(&resolve_shell_db_path(), id)
}

#[flutter_rust_bridge::frb(sync)]
pub fn mark_notifications_read() -> ActionResponse {
    mark_notifications_read_at(&resolve_shell_db_path())
}

/// Header and sidebar data for the local user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileResponse {
    pub ok: bool,
    pub user_id: String,
    pub username: String,
    pub avatar_initial: String,
    /// `Good morning|Good afternoon|Good evening`.
    pub greeting: String,
    pub transcriptions: u32,
    pub projects: u32,
    pub downloads: u32,
    pub collaborations: u32,
    pub message: String,
}

/// Loads the local profile, creating defaults on first run.
#[flutter_rust_bridge::frb(sync)]
pub fn load_profile() -> ProfileResponse {
    load_profile_at(&resolve_shell_db_path())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchItem {
    /// `song|project|user`.
    pub category: String,
    pub label: String,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub items: Vec<SearchItem>,
    pub message: String,
}

/// Searches the simulated catalog without the artificial delay.
#[flutter_rust_bridge::frb(sync)]
pub fn search_catalog(query: String) -> SearchResponse {
    let Some(query) = normalize_query(&query) else {
        return SearchResponse {
            items: Vec::new(),
            message: "Empty query.".to_string(),
        };
    };
    let results = search_catalog_inner(&query);
    let songs = results.songs.iter().map(|hit| SearchItem {
        category: "song".to_string(),
        label: format!("{} - {}", hit.name, hit.artist),
        score: hit.score,
    });
    let projects = results.projects.iter().map(|hit| SearchItem {
        category: "project".to_string(),
        label: hit.name.to_string(),
        score: hit.score,
    });
    let users = results.users.iter().map(|hit| SearchItem {
        category: "user".to_string(),
        label: hit.name.to_string(),
        score: hit.score,
    });
    SearchResponse {
        items: songs.chain(projects).chain(users).collect(),
        message: format!("Found {} results", results.total()),
    }
}

fn list_notifications_at(db_path: &Path) -> NotificationListResponse {
    match with_store(db_path, |store| NotificationService::new(store).list()) {
        Ok(notifications) => NotificationListResponse {
            ok: true,
            unread: u32::try_from(unread_count(&notifications)).unwrap_or(u32::MAX),
            message: format!("{} notification(s).", notifications.len()),
            items: notifications.into_iter().map(to_notification_item).collect(),
        },
        Err(message) => NotificationListResponse {
            ok: false,
            items: Vec::new(),
            unread: 0,
            message,
        },
    }
}

fn dismiss_notification_at(db_path: &Path, id: u64) -> ActionResponse {
    match with_store(db_path, |store| NotificationService::new(store).dismiss(id)) {
        Ok(Ok(())) => ActionResponse::success("Notification removed"),
        Ok(Err(err)) => ActionResponse::failure(notification_failure_message(err)),
        Err(message) => ActionResponse::failure(message),
    }
}

fn mark_notifications_read_at(db_path: &Path) -> ActionResponse {
    match with_store(db_path, |store| NotificationService::new(store).mark_all_read()) {
        Ok(Ok(changed)) => ActionResponse::success(format!("{changed} marked as read.")),
        Ok(Err(err)) => ActionResponse::failure(notification_failure_message(err)),
        Err(message) => ActionResponse::failure(message),
    }
}

fn load_profile_at(db_path: &Path) -> ProfileResponse {
    let loaded = with_store(db_path, |store| ProfileService::new(store).load_or_create());
    match loaded {
        Ok((user, profile)) => {
            let view = ProfileView::new(&profile, Greeting::now());
            ProfileResponse {
                ok: true,
                user_id: user.id,
                username: view.username,
                avatar_initial: view.avatar_initial.to_string(),
                greeting: view.greeting.label().to_string(),
                transcriptions: view.stats.transcriptions,
                projects: view.stats.projects,
                downloads: view.stats.downloads,
                collaborations: view.stats.collaborations,
                message: String::new(),
            }
        }
        Err(message) => ProfileResponse {
            ok: false,
            user_id: String::new(),
            username: String::new(),
            avatar_initial: String::new(),
            greeting: String::new(),
            transcriptions: 0,
            projects: 0,
            downloads: 0,
            collaborations: 0,
            message,
        },
    }
}

fn resolve_shell_db_path() -> PathBuf {
    SHELL_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("TRANSCOOPE_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(SHELL_DB_FILE_NAME)
        })
        .clone()
}

fn with_store<T>(
    db_path: &Path,
    f: impl FnOnce(&NamespacedStore<SqliteKvStore>) -> T,
) -> Result<T, String> {
    let backend =
        SqliteKvStore::open(db_path).map_err(|err| format!("shell DB open failed: {err}"))?;
    let store = NamespacedStore::new(backend, DEFAULT_NAMESPACE);
    if !store.is_available() {
        return Err("shell storage is unavailable".to_string());
    }
    Ok(f(&store))
}

fn notification_failure_message(err: NotificationError) -> String {
    err.user_message()
        .map_or_else(|| err.to_string(), str::to_string)
}

fn to_notification_item(notification: Notification) -> NotificationItem {
    NotificationItem {
        id: notification.id,
        kind: notification.kind.as_str().to_string(),
        icon: notification.kind.icon().to_string(),
        title: notification.title,
        message: notification.message,
        time: notification.time,
        read: notification.read,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, dismiss_notification_at, format_file_size, init_logging,
        list_notifications_at, list_sections, load_profile_at, mark_notifications_read_at, ping,
        resolve_section, search_catalog, validate_upload,
    };
    use transcoope_core::SqliteKvStore;

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_relative_dir() {
        let error = init_logging("info".to_string(), "logs".to_string());
        assert!(error.contains("absolute"));
    }

    #[test]
    fn resolve_section_falls_back_to_dashboard() {
        assert_eq!(resolve_section(Some("#library".to_string())).id, "library");
        assert_eq!(resolve_section(Some("#nowhere".to_string())).id, "dashboard");
        let home = resolve_section(None);
        assert_eq!(home.window_title, "Home | TransCoope");
        assert_eq!(list_sections().len(), 6);
    }

    #[test]
    fn validate_upload_reports_limit_and_type() {
        let limit = 50 * 1024 * 1024;
        assert!(validate_upload("a.mp3".into(), "audio/mpeg".into(), limit).ok);
        let too_big = validate_upload("a.mp3".into(), "audio/mpeg".into(), limit + 1);
        assert!(!too_big.ok);
        assert!(too_big.message.contains("50 MB"));
        assert!(!validate_upload("a.ogg".into(), "audio/ogg".into(), 10).ok);
        assert_eq!(format_file_size(1536), "1.5 KB");
    }

    #[test]
    fn notifications_persist_between_calls() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("shell.sqlite3");

        let first = list_notifications_at(&db);
        assert!(first.ok, "{}", first.message);
        assert_eq!(first.unread, 2);

        assert!(dismiss_notification_at(&db, 2).ok);
        assert!(!dismiss_notification_at(&db, 2).ok);
        assert!(mark_notifications_read_at(&db).ok);

        let after = list_notifications_at(&db);
        let ids: Vec<_> = after.items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(after.unread, 0);
    }

    #[test]
    fn failed_dismiss_reports_storage_not_missing() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("shell.sqlite3");
        assert!(list_notifications_at(&db).ok);

        let store = SqliteKvStore::open(&db).unwrap();
        store
            .connection()
            .execute_batch(
                "CREATE TRIGGER kv_entries_frozen BEFORE UPDATE ON kv_entries
                 BEGIN SELECT RAISE(ABORT, 'frozen'); END;",
            )
            .unwrap();
        drop(store);

        let missing = dismiss_notification_at(&db, 9);
        assert!(!missing.ok);
        assert_eq!(missing.message, "notification 9 not found");

        let frozen = dismiss_notification_at(&db, 2);
        assert!(!frozen.ok);
        assert_eq!(frozen.message, "Could not save notifications");
        assert_eq!(list_notifications_at(&db).items.len(), 3);
    }

    #[test]
    fn profile_is_created_once() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("shell.sqlite3");

        let first = load_profile_at(&db);
        assert!(first.ok, "{}", first.message);
        assert_eq!(first.username, "Musician");
        assert_eq!(first.avatar_initial, "M");
        assert_eq!(first.transcriptions, 0);

        let second = load_profile_at(&db);
        assert_eq!(second.user_id, first.user_id);
    }

    #[test]
    fn search_ignores_blank_queries() {
        assert!(search_catalog("   ".to_string()).items.is_empty());
        let response = search_catalog("piano".to_string());
        assert_eq!(response.items.len(), 4);
        assert_eq!(response.message, "Found 4 results");
    }
}
