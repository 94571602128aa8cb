//! Local user identity and the persisted profile record.
//!
//! # Invariants
//! - A profile is persisted as one whole record under `userData`.
//! - Statistics start at zero and `recent_activity` starts empty.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display name given to a freshly created local user.
pub const DEFAULT_USERNAME: &str = "Musician";

/// Maximum number of entries kept in `recent_activity`.
pub const MAX_RECENT_ACTIVITY: usize = 20;

/// Locally generated user identity, stored under `currentUser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub username: String,
    pub id: String,
}

impl CurrentUser {
    /// Creates a temporary local identity (`temp_<uuid>`).
    pub fn temporary() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            id: format!("temp_{}", Uuid::new_v4().simple()),
        }
    }
}

/// Usage counters shown on the dashboard and sidebar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub transcriptions: u32,
    pub projects: u32,
    pub downloads: u32,
    pub collaborations: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default = "default_auto_save")]
    pub auto_save: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            genres: Vec::new(),
            auto_save: true,
        }
    }
}

fn default_auto_save() -> bool {
    true
}

/// Category of a recent-activity entry; drives the host's icon choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Transcription,
    Project,
    Download,
    Collaboration,
    Info,
    Tip,
}

impl ActivityKind {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Transcription => "wave-square",
            Self::Project => "project-diagram",
            Self::Download => "download",
            Self::Collaboration => "users",
            Self::Info => "info-circle",
            Self::Tip => "lightbulb",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub message: String,
    /// Relative time label (e.g. `Now`), not a timestamp.
    pub time: String,
}

impl Activity {
    pub fn new(kind: ActivityKind, message: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            time: time.into(),
        }
    }
}

/// Flat per-user record persisted under `userData`.
///
/// Missing fields in older stored values fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub stats: UserStats,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub recent_activity: Vec<Activity>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            stats: UserStats::default(),
            preferences: Preferences::default(),
            recent_activity: Vec::new(),
        }
    }
}

impl UserProfile {
    /// Uppercased first letter of the username, `M` when the name is empty.
    pub fn avatar_initial(&self) -> char {
        self.username
            .chars()
            .next()
            .and_then(|first| first.to_uppercase().next())
            .unwrap_or('M')
    }

    /// Prepends an activity entry, keeping at most `MAX_RECENT_ACTIVITY`.
    pub fn push_activity(&mut self, activity: Activity) {
        self.recent_activity.insert(0, activity);
        self.recent_activity.truncate(MAX_RECENT_ACTIVITY);
    }
}
