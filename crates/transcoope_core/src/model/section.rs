//! Top-level panels of the shell and address-fragment routing.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Product name appended to every window title.
pub const APP_TITLE: &str = "TransCoope";

/// One named top-level panel of the shell.
///
/// The set is closed: adding a panel is an exhaustive-match change in every
/// dispatch site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Dashboard,
    Transcribe,
    Library,
    Community,
    Projects,
    Trending,
}

impl Section {
    /// Every section in navigation-bar order.
    pub const ALL: [Section; 6] = [
        Section::Dashboard,
        Section::Transcribe,
        Section::Library,
        Section::Community,
        Section::Projects,
        Section::Trending,
    ];

    /// Stable routing id, also used as the address fragment.
    pub fn id(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Transcribe => "transcribe",
            Self::Library => "library",
            Self::Community => "community",
            Self::Projects => "projects",
            Self::Trending => "trending",
        }
    }

    /// Human-readable panel title.
    pub fn title(self) -> &'static str {
        match self {
            Self::Dashboard => "Home",
            Self::Transcribe => "Transcribe",
            Self::Library => "My Library",
            Self::Community => "Community",
            Self::Projects => "Projects",
            Self::Trending => "Trending",
        }
    }

    /// Window/document title shown while this section is active.
    pub fn window_title(self) -> String {
        format!("{} | {APP_TITLE}", self.title())
    }

    /// Parses an exact routing id. Returns `None` for anything else.
    pub fn from_id(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.id() == value)
    }

    /// Resolves a raw address fragment (with or without the leading `#`).
    ///
    /// Absent, empty or unrecognized fragments resolve to `Dashboard`.
    pub fn resolve(fragment: Option<&str>) -> Self {
        fragment
            .map(|raw| raw.trim().trim_start_matches('#'))
            .and_then(Self::from_id)
            .unwrap_or_default()
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::Dashboard
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::Section;

    #[test]
    fn resolve_accepts_known_ids_with_or_without_hash() {
        assert_eq!(Section::resolve(Some("library")), Section::Library);
        assert_eq!(Section::resolve(Some("#trending")), Section::Trending);
        assert_eq!(Section::resolve(Some("  #projects ")), Section::Projects);
    }

    #[test]
    fn resolve_falls_back_to_dashboard() {
        assert_eq!(Section::resolve(None), Section::Dashboard);
        assert_eq!(Section::resolve(Some("")), Section::Dashboard);
        assert_eq!(Section::resolve(Some("#")), Section::Dashboard);
        assert_eq!(Section::resolve(Some("settings")), Section::Dashboard);
        assert_eq!(Section::resolve(Some("Library")), Section::Dashboard);
    }

    #[test]
    fn ids_round_trip_for_every_section() {
        for section in Section::ALL {
            assert_eq!(Section::from_id(section.id()), Some(section));
        }
    }

    #[test]
    fn window_title_carries_app_name() {
        assert_eq!(Section::Library.window_title(), "My Library | TransCoope");
    }
}
