//! Host-originated events consumed by the session loop.

use crate::model::notification::NotificationId;
use crate::model::section::Section;
use crate::model::upload::AudioFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// Nav click or address-fragment change, carrying the raw identifier.
    Navigate(String),
    QuickAction(QuickAction),
    RecommendationClicked(u32),
    FileSelected(AudioFile),
    CancelUpload,
    StartTranscription,
    CancelTranscription,
    Search(String),
    OpenNotifications,
    DismissNotification(NotificationId),
    MarkNotificationsRead,
    /// Player button click.
    TogglePlayback,
    /// Error the host caught outside the core (uncaught exception,
    /// rejected async operation).
    HostError(String),
    Shutdown,
}

/// Buttons that act as shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    Transcribe,
    NewTranscription,
    StartActivity,
    Library,
    ViewActivity,
    ExploreCommunity,
    NewProject,
    Collaborate,
    RefreshRecommendations,
}

/// What a quick action resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickTarget {
    Navigate(Section),
    Toast(&'static str),
    RefreshRecommendations,
}

impl QuickAction {
    pub fn target(self) -> QuickTarget {
        match self {
            Self::Transcribe | Self::NewTranscription | Self::StartActivity => {
                QuickTarget::Navigate(Section::Transcribe)
            }
            Self::Library | Self::ViewActivity => QuickTarget::Navigate(Section::Library),
            Self::ExploreCommunity => QuickTarget::Navigate(Section::Community),
            Self::NewProject => QuickTarget::Toast("Project creation is coming soon"),
            Self::Collaborate => QuickTarget::Toast("Collaboration invites are coming soon"),
            Self::RefreshRecommendations => QuickTarget::RefreshRecommendations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{QuickAction, QuickTarget};
    use crate::model::section::Section;

    #[test]
    fn navigation_shortcuts_target_their_sections() {
        assert_eq!(
            QuickAction::StartActivity.target(),
            QuickTarget::Navigate(Section::Transcribe)
        );
        assert_eq!(
            QuickAction::ViewActivity.target(),
            QuickTarget::Navigate(Section::Library)
        );
        assert_eq!(
            QuickAction::ExploreCommunity.target(),
            QuickTarget::Navigate(Section::Community)
        );
    }

    #[test]
    fn modal_shortcuts_only_toast() {
        assert!(matches!(QuickAction::NewProject.target(), QuickTarget::Toast(_)));
        assert!(matches!(QuickAction::Collaborate.target(), QuickTarget::Toast(_)));
    }
}
