//! Contract of the host UI layer.
//!
//! The core calls into a `ContentRenderer` but never owns what it draws.
//! Only the navigation hooks are required; the rest default to no-ops so a
//! host can start small.

use crate::model::notification::{Notification, Toast};
use crate::model::section::Section;
use crate::model::transcription::{TranscriptionProgress, TranscriptionResult};
use crate::model::upload::AudioFile;
use crate::nav::loader::{Recommendation, SectionContent};
use crate::service::profile_service::ProfileView;
use crate::service::search::SearchResults;

pub trait ContentRenderer {
    /// Shows or hides the panel and nav item of `section`.
    fn set_section_active(&mut self, section: Section, active: bool);
    /// Whether the panel of `section` already holds rendered content.
    fn has_content(&self, section: Section) -> bool;
    fn render_section(&mut self, section: Section, content: &SectionContent);
    fn set_address_fragment(&mut self, fragment: &str);
    fn set_title(&mut self, title: &str);
    fn show_toast(&mut self, toast: &Toast);
    /// Replaces the whole UI with a static retry prompt.
    fn show_fatal(&mut self, message: &str);

    fn show_profile(&mut self, _view: &ProfileView) {}
    fn show_notifications(&mut self, _notifications: &[Notification], _unread: usize) {}
    fn show_recommendations(&mut self, _recommendations: &[Recommendation]) {}
    fn show_selected_file(&mut self, _file: &AudioFile, _size_label: &str) {}
    fn reset_upload(&mut self) {}
    fn show_search_results(&mut self, _results: &SearchResults) {}
    fn show_transcription_progress(&mut self, _progress: &TranscriptionProgress) {}
    fn show_transcription_result(&mut self, _result: &TranscriptionResult) {}
    fn set_date_label(&mut self, _label: &str) {}
    /// Swaps the player button between its play and pause icons.
    fn set_playback(&mut self, _playing: bool) {}
}
