//! Shared fakes for session-level tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::Duration;
use transcoope_core::model::notification::{Notification, Toast};
use transcoope_core::model::section::Section;
use transcoope_core::model::transcription::{TranscriptionProgress, TranscriptionResult};
use transcoope_core::model::upload::AudioFile;
use transcoope_core::nav::loader::{
    section_content, LoadError, LoadFuture, Recommendation, SectionContent, SectionLoader,
};
use transcoope_core::nav::renderer::ContentRenderer;
use transcoope_core::model::profile::UserProfile;
use transcoope_core::service::profile_service::ProfileView;
use transcoope_core::service::search::SearchResults;
use transcoope_core::ShellConfig;

/// Everything the renderer was asked to show.
#[derive(Debug, Default)]
pub struct RenderLog {
    pub visible: BTreeSet<Section>,
    pub filled: BTreeSet<Section>,
    pub rendered: Vec<Section>,
    pub fragment: String,
    pub title: String,
    pub toasts: Vec<Toast>,
    pub fatal: Option<String>,
    pub profile: Option<ProfileView>,
    pub notifications: Vec<Notification>,
    pub unread: usize,
    pub selected: Option<(String, String)>,
    pub upload_resets: usize,
    pub searches: Vec<SearchResults>,
    pub progress: Vec<u8>,
    pub results: Vec<TranscriptionResult>,
    pub recommendation_refreshes: usize,
    pub date_label: Option<String>,
    pub playback: Vec<bool>,
}

impl RenderLog {
    pub fn toast_messages(&self) -> Vec<&str> {
        self.toasts.iter().map(|toast| toast.message.as_str()).collect()
    }

    pub fn has_toast(&self, message: &str) -> bool {
        self.toasts.iter().any(|toast| toast.message == message)
    }
}

/// Renderer whose log stays readable after the session consumed it.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    log: Rc<RefCell<RenderLog>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> std::cell::Ref<'_, RenderLog> {
        self.log.borrow()
    }

    /// Marks a panel as already holding markup.
    pub fn prefill(&self, section: Section) {
        self.log.borrow_mut().filled.insert(section);
    }
}

impl ContentRenderer for RecordingRenderer {
    fn set_section_active(&mut self, section: Section, active: bool) {
        let mut log = self.log.borrow_mut();
        if active {
            log.visible.insert(section);
        } else {
            log.visible.remove(&section);
        }
    }

    fn has_content(&self, section: Section) -> bool {
        self.log.borrow().filled.contains(&section)
    }

    fn render_section(&mut self, section: Section, _content: &SectionContent) {
        let mut log = self.log.borrow_mut();
        log.filled.insert(section);
        log.rendered.push(section);
    }

    fn set_address_fragment(&mut self, fragment: &str) {
        self.log.borrow_mut().fragment = fragment.to_string();
    }

    fn set_title(&mut self, title: &str) {
        self.log.borrow_mut().title = title.to_string();
    }

    fn show_toast(&mut self, toast: &Toast) {
        self.log.borrow_mut().toasts.push(toast.clone());
    }

    fn show_fatal(&mut self, message: &str) {
        self.log.borrow_mut().fatal = Some(message.to_string());
    }

    fn show_profile(&mut self, view: &ProfileView) {
        self.log.borrow_mut().profile = Some(view.clone());
    }

    fn show_notifications(&mut self, notifications: &[Notification], unread: usize) {
        let mut log = self.log.borrow_mut();
        log.notifications = notifications.to_vec();
        log.unread = unread;
    }

    fn show_recommendations(&mut self, _recommendations: &[Recommendation]) {
        self.log.borrow_mut().recommendation_refreshes += 1;
    }

    fn show_selected_file(&mut self, file: &AudioFile, size_label: &str) {
        self.log.borrow_mut().selected = Some((file.name.clone(), size_label.to_string()));
    }

    fn reset_upload(&mut self) {
        let mut log = self.log.borrow_mut();
        log.selected = None;
        log.upload_resets += 1;
    }

    fn show_search_results(&mut self, results: &SearchResults) {
        self.log.borrow_mut().searches.push(results.clone());
    }

    fn show_transcription_progress(&mut self, progress: &TranscriptionProgress) {
        self.log.borrow_mut().progress.push(progress.percent);
    }

    fn show_transcription_result(&mut self, result: &TranscriptionResult) {
        self.log.borrow_mut().results.push(result.clone());
    }

    fn set_date_label(&mut self, label: &str) {
        self.log.borrow_mut().date_label = Some(label.to_string());
    }

    fn set_playback(&mut self, playing: bool) {
        self.log.borrow_mut().playback.push(playing);
    }
}

/// Loader that records every call and fails for chosen sections.
#[derive(Clone, Default)]
pub struct ScriptedLoader {
    delay: Duration,
    failing: BTreeSet<Section>,
    calls: Rc<RefCell<Vec<Section>>>,
}

impl ScriptedLoader {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn failing(mut self, section: Section) -> Self {
        self.failing.insert(section);
        self
    }

    pub fn calls(&self) -> Vec<Section> {
        self.calls.borrow().clone()
    }

    pub fn calls_for(&self, section: Section) -> usize {
        self.calls.borrow().iter().filter(|called| **called == section).count()
    }
}

impl SectionLoader for ScriptedLoader {
    fn load(&self, section: Section, profile: &UserProfile) -> LoadFuture {
        self.calls.borrow_mut().push(section);
        let delay = self.delay;
        let fails = self.failing.contains(&section);
        let content = section_content(section, profile);
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if fails {
                Err(LoadError::new(section, "backend offline"))
            } else {
                Ok(content)
            }
        })
    }
}

/// Default configuration with instant loads.
pub fn test_config() -> ShellConfig {
    ShellConfig::default()
}

pub type TestSession<B> = transcoope_core::Session<B, RecordingRenderer, ScriptedLoader>;

/// Starts a session with default config, returning a handle on its render log.
pub fn start_session<B: transcoope_core::KvBackend>(
    backend: B,
    loader: ScriptedLoader,
) -> (TestSession<B>, RecordingRenderer) {
    start_session_with(test_config(), backend, loader)
}

pub fn start_session_with<B: transcoope_core::KvBackend>(
    config: ShellConfig,
    backend: B,
    loader: ScriptedLoader,
) -> (TestSession<B>, RecordingRenderer) {
    let renderer = RecordingRenderer::new();
    let session = transcoope_core::Session::start(config, backend, renderer.clone(), loader)
        .expect("session should start");
    (session, renderer)
}
