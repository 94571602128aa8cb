//! The shell session: one explicit context object owning navigation, the
//! store, the renderer and every in-flight simulated task.
//!
//! # Responsibility
//! - Start the shell (capability check, profile load, first render).
//! - Turn host events into navigator transitions and service calls.
//! - Run simulated work (content loads, transcription, search, timers) on a
//!   single cooperative loop.
//!
//! # Invariants
//! - Every failed operation is paired with a user-visible toast.
//! - A failing content load never rolls back the active section.
//! - At most one transcription job runs at a time.

use crate::config::{ConfigError, ShellConfig};
use crate::model::notification::{Notification, NotificationId, NotificationKind, Toast};
use crate::model::profile::{Activity, ActivityKind, CurrentUser, UserProfile};
use crate::model::section::Section;
use crate::model::transcription::TranscriptionProgress;
use crate::model::upload::AudioFile;
use crate::nav::loader::{recommendations, LoadFuture, LoadResult, SectionLoader};
use crate::nav::navigator::{LoadTicket, Navigator};
use crate::nav::renderer::ContentRenderer;
use crate::service::clock::{current_date_label, Greeting};
use crate::service::notification_service::{
    unread_count, NotificationError, NotificationResult, NotificationService,
};
use crate::service::profile_service::{ProfileService, ProfileView};
use crate::service::search::{normalize_query, search_catalog, SearchResults};
use crate::service::transcription::{
    JobEvent, TranscriptionError, TranscriptionJob, TranscriptionOutcome, TranscriptionPipeline,
};
use crate::service::upload_service::{format_file_size, UploadError, UploadPolicy};
use crate::session::event::{QuickAction, QuickTarget, ShellEvent};
use crate::store::{KvBackend, NamespacedStore};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::time::{delay_queue, DelayQueue};

const FATAL_MESSAGE: &str =
    "TransCoope could not start. Check that local storage is available and try again.";
const LOAD_FAILED_MESSAGE: &str = "Failed to load content";
const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";
const RECOMMENDATION_REFRESH_DELAY: Duration = Duration::from_secs(1);

/// Session start failure. The renderer has already shown the retry prompt.
#[derive(Debug)]
pub enum InitError {
    Config(ConfigError),
    StorageUnavailable,
}

impl Display for InitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::StorageUnavailable => write!(f, "persistent storage is unavailable"),
        }
    }
}

impl Error for InitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::StorageUnavailable => None,
        }
    }
}

/// Work scheduled on the session loop's timer queue.
#[derive(Debug)]
enum Deferred {
    BackgroundRefresh,
    Navigate(Section),
    RefreshRecommendations,
    Search(String),
}

impl Deferred {
    fn name(&self) -> &'static str {
        match self {
            Self::BackgroundRefresh => "background_refresh",
            Self::Navigate(_) => "navigate",
            Self::RefreshRecommendations => "refresh_recommendations",
            Self::Search(_) => "search",
        }
    }
}

struct InFlightLoad {
    ticket: LoadTicket,
    future: LoadFuture,
}

/// Everything the loop keeps in flight between events.
struct LoopState {
    load: Option<InFlightLoad>,
    job: Option<TranscriptionJob>,
    deferred: DelayQueue<Deferred>,
    search_key: Option<delay_queue::Key>,
}

impl LoopState {
    fn new() -> Self {
        Self {
            load: None,
            job: None,
            deferred: DelayQueue::new(),
            search_key: None,
        }
    }

    fn is_idle(&self) -> bool {
        self.load.is_none() && self.job.is_none() && self.deferred.is_empty()
    }
}

pub struct Session<B: KvBackend, R: ContentRenderer, L: SectionLoader> {
    config: ShellConfig,
    store: NamespacedStore<B>,
    renderer: R,
    loader: L,
    navigator: Navigator,
    upload_policy: UploadPolicy,
    pipeline: TranscriptionPipeline,
    user: CurrentUser,
    profile: UserProfile,
    selected_file: Option<AudioFile>,
    playing: bool,
}

impl<B: KvBackend, R: ContentRenderer, L: SectionLoader> Session<B, R, L> {
    /// Starts a session: validates config, checks the store, loads or
    /// creates the profile and renders the user header.
    ///
    /// On failure the renderer shows a static retry prompt before the error
    /// is returned.
    pub fn start(
        config: ShellConfig,
        backend: B,
        mut renderer: R,
        loader: L,
    ) -> Result<Self, InitError> {
        if let Err(err) = config.validate() {
            error!("event=session_start module=session status=error error_code=invalid_config error={err}");
            renderer.show_fatal(FATAL_MESSAGE);
            return Err(InitError::Config(err));
        }

        let store = NamespacedStore::new(backend, config.namespace.clone());
        if !store.is_available() {
            error!("event=session_start module=session status=error error_code=storage_unavailable");
            renderer.show_fatal(FATAL_MESSAGE);
            return Err(InitError::StorageUnavailable);
        }

        let (user, profile) = ProfileService::new(&store).load_or_create();
        let mut session = Self {
            navigator: Navigator::new(config.in_flight_policy),
            upload_policy: UploadPolicy::from_config(&config),
            pipeline: TranscriptionPipeline::new(config.step_delay()),
            config,
            store,
            renderer,
            loader,
            user,
            profile,
            selected_file: None,
            playing: false,
        };
        session.refresh_profile_view();
        session.renderer.set_date_label(&current_date_label());
        info!(
            "event=session_start module=session status=ok policy={:?}",
            session.config.in_flight_policy
        );
        Ok(session)
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn store(&self) -> &NamespacedStore<B> {
        &self.store
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn selected_file(&self) -> Option<&AudioFile> {
        self.selected_file.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Resolves the startup fragment and loads the initial section.
    pub async fn open(&mut self, fragment: Option<&str>) {
        let ticket = self.begin_navigation(fragment);
        self.drive_loads(ticket).await;
    }

    /// Activates the section named by `requested` and waits for its content.
    pub async fn navigate(&mut self, requested: &str) {
        let ticket = self.begin_navigation(Some(requested));
        self.drive_loads(ticket).await;
    }

    /// Validates a selected file and shows it in the upload area.
    ///
    /// A rejected file leaves the session and the store untouched apart from
    /// the error toast.
    pub fn select_file(&mut self, file: AudioFile) -> Result<(), UploadError> {
        if let Err(err) = self.upload_policy.validate(&file) {
            warn!("event=upload_validate module=upload status=error error={err}");
            self.renderer.show_toast(&Toast::error(err.user_message()));
            return Err(err);
        }
        info!(
            "event=upload_validate module=upload status=ok size_bytes={}",
            file.size_bytes
        );
        self.renderer
            .show_selected_file(&file, &format_file_size(file.size_bytes));
        self.selected_file = Some(file);
        Ok(())
    }

    pub fn cancel_upload(&mut self) {
        self.selected_file = None;
        self.renderer.reset_upload();
    }

    /// Starts the simulated pipeline for the selected file.
    pub fn start_transcription(&mut self) -> Option<TranscriptionJob> {
        let Some(file) = self.selected_file.clone() else {
            self.renderer
                .show_toast(&Toast::error("Select an audio file first"));
            return None;
        };
        self.renderer
            .show_toast(&Toast::info("Starting transcription..."));
        Some(self.pipeline.start(file))
    }

    /// Runs a transcription of the selected file to completion, then moves to
    /// the library after the configured delay.
    pub async fn transcribe(&mut self) -> Option<TranscriptionOutcome> {
        self.transcribe_until(std::future::pending()).await
    }

    /// Like `transcribe`, but cancels the job once `stop` resolves.
    pub async fn transcribe_until(
        &mut self,
        stop: impl Future<Output = ()>,
    ) -> Option<TranscriptionOutcome> {
        let mut job = self.start_transcription()?;
        tokio::pin!(stop);
        let mut stop_requested = false;
        let outcome = loop {
            tokio::select! {
                event = job.next_event() => match event {
                    JobEvent::Progress(progress) => self.on_transcription_progress(&progress),
                    JobEvent::Finished(outcome) => break outcome,
                },
                () = &mut stop, if !stop_requested => {
                    stop_requested = true;
                    job.cancel();
                }
            }
        };
        if self.finish_transcription(&outcome) {
            tokio::time::sleep(self.config.post_transcription_nav_delay()).await;
            self.navigate(Section::Library.id()).await;
        }
        Some(outcome)
    }

    /// Runs a simulated search. Blank queries are ignored.
    pub async fn search(&mut self, raw: &str) -> Option<SearchResults> {
        let query = self.begin_search(raw)?;
        tokio::time::sleep(self.config.search_delay()).await;
        Some(self.complete_search(&query))
    }

    /// Loads and renders the notification center.
    pub fn open_notifications(&mut self) -> Vec<Notification> {
        let notifications = NotificationService::new(&self.store).list();
        self.renderer
            .show_notifications(&notifications, unread_count(&notifications));
        notifications
    }

    /// Removes a notification. Unknown ids are a silent no-op; a failed write
    /// keeps the entry and shows an error toast.
    pub fn dismiss_notification(&mut self, id: NotificationId) -> NotificationResult<()> {
        let result = NotificationService::new(&self.store).dismiss(id);
        match result {
            Ok(()) => {
                self.open_notifications();
                self.renderer
                    .show_toast(&Toast::success("Notification removed"));
            }
            Err(err) => self.report_notification_error(err),
        }
        result
    }

    pub fn mark_notifications_read(&mut self) -> NotificationResult<usize> {
        let result = NotificationService::new(&self.store).mark_all_read();
        if let Err(err) = result {
            self.report_notification_error(err);
        }
        self.open_notifications();
        result
    }

    /// Adds a notification to the center, e.g. from a background event.
    pub fn notify(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> NotificationResult<Notification> {
        let result = NotificationService::new(&self.store).push(kind, title, message);
        match &result {
            Ok(_) => {
                self.open_notifications();
            }
            Err(err) => self.report_notification_error(*err),
        }
        result
    }

    /// Flips the audio player between playing and paused. Returns the new
    /// state.
    pub fn toggle_playback(&mut self) -> bool {
        self.playing = !self.playing;
        self.renderer.set_playback(self.playing);
        let message = if self.playing {
            "Playing audio"
        } else {
            "Audio paused"
        };
        self.renderer.show_toast(&Toast::info(message));
        debug!(
            "event=playback_toggle module=session status=ok playing={}",
            self.playing
        );
        self.playing
    }

    /// Handles a recommendation card click. Returns the section to visit.
    pub fn recommendation_clicked(&mut self, id: u32) -> Option<Section> {
        match id {
            1 => {
                self.renderer.show_toast(&Toast::info("Opening tutorial..."));
                None
            }
            2 => Some(Section::Community),
            3 => Some(Section::Library),
            other => {
                debug!("event=recommendation_click module=session status=skip id={other}");
                None
            }
        }
    }

    pub async fn refresh_recommendations(&mut self) {
        tokio::time::sleep(RECOMMENDATION_REFRESH_DELAY).await;
        self.complete_recommendation_refresh();
    }

    pub async fn quick_action(&mut self, action: QuickAction) {
        match action.target() {
            QuickTarget::Navigate(section) => self.navigate(section.id()).await,
            QuickTarget::Toast(message) => self.renderer.show_toast(&Toast::info(message)),
            QuickTarget::RefreshRecommendations => self.refresh_recommendations().await,
        }
    }

    /// Applies the delayed initial-data refresh. Returns whether stats changed.
    pub fn apply_background_refresh(&mut self) -> bool {
        let changed = ProfileService::new(&self.store).apply_seeded_stats(&mut self.profile);
        if changed {
            self.refresh_profile_view();
        }
        changed
    }

    /// Converts an error that escaped every other handler into a toast.
    pub fn report_uncaught(&mut self, error: &dyn Display) {
        error!("event=uncaught_error module=session status=error error={error}");
        self.renderer
            .show_toast(&Toast::error(UNEXPECTED_ERROR_MESSAGE));
    }

    /// Runs the session loop until `Shutdown`, or until the event channel is
    /// closed and no simulated work remains.
    ///
    /// Content loads, the transcription job, timers and host events are all
    /// polled from this one task, so navigation requests can arrive while a
    /// load is in flight.
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<ShellEvent>) {
        let mut state = LoopState::new();
        state.deferred.insert(
            Deferred::BackgroundRefresh,
            self.config.background_refresh_delay(),
        );
        let refresh_every = self.config.date_refresh_interval();
        let mut date_tick = tokio::time::interval_at(Instant::now() + refresh_every, refresh_every);
        date_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut events_open = true;
        info!("event=session_loop module=session status=start");

        loop {
            if !events_open && state.is_idle() {
                break;
            }
            tokio::select! {
                event = events.recv(), if events_open => match event {
                    Some(ShellEvent::Shutdown) => {
                        if let Some(job) = &state.job {
                            job.cancel();
                        }
                        break;
                    }
                    Some(event) => self.handle_event(event, &mut state),
                    None => events_open = false,
                },
                result = next_load(&mut state.load) => self.on_load_finished(result, &mut state),
                job_event = next_job_event(&mut state.job) => self.on_job_event(job_event, &mut state),
                expired = std::future::poll_fn(|cx| state.deferred.poll_expired(cx)), if !state.deferred.is_empty() => {
                    if let Some(expired) = expired {
                        self.run_deferred(expired.into_inner(), &mut state);
                    }
                }
                _ = date_tick.tick() => self.renderer.set_date_label(&current_date_label()),
            }
        }

        info!("event=session_loop module=session status=ok");
    }

    fn handle_event(&mut self, event: ShellEvent, state: &mut LoopState) {
        match event {
            ShellEvent::Navigate(raw) => self.request_navigation(Some(&raw), state),
            ShellEvent::QuickAction(action) => match action.target() {
                QuickTarget::Navigate(section) => {
                    self.request_navigation(Some(section.id()), state)
                }
                QuickTarget::Toast(message) => self.renderer.show_toast(&Toast::info(message)),
                QuickTarget::RefreshRecommendations => {
                    state.deferred.insert(
                        Deferred::RefreshRecommendations,
                        RECOMMENDATION_REFRESH_DELAY,
                    );
                }
            },
            ShellEvent::RecommendationClicked(id) => {
                if let Some(section) = self.recommendation_clicked(id) {
                    self.request_navigation(Some(section.id()), state);
                }
            }
            ShellEvent::FileSelected(file) => {
                // Rejections are already surfaced as a toast.
                let _ = self.select_file(file);
            }
            ShellEvent::CancelUpload => self.cancel_upload(),
            ShellEvent::StartTranscription => {
                if state.job.is_some() {
                    self.renderer
                        .show_toast(&Toast::info("A transcription is already running"));
                } else {
                    state.job = self.start_transcription();
                }
            }
            ShellEvent::CancelTranscription => match &state.job {
                Some(job) => job.cancel(),
                None => debug!("event=transcription_cancel module=session status=skip reason=no_job"),
            },
            ShellEvent::Search(raw) => {
                if let Some(key) = state.search_key.take() {
                    state.deferred.remove(&key);
                }
                if let Some(query) = self.begin_search(&raw) {
                    let key = state
                        .deferred
                        .insert(Deferred::Search(query), self.config.search_delay());
                    state.search_key = Some(key);
                }
            }
            ShellEvent::OpenNotifications => {
                self.open_notifications();
            }
            // Failures are already surfaced as a toast.
            ShellEvent::DismissNotification(id) => {
                let _ = self.dismiss_notification(id);
            }
            ShellEvent::MarkNotificationsRead => {
                let _ = self.mark_notifications_read();
            }
            ShellEvent::TogglePlayback => {
                self.toggle_playback();
            }
            ShellEvent::HostError(message) => self.report_uncaught(&message),
            ShellEvent::Shutdown => {}
        }
    }

    fn run_deferred(&mut self, deferred: Deferred, state: &mut LoopState) {
        debug!(
            "event=deferred_run module=session status=start task={}",
            deferred.name()
        );
        match deferred {
            Deferred::BackgroundRefresh => {
                self.apply_background_refresh();
            }
            Deferred::Navigate(section) => self.request_navigation(Some(section.id()), state),
            Deferred::RefreshRecommendations => self.complete_recommendation_refresh(),
            Deferred::Search(query) => {
                state.search_key = None;
                self.complete_search(&query);
            }
        }
    }

    fn on_load_finished(&mut self, result: LoadResult, state: &mut LoopState) {
        if let Some(done) = state.load.take() {
            let next = self.complete_load(done.ticket, result);
            state.load = next.map(|ticket| self.start_load(ticket));
        }
    }

    fn on_job_event(&mut self, event: JobEvent, state: &mut LoopState) {
        match event {
            JobEvent::Progress(progress) => self.on_transcription_progress(&progress),
            JobEvent::Finished(outcome) => {
                state.job = None;
                if self.finish_transcription(&outcome) {
                    state.deferred.insert(
                        Deferred::Navigate(Section::Library),
                        self.config.post_transcription_nav_delay(),
                    );
                }
            }
        }
    }

    fn request_navigation(&mut self, fragment: Option<&str>, state: &mut LoopState) {
        if let Some(ticket) = self.begin_navigation(fragment) {
            state.load = Some(self.start_load(ticket));
        }
    }

    fn begin_navigation(&mut self, fragment: Option<&str>) -> Option<LoadTicket> {
        let section = Section::resolve(fragment);
        self.navigator.activate(section, &mut self.renderer)
    }

    async fn drive_loads(&mut self, mut next: Option<LoadTicket>) {
        while let Some(ticket) = next {
            let InFlightLoad { ticket, mut future } = self.start_load(ticket);
            let result = future.as_mut().await;
            next = self.complete_load(ticket, result);
        }
    }

    fn start_load(&mut self, ticket: LoadTicket) -> InFlightLoad {
        let section = ticket.section();
        if section == Section::Dashboard {
            ProfileService::new(&self.store).ensure_recent_activity(&mut self.profile);
        }
        debug!("event=section_load module=session status=start section={section}");
        let future = self.loader.load(section, &self.profile);
        InFlightLoad { ticket, future }
    }

    fn complete_load(&mut self, ticket: LoadTicket, result: LoadResult) -> Option<LoadTicket> {
        let section = ticket.section();
        let succeeded = match result {
            Ok(content) => {
                self.renderer.render_section(section, &content);
                info!("event=section_load module=session status=ok section={section}");
                true
            }
            Err(err) => {
                error!(
                    "event=section_load module=session status=error section={section} error={err}"
                );
                self.renderer.show_toast(&Toast::error(LOAD_FAILED_MESSAGE));
                false
            }
        };
        self.navigator
            .finish_load(ticket, succeeded, &self.renderer)
    }

    fn on_transcription_progress(&mut self, progress: &TranscriptionProgress) {
        self.renderer.show_transcription_progress(progress);
        self.renderer.show_toast(&Toast::info(progress.message));
    }

    /// Applies a finished job. Returns whether the library should be opened.
    fn finish_transcription(&mut self, outcome: &TranscriptionOutcome) -> bool {
        match outcome {
            Ok(result) => {
                self.renderer
                    .show_toast(&Toast::success("Transcription completed successfully!"));
                let profiles = ProfileService::new(&self.store);
                profiles.apply_seeded_stats(&mut self.profile);
                profiles.record_activity(
                    &mut self.profile,
                    Activity::new(
                        ActivityKind::Transcription,
                        format!("Transcribed {}", result.file),
                        "Now",
                    ),
                );
                self.refresh_profile_view();
                self.renderer.show_transcription_result(result);
                self.selected_file = None;
                self.renderer.reset_upload();
                true
            }
            Err(TranscriptionError::Cancelled { .. }) => {
                self.renderer
                    .show_toast(&Toast::info("Transcription cancelled"));
                false
            }
        }
    }

    fn begin_search(&mut self, raw: &str) -> Option<String> {
        let query = normalize_query(raw)?;
        self.renderer
            .show_toast(&Toast::info(format!("Searching: \"{query}\"")));
        Some(query)
    }

    fn complete_search(&mut self, query: &str) -> SearchResults {
        let results = search_catalog(query);
        self.renderer.show_search_results(&results);
        self.renderer
            .show_toast(&Toast::success(format!("Found {} results", results.total())));
        results
    }

    fn complete_recommendation_refresh(&mut self) {
        self.renderer.show_recommendations(&recommendations());
        self.renderer
            .show_toast(&Toast::success("Recommendations updated"));
    }

    fn report_notification_error(&mut self, err: NotificationError) {
        match err.user_message() {
            Some(message) => self.renderer.show_toast(&Toast::error(message)),
            None => debug!("event=notification_update module=session status=skip error={err}"),
        }
    }

    fn refresh_profile_view(&mut self) {
        let view = ProfileView::new(&self.profile, Greeting::now());
        self.renderer.show_profile(&view);
    }
}

async fn next_load(slot: &mut Option<InFlightLoad>) -> LoadResult {
    match slot {
        Some(load) => load.future.as_mut().await,
        None => std::future::pending().await,
    }
}

async fn next_job_event(slot: &mut Option<TranscriptionJob>) -> JobEvent {
    match slot {
        Some(job) => job.next_event().await,
        None => std::future::pending().await,
    }
}
