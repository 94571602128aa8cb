//! Section navigator state machine.
//!
//! # Responsibility
//! - Track the single active section, starting from an uninitialized state.
//! - Apply transition effects to the renderer in a fixed order.
//! - Gate content loads with a single in-flight flag.
//!
//! # Invariants
//! - Re-activating the active section is a no-op.
//! - A section is handed out for loading at most once until its load fails;
//!   a successful load is never repeated in the same session.
//! - At most one load is in flight. Requests arriving meanwhile follow the
//!   configured `InFlightPolicy`.
//! - A failed load never rolls back the active section.

use crate::config::InFlightPolicy;
use crate::model::section::Section;
use crate::nav::renderer::ContentRenderer;
use log::{debug, info, warn};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigatorState {
    #[default]
    Uninitialized,
    Active(Section),
}

/// Permission to run one section's content loader.
///
/// Must be handed back through `Navigator::finish_load`.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a load ticket must be completed with Navigator::finish_load"]
pub struct LoadTicket {
    section: Section,
}

impl LoadTicket {
    pub fn section(&self) -> Section {
        self.section
    }
}

#[derive(Debug)]
pub struct Navigator {
    state: NavigatorState,
    policy: InFlightPolicy,
    loaded: BTreeSet<Section>,
    loading: Option<Section>,
    pending: Option<Section>,
}

impl Navigator {
    pub fn new(policy: InFlightPolicy) -> Self {
        Self {
            state: NavigatorState::Uninitialized,
            policy,
            loaded: BTreeSet::new(),
            loading: None,
            pending: None,
        }
    }

    pub fn state(&self) -> NavigatorState {
        self.state
    }

    pub fn active(&self) -> Option<Section> {
        match self.state {
            NavigatorState::Uninitialized => None,
            NavigatorState::Active(section) => Some(section),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_some()
    }

    pub fn is_loaded(&self, section: Section) -> bool {
        self.loaded.contains(&section)
    }

    /// Section whose load is waiting for the in-flight one to finish.
    pub fn pending(&self) -> Option<Section> {
        self.pending
    }

    /// Activates `section`.
    ///
    /// Effects run in order: hide the current panel, show the new one,
    /// decide on its content load, publish fragment and title, then move the
    /// active pointer. Returns a ticket when the caller must start a load now.
    pub fn activate<R: ContentRenderer + ?Sized>(
        &mut self,
        section: Section,
        renderer: &mut R,
    ) -> Option<LoadTicket> {
        if self.active() == Some(section) {
            debug!("event=nav_activate module=nav status=skip section={section} reason=already_active");
            return None;
        }

        if let Some(current) = self.active() {
            renderer.set_section_active(current, false);
        }
        renderer.set_section_active(section, true);

        let ticket = self.request_load(section, renderer);

        renderer.set_address_fragment(section.id());
        renderer.set_title(&section.window_title());
        let previous = self.active();
        self.state = NavigatorState::Active(section);

        info!(
            "event=nav_activate module=nav status=ok from={} to={section} load={}",
            previous.map_or("none", Section::id),
            ticket.is_some()
        );
        ticket
    }

    /// Completes an in-flight load.
    ///
    /// A successful load marks the section as loaded; a failed one leaves it
    /// eligible for a later visit. Returns the replayed ticket when a request
    /// was queued under `InFlightPolicy::LatestWins`.
    pub fn finish_load<R: ContentRenderer + ?Sized>(
        &mut self,
        ticket: LoadTicket,
        succeeded: bool,
        renderer: &R,
    ) -> Option<LoadTicket> {
        let section = ticket.section;
        if self.loading != Some(section) {
            warn!("event=nav_finish_load module=nav status=error section={section} error_code=stale_ticket");
        }
        self.loading = None;
        if succeeded {
            self.loaded.insert(section);
        }
        info!("event=nav_finish_load module=nav status=ok section={section} succeeded={succeeded}");

        let replay = self.pending.take()?;
        if self.active() != Some(replay) {
            debug!("event=nav_replay module=nav status=skip section={replay} reason=no_longer_active");
            return None;
        }
        self.request_load(replay, renderer)
    }

    fn request_load<R: ContentRenderer + ?Sized>(
        &mut self,
        section: Section,
        renderer: &R,
    ) -> Option<LoadTicket> {
        if self.loaded.contains(&section) {
            return None;
        }
        if renderer.has_content(section) {
            self.loaded.insert(section);
            return None;
        }
        if let Some(in_flight) = self.loading {
            match self.policy {
                InFlightPolicy::Drop => {
                    info!(
                        "event=nav_load module=nav status=skip section={section} in_flight={in_flight} reason=dropped"
                    );
                }
                InFlightPolicy::LatestWins => {
                    info!(
                        "event=nav_load module=nav status=skip section={section} in_flight={in_flight} reason=queued"
                    );
                    self.pending = Some(section);
                }
            }
            return None;
        }
        self.loading = Some(section);
        Some(LoadTicket { section })
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(InFlightPolicy::default())
    }
}
