//! Section content loaders.
//!
//! # Responsibility
//! - Map each `Section` to the content its panel shows on first visit.
//! - Simulate the loading latency of a real backend.
//!
//! # Invariants
//! - Dispatch is an exhaustive match over `Section`.
//! - Returned futures own everything they need (`'static`), so the session
//!   can keep one in flight while it keeps handling events.

use crate::model::profile::{Activity, UserProfile};
use crate::model::section::Section;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub type LoadResult = Result<SectionContent, LoadError>;
pub type LoadFuture = Pin<Box<dyn Future<Output = LoadResult>>>;

/// Content handed to the renderer for one panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionContent {
    Dashboard(DashboardContent),
    Panel(PanelContent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardContent {
    pub recent_activity: Vec<Activity>,
    pub recommendations: Vec<Recommendation>,
    pub spotlight: Vec<SpotlightEntry>,
}

/// Static panel descriptor for sections without dynamic data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelContent {
    pub heading: &'static str,
    pub blurb: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub id: u32,
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub meta: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotlightEntry {
    pub user: &'static str,
    pub project: &'static str,
    pub likes: u32,
    pub comments: u32,
}

/// Failure to produce a section's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadError {
    pub section: Section,
    pub message: String,
}

impl LoadError {
    pub fn new(section: Section, message: impl Into<String>) -> Self {
        Self {
            section,
            message: message.into(),
        }
    }
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to load section `{}`: {}", self.section, self.message)
    }
}

impl Error for LoadError {}

/// Produces the content of one section.
pub trait SectionLoader {
    fn load(&self, section: Section, profile: &UserProfile) -> LoadFuture;
}

/// Loader serving fixed sample content after an artificial delay.
#[derive(Debug, Clone, Default)]
pub struct SimulatedLoader {
    delay: Duration,
}

impl SimulatedLoader {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl SectionLoader for SimulatedLoader {
    fn load(&self, section: Section, profile: &UserProfile) -> LoadFuture {
        let delay = self.delay;
        let content = section_content(section, profile);
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok(content)
        })
    }
}

/// Builds the content of `section` from the current profile.
pub fn section_content(section: Section, profile: &UserProfile) -> SectionContent {
    match section {
        Section::Dashboard => SectionContent::Dashboard(DashboardContent {
            recent_activity: profile.recent_activity.clone(),
            recommendations: recommendations(),
            spotlight: community_spotlight(),
        }),
        Section::Transcribe => SectionContent::Panel(PanelContent {
            heading: "Transcribe audio",
            blurb: "Upload an MP3, WAV, FLAC or M4A file to turn it into sheet music.",
        }),
        Section::Library => SectionContent::Panel(PanelContent {
            heading: "My library",
            blurb: "Your finished transcriptions and downloaded scores.",
        }),
        Section::Community => SectionContent::Panel(PanelContent {
            heading: "Community",
            blurb: "Share arrangements and discover other musicians.",
        }),
        Section::Projects => SectionContent::Panel(PanelContent {
            heading: "Projects",
            blurb: "Collaborative projects you own or contribute to.",
        }),
        Section::Trending => SectionContent::Panel(PanelContent {
            heading: "Trending",
            blurb: "The most transcribed songs this week.",
        }),
    }
}

pub fn recommendations() -> Vec<Recommendation> {
    vec![
        Recommendation {
            id: 1,
            icon: "music",
            title: "Getting started",
            description: "Learn TransCoope in five minutes",
            meta: "Quick guide",
        },
        Recommendation {
            id: 2,
            icon: "users",
            title: "Active community",
            description: "Connect and collaborate with other musicians",
            meta: "+500 members",
        },
        Recommendation {
            id: 3,
            icon: "graduation-cap",
            title: "Musical examples",
            description: "Explore reference transcriptions",
            meta: "Templates",
        },
    ]
}

pub fn community_spotlight() -> Vec<SpotlightEntry> {
    vec![
        SpotlightEntry {
            user: "Ana Martinez",
            project: "Piano piece - \"Sunset\"",
            likes: 18,
            comments: 5,
        },
        SpotlightEntry {
            user: "David Lopez",
            project: "Guitar arrangement - folk song",
            likes: 32,
            comments: 12,
        },
    ]
}
