//! User profile use-cases.
//!
//! # Responsibility
//! - Load the local user and profile, creating defaults on first run.
//! - Apply the one-time seeded statistics and record activity.
//!
//! # Invariants
//! - A missing `currentUser` creates and persists both user and profile.
//! - Seeded statistics are assigned only while `transcriptions == 0`, so
//!   they land at most once per stored profile.

use crate::model::profile::{Activity, ActivityKind, CurrentUser, UserProfile, UserStats};
use crate::service::clock::Greeting;
use crate::store::{KvBackend, NamespacedStore, StoreKey};
use log::{info, warn};

/// Statistics assigned once the first simulated work completes.
pub const SEEDED_STATS: UserStats = UserStats {
    transcriptions: 3,
    projects: 1,
    downloads: 8,
    collaborations: 2,
};

/// Render-ready summary of the profile for header, sidebar and dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileView {
    pub username: String,
    pub avatar_initial: char,
    pub greeting: Greeting,
    pub stats: UserStats,
}

impl ProfileView {
    pub fn new(profile: &UserProfile, greeting: Greeting) -> Self {
        Self {
            username: profile.username.clone(),
            avatar_initial: profile.avatar_initial(),
            greeting,
            stats: profile.stats,
        }
    }
}

pub struct ProfileService<'a, B: KvBackend> {
    store: &'a NamespacedStore<B>,
}

impl<'a, B: KvBackend> ProfileService<'a, B> {
    pub fn new(store: &'a NamespacedStore<B>) -> Self {
        Self { store }
    }

    /// Loads the stored user and profile, or creates and persists defaults.
    ///
    /// An existing user with a missing or unreadable profile gets an
    /// in-memory default profile that is persisted on its next mutation.
    pub fn load_or_create(&self) -> (CurrentUser, UserProfile) {
        if let Some(user) = self.store.load::<CurrentUser>(StoreKey::CurrentUser) {
            let profile = self
                .store
                .load::<UserProfile>(StoreKey::UserData)
                .unwrap_or_default();
            info!("event=profile_load module=profile status=ok created=false");
            return (user, profile);
        }

        let user = CurrentUser::temporary();
        let profile = UserProfile::default();
        let persisted = self.store.save(StoreKey::CurrentUser, &user)
            && self.store.save(StoreKey::UserData, &profile);
        if !persisted {
            warn!("event=profile_load module=profile status=error created=true error_code=persist_failed");
        } else {
            info!("event=profile_load module=profile status=ok created=true");
        }
        (user, profile)
    }

    pub fn save(&self, profile: &UserProfile) -> bool {
        self.store.save(StoreKey::UserData, profile)
    }

    /// Assigns `SEEDED_STATS` when no transcription has been counted yet.
    ///
    /// Returns whether the statistics changed.
    pub fn apply_seeded_stats(&self, profile: &mut UserProfile) -> bool {
        if profile.stats.transcriptions != 0 {
            return false;
        }
        profile.stats = SEEDED_STATS;
        let persisted = self.save(profile);
        info!("event=profile_seed_stats module=profile status=ok persisted={persisted}");
        true
    }

    /// Seeds the welcome entries when the activity log is empty.
    ///
    /// Returns whether entries were added.
    pub fn ensure_recent_activity(&self, profile: &mut UserProfile) -> bool {
        if !profile.recent_activity.is_empty() {
            return false;
        }
        profile.recent_activity = sample_activity();
        let persisted = self.save(profile);
        if persisted {
            info!("event=profile_seed_activity module=profile status=ok");
        } else {
            warn!("event=profile_seed_activity module=profile status=error error_code=persist_failed");
        }
        true
    }

    pub fn record_activity(&self, profile: &mut UserProfile, activity: Activity) -> bool {
        profile.push_activity(activity);
        self.save(profile)
    }
}

/// Welcome entries shown to a new user.
pub fn sample_activity() -> Vec<Activity> {
    vec![
        Activity::new(ActivityKind::Info, "Welcome to TransCoope", "Now"),
        Activity::new(
            ActivityKind::Tip,
            "Start by transcribing your first audio file",
            "Tip",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::{ProfileService, SEEDED_STATS};
    use crate::model::profile::{Activity, ActivityKind, UserProfile, UserStats};
    use crate::store::{MemoryKvStore, NamespacedStore, StoreKey};

    fn store() -> NamespacedStore<MemoryKvStore> {
        NamespacedStore::new(MemoryKvStore::new(), "transcoope_")
    }

    #[test]
    fn first_run_creates_and_persists_defaults() {
        let store = store();
        let (user, profile) = ProfileService::new(&store).load_or_create();

        assert!(user.id.starts_with("temp_"));
        assert_eq!(profile.stats, UserStats::default());
        assert!(profile.recent_activity.is_empty());
        assert_eq!(store.load::<UserProfile>(StoreKey::UserData), Some(profile));
    }

    #[test]
    fn second_run_reuses_stored_user() {
        let store = store();
        let (first_user, _) = ProfileService::new(&store).load_or_create();
        let (second_user, _) = ProfileService::new(&store).load_or_create();
        assert_eq!(first_user, second_user);
    }

    #[test]
    fn seeded_stats_assign_once() {
        let store = store();
        let service = ProfileService::new(&store);
        let (_, mut profile) = service.load_or_create();

        assert!(service.apply_seeded_stats(&mut profile));
        assert!(!service.apply_seeded_stats(&mut profile));
        assert_eq!(profile.stats, SEEDED_STATS);
        let stored: UserProfile = store.load(StoreKey::UserData).unwrap();
        assert_eq!(stored.stats, SEEDED_STATS);
    }

    #[test]
    fn activity_seed_survives_a_failed_write() {
        let backend = MemoryKvStore::new();
        let store = NamespacedStore::new(backend.clone(), "transcoope_");
        let service = ProfileService::new(&store);
        let (_, mut profile) = service.load_or_create();

        backend.set_read_only(true);
        assert!(service.ensure_recent_activity(&mut profile));
        assert_eq!(profile.recent_activity.len(), 2);
        let stored: UserProfile = store.load(StoreKey::UserData).unwrap();
        assert!(stored.recent_activity.is_empty());
    }

    #[test]
    fn recent_activity_is_seeded_only_when_empty() {
        let store = store();
        let service = ProfileService::new(&store);
        let (_, mut profile) = service.load_or_create();

        assert!(service.ensure_recent_activity(&mut profile));
        assert_eq!(profile.recent_activity.len(), 2);
        service.record_activity(
            &mut profile,
            Activity::new(ActivityKind::Transcription, "Transcribed song.mp3", "Now"),
        );
        assert!(!service.ensure_recent_activity(&mut profile));
        assert_eq!(profile.recent_activity.len(), 3);
        assert_eq!(profile.recent_activity[0].kind, ActivityKind::Transcription);
    }
}
