//! Notification-center use-cases over the `notifications` key.
//!
//! # Invariants
//! - The stored sequence keeps insertion order; dismissal never reorders.
//! - Ids are unique within the stored sequence. New ids are `max + 1`, or
//!   the smallest unused id once `max` is `u64::MAX`.
//! - First access with nothing stored seeds and persists the welcome set.
//! - A mutation that cannot be written back reports `PersistFailed`.

use crate::model::notification::{Notification, NotificationId, NotificationKind};
use crate::store::{KvBackend, NamespacedStore, StoreKey};
use log::{error, info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationError {
    NotFound(NotificationId),
    IdsExhausted,
    PersistFailed,
}

impl NotificationError {
    /// Toast text for failures the user must hear about. `None` for no-ops.
    pub fn user_message(self) -> Option<&'static str> {
        match self {
            Self::NotFound(_) => None,
            Self::IdsExhausted => Some("Notification center is full"),
            Self::PersistFailed => Some("Could not save notifications"),
        }
    }
}

impl Display for NotificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "notification {id} not found"),
            Self::IdsExhausted => write!(f, "no unused notification id remains"),
            Self::PersistFailed => write!(f, "failed to persist notifications"),
        }
    }
}

impl Error for NotificationError {}

pub type NotificationResult<T> = Result<T, NotificationError>;

pub struct NotificationService<'a, B: KvBackend> {
    store: &'a NamespacedStore<B>,
}

impl<'a, B: KvBackend> NotificationService<'a, B> {
    pub fn new(store: &'a NamespacedStore<B>) -> Self {
        Self { store }
    }

    /// Returns the stored notifications, seeding the welcome set on first use.
    pub fn list(&self) -> Vec<Notification> {
        if let Some(stored) = self.store.load::<Vec<Notification>>(StoreKey::Notifications) {
            return stored;
        }
        let seeded = sample_notifications();
        if !self.store.save(StoreKey::Notifications, &seeded) {
            warn!("event=notifications_seed module=notifications status=error error_code=persist_failed");
        }
        seeded
    }

    /// Removes the entry with `id`.
    pub fn dismiss(&self, id: NotificationId) -> NotificationResult<()> {
        let mut notifications = self.list();
        let before = notifications.len();
        notifications.retain(|notification| notification.id != id);
        if notifications.len() == before {
            info!("event=notification_dismiss module=notifications status=skip id={id} reason=not_found");
            return Err(NotificationError::NotFound(id));
        }
        self.persist("notification_dismiss", &notifications)?;
        info!("event=notification_dismiss module=notifications status=ok id={id}");
        Ok(())
    }

    /// Appends a new unread notification and returns it.
    pub fn push(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> NotificationResult<Notification> {
        let mut notifications = self.list();
        let Some(id) = next_id(&notifications) else {
            error!("event=notification_push module=notifications status=error error_code=ids_exhausted");
            return Err(NotificationError::IdsExhausted);
        };
        let notification = Notification {
            id,
            kind,
            title: title.into(),
            message: message.into(),
            time: "Now".to_string(),
            read: false,
        };
        notifications.push(notification.clone());
        self.persist("notification_push", &notifications)?;
        info!("event=notification_push module=notifications status=ok id={id}");
        Ok(notification)
    }

    /// Marks every entry as read. Returns how many changed.
    pub fn mark_all_read(&self) -> NotificationResult<usize> {
        let mut notifications = self.list();
        let mut changed = 0;
        for notification in notifications.iter_mut().filter(|entry| !entry.read) {
            notification.read = true;
            changed += 1;
        }
        if changed > 0 {
            self.persist("notifications_mark_read", &notifications)?;
        }
        Ok(changed)
    }

    fn persist(&self, event: &str, notifications: &[Notification]) -> NotificationResult<()> {
        if self.store.save(StoreKey::Notifications, &notifications) {
            return Ok(());
        }
        error!("event={event} module=notifications status=error error_code=persist_failed");
        Err(NotificationError::PersistFailed)
    }
}

/// `max + 1`, falling back to the smallest unused id when `max + 1` overflows.
fn next_id(notifications: &[Notification]) -> Option<NotificationId> {
    let Some(max) = notifications.iter().map(|notification| notification.id).max() else {
        return Some(1);
    };
    max.checked_add(1).or_else(|| {
        let used: BTreeSet<NotificationId> =
            notifications.iter().map(|notification| notification.id).collect();
        (1..=NotificationId::MAX).find(|candidate| !used.contains(candidate))
    })
}

pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications
        .iter()
        .filter(|notification| !notification.read)
        .count()
}

/// Welcome set shown before any real notification exists.
pub fn sample_notifications() -> Vec<Notification> {
    vec![
        Notification {
            id: 1,
            kind: NotificationKind::Success,
            title: "Welcome to TransCoope!".to_string(),
            message: "Your account has been set up successfully".to_string(),
            time: "Now".to_string(),
            read: false,
        },
        Notification {
            id: 2,
            kind: NotificationKind::Info,
            title: "New feature available".to_string(),
            message: "You can now transcribe from YouTube links".to_string(),
            time: "1 hour ago".to_string(),
            read: false,
        },
        Notification {
            id: 3,
            kind: NotificationKind::Warning,
            title: "Complete your profile".to_string(),
            message: "Add your favorite genres for better recommendations".to_string(),
            time: "2 hours ago".to_string(),
            read: true,
        },
    ]
}
