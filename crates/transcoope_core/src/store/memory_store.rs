//! In-process backend used by tests and ephemeral sessions.

use super::{KvBackend, StoreError};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Map-backed store. Clones share the same entries, like two views over one
/// origin's storage.
#[derive(Debug, Clone)]
pub struct MemoryKvStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
    quota_bytes: Option<usize>,
    available: bool,
    read_only: Rc<Cell<bool>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self {
            entries: Rc::default(),
            quota_bytes: None,
            available: true,
            read_only: Rc::default(),
        }
    }

    /// Store that refuses writes once keys plus values exceed `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            quota_bytes: Some(quota_bytes),
            ..Self::new()
        }
    }

    /// Store whose capability probe and every operation fail.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// Makes every clone refuse writes and removals while reads keep working.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Snapshot of all raw entries, for assertions.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.borrow().clone()
    }

    fn ensure_available(&self) -> Result<(), StoreError> {
        if self.available {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store disabled".to_string()))
        }
    }

    fn ensure_writable(&self) -> Result<(), StoreError> {
        self.ensure_available()?;
        if self.read_only.get() {
            return Err(StoreError::Backend("memory store is read-only".to_string()));
        }
        Ok(())
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(existing, _)| existing.as_str() != key)
            .map(|(existing, value)| existing.len() + value.len())
            .sum()
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvBackend for MemoryKvStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.ensure_available()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.ensure_writable()?;
        if let Some(quota) = self.quota_bytes {
            let used = self.used_bytes_without(key);
            let needed = key.len() + value.len();
            let remaining = quota.saturating_sub(used);
            if needed > remaining {
                return Err(StoreError::QuotaExceeded { needed, remaining });
            }
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.ensure_writable()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn probe(&self) -> Result<(), StoreError> {
        self.ensure_available()
    }
}
