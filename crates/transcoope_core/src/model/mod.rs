//! Plain records shared by the navigator, the store and the services.
//!
//! # Responsibility
//! - Define the closed `Section` set and its routing identifiers.
//! - Define the persisted shapes kept in the key-value store.
//!
//! # Invariants
//! - Persisted records serialize with the camelCase field names the store
//!   has always used, so older stored values keep loading.

pub mod notification;
pub mod profile;
pub mod section;
pub mod transcription;
pub mod upload;
