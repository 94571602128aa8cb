//! Shell use-case services.
//!
//! # Responsibility
//! - Orchestrate store reads and writes into use-case level APIs.
//! - Keep host UI and FFI layers decoupled from persistence details.

pub mod clock;
pub mod notification_service;
pub mod profile_service;
pub mod search;
pub mod transcription;
pub mod upload_service;
