//! Section navigation: the state machine, its content loaders and the
//! renderer contract it drives.
//!
//! # Responsibility
//! - Keep exactly one active section and mirror it into the renderer.
//! - Request each section's content at most once per session.
//!
//! # Invariants
//! - The navigator owns only the active-section pointer and its load
//!   bookkeeping; profile and notifications belong to the store.

pub mod loader;
pub mod navigator;
pub mod renderer;
