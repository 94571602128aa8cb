//! Shell session: event vocabulary and the session context that drives
//! navigation, uploads, transcription and notifications.

pub mod event;
pub mod shell;

pub use event::{QuickAction, QuickTarget, ShellEvent};
pub use shell::{InitError, Session};
