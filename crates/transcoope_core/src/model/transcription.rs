//! Records produced by the simulated transcription pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TranscriptionJobId = Uuid;

/// Fabricated transcription outcome. Nothing here is computed from audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub success: bool,
    /// Original filename of the submitted file.
    pub file: String,
    pub instruments: Vec<String>,
    /// `m:ss` duration label.
    pub duration: String,
    pub key: String,
    pub bpm: u32,
}

/// Progress notice emitted after each pipeline step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionProgress {
    pub job_id: TranscriptionJobId,
    pub percent: u8,
    pub message: &'static str,
}
