//! Audio file descriptors accepted by the upload area.

use serde::{Deserialize, Serialize};

/// Metadata the host reports for a selected or dropped file.
///
/// The core never reads file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFile {
    pub name: String,
    /// Declared media type, e.g. `audio/mpeg`.
    pub media_type: String,
    pub size_bytes: u64,
}

impl AudioFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size_bytes,
        }
    }
}

/// Guesses a declared media type from a file extension.
///
/// Unknown extensions map to `application/octet-stream`, which the upload
/// policy rejects.
pub fn media_type_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "mp3" | "mpeg" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/m4a",
        _ => "application/octet-stream",
    }
}
