//! Audio file validation for the upload area.
//!
//! # Invariants
//! - Validation is pure: it never touches the store.
//! - The size limit is inclusive.

use crate::config::ShellConfig;
use crate::model::upload::AudioFile;
use std::error::Error;
use std::fmt::{Display, Formatter};

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub accepted_media_types: Vec<String>,
    pub max_bytes: u64,
}

impl UploadPolicy {
    pub fn from_config(config: &ShellConfig) -> Self {
        Self {
            accepted_media_types: config.accepted_media_types.clone(),
            max_bytes: config.max_upload_bytes,
        }
    }

    pub fn validate(&self, file: &AudioFile) -> Result<(), UploadError> {
        let declared = file.media_type.trim();
        if !self
            .accepted_media_types
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(declared))
        {
            return Err(UploadError::UnsupportedType {
                media_type: declared.to_string(),
            });
        }
        if file.size_bytes > self.max_bytes {
            return Err(UploadError::TooLarge {
                size_bytes: file.size_bytes,
                max_bytes: self.max_bytes,
            });
        }
        Ok(())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::from_config(&ShellConfig::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    UnsupportedType { media_type: String },
    TooLarge { size_bytes: u64, max_bytes: u64 },
}

impl UploadError {
    /// Message shown to the user at the upload area.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnsupportedType { .. } => {
                "Unsupported file type. Use MP3, WAV, FLAC or M4A".to_string()
            }
            Self::TooLarge { max_bytes, .. } => format!(
                "The file is too large (maximum {})",
                format_file_size(*max_bytes)
            ),
        }
    }
}

impl Display for UploadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedType { media_type } => {
                write!(f, "unsupported media type `{media_type}`")
            }
            Self::TooLarge {
                size_bytes,
                max_bytes,
            } => write!(f, "file size {size_bytes} exceeds limit {max_bytes}"),
        }
    }
}

impl Error for UploadError {}

/// Formats a byte count with a binary unit and at most two decimals.
///
/// `0 Bytes`, `512 Bytes`, `1.5 KB`, `50 MB`. Sizes beyond the largest unit
/// stay in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", SIZE_UNITS[unit])
}
