//! Error types for livery.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`LiveryError`].
pub type Result<T> = std::result::Result<T, LiveryError>;

/// Errors that can occur while loading assets, editing placements or baking.
#[derive(Error, Debug)]
pub enum LiveryError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading a model asset.
    #[error("failed to load model from {path}: {message}")]
    LoadError {
        /// The file path, or `<memory>` for uploaded bytes.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Error writing an image to disk.
    #[error("failed to save image to {path}: {message}")]
    SaveError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// An uploaded image could not be decoded.
    #[error("failed to decode image {file_name}: {message}")]
    ImageDecode {
        /// Name of the uploaded file.
        file_name: String,
        /// Decoder message.
        message: String,
    },

    /// A colour string is not `#rrggbb` or `#rrggbbaa`.
    #[error("invalid color {0:?}, expected #rrggbb or #rrggbbaa")]
    InvalidColor(String),

    /// No zone table is registered for the model.
    #[error("no zones registered for model {0:?}")]
    UnknownModel(String),

    /// The zone does not exist for the current model.
    #[error("unknown zone {zone_id:?} for model {model_id:?}")]
    UnknownZone {
        /// The current model identifier.
        model_id: String,
        /// The requested zone identifier.
        zone_id: String,
    },

    /// A zone definition is malformed.
    #[error("invalid zone {zone_id:?}: {reason}")]
    InvalidZone {
        /// The zone identifier.
        zone_id: String,
        /// Reason the zone is invalid.
        reason: String,
    },

    /// A model identifier or zone identifier was registered twice.
    #[error("duplicate {kind} id {id:?}")]
    DuplicateId {
        /// Either `"model"` or `"zone"`.
        kind: &'static str,
        /// The duplicated identifier.
        id: String,
    },

    /// A placement was requested before any logo was uploaded.
    #[error("no logo has been uploaded")]
    NoLogoUploaded,

    /// Configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Editor state could not be serialized or parsed.
    #[error("invalid editor state: {0}")]
    State(#[from] serde_json::Error),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl LiveryError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        LiveryError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create an invalid zone error.
    pub fn invalid_zone(zone_id: &str, reason: impl Into<String>) -> Self {
        LiveryError::InvalidZone {
            zone_id: zone_id.to_string(),
            reason: reason.into(),
        }
    }
}
