//! Serializable editor state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Handle of a decoded logo image held by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogoId(pub u64);

impl fmt::Display for LogoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "logo#{}", self.0)
    }
}

/// The most recently uploaded logo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedLogo {
    /// Handle of the decoded image.
    pub logo_id: LogoId,
    /// Name of the uploaded file.
    pub file_name: String,
}

/// A logo assigned to a zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedLogo {
    /// Zone the logo occupies.
    pub zone_id: String,
    /// Handle of the decoded image.
    pub logo_id: LogoId,
    /// Display name of the logo (its file name).
    pub logo_name: String,
}

/// Everything the editor knows besides pixel data.
///
/// Every event replaces the affected field wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorState {
    /// Model whose zone table is in use.
    pub model_id: String,
    /// Placements keyed by zone id; at most one per zone.
    pub placements: BTreeMap<String, PlacedLogo>,
    /// Current upload, if any.
    pub uploaded_logo: Option<UploadedLogo>,
    /// Zone most recently placed into.
    pub selected_zone: Option<String>,
}

impl EditorState {
    /// Empty state for a model.
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            ..Self::default()
        }
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether a logo handle is referenced by the upload or any placement.
    pub fn references(&self, id: LogoId) -> bool {
        self.uploaded_logo.as_ref().is_some_and(|u| u.logo_id == id)
            || self.placements.values().any(|p| p.logo_id == id)
    }
}
