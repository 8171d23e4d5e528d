//! Zone tables keyed by model identifier.

use std::collections::{BTreeMap, HashSet};

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use super::Zone;
use crate::color::Color;
use crate::error::{LiveryError, Result};

/// Identifier of the built-in sedan model.
pub const DEFAULT_MODEL_ID: &str = "generic-sedan";

/// The zone table of one car model, as written in configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelZones {
    /// Model identifier.
    pub id: String,
    /// Zones of the model, in display order.
    pub zones: Vec<Zone>,
}

/// Immutable collection of zone tables, one per supported model.
#[derive(Debug, Clone, Default)]
pub struct ZoneRegistry {
    models: BTreeMap<String, Vec<Zone>>,
}

impl ZoneRegistry {
    /// Registry containing only the built-in `generic-sedan` zones.
    pub fn builtin() -> Self {
        Self::from_models(vec![Self::builtin_sedan()]).unwrap_or_default()
    }

    /// The zone table of the built-in sedan model.
    pub fn builtin_sedan() -> ModelZones {
        ModelZones {
            id: DEFAULT_MODEL_ID.to_string(),
            zones: vec![
                Zone::new("zone-front", "Front", 0.25, 0.1, 0.5, 0.3, Color::rgb(0xff, 0x6b, 0x6b)),
                Zone::new("zone-side", "Side", 0.05, 0.45, 0.35, 0.4, Color::rgb(0x4e, 0xcd, 0xc4)),
                Zone::new("zone-back", "Back", 0.25, 0.6, 0.5, 0.3, Color::rgb(0x45, 0xb7, 0xd1)),
            ],
        }
    }

    /// Build a registry from model tables.
    ///
    /// Every zone is validated. Model ids must be unique, and zone ids must be
    /// unique within a model. Overlap between zones is not checked.
    pub fn from_models(models: Vec<ModelZones>) -> Result<Self> {
        let mut table = BTreeMap::new();
        for model in models {
            let mut seen = HashSet::new();
            for zone in &model.zones {
                zone.validate()?;
                if !seen.insert(zone.id.as_str()) {
                    return Err(LiveryError::DuplicateId {
                        kind: "zone",
                        id: zone.id.clone(),
                    });
                }
            }

            if table.contains_key(&model.id) {
                return Err(LiveryError::DuplicateId {
                    kind: "model",
                    id: model.id,
                });
            }
            table.insert(model.id, model.zones);
        }
        Ok(Self { models: table })
    }

    /// Identifiers of all registered models, sorted.
    pub fn model_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.models.keys().map(String::as_str)
    }

    /// Whether a model is registered.
    pub fn contains_model(&self, model_id: &str) -> bool {
        self.models.contains_key(model_id)
    }

    /// Zones of a model.
    pub fn zones(&self, model_id: &str) -> Result<&[Zone]> {
        self.models
            .get(model_id)
            .map(Vec::as_slice)
            .ok_or_else(|| LiveryError::UnknownModel(model_id.to_string()))
    }

    /// Look up one zone of a model.
    pub fn zone(&self, model_id: &str, zone_id: &str) -> Result<&Zone> {
        self.zones(model_id)?
            .iter()
            .find(|z| z.id == zone_id)
            .ok_or_else(|| LiveryError::UnknownZone {
                model_id: model_id.to_string(),
                zone_id: zone_id.to_string(),
            })
    }

    /// The first zone of a model containing a UV point, if any.
    pub fn zone_at(&self, model_id: &str, uv: Point2<f64>) -> Result<Option<&Zone>> {
        Ok(self.zones(model_id)?.iter().find(|z| z.contains_uv(uv)))
    }
}
