//! Logo placement on the UV map.
//!
//! The [`Editor`] plays the role of the interactive canvas: it overlays a
//! model's zones on the UV image and keeps one logo element per occupied zone,
//! sized to exactly cover the zone's rectangle. Placing into an occupied zone
//! replaces the previous logo; clearing a zone removes both the element and
//! its placement record.
//!
//! # Example
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use livery::editor::{Editor, EditorOptions};
//! use livery::zone::{ZoneRegistry, DEFAULT_MODEL_ID};
//!
//! let registry = ZoneRegistry::builtin();
//! let zones = registry.zones(DEFAULT_MODEL_ID).unwrap().to_vec();
//! let mut editor = Editor::new(DEFAULT_MODEL_ID, zones, EditorOptions::default());
//!
//! editor.upload_logo_image("acme.png", RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255])));
//! editor.place_logo("zone-front").unwrap();
//!
//! let elements = editor.elements();
//! assert_eq!(elements.len(), 1);
//! assert_eq!(elements[0].rect.width, 200.0);
//! ```

mod state;

pub use state::{EditorState, LogoId, PlacedLogo, UploadedLogo};

use std::collections::HashMap;
use std::sync::Arc;

use image::RgbaImage;
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{LiveryError, Result};
use crate::raster::{self, ResizeFilter};
use crate::zone::{PixelRect, Zone};

/// How a logo is scaled into its zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogoFit {
    /// Stretch the logo to cover the whole zone.
    #[default]
    Stretch,
    /// Scale uniformly to fit inside the zone and centre it.
    Contain,
}

/// Options for the placement editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorOptions {
    /// Side length of the editing canvas in pixels.
    pub canvas_size: u32,
    /// Zone outline thickness in the preview.
    pub outline_width: u32,
    /// Canvas background when no UV image is available.
    pub background: Color,
    /// Scale of the 8 px zone name labels in the preview; 0 hides them.
    pub label_scale: u32,
    /// Logo scaling used by the preview.
    pub logo_fit: LogoFit,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            canvas_size: 400,
            outline_width: 2,
            background: Color::rgb(0x1a, 0x1a, 0x1a),
            label_scale: 2,
            logo_fit: LogoFit::Stretch,
        }
    }
}

impl EditorOptions {
    /// Set the canvas size.
    pub fn with_canvas_size(mut self, size: u32) -> Self {
        self.canvas_size = size;
        self
    }

    /// Set the logo fit.
    pub fn with_logo_fit(mut self, fit: LogoFit) -> Self {
        self.logo_fit = fit;
        self
    }
}

const LABEL_OFFSET: u32 = 5;

/// A logo drawn on the canvas inside a zone.
#[derive(Debug, Clone, PartialEq)]
pub struct LogoElement {
    /// Zone the element covers.
    pub zone_id: String,
    /// Logo drawn by the element.
    pub logo_id: LogoId,
    /// Rectangle on the canvas, equal to the zone's pixel rectangle.
    pub rect: PixelRect,
}

/// Placement editor for one model's zones.
#[derive(Debug)]
pub struct Editor {
    zones: Vec<Zone>,
    options: EditorOptions,
    state: EditorState,
    logos: HashMap<LogoId, Arc<RgbaImage>>,
    next_logo: u64,
}

impl Editor {
    /// Create an empty editor over `zones`.
    pub fn new(model_id: impl Into<String>, zones: Vec<Zone>, options: EditorOptions) -> Self {
        Self {
            zones,
            options,
            state: EditorState::new(model_id),
            logos: HashMap::new(),
            next_logo: 1,
        }
    }

    /// The editor options.
    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    /// Zones of the current model.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// The serializable editor state.
    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// The current upload.
    pub fn uploaded_logo(&self) -> Option<&UploadedLogo> {
        self.state.uploaded_logo.as_ref()
    }

    /// The placement in a zone.
    pub fn placement(&self, zone_id: &str) -> Option<&PlacedLogo> {
        self.state.placements.get(zone_id)
    }

    /// Whether any logo is placed.
    pub fn has_placements(&self) -> bool {
        !self.state.placements.is_empty()
    }

    /// Decoded pixels of a logo.
    pub fn logo(&self, id: LogoId) -> Option<&Arc<RgbaImage>> {
        self.logos.get(&id)
    }

    /// Number of decoded logos held in memory.
    pub fn num_logos(&self) -> usize {
        self.logos.len()
    }

    fn zone(&self, zone_id: &str) -> Result<&Zone> {
        self.zones
            .iter()
            .find(|z| z.id == zone_id)
            .ok_or_else(|| LiveryError::UnknownZone {
                model_id: self.state.model_id.clone(),
                zone_id: zone_id.to_string(),
            })
    }

    /// Decode and upload a logo, replacing the previous upload.
    ///
    /// On decode failure the previous upload stays in place.
    pub fn upload_logo(&mut self, file_name: &str, bytes: &[u8]) -> Result<LogoId> {
        let image = image::load_from_memory(bytes).map_err(|e| LiveryError::ImageDecode {
            file_name: file_name.to_string(),
            message: e.to_string(),
        })?;
        Ok(self.upload_logo_image(file_name, image.to_rgba8()))
    }

    /// Upload already decoded pixels, replacing the previous upload.
    pub fn upload_logo_image(&mut self, file_name: &str, image: RgbaImage) -> LogoId {
        let id = LogoId(self.next_logo);
        self.next_logo += 1;
        self.logos.insert(id, Arc::new(image));
        self.state.uploaded_logo = Some(UploadedLogo {
            logo_id: id,
            file_name: file_name.to_string(),
        });
        self.release_unused();
        debug!("uploaded {} as {}", file_name, id);
        id
    }

    /// Place the current upload into a zone.
    ///
    /// An existing placement in the zone is replaced. The zone becomes the
    /// selected zone.
    pub fn place_logo(&mut self, zone_id: &str) -> Result<()> {
        let uploaded = self.state.uploaded_logo.clone().ok_or(LiveryError::NoLogoUploaded)?;
        let zone_id = self.zone(zone_id)?.id.clone();

        let previous = self.state.placements.insert(
            zone_id.clone(),
            PlacedLogo {
                zone_id: zone_id.clone(),
                logo_id: uploaded.logo_id,
                logo_name: uploaded.file_name,
            },
        );
        if let Some(prev) = previous {
            debug!("replaced {} in {}", prev.logo_name, zone_id);
        }
        self.state.selected_zone = Some(zone_id);
        self.release_unused();
        Ok(())
    }

    /// Remove the logo in a zone and clear the selection.
    ///
    /// Returns whether a placement was removed.
    pub fn clear_zone(&mut self, zone_id: &str) -> bool {
        let removed = self.state.placements.remove(zone_id).is_some();
        self.state.selected_zone = None;
        self.release_unused();
        removed
    }

    /// Remove every placement.
    pub fn clear_all(&mut self) {
        self.state.placements.clear();
        self.state.selected_zone = None;
        self.release_unused();
    }

    fn release_unused(&mut self) {
        let state = &self.state;
        self.logos.retain(|&id, _| state.references(id));
    }

    /// One element per occupied zone, in zone table order.
    pub fn elements(&self) -> Vec<LogoElement> {
        let size = self.options.canvas_size;
        self.zones
            .iter()
            .filter_map(|zone| {
                self.state.placements.get(&zone.id).map(|p| LogoElement {
                    zone_id: zone.id.clone(),
                    logo_id: p.logo_id,
                    rect: zone.pixel_rect(size),
                })
            })
            .collect()
    }

    /// The zone under a canvas pixel.
    pub fn zone_at_pixel(&self, x: f64, y: f64) -> Option<&Zone> {
        let s = f64::from(self.options.canvas_size);
        let uv = Point2::new(x / s, y / s);
        self.zones.iter().find(|z| z.contains_uv(uv))
    }

    /// Render only the placed logos on a transparent `size x size` raster.
    ///
    /// Zone outlines are not drawn.
    pub fn render_overlay(&self, size: u32, fit: LogoFit, filter: ResizeFilter) -> RgbaImage {
        let mut overlay = RgbaImage::new(size, size);
        for zone in &self.zones {
            let Some(logo) = self
                .state
                .placements
                .get(&zone.id)
                .and_then(|p| self.logos.get(&p.logo_id))
            else {
                continue;
            };

            let bounds = zone.pixel_rect(size).bounds(size);
            if bounds.is_empty() || logo.width() == 0 || logo.height() == 0 {
                continue;
            }

            let (w, h, dx, dy) = match fit {
                LogoFit::Stretch => (bounds.width(), bounds.height(), 0, 0),
                LogoFit::Contain => {
                    let scale = (f64::from(bounds.width()) / f64::from(logo.width()))
                        .min(f64::from(bounds.height()) / f64::from(logo.height()));
                    let w = (f64::from(logo.width()) * scale).round() as u32;
                    let h = (f64::from(logo.height()) * scale).round() as u32;
                    let w = w.clamp(1, bounds.width());
                    let h = h.clamp(1, bounds.height());
                    (w, h, (bounds.width() - w) / 2, (bounds.height() - h) / 2)
                }
            };

            let scaled = raster::resize(logo, w, h, filter);
            raster::draw_over(&mut overlay, &scaled, bounds.left + dx, bounds.top + dy);
        }
        overlay
    }

    /// Render the editing canvas: UV image, zone outlines and names, and logos.
    ///
    /// Each name is drawn in the zone colour 5 px right of and below the
    /// zone's top-left corner.
    ///
    /// This is what a user looks at while placing logos. It is never baked.
    pub fn render_preview(&self, base: Option<&RgbaImage>, filter: ResizeFilter) -> RgbaImage {
        let size = self.options.canvas_size;
        let mut canvas = match base {
            Some(img) => raster::resize(img, size, size, filter),
            None => RgbaImage::from_pixel(size, size, self.options.background.to_rgba()),
        };

        for zone in &self.zones {
            let bounds = zone.pixel_rect(size).bounds(size);
            raster::stroke_rect(&mut canvas, bounds, self.options.outline_width, zone.color);
            raster::draw_text(
                &mut canvas,
                &zone.name,
                bounds.left + LABEL_OFFSET,
                bounds.top + LABEL_OFFSET,
                self.options.label_scale,
                zone.color,
            );
        }

        let overlay = self.render_overlay(size, self.options.logo_fit, filter);
        raster::draw_over(&mut canvas, &overlay, 0, 0);
        canvas
    }
}
