//! UV image extraction.
//!
//! The editor paints over a square raster that stands in for the unwrapped
//! surface of the model. When the loaded scene already carries a base colour
//! texture, its pixels are copied (scaled to the fixed size). Otherwise a
//! checkerboard placeholder with a border is synthesized.
//!
//! This does not compute a parameterization from geometry; the UV layout is
//! whatever the asset's texture already uses.
//!
//! # Example
//!
//! ```
//! use livery::scene::Scene;
//! use livery::uv::{extract_uv_image, UvOptions, UvSource};
//!
//! let uv = extract_uv_image(&Scene::placeholder(), &UvOptions::default());
//! assert_eq!(uv.source, UvSource::Placeholder);
//! assert_eq!(uv.image.dimensions(), (1024, 1024));
//! ```

mod checkerboard;

pub use checkerboard::checkerboard;

use std::sync::Arc;

use image::RgbaImage;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::raster::{self, ResizeFilter};
use crate::scene::Scene;

/// Options for UV image extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UvOptions {
    /// Side length of the square UV image in pixels.
    pub size: u32,

    /// Filter used to scale a copied texture.
    pub filter: ResizeFilter,

    /// Checkerboard cell size in pixels.
    pub cell_size: u32,

    /// Colour of the top-left checkerboard cell.
    pub light_color: Color,

    /// Colour of alternating checkerboard cells.
    pub dark_color: Color,

    /// Placeholder border thickness in pixels.
    pub border_width: u32,

    /// Placeholder border colour.
    pub border_color: Color,
}

impl Default for UvOptions {
    fn default() -> Self {
        Self {
            size: 1024,
            filter: ResizeFilter::Triangle,
            cell_size: 64,
            light_color: Color::rgb(0xd9, 0xd9, 0xd9),
            dark_color: Color::rgb(0xa6, 0xa6, 0xa6),
            border_width: 8,
            border_color: Color::rgb(0x33, 0x33, 0x33),
        }
    }
}

impl UvOptions {
    /// Set the UV image size.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Set the checkerboard cell size.
    pub fn with_cell_size(mut self, cell_size: u32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Set the placeholder border.
    pub fn with_border(mut self, width: u32, color: Color) -> Self {
        self.border_width = width;
        self.border_color = color;
        self
    }

    /// Set the resampling filter.
    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Where a UV image came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UvSource {
    /// Copied from the base colour texture of a material.
    ModelTexture {
        /// Name of the mesh that owns the material.
        mesh: Option<String>,
        /// Name of the material.
        material: Option<String>,
    },
    /// Synthesized checkerboard.
    Placeholder,
}

/// The raster the editor draws on.
#[derive(Debug, Clone)]
pub struct UvImage {
    /// Square raster of [`UvOptions::size`] pixels.
    pub image: Arc<RgbaImage>,
    /// Origin of the pixels.
    pub source: UvSource,
}

impl UvImage {
    /// Side length in pixels.
    pub fn size(&self) -> u32 {
        self.image.width()
    }

    /// Whether this is the synthesized placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.source == UvSource::Placeholder
    }
}

/// Produce the UV image for a scene.
///
/// Meshes are visited in traversal order and the first material with a base
/// colour texture wins. The output is always `size x size`.
pub fn extract_uv_image(scene: &Scene, options: &UvOptions) -> UvImage {
    match scene.first_texture() {
        Some((mesh, material, texture)) => {
            let (w, h) = texture.dimensions();
            debug!(
                "copying {}x{} texture of material {:?} into {}px UV image",
                w, h, material.name, options.size
            );
            UvImage {
                image: Arc::new(raster::resize(
                    &texture.image,
                    options.size,
                    options.size,
                    options.filter,
                )),
                source: UvSource::ModelTexture {
                    mesh: mesh.name.clone(),
                    material: material.name.clone(),
                },
            }
        }
        None => {
            info!("model has no texture, using checkerboard placeholder");
            UvImage {
                image: Arc::new(checkerboard(options)),
                source: UvSource::Placeholder,
            }
        }
    }
}
