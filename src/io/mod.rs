//! Asset and image I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Notes |
//! |--------|-----------|------|-------|
//! | glTF | `.gltf` | ✓ | External or data-URI buffers and images |
//! | glTF binary | `.glb` | ✓ | Self-contained |
//!
//! Logos can be any raster format the `image` crate decodes; baked textures are
//! written as PNG.
//!
//! # Usage
//!
//! ```no_run
//! use livery::io;
//!
//! let scene = io::load("car/scene.gltf").unwrap();
//! println!("{} materials", scene.num_materials());
//! ```

pub mod gltf;

use std::path::Path;

use image::RgbaImage;

use crate::error::{LiveryError, Result};
use crate::scene::Scene;

/// Supported model file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// glTF format.
    Gltf,
    /// glTF binary format.
    Glb,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "gltf" => Some(Format::Gltf),
            "glb" => Some(Format::Glb),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

/// Load a model with automatic format detection.
///
/// The format is determined by the file extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Scene> {
    let path = path.as_ref();
    let format = Format::from_path(path).ok_or_else(|| LiveryError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })?;

    match format {
        Format::Gltf | Format::Glb => gltf::load(path),
    }
}

/// Load a model from uploaded bytes.
pub fn load_slice(bytes: &[u8]) -> Result<Scene> {
    gltf::load_slice(bytes)
}

/// Write a raster to a PNG file.
pub fn save_png<P: AsRef<Path>>(image: &RgbaImage, path: P) -> Result<()> {
    let path = path.as_ref();
    image
        .save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| LiveryError::SaveError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
