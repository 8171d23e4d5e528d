//! # Livery
//!
//! Logo placement and texture baking for UV-mapped car models.
//!
//! Livery takes a glTF car model, derives a square UV image from its existing
//! base colour texture (or a checkerboard placeholder), lets logos be placed
//! into predefined rectangular zones of that image, and bakes everything into
//! one texture that is then assigned to every material of the model.
//!
//! ## Pipeline
//!
//! | Stage | Module | Output |
//! |-------|--------|--------|
//! | Asset loading | [`io`] | [`scene::Scene`] |
//! | UV extraction | [`uv`] | [`uv::UvImage`] |
//! | Zone lookup | [`zone`] | [`zone::Zone`] rectangles |
//! | Placement | [`editor`] | [`editor::EditorState`] |
//! | Baking | [`bake`] | [`bake::BakedTexture`] |
//! | Material update | [`scene::apply_baked_texture`] | updated materials |
//!
//! [`session::Session`] owns all of these for one editing session.
//!
//! ## Quick Start
//!
//! ```no_run
//! use livery::prelude::*;
//!
//! let mut session = Session::new(Config::default()).unwrap();
//! session.load_model("car/scene.gltf");
//!
//! let logo = std::fs::read("acme.png").unwrap();
//! session.upload_logo("acme.png", &logo);
//! session.place_logo("zone-front").unwrap();
//!
//! session.bake().save("baked.png").unwrap();
//! ```
//!
//! ## Working Without a Session
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use livery::prelude::*;
//!
//! let registry = ZoneRegistry::builtin();
//! let zones = registry.zones(DEFAULT_MODEL_ID).unwrap().to_vec();
//! let mut editor = Editor::new(DEFAULT_MODEL_ID, zones, EditorOptions::default());
//!
//! editor.upload_logo_image("acme.png", RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255])));
//! editor.place_logo("zone-side").unwrap();
//!
//! let uv = extract_uv_image(&Scene::placeholder(), &UvOptions::default().with_size(256));
//! let options = BakeOptions::default().with_resolution(256);
//! let baked = bake(Some(uv.image.as_ref()), &editor, &options);
//! assert_eq!(baked.resolution(), 256);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bake;
pub mod color;
pub mod config;
pub mod editor;
pub mod error;
pub mod io;
pub mod raster;
pub mod scene;
pub mod session;
pub mod uv;
pub mod zone;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use livery::prelude::*;
/// ```
pub mod prelude {
    pub use crate::bake::{bake, BakeOptions, BakedTexture, Progress};
    pub use crate::color::Color;
    pub use crate::config::Config;
    pub use crate::editor::{Editor, EditorOptions, EditorState, LogoFit, PlacedLogo};
    pub use crate::error::{LiveryError, Result};
    pub use crate::scene::{apply_baked_texture, Scene};
    pub use crate::session::{LoadOutcome, Session};
    pub use crate::uv::{extract_uv_image, UvImage, UvOptions};
    pub use crate::zone::{Zone, ZoneRegistry, DEFAULT_MODEL_ID};
}

// Re-export image types for convenience
pub use image;
