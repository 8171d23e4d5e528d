//! In-memory model of a loaded 3D asset.
//!
//! Only the parts of the scene graph that the texture pipeline touches are kept:
//! mesh nodes in traversal order and the material slots they reference. Geometry
//! is left to the viewer.

mod material;

pub use material::apply_baked_texture;

use std::path::PathBuf;
use std::sync::Arc;

use image::RgbaImage;

use crate::color::Color;

/// Where a material's texture came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureOrigin {
    /// Decoded from the asset's image list.
    Asset {
        /// Index into the asset's images.
        image_index: usize,
    },
    /// Produced by the baker.
    Baked,
}

/// A texture assigned to a material.
#[derive(Debug, Clone)]
pub struct Texture {
    /// Decoded pixels.
    pub image: Arc<RgbaImage>,
    /// Source of the pixels.
    pub origin: TextureOrigin,
}

impl Texture {
    /// Texture dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// A material slot.
#[derive(Debug, Clone)]
pub struct Material {
    /// Material name, if the asset provides one.
    pub name: Option<String>,
    /// Base colour multiplier (linear RGBA).
    pub base_color_factor: [f32; 4],
    /// Base colour texture.
    pub base_color_texture: Option<Texture>,
    /// Set when the material changed and the renderer must refresh it.
    pub needs_update: bool,
}

impl Material {
    /// An untextured material with the given name and factor.
    pub fn untextured(name: Option<String>, base_color_factor: [f32; 4]) -> Self {
        Self {
            name,
            base_color_factor,
            base_color_texture: None,
            needs_update: false,
        }
    }

    /// An untextured material tinted with an sRGB colour.
    pub fn tinted(name: &str, color: Color) -> Self {
        let f = |c: u8| f32::from(c) / 255.0;
        Self::untextured(Some(name.to_string()), [f(color.r), f(color.g), f(color.b), f(color.a)])
    }
}

/// A mesh node and the material slots used by its primitives.
#[derive(Debug, Clone)]
pub struct MeshNode {
    /// Node or mesh name.
    pub name: Option<String>,
    /// Indices into [`Scene::materials`], one per primitive.
    pub materials: Vec<usize>,
}

/// A loaded asset.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// File the scene was loaded from, if any.
    pub source: Option<PathBuf>,
    /// Mesh nodes in depth-first traversal order.
    pub meshes: Vec<MeshNode>,
    /// Material slots.
    pub materials: Vec<Material>,
}

/// Tint of the placeholder shown when a model fails to load.
pub const PLACEHOLDER_COLOR: Color = Color::rgb(0xff, 0x6b, 0x6b);

impl Scene {
    /// The fallback shape shown when an asset cannot be loaded: a single mesh
    /// with one untextured material.
    pub fn placeholder() -> Self {
        Self {
            source: None,
            meshes: vec![MeshNode {
                name: Some("placeholder-box".to_string()),
                materials: vec![0],
            }],
            materials: vec![Material::tinted("placeholder", PLACEHOLDER_COLOR)],
        }
    }

    /// Number of mesh nodes.
    pub fn num_meshes(&self) -> usize {
        self.meshes.len()
    }

    /// Number of material slots.
    pub fn num_materials(&self) -> usize {
        self.materials.len()
    }

    /// Iterate over `(mesh, material)` pairs in traversal order.
    ///
    /// A material shared by several primitives is yielded once per use.
    pub fn mesh_materials(&self) -> impl Iterator<Item = (&MeshNode, &Material)> + '_ {
        self.meshes.iter().flat_map(move |mesh| {
            mesh.materials
                .iter()
                .filter_map(move |&i| self.materials.get(i).map(|m| (mesh, m)))
        })
    }

    /// The first textured material in traversal order.
    pub fn first_texture(&self) -> Option<(&MeshNode, &Material, &Texture)> {
        self.mesh_materials()
            .find_map(|(mesh, mat)| mat.base_color_texture.as_ref().map(|t| (mesh, mat, t)))
    }
}
