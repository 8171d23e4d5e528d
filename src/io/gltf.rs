//! glTF format support.
//!
//! This module loads the material graph of glTF and GLB assets. Geometry is not
//! read; the pipeline only needs the mesh traversal order, the material slot of
//! every primitive and the decoded base colour textures.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use ::gltf::image::{Format as PixelFormat, Source as ImageSource};
use ::gltf::{Document, Node};
use image::RgbaImage;
use log::{debug, warn};

use crate::error::{LiveryError, Result};
use crate::scene::{Material, MeshNode, Scene, Texture, TextureOrigin};

/// Load a scene from a glTF or GLB file.
///
/// External buffers and images are resolved relative to the file.
///
/// # Example
///
/// ```no_run
/// use livery::io::gltf;
///
/// let scene = gltf::load("car/scene.gltf").unwrap();
/// println!("{} meshes", scene.num_meshes());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Scene> {
    let path = path.as_ref();

    let (document, _buffers, images) = ::gltf::import(path).map_err(|e| LiveryError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut scene = build_scene(&document, images.len(), |index| {
        images.get(index).and_then(to_rgba)
    });
    scene.source = Some(path.to_path_buf());
    Ok(scene)
}

/// Load a scene from an in-memory glTF or GLB asset, such as an uploaded file.
///
/// Only self-contained assets can be loaded this way: GLB files, or glTF files
/// whose buffers and images are embedded as `data:` URIs or buffer views.
/// Images that reference external files, or fail to decode, are skipped and the
/// material is treated as untextured.
pub fn load_slice(bytes: &[u8]) -> Result<Scene> {
    let load_error = |e: ::gltf::Error| LiveryError::LoadError {
        path: "<memory>".into(),
        message: e.to_string(),
    };

    let ::gltf::Gltf { document, blob } = ::gltf::Gltf::from_slice(bytes).map_err(load_error)?;
    let buffers = ::gltf::import_buffers(&document, None, blob).map_err(load_error)?;

    let images: Vec<_> = document.images().collect();
    Ok(build_scene(&document, images.len(), |index| {
        images.get(index).and_then(|img| decode_embedded(img, &buffers))
    }))
}

fn build_scene<F>(document: &Document, num_images: usize, mut decode: F) -> Scene
where
    F: FnMut(usize) -> Option<RgbaImage>,
{
    let mut decoded: Vec<Option<Option<Arc<RgbaImage>>>> = vec![None; num_images];

    let mut materials: Vec<Material> = document
        .materials()
        .map(|material| {
            let pbr = material.pbr_metallic_roughness();
            let texture = pbr.base_color_texture().and_then(|info| {
                let image_index = info.texture().source().index();
                let image = decoded
                    .get_mut(image_index)?
                    .get_or_insert_with(|| decode(image_index).map(Arc::new))
                    .clone()?;
                Some(Texture {
                    image,
                    origin: TextureOrigin::Asset { image_index },
                })
            });

            Material {
                name: material.name().map(String::from),
                base_color_factor: pbr.base_color_factor(),
                base_color_texture: texture,
                needs_update: false,
            }
        })
        .collect();

    // Primitives without a material share one default slot.
    let mut default_slot = None;
    let mut slot_for = |index: Option<usize>, materials: &mut Vec<Material>| match index {
        Some(i) => i,
        None => *default_slot.get_or_insert_with(|| {
            materials.push(Material::untextured(Some("default".to_string()), [1.0; 4]));
            materials.len() - 1
        }),
    };

    let mut meshes = Vec::new();
    for (name, mesh) in mesh_nodes(document) {
        let slots = mesh
            .primitives()
            .map(|p| slot_for(p.material().index(), &mut materials))
            .collect();
        meshes.push(MeshNode {
            name: name.or_else(|| mesh.name().map(String::from)),
            materials: slots,
        });
    }

    debug!(
        "glTF scene: {} meshes, {} materials, {} images",
        meshes.len(),
        materials.len(),
        num_images
    );

    Scene {
        source: None,
        meshes,
        materials,
    }
}

/// Decode an image stored inside the asset itself.
fn decode_embedded(
    img: &::gltf::Image<'_>,
    buffers: &[::gltf::buffer::Data],
) -> Option<RgbaImage> {
    let encoded: Cow<'_, [u8]> = match img.source() {
        ImageSource::View { view, .. } => {
            let buffer = buffers.get(view.buffer().index())?;
            let begin = view.offset();
            Cow::Borrowed(buffer.get(begin..begin + view.length())?)
        }
        ImageSource::Uri { uri, .. } => {
            let payload = uri.strip_prefix("data:").and_then(|rest| rest.split_once(";base64,"));
            let Some((_, payload)) = payload else {
                warn!("image {} references external file {}, skipping", img.index(), uri);
                return None;
            };
            match base64::decode(payload) {
                Ok(bytes) => Cow::Owned(bytes),
                Err(e) => {
                    warn!("image {} has an invalid data URI: {}", img.index(), e);
                    return None;
                }
            }
        }
    };

    match image::load_from_memory(&encoded) {
        Ok(decoded) => Some(decoded.to_rgba8()),
        Err(e) => {
            warn!("failed to decode image {}: {}", img.index(), e);
            None
        }
    }
}

/// Mesh-bearing nodes of the default scene in depth-first pre-order.
///
/// Falls back to the first scene, and to the raw mesh list when the document
/// defines no scenes at all.
fn mesh_nodes<'a>(document: &'a Document) -> Vec<(Option<String>, ::gltf::Mesh<'a>)> {
    let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        return document.meshes().map(|m| (None, m)).collect();
    };

    let mut out = Vec::new();
    let mut stack: Vec<Node<'a>> = scene.nodes().collect();
    stack.reverse();
    while let Some(node) = stack.pop() {
        if let Some(mesh) = node.mesh() {
            out.push((node.name().map(String::from), mesh));
        }
        let mut children: Vec<_> = node.children().collect();
        children.reverse();
        stack.extend(children);
    }
    out
}

/// Convert decoded glTF image data to RGBA8.
///
/// 16-bit and floating point images are not supported and yield `None`.
fn to_rgba(data: &::gltf::image::Data) -> Option<RgbaImage> {
    let pixels: Vec<u8> = match data.format {
        PixelFormat::R8G8B8A8 => data.pixels.clone(),
        PixelFormat::R8G8B8 => data
            .pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        PixelFormat::R8G8 => data
            .pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        PixelFormat::R8 => data.pixels.iter().flat_map(|&l| [l, l, l, 255]).collect(),
        other => {
            warn!("skipping texture with unsupported pixel format {:?}", other);
            return None;
        }
    };

    let image = RgbaImage::from_raw(data.width, data.height, pixels);
    if image.is_none() {
        warn!("texture data does not match its {}x{} size", data.width, data.height);
    }
    image
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A one-triangle glTF whose buffers and images are inlined as data URIs.
    ///
    /// The PNG is a 2x2 RGBA image: red, green / blue, white.
    pub(crate) fn textured_gltf() -> String {
        let png = png_2x2();
        let buffer = [0u8; 36]; // three zeroed VEC3 positions
        format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [
    {{ "name": "root", "children": [1, 2] }},
    {{ "name": "body", "mesh": 0 }},
    {{ "name": "trim", "mesh": 1 }}
  ],
  "meshes": [
    {{ "name": "body-mesh", "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "material": 0 }}] }},
    {{ "primitives": [
        {{ "attributes": {{ "POSITION": 0 }}, "material": 1 }},
        {{ "attributes": {{ "POSITION": 0 }} }}
    ] }}
  ],
  "materials": [
    {{ "name": "paint", "pbrMetallicRoughness": {{ "baseColorFactor": [1, 0.5, 0.5, 1] }} }},
    {{ "name": "decal", "pbrMetallicRoughness": {{ "baseColorTexture": {{ "index": 0 }} }} }}
  ],
  "textures": [{{ "source": 0 }}],
  "images": [{{ "uri": "data:image/png;base64,{png}" }}],
  "buffers": [{{ "byteLength": 36, "uri": "data:application/octet-stream;base64,{buf}" }}],
  "bufferViews": [{{ "buffer": 0, "byteLength": 36 }}],
  "accessors": [{{
    "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
    "min": [0, 0, 0], "max": [0, 0, 0]
  }}]
}}"#,
            png = base64::encode(&png),
            buf = base64::encode(buffer),
        )
    }

    fn png_2x2() -> Vec<u8> {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 255, 0, 255]));
        img.put_pixel(0, 1, image::Rgba([0, 0, 255, 255]));
        img.put_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut out, image::ImageOutputFormat::Png)
            .unwrap();
        out.into_inner()
    }

    /// A GLB with one textured mesh whose PNG lives in a buffer view of the BIN chunk.
    pub(crate) fn textured_glb() -> Vec<u8> {
        let png = png_2x2();
        let mut bin = vec![0u8; 36];
        bin.extend_from_slice(&png);

        let json = format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [{{ "name": "hood", "mesh": 0 }}],
  "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "material": 0 }}] }}],
  "materials": [{{ "name": "livery", "pbrMetallicRoughness": {{ "baseColorTexture": {{ "index": 0 }} }} }}],
  "textures": [{{ "source": 0 }}],
  "images": [{{ "bufferView": 1, "mimeType": "image/png" }}],
  "buffers": [{{ "byteLength": {total} }}],
  "bufferViews": [
    {{ "buffer": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": {png_len} }}
  ],
  "accessors": [{{
    "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
    "min": [0, 0, 0], "max": [0, 0, 0]
  }}]
}}"#,
            total = bin.len(),
            png_len = png.len(),
        );

        ::gltf::Glb {
            header: ::gltf::binary::Header {
                magic: *b"glTF",
                version: 2,
                length: 0,
            },
            json: Cow::Owned(json.into_bytes()),
            bin: Some(Cow::Owned(bin)),
        }
        .to_vec()
        .unwrap()
    }

    #[test]
    fn test_load_slice_material_slots() {
        let scene = load_slice(textured_gltf().as_bytes()).unwrap();

        assert_eq!(scene.num_meshes(), 2);
        assert_eq!(scene.meshes[0].name.as_deref(), Some("body"));
        assert_eq!(scene.meshes[0].materials, vec![0]);
        // Second primitive has no material and gets the synthesized default slot.
        assert_eq!(scene.meshes[1].materials, vec![1, 2]);
        assert_eq!(scene.num_materials(), 3);
        assert_eq!(scene.materials[2].name.as_deref(), Some("default"));

        assert!(scene.materials[0].base_color_texture.is_none());
        assert!((scene.materials[0].base_color_factor[1] - 0.5).abs() < 1e-6);

        let (mesh, mat, tex) = scene.first_texture().unwrap();
        assert_eq!(mesh.name.as_deref(), Some("trim"));
        assert_eq!(mat.name.as_deref(), Some("decal"));
        assert_eq!(tex.origin, TextureOrigin::Asset { image_index: 0 });
        assert_eq!(tex.dimensions(), (2, 2));
        assert_eq!(tex.image.get_pixel(1, 0).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_load_slice_glb_buffer_view_image() {
        let scene = load_slice(&textured_glb()).unwrap();

        assert_eq!(scene.num_meshes(), 1);
        assert_eq!(scene.meshes[0].name.as_deref(), Some("hood"));
        let (_, mat, tex) = scene.first_texture().unwrap();
        assert_eq!(mat.name.as_deref(), Some("livery"));
        assert_eq!(tex.dimensions(), (2, 2));
        assert_eq!(tex.image.get_pixel(0, 1).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_load_slice_skips_external_image() {
        let gltf = textured_gltf();
        let start = gltf.find("data:image/png").unwrap();
        let end = start + gltf[start..].find('"').unwrap();
        let external = format!("{}decal.png{}", &gltf[..start], &gltf[end..]);

        let scene = load_slice(external.as_bytes()).unwrap();
        assert_eq!(scene.num_meshes(), 2);
        assert!(scene.first_texture().is_none());
    }

    #[test]
    fn test_load_slice_rejects_garbage() {
        let err = load_slice(b"not a gltf").unwrap_err();
        assert!(matches!(err, LiveryError::LoadError { .. }));
    }

    #[test]
    fn test_to_rgba_expands_rgb() {
        let data = ::gltf::image::Data {
            pixels: vec![10, 20, 30, 40, 50, 60],
            format: PixelFormat::R8G8B8,
            width: 2,
            height: 1,
        };
        let img = to_rgba(&data).unwrap();
        assert_eq!(img.get_pixel(1, 0).0, [40, 50, 60, 255]);
    }

    #[test]
    fn test_to_rgba_rejects_size_mismatch() {
        let data = ::gltf::image::Data {
            pixels: vec![1, 2, 3, 4],
            format: PixelFormat::R8G8B8A8,
            width: 2,
            height: 2,
        };
        assert!(to_rgba(&data).is_none());
    }
}
