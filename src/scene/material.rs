//! Assigning baked textures to scene materials.

use log::debug;

use super::{Scene, Texture, TextureOrigin};
use crate::bake::BakedTexture;

/// Assign a baked texture to every material used by the scene's meshes.
///
/// Each material's base colour texture is replaced (no diffing against the
/// previous texture) and flagged with `needs_update`. Materials that no mesh
/// references are left alone. Returns the number of materials updated; for a
/// scene without materials this is a no-op returning 0.
pub fn apply_baked_texture(scene: &mut Scene, baked: &BakedTexture) -> usize {
    let mut used = vec![false; scene.materials.len()];
    for mesh in &scene.meshes {
        for &i in &mesh.materials {
            if let Some(flag) = used.get_mut(i) {
                *flag = true;
            }
        }
    }

    let texture = Texture {
        image: baked.shared_image(),
        origin: TextureOrigin::Baked,
    };

    let mut updated = 0;
    for (material, _) in scene.materials.iter_mut().zip(&used).filter(|(_, u)| **u) {
        material.base_color_texture = Some(texture.clone());
        material.needs_update = true;
        updated += 1;
    }

    debug!("assigned baked texture to {} material(s)", updated);
    updated
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::scene::{Material, MeshNode};

    fn baked() -> BakedTexture {
        BakedTexture::new(RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255])))
    }

    #[test]
    fn test_replaces_every_used_material() {
        let mut scene = Scene {
            source: None,
            meshes: vec![
                MeshNode { name: None, materials: vec![0, 1] },
                MeshNode { name: None, materials: vec![1] },
            ],
            materials: vec![
                Material::untextured(None, [1.0; 4]),
                Material::untextured(None, [1.0; 4]),
                Material::untextured(Some("unused".into()), [1.0; 4]),
            ],
        };

        let tex = baked();
        assert_eq!(apply_baked_texture(&mut scene, &tex), 2);

        for mat in &scene.materials[..2] {
            let t = mat.base_color_texture.as_ref().unwrap();
            assert_eq!(t.origin, TextureOrigin::Baked);
            assert!(Arc::ptr_eq(&t.image, &tex.shared_image()));
            assert!(mat.needs_update);
        }
        assert!(scene.materials[2].base_color_texture.is_none());
        assert!(!scene.materials[2].needs_update);
    }

    #[test]
    fn test_second_bake_replaces_first() {
        let mut scene = Scene::placeholder();
        apply_baked_texture(&mut scene, &baked());

        let second = BakedTexture::new(RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255])));
        apply_baked_texture(&mut scene, &second);

        let t = scene.materials[0].base_color_texture.as_ref().unwrap();
        assert_eq!(t.dimensions(), (2, 2));
    }

    #[test]
    fn test_empty_scene_is_noop() {
        let mut scene = Scene::default();
        assert_eq!(apply_baked_texture(&mut scene, &baked()), 0);
        assert!(scene.materials.is_empty());
    }
}
