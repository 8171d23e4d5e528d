//! Texture baking.
//!
//! Baking flattens the editor into a single raster: the UV base image scaled
//! to the output resolution, with the placed logos drawn over it. Zone outlines
//! are never baked.
//!
//! # Algorithm
//!
//! 1. Copy the base image, resizing it only if its size differs from the
//!    output resolution. Without a base image, fill with the fallback colour.
//! 2. Render the logo overlay at the full output resolution.
//! 3. Composite the overlay onto the base row by row (source-over).
//!
//! # Example
//!
//! ```
//! use livery::bake::{bake, BakeOptions};
//! use livery::editor::{Editor, EditorOptions};
//!
//! let editor = Editor::new("generic-sedan", Vec::new(), EditorOptions::default());
//! let baked = bake(None, &editor, &BakeOptions::default().with_resolution(256));
//! assert_eq!(baked.resolution(), 256);
//! ```

mod progress;

pub use progress::Progress;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::editor::{Editor, LogoFit};
use crate::error::{LiveryError, Result};
use crate::raster::{self, ResizeFilter};

/// Options for texture baking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BakeOptions {
    /// Side length of the baked texture in pixels.
    pub resolution: u32,

    /// Filter used to scale the base image and logos.
    pub filter: ResizeFilter,

    /// Fill colour used when no UV image exists.
    pub fallback_color: Color,

    /// How logos are scaled into their zones.
    pub logo_fit: LogoFit,

    /// Whether to use parallel execution (default: true).
    pub parallel: bool,
}

impl Default for BakeOptions {
    fn default() -> Self {
        Self {
            resolution: 1024,
            filter: ResizeFilter::Triangle,
            fallback_color: Color::rgb(0x1a, 0x1a, 0x1a),
            logo_fit: LogoFit::Stretch,
            parallel: true,
        }
    }
}

impl BakeOptions {
    /// Set the output resolution.
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the resampling filter.
    pub fn with_filter(mut self, filter: ResizeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the logo fit.
    pub fn with_logo_fit(mut self, fit: LogoFit) -> Self {
        self.logo_fit = fit;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check option values.
    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 {
            return Err(LiveryError::invalid_param(
                "bake.resolution",
                self.resolution,
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// The result of the most recent bake.
#[derive(Debug, Clone)]
pub struct BakedTexture {
    image: Arc<RgbaImage>,
}

impl BakedTexture {
    /// Wrap a raster.
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    /// The baked pixels.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// A shared handle to the pixels, for assignment to materials.
    pub fn shared_image(&self) -> Arc<RgbaImage> {
        Arc::clone(&self.image)
    }

    /// Side length in pixels.
    pub fn resolution(&self) -> u32 {
        self.image.width()
    }

    /// Write the texture as PNG.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        crate::io::save_png(&self.image, path)
    }
}

/// Bake the editor's logos over a base image.
///
/// With no logos placed the result equals `base` scaled to the output
/// resolution, or a flat fill of the fallback colour when `base` is `None`.
pub fn bake(base: Option<&RgbaImage>, editor: &Editor, options: &BakeOptions) -> BakedTexture {
    bake_with_progress(base, editor, options, &Progress::none())
}

/// Bake with progress reporting.
///
/// See [`bake`] for details.
pub fn bake_with_progress(
    base: Option<&RgbaImage>,
    editor: &Editor,
    options: &BakeOptions,
    progress: &Progress,
) -> BakedTexture {
    let size = options.resolution;
    let mut out = match base {
        Some(img) => raster::resize(img, size, size, options.filter),
        None => RgbaImage::from_pixel(size, size, options.fallback_color.to_rgba()),
    };

    if editor.has_placements() {
        let overlay = editor.render_overlay(size, options.logo_fit, options.filter);
        composite(&mut out, &overlay, options.parallel, progress);
    } else {
        progress.report(1, 1, "Compositing");
    }

    BakedTexture::new(out)
}

/// Draw `overlay` over `dst` pixel for pixel.
///
/// Both rasters must have the same dimensions; extra rows or columns of the
/// larger one are ignored.
pub fn composite(dst: &mut RgbaImage, overlay: &RgbaImage, parallel: bool, progress: &Progress) {
    let width = dst.width().min(overlay.width()) as usize;
    let rows = dst.height().min(overlay.height()) as usize;
    if width == 0 || rows == 0 {
        progress.report(1, 1, "Compositing");
        return;
    }

    let dst_stride = dst.width() as usize * 4;
    let src_stride = overlay.width() as usize * 4;
    let src: &[u8] = overlay.as_raw();
    let buf: &mut [u8] = &mut *dst;
    let done = AtomicUsize::new(0);

    let step = |(dst_row, src_row): (&mut [u8], &[u8])| {
        composite_row(&mut dst_row[..width * 4], &src_row[..width * 4]);
        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
        if n % 64 == 0 || n == rows {
            progress.report(n, rows, "Compositing");
        }
    };

    if parallel {
        buf.par_chunks_mut(dst_stride)
            .zip(src.par_chunks(src_stride))
            .take(rows)
            .for_each(step);
    } else {
        buf.chunks_mut(dst_stride)
            .zip(src.chunks(src_stride))
            .take(rows)
            .for_each(step);
    }
}

#[inline]
fn composite_row(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let mut px = Rgba([d[0], d[1], d[2], d[3]]);
        raster::blend_over(&mut px, Rgba([s[0], s[1], s[2], s[3]]));
        d.copy_from_slice(&px.0);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::editor::EditorOptions;
    use crate::zone::{ZoneRegistry, DEFAULT_MODEL_ID};

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn editor() -> Editor {
        let zones = ZoneRegistry::builtin().zones(DEFAULT_MODEL_ID).unwrap().to_vec();
        Editor::new(DEFAULT_MODEL_ID, zones, EditorOptions::default())
    }

    fn gradient(size: u32) -> RgbaImage {
        RgbaImage::from_fn(size, size, |x, y| Rgba([(x % 256) as u8, (y % 256) as u8, 77, 255]))
    }

    #[test]
    fn test_no_logos_equals_scaled_base() {
        let base = gradient(300);
        let options = BakeOptions::default().with_resolution(128);
        let baked = bake(Some(&base), &editor(), &options);

        let expected = raster::resize(&base, 128, 128, options.filter);
        assert_eq!(*baked.image(), expected);
    }

    #[test]
    fn test_no_logos_same_size_is_identity() {
        let base = gradient(64);
        let baked = bake(Some(&base), &editor(), &BakeOptions::default().with_resolution(64));
        assert_eq!(*baked.image(), base);
    }

    #[test]
    fn test_no_base_uses_fallback() {
        let options = BakeOptions::default().with_resolution(16);
        let baked = bake(None, &editor(), &options);
        let fill = options.fallback_color.to_rgba();
        assert!(baked.image().pixels().all(|p| *p == fill));
    }

    #[test]
    fn test_output_resolution_is_fixed() {
        let mut ed = editor();
        ed.upload_logo_image("logo.png", RgbaImage::from_pixel(5, 3, RED));
        ed.place_logo("zone-back").unwrap();

        for src in [1u32, 17, 512, 1500] {
            let base = gradient(src);
            let baked = bake(Some(&base), &ed, &BakeOptions::default().with_resolution(200));
            assert_eq!(baked.image().dimensions(), (200, 200));
        }
    }

    #[test]
    fn test_logo_drawn_in_zone() {
        let mut ed = editor();
        ed.upload_logo_image("logo.png", RgbaImage::from_pixel(4, 4, RED));
        ed.place_logo("zone-front").unwrap();

        let base = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        let options = BakeOptions::default()
            .with_resolution(100)
            .with_filter(ResizeFilter::Nearest);
        let baked = bake(Some(&base), &ed, &options);

        // zone-front is [25, 75) x [10, 40)
        assert_eq!(*baked.image().get_pixel(50, 25), RED);
        assert_eq!(*baked.image().get_pixel(50, 50), Rgba([0, 0, 0, 255]));
        assert_eq!(*baked.image().get_pixel(10, 25), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_contain_fit_keeps_aspect() {
        let mut ed = editor();
        ed.upload_logo_image("square.png", RgbaImage::from_pixel(6, 6, RED));
        ed.place_logo("zone-front").unwrap();

        let black = Rgba([0, 0, 0, 255]);
        let base = RgbaImage::from_pixel(100, 100, black);
        let options = BakeOptions::default()
            .with_resolution(100)
            .with_filter(ResizeFilter::Nearest)
            .with_logo_fit(LogoFit::Contain);
        let baked = bake(Some(&base), &ed, &options);

        // 50x30 zone -> 30x30 logo at [35, 65) x [10, 40)
        assert_eq!(*baked.image().get_pixel(30, 25), black);
        assert_eq!(*baked.image().get_pixel(35, 25), RED);
        assert_eq!(*baked.image().get_pixel(64, 39), RED);
        assert_eq!(*baked.image().get_pixel(65, 25), black);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut ed = editor();
        let logo = RgbaImage::from_fn(9, 9, |x, y| Rgba([200, 10, 10, ((x * y) % 256) as u8]));
        ed.upload_logo_image("logo.png", logo);
        ed.place_logo("zone-side").unwrap();
        ed.place_logo("zone-front").unwrap();

        let base = gradient(97);
        let par = bake(Some(&base), &ed, &BakeOptions::default().with_resolution(150));
        let seq = bake(Some(&base), &ed, &BakeOptions::default().with_resolution(150).sequential());
        assert_eq!(par.image(), seq.image());
    }

    #[test]
    fn test_translucent_logo_blends() {
        let mut ed = editor();
        ed.upload_logo_image("ghost.png", RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 128])));
        ed.place_logo("zone-front").unwrap();

        let base = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        let baked = bake(Some(&base), &ed, &BakeOptions::default().with_resolution(100));
        let px = baked.image().get_pixel(50, 25);
        assert_eq!(px[3], 255);
        assert!((i32::from(px[0]) - 128).abs() <= 1);
    }

    #[test]
    fn test_progress_reaches_total() {
        let mut ed = editor();
        ed.upload_logo_image("logo.png", RgbaImage::from_pixel(2, 2, RED));
        ed.place_logo("zone-front").unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress = Progress::new(move |current, total, _| {
            sink.lock().unwrap().push((current, total));
        });

        bake_with_progress(None, &ed, &BakeOptions::default().with_resolution(130), &progress);
        let seen = seen.lock().unwrap();
        assert!(seen.contains(&(130, 130)));
        assert!(seen.iter().all(|&(c, t)| c <= t && t == 130));
    }

    #[test]
    fn test_validate() {
        assert!(BakeOptions::default().validate().is_ok());
        assert!(matches!(
            BakeOptions::default().with_resolution(0).validate(),
            Err(LiveryError::InvalidParameter { name: "bake.resolution", .. })
        ));
    }

    #[test]
    fn test_save() {
        let path = std::env::temp_dir().join(format!("livery-bake-{}.png", std::process::id()));
        let baked = BakedTexture::new(gradient(8));
        baked.save(&path).unwrap();
        assert_eq!(image::open(&path).unwrap().to_rgba8(), gradient(8));
        let _ = std::fs::remove_file(&path);
    }
}
