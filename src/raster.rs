//! Raster helpers shared by the extractor, editor and baker.

use font8x8::legacy::BASIC_LEGACY;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::zone::RasterBounds;

/// Resampling filter used when scaling images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeFilter {
    /// Nearest neighbour.
    Nearest,
    /// Bilinear.
    #[default]
    Triangle,
    /// Bicubic (Catmull-Rom).
    CatmullRom,
    /// Lanczos with window 3.
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Scale an image to `width x height`.
///
/// An image that already has the requested size is copied unchanged.
pub fn resize(image: &RgbaImage, width: u32, height: u32, filter: ResizeFilter) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, filter.into())
}

/// Source-over composite of one pixel onto another.
///
/// Uses straight (non-premultiplied) alpha. A fully transparent source
/// leaves the destination untouched, a fully opaque one replaces it.
#[inline]
pub fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return;
    }
    if sa == 255 {
        *dst = src;
        return;
    }

    let da = u32::from(dst[3]);
    // out_a = sa + da * (1 - sa), scaled by 255.
    let out_a = sa * 255 + da * (255 - sa);
    if out_a == 0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    for c in 0..3 {
        let num = u32::from(src[c]) * sa * 255 + u32::from(dst[c]) * da * (255 - sa);
        dst[c] = ((num + out_a / 2) / out_a) as u8;
    }
    dst[3] = ((out_a + 127) / 255) as u8;
}

/// Draw `src` over `dst` with its top-left corner at `(left, top)`.
///
/// Pixels falling outside `dst` are clipped.
pub fn draw_over(dst: &mut RgbaImage, src: &RgbaImage, left: u32, top: u32) {
    let (dw, dh) = dst.dimensions();
    for (x, y, pixel) in src.enumerate_pixels() {
        let (tx, ty) = (left + x, top + y);
        if tx < dw && ty < dh {
            blend_over(dst.get_pixel_mut(tx, ty), *pixel);
        }
    }
}

/// Stroke the outline of `bounds` with a line `width` pixels thick, drawn
/// inside the bounds.
pub fn stroke_rect(dst: &mut RgbaImage, bounds: RasterBounds, width: u32, color: Color) {
    if bounds.is_empty() || width == 0 {
        return;
    }
    let pixel = color.to_rgba();
    let (dw, dh) = dst.dimensions();
    for y in bounds.top..bounds.bottom.min(dh) {
        for x in bounds.left..bounds.right.min(dw) {
            let inner = x >= bounds.left + width
                && y >= bounds.top + width
                && x + width < bounds.right
                && y + width < bounds.bottom;
            if !inner {
                blend_over(dst.get_pixel_mut(x, y), pixel);
            }
        }
    }
}

/// Side length of one unscaled label glyph.
pub const GLYPH_SIZE: u32 = 8;

fn glyph_for_char(ch: char) -> [u8; 8] {
    let index = ch as usize;
    if index < BASIC_LEGACY.len() {
        BASIC_LEGACY[index]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}

/// Draw a single line of text in the 8x8 bitmap font, with each font pixel
/// drawn as a `scale x scale` block.
///
/// Characters outside ASCII are drawn as `?`. Pixels falling outside `dst`
/// are clipped.
pub fn draw_text(dst: &mut RgbaImage, text: &str, left: u32, top: u32, scale: u32, color: Color) {
    if scale == 0 {
        return;
    }
    let pixel = color.to_rgba();
    let (dw, dh) = dst.dimensions();
    let advance = GLYPH_SIZE * scale;

    for (col, ch) in text.chars().enumerate() {
        let glyph_left = left + col as u32 * advance;
        if glyph_left >= dw {
            break;
        }
        for (row, bits) in glyph_for_char(ch).iter().enumerate() {
            for bit in 0..GLYPH_SIZE {
                if (bits >> bit) & 0x01 == 0 {
                    continue;
                }
                let x0 = glyph_left + bit * scale;
                let y0 = top + row as u32 * scale;
                for y in y0..(y0 + scale).min(dh) {
                    for x in x0..(x0 + scale).min(dw) {
                        blend_over(dst.get_pixel_mut(x, y), pixel);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_over_extremes() {
        let mut dst = Rgba([10, 20, 30, 255]);
        blend_over(&mut dst, Rgba([200, 200, 200, 0]));
        assert_eq!(dst, Rgba([10, 20, 30, 255]));

        blend_over(&mut dst, Rgba([1, 2, 3, 255]));
        assert_eq!(dst, Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn test_blend_over_half_alpha_on_opaque() {
        let mut dst = Rgba([0, 0, 0, 255]);
        blend_over(&mut dst, Rgba([255, 255, 255, 128]));
        assert_eq!(dst[3], 255);
        assert!((i32::from(dst[0]) - 128).abs() <= 1);
    }

    #[test]
    fn test_blend_over_onto_transparent() {
        let mut dst = Rgba([0, 0, 0, 0]);
        blend_over(&mut dst, Rgba([200, 100, 50, 64]));
        assert_eq!(dst, Rgba([200, 100, 50, 64]));
    }

    #[test]
    fn test_resize_same_size_is_copy() {
        let mut img = RgbaImage::new(3, 3);
        img.put_pixel(1, 1, Rgba([5, 6, 7, 8]));
        assert_eq!(resize(&img, 3, 3, ResizeFilter::Lanczos3), img);
        assert_eq!(resize(&img, 7, 5, ResizeFilter::Nearest).dimensions(), (7, 5));
    }

    #[test]
    fn test_draw_over_clips() {
        let mut dst = RgbaImage::new(4, 4);
        let src = RgbaImage::from_pixel(3, 3, Rgba([9, 9, 9, 255]));
        draw_over(&mut dst, &src, 2, 2);
        assert_eq!(dst.get_pixel(3, 3).0, [9, 9, 9, 255]);
        assert_eq!(dst.get_pixel(1, 1).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_draw_text_scales_glyphs() {
        let mut dst = RgbaImage::new(40, 20);
        draw_text(&mut dst, "I", 1, 1, 2, Color::rgb(0, 255, 0));

        let lit: Vec<(u32, u32)> = dst
            .enumerate_pixels()
            .filter(|(_, _, p)| p[3] != 0)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!lit.is_empty());
        // Glyph stays within its 16x16 cell and blocks are 2x2.
        assert!(lit.iter().all(|&(x, y)| (1..17).contains(&x) && (1..17).contains(&y)));
        assert!(lit.iter().all(|&(x, y)| {
            let bx = x - (x - 1) % 2;
            let by = y - (y - 1) % 2;
            lit.contains(&(bx, by)) && lit.contains(&(bx + 1, by + 1))
        }));
    }

    #[test]
    fn test_draw_text_clips_and_substitutes() {
        let mut dst = RgbaImage::new(10, 10);
        draw_text(&mut dst, "\u{e9}", 4, 4, 1, Color::rgb(255, 255, 255));
        let mut expected = RgbaImage::new(10, 10);
        draw_text(&mut expected, "?", 4, 4, 1, Color::rgb(255, 255, 255));
        assert_eq!(dst, expected);

        draw_text(&mut dst, "WWW", 100, 100, 3, Color::rgb(1, 1, 1));
        assert_eq!(dst, expected);
    }

    #[test]
    fn test_stroke_rect_leaves_interior() {
        let mut dst = RgbaImage::new(10, 10);
        let bounds = RasterBounds { left: 2, top: 2, right: 8, bottom: 8 };
        stroke_rect(&mut dst, bounds, 2, Color::rgb(255, 0, 0));
        assert_eq!(dst.get_pixel(2, 5).0, [255, 0, 0, 255]);
        assert_eq!(dst.get_pixel(7, 7).0, [255, 0, 0, 255]);
        assert_eq!(dst.get_pixel(4, 4).0, [0, 0, 0, 0]);
        assert_eq!(dst.get_pixel(1, 1).0, [0, 0, 0, 0]);
    }
}
