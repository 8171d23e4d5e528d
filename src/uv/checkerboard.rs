//! Placeholder UV image for untextured models.

use image::RgbaImage;

use super::UvOptions;

/// Fill a square raster with a checkerboard and stroke a border around it.
///
/// The cell at the top-left corner uses `light`. The border is drawn inside
/// the raster, `border_width` pixels thick on every side.
pub fn checkerboard(options: &UvOptions) -> RgbaImage {
    let size = options.size;
    let cell = options.cell_size.max(1);
    let border = options.border_width.min(size / 2 + size % 2);
    let light = options.light_color.to_rgba();
    let dark = options.dark_color.to_rgba();
    let stroke = options.border_color.to_rgba();

    RgbaImage::from_fn(size, size, |x, y| {
        let on_border =
            x < border || y < border || x >= size - border || y >= size - border;
        if on_border {
            stroke
        } else if ((x / cell) + (y / cell)) % 2 == 0 {
            light
        } else {
            dark
        }
    })
}
