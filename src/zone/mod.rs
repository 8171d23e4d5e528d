//! Placement zones in normalized UV space.
//!
//! A [`Zone`] is an author-defined rectangle of the UV map where a logo may be
//! placed. Coordinates are normalized to `[0, 1] x [0, 1]`, with the origin at
//! the top-left corner of the UV image and `y` growing downwards, matching the
//! raster layout of the texture.
//!
//! Zone tables are grouped per car model in a [`ZoneRegistry`].
//!
//! # Example
//!
//! ```
//! use livery::zone::ZoneRegistry;
//!
//! let registry = ZoneRegistry::builtin();
//! let front = registry.zone("generic-sedan", "zone-front").unwrap();
//!
//! let rect = front.pixel_rect(400);
//! assert_eq!((rect.x, rect.y, rect.width, rect.height), (100.0, 40.0, 200.0, 120.0));
//! ```

mod registry;

pub use registry::{ModelZones, ZoneRegistry, DEFAULT_MODEL_ID};

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{LiveryError, Result};

/// Tolerance for comparing UV edges built from decimal literals.
pub const EDGE_EPSILON: f64 = 1e-9;

/// A rectangular placement region of the UV map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Zone {
    /// Identifier, unique within a model.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Left edge (normalized).
    pub x: f64,
    /// Top edge (normalized).
    pub y: f64,
    /// Width (normalized).
    pub width: f64,
    /// Height (normalized).
    pub height: f64,
    /// Outline colour used by the editor preview.
    pub color: Color,
}

impl Zone {
    /// Create a zone.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            x,
            y,
            width,
            height,
            color,
        }
    }

    /// Top-left corner in UV space.
    #[inline]
    pub fn origin(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    /// Extent in UV space.
    #[inline]
    pub fn extent(&self) -> Vector2<f64> {
        Vector2::new(self.width, self.height)
    }

    /// Centre of the zone in UV space.
    pub fn center(&self) -> Point2<f64> {
        self.origin() + self.extent() * 0.5
    }

    /// Pixel rectangle of the zone on a square canvas of `size` pixels.
    ///
    /// The result is exactly `(x * size, y * size, width * size, height * size)`.
    pub fn pixel_rect(&self, size: u32) -> PixelRect {
        let s = f64::from(size);
        let origin = self.origin() * s;
        let extent = self.extent() * s;
        PixelRect {
            x: origin.x,
            y: origin.y,
            width: extent.x,
            height: extent.y,
        }
    }

    /// Whether a UV point lies inside the zone.
    ///
    /// The left and top edges are inclusive, the right and bottom edges exclusive.
    /// Edges are compared with [`EDGE_EPSILON`] slack, so a point written as the
    /// same decimal as an edge (`0.85` for `0.45 + 0.4`) lands on that edge.
    pub fn contains_uv(&self, uv: Point2<f64>) -> bool {
        let min = self.origin().map(|c| c - EDGE_EPSILON);
        let max = (self.origin() + self.extent()).map(|c| c - EDGE_EPSILON);
        uv.x >= min.x && uv.y >= min.y && uv.x < max.x && uv.y < max.y
    }

    /// Check that the zone lies within the unit square and has positive area.
    pub fn validate(&self) -> Result<()> {
        if self.id.is_empty() {
            return Err(LiveryError::invalid_zone(&self.id, "id must not be empty"));
        }

        let coords = [self.x, self.y, self.width, self.height];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(LiveryError::invalid_zone(&self.id, "coordinates must be finite"));
        }
        if self.x < 0.0 || self.y < 0.0 {
            return Err(LiveryError::invalid_zone(&self.id, "origin must be within [0, 1]"));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(LiveryError::invalid_zone(&self.id, "width and height must be positive"));
        }
        let limit = 1.0 + EDGE_EPSILON;
        if self.x + self.width > limit || self.y + self.height > limit {
            return Err(LiveryError::invalid_zone(&self.id, "rectangle exceeds the unit square"));
        }
        Ok(())
    }
}

/// A zone rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    /// Left edge in pixels.
    pub x: f64,
    /// Top edge in pixels.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

/// Integer raster bounds: `[left, right) x [top, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterBounds {
    /// First column.
    pub left: u32,
    /// First row.
    pub top: u32,
    /// One past the last column.
    pub right: u32,
    /// One past the last row.
    pub bottom: u32,
}

impl RasterBounds {
    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Whether the bounds cover no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

impl PixelRect {
    /// Integer bounds obtained by rounding each edge, clamped to a
    /// `canvas x canvas` raster.
    ///
    /// Rounding edges (rather than origin and size separately) keeps
    /// adjacent zones from overlapping or leaving gaps.
    pub fn bounds(&self, canvas: u32) -> RasterBounds {
        let clamp = |v: f64| v.round().clamp(0.0, f64::from(canvas)) as u32;
        let left = clamp(self.x);
        let top = clamp(self.y);
        RasterBounds {
            left,
            top,
            right: clamp(self.x + self.width).max(left),
            bottom: clamp(self.y + self.height).max(top),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side() -> Zone {
        Zone::new("zone-side", "Side", 0.05, 0.45, 0.35, 0.4, Color::rgb(0x4e, 0xcd, 0xc4))
    }

    #[test]
    fn test_pixel_rect_is_scaled_coordinates() {
        let zone = side();
        for size in [1u32, 400, 512, 1000, 1024, 4096] {
            let s = f64::from(size);
            let rect = zone.pixel_rect(size);
            assert_eq!(rect.x, zone.x * s);
            assert_eq!(rect.y, zone.y * s);
            assert_eq!(rect.width, zone.width * s);
            assert_eq!(rect.height, zone.height * s);
        }
    }

    #[test]
    fn test_bounds_rounding_and_clamping() {
        let zone = side();
        let b = zone.pixel_rect(400).bounds(400);
        assert_eq!(b, RasterBounds { left: 20, top: 180, right: 160, bottom: 340 });
        assert_eq!(b.width(), 140);
        assert_eq!(b.height(), 160);

        let rect = PixelRect { x: -5.0, y: 390.2, width: 20.0, height: 50.0 };
        let b = rect.bounds(400);
        assert_eq!(b, RasterBounds { left: 0, top: 390, right: 15, bottom: 400 });
    }

    #[test]
    fn test_adjacent_zones_share_edge() {
        let a = Zone::new("a", "A", 0.0, 0.0, 1.0 / 3.0, 1.0, Color::rgb(0, 0, 0));
        let b = Zone::new("b", "B", 1.0 / 3.0, 0.0, 1.0 / 3.0, 1.0, Color::rgb(0, 0, 0));
        let ba = a.pixel_rect(100).bounds(100);
        let bb = b.pixel_rect(100).bounds(100);
        assert_eq!(ba.right, bb.left);
    }

    #[test]
    fn test_contains_uv() {
        let zone = side();
        assert!(zone.contains_uv(Point2::new(0.05, 0.45)));
        assert!(zone.contains_uv(zone.center()));
        assert!(!zone.contains_uv(Point2::new(0.40, 0.5)));
        assert!(!zone.contains_uv(Point2::new(0.1, 0.85)));
        assert!(!zone.contains_uv(Point2::new(0.01, 0.5)));
        assert!(zone.contains_uv(Point2::new(0.1, 0.8499)));
    }

    #[test]
    fn test_contains_uv_builtin_edges() {
        // Every built-in edge is written as a decimal sum of origin and extent.
        let registry = ZoneRegistry::builtin();
        for zone in registry.zones(DEFAULT_MODEL_ID).unwrap() {
            let right = (zone.x * 100.0 + zone.width * 100.0).round() / 100.0;
            let bottom = (zone.y * 100.0 + zone.height * 100.0).round() / 100.0;
            let cy = zone.center().y;
            let cx = zone.center().x;
            assert!(zone.contains_uv(Point2::new(zone.x, zone.y)), "{}", zone.id);
            assert!(!zone.contains_uv(Point2::new(right, cy)), "{}", zone.id);
            assert!(!zone.contains_uv(Point2::new(cx, bottom)), "{}", zone.id);
        }
    }

    #[test]
    fn test_validate() {
        assert!(side().validate().is_ok());

        let mut z = side();
        z.width = 0.0;
        assert!(matches!(z.validate(), Err(LiveryError::InvalidZone { .. })));

        let mut z = side();
        z.x = 0.8;
        assert!(z.validate().is_err());

        let mut z = side();
        z.y = f64::NAN;
        assert!(z.validate().is_err());

        let mut z = side();
        z.id.clear();
        assert!(z.validate().is_err());
    }
}
