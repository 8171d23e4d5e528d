//! RGBA colours written as hex strings.

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::error::LiveryError;

/// An 8-bit RGBA colour.
///
/// Colours appear in zone tables and configuration files as `#rrggbb`
/// (opaque) or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Create an opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a colour with an explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully transparent black.
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Convert to an `image` pixel.
    #[inline]
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }
}

impl FromStr for Color {
    type Err = LiveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LiveryError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Color::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl TryFrom<String> for Color {
    type Error = LiveryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl From<Color> for Rgba<u8> {
    fn from(color: Color) -> Self {
        color.to_rgba()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rgb() {
        let c: Color = "#ff6b6b".parse().unwrap();
        assert_eq!(c, Color::rgb(0xff, 0x6b, 0x6b));
        assert_eq!(c.to_string(), "#ff6b6b");
    }

    #[test]
    fn test_parse_rgba() {
        let c: Color = "#1A1A1A80".parse().unwrap();
        assert_eq!(c, Color::rgba(0x1a, 0x1a, 0x1a, 0x80));
        assert_eq!(c.to_string(), "#1a1a1a80");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["ff6b6b", "#ff6b6", "#gg0000", "#ff6b6b0", ""] {
            assert!(
                matches!(bad.parse::<Color>(), Err(LiveryError::InvalidColor(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_color_serde_as_string() {
        #[derive(Deserialize, Serialize)]
        struct Holder {
            color: Color,
        }

        let h: Holder = toml::from_str("color = \"#4ecdc4\"").unwrap();
        assert_eq!(h.color, Color::rgb(0x4e, 0xcd, 0xc4));
        assert_eq!(toml::to_string(&h).unwrap().trim(), "color = \"#4ecdc4\"");
    }
}
