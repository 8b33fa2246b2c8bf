use palette::{LinSrgb, Srgb};

use crate::error::{Error, Result};

/// Core color type shared by the scheme extractor and the preview renderer.
/// Wraps sRGB u8 components; alpha is dropped on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xAARRGGBB` integer.
    pub fn from_argb(argb: u32) -> Self {
        let [_, r, g, b] = argb.to_be_bytes();
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800`, `FF8800` or `#ff8800cc`.
    ///
    /// Only the first three bytes are read; a trailing alpha byte is accepted
    /// and ignored.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 && digits.len() != 8 {
            return Err(Error::InvalidColor {
                value: hex.to_string(),
                reason: format!("expected 6 or 8 hex digits, got {}", digits.len()),
            });
        }
        let channel = |range: std::ops::Range<usize>| {
            digits
                .get(range)
                .and_then(|s| u8::from_str_radix(s, 16).ok())
                .ok_or_else(|| Error::InvalidColor {
                    value: hex.to_string(),
                    reason: "non-hex digit".to_string(),
                })
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Convert to `palette::Srgb<u8>`.
    pub fn to_srgb_u8(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    /// WCAG 2.0 relative luminance, computed on linearized sRGB.
    pub fn relative_luminance(self) -> f32 {
        let linear: LinSrgb = self.to_srgb_u8().into_format::<f32>().into_linear();
        0.2126 * linear.red + 0.7152 * linear.green + 0.0722 * linear.blue
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
