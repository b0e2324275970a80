//! Packed RGB colours, as used by dataset styling and configuration files.
use std::fmt;

use bevy::color::{Color, Srgba};

/// 24-bit sRGB colour, `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexColor(pub u32);

impl HexColor {
    pub const fn new(rgb: u32) -> Self {
        Self(rgb & 0x00ff_ffff)
    }

    /// Parses `#rrggbb`, `rrggbb` or `#rrggbbaa` (alpha is ignored).
    pub fn parse(raw: &str) -> Option<Self> {
        let digits = raw.trim().trim_start_matches('#');
        let digits = match digits.len() {
            6 => digits,
            8 => &digits[..6],
            _ => return None,
        };
        u32::from_str_radix(digits, 16).ok().map(Self::new)
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xff) as u8,
            ((self.0 >> 8) & 0xff) as u8,
            (self.0 & 0xff) as u8,
        )
    }

    pub fn to_color(self) -> Color {
        let (r, g, b) = self.rgb();
        Color::srgb_u8(r, g, b)
    }

    pub fn from_color(color: Color) -> Self {
        let Srgba {
            red, green, blue, ..
        } = color.to_srgba();
        let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u32;
        Self::new((channel(red) << 16) | (channel(green) << 8) | channel(blue))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_css_style_hex() {
        assert_eq!(HexColor::parse("#ffea00"), Some(HexColor(0xffea00)));
        assert_eq!(HexColor::parse("f7c286ff"), Some(HexColor(0xf7c286)));
        assert_eq!(HexColor::parse("#fff"), None);
        assert_eq!(HexColor::parse("#gggggg"), None);
    }

    #[test]
    fn converts_through_bevy_color() {
        let color = HexColor(0x893f71);
        assert_eq!(HexColor::from_color(color.to_color()), color);
        assert_eq!(color.to_string(), "#893f71");
    }
}
