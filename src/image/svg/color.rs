//! Straight-alpha RGBA colors for backgrounds and tints.

use std::fmt;
use std::str::FromStr;

use resvg::tiny_skia;
use serde::{Deserialize, Serialize};

/// 8-bit RGBA color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub const fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Source-over composite of `self` onto `below`.
    pub fn over(self, below: Self) -> Self {
        let sa = self.a as f32 / 255.0;
        let da = below.a as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return Self::TRANSPARENT;
        }
        let blend = |s: u8, d: u8| {
            let c = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
            c.round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: blend(self.r, below.r),
            g: blend(self.g, below.g),
            b: blend(self.b, below.b),
            a: (out_a * 255.0).round() as u8,
        }
    }

    pub(super) fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s).ok_or_else(|| format!("invalid color `{s}`, expected #rrggbb or #rrggbbaa"))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if !self.is_opaque() {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color_valid() {
        assert_eq!(Color::parse_hex("#88c0d0"), Some(Color::rgb(0x88, 0xc0, 0xd0)));
        assert_eq!(Color::parse_hex("ff000080"), Some(Color::rgba(255, 0, 0, 0x80)));
    }

    #[test]
    fn test_parse_hex_color_invalid() {
        assert!(Color::parse_hex("#fff").is_none());
        assert!(Color::parse_hex("zzzzzz").is_none());
        assert!(Color::parse_hex("#ééé").is_none());
        assert!("nope".parse::<Color>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        let color = Color::rgba(1, 2, 3, 4);
        assert_eq!(color.to_string(), "#01020304");
        assert_eq!(Color::WHITE.to_string(), "#ffffff");
    }

    #[test]
    fn test_over_blends_onto_white() {
        let half_black = Color::rgba(0, 0, 0, 128);
        let out = half_black.over(Color::WHITE);
        assert!(out.is_opaque());
        assert_eq!(out.r, 127);

        assert_eq!(Color::TRANSPARENT.over(Color::TRANSPARENT), Color::TRANSPARENT);
        assert_eq!(Color::BLACK.over(Color::WHITE), Color::BLACK);
    }
}
