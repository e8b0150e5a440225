//! `[svg]` section configuration.
//!
//! Rendering defaults and limits for the SVG adapters.
//!
//! # Example
//!
//! ```toml
//! [svg]
//! default_scale = 2.0      # Device scale used when the CLI gets no --scale
//! max_pixels = 67108864    # Larger renders are refused (default: 8192 x 8192)
//! ```

use serde::{Deserialize, Serialize};

/// SVG rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgConfig {
    /// Device scale factor applied when none is given.
    pub default_scale: f32,

    /// Upper bound on `width * height` of a rendered bitmap.
    pub max_pixels: u64,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            default_scale: 1.0,
            max_pixels: 8192 * 8192,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_config_defaults() {
        let config = SvgConfig::default();
        assert_eq!(config.default_scale, 1.0);
        assert_eq!(config.max_pixels, 67_108_864);
    }

    #[test]
    fn test_svg_config_partial_override() {
        let config: SvgConfig = toml::from_str("default_scale = 3.0").unwrap();
        assert_eq!(config.default_scale, 3.0);
        assert_eq!(config.max_pixels, SvgConfig::default().max_pixels);
    }
}
