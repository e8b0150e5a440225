//! `[yuv]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [yuv]
//! parallel_threshold = 65536   # Frames with fewer pixels convert on one thread
//! ```

use serde::{Deserialize, Serialize};

/// Pixel-format conversion settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct YuvConfig {
    /// Pixel count from which rows are converted with rayon.
    pub parallel_threshold: usize,
}

impl Default for YuvConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 64 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuv_config_from_toml() {
        let config: YuvConfig = toml::from_str("parallel_threshold = 1").unwrap();
        assert_eq!(config.parallel_threshold, 1);

        let config: YuvConfig = toml::from_str("").unwrap();
        assert_eq!(config, YuvConfig::default());
    }
}
