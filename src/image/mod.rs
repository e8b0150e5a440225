//! Image adapters.
//!
//! # Modules
//!
//! - [`svg`]: SVG preparation, pattern extraction and rendering
//! - [`yuv`]: I420 to NV12 conversion

pub mod svg;
pub mod yuv;
