//! tessera: adapters for contact change enumeration, SVG pattern rendering
//! and I420 to NV12 conversion.
//!
//! ```text
//! tessera/
//! ├── contacts/   # change history + bulk fetch over a ContactStore
//! ├── image/svg/  # prepare, pattern geometry, render, symbol compositing
//! ├── image/yuv/  # planar I420 -> semi-planar NV12
//! ├── config/     # tessera.toml, global handle
//! └── logger.rs   # log! / debug!
//! ```

pub mod config;
pub mod contacts;
pub mod image;
pub mod logger;

pub use contacts::{
    ChangeEnumerationResult, EnumerationResult, enumerate_changes, enumerate_contacts,
};
pub use image::svg::{
    draw_svg_image, gift_pattern_data, prepare_svg_image, render_prepared_image,
    render_prepared_image_with_symbol,
};
pub use image::yuv::i420_to_nv12;
