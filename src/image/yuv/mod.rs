//! I420 to NV12 pixel-format conversion.
//!
//! # Modules
//!
//! - [`convert`]: plane copy and chroma interleave over borrowed planes
//! - [`frame`]: owned packed frames built on top of `convert`
//!
//! [`i420_to_nv12`] is the boolean adapter: it either fills the destination
//! or reports `false` without touching it.

mod convert;
mod error;
mod frame;

pub use convert::{I420Planes, Nv12PlanesMut, try_i420_to_nv12};
pub use error::YuvError;
pub use frame::{I420Frame, Nv12Frame, frame_len};

use crate::debug;

/// Convert an I420 frame into NV12.
///
/// Returns `false` on invalid dimensions, strides or undersized planes.
pub fn i420_to_nv12(
    src: &I420Planes<'_>,
    dst: &mut Nv12PlanesMut<'_>,
    width: i32,
    height: i32,
) -> bool {
    match try_i420_to_nv12(src, dst, width, height) {
        Ok(()) => true,
        Err(err) => {
            debug!("yuv"; "i420 -> nv12 {}x{} rejected: {}", width, height, err);
            false
        }
    }
}
