//! Owned, tightly packed frames.
//!
//! Plane layout is contiguous with strides equal to the row widths:
//! I420 is `Y | U | V`, NV12 is `Y | UV`.

use super::convert::{I420Planes, Nv12PlanesMut, try_i420_to_nv12};
use super::error::YuvError;

/// Packed I420 frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I420Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Packed NV12 frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nv12Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

#[inline]
fn chroma_dims(width: u32, height: u32) -> (usize, usize) {
    (width.div_ceil(2) as usize, height.div_ceil(2) as usize)
}

/// Byte length of a packed 4:2:0 frame (same for I420 and NV12).
pub fn frame_len(width: u32, height: u32) -> usize {
    let (cw, ch) = chroma_dims(width, height);
    width as usize * height as usize + 2 * cw * ch
}

fn check_dims(width: u32, height: u32) -> Result<(), YuvError> {
    match (i32::try_from(width), i32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok(()),
        _ => Err(YuvError::InvalidDimensions {
            width: width.min(i32::MAX as u32) as i32,
            height: height.min(i32::MAX as u32) as i32,
        }),
    }
}

impl I420Frame {
    /// Allocate a black-luma, zero-chroma frame.
    pub fn new(width: u32, height: u32) -> Result<Self, YuvError> {
        check_dims(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; frame_len(width, height)],
        })
    }

    /// Wrap packed bytes; the length must match the dimensions exactly.
    pub fn from_bytes(width: u32, height: u32, data: Vec<u8>) -> Result<Self, YuvError> {
        check_dims(width, height)?;
        let needed = frame_len(width, height);
        if data.len() != needed {
            return Err(YuvError::BufferTooSmall {
                plane: "i420",
                len: data.len(),
                needed,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the `(y, u, v)` planes.
    pub fn planes_mut(&mut self) -> (&mut [u8], &mut [u8], &mut [u8]) {
        let luma = self.width as usize * self.height as usize;
        let (cw, ch) = chroma_dims(self.width, self.height);
        let (y, chroma) = self.data.split_at_mut(luma);
        let (u, v) = chroma.split_at_mut(cw * ch);
        (y, u, v)
    }

    pub fn planes(&self) -> I420Planes<'_> {
        let luma = self.width as usize * self.height as usize;
        let (cw, ch) = chroma_dims(self.width, self.height);
        let (y, chroma) = self.data.split_at(luma);
        let (u, v) = chroma.split_at(cw * ch);
        I420Planes {
            y,
            stride_y: self.width as usize,
            u,
            stride_u: cw,
            v,
            stride_v: cw,
        }
    }

    /// Convert into a freshly allocated NV12 frame.
    pub fn to_nv12(&self) -> Result<Nv12Frame, YuvError> {
        let mut out = Nv12Frame {
            width: self.width,
            height: self.height,
            data: vec![0; self.data.len()],
        };
        let src = self.planes();
        let mut dst = out.planes_mut();
        try_i420_to_nv12(&src, &mut dst, self.width as i32, self.height as i32)?;
        Ok(out)
    }
}

impl Nv12Frame {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn planes_mut(&mut self) -> Nv12PlanesMut<'_> {
        let luma = self.width as usize * self.height as usize;
        let (cw, _) = chroma_dims(self.width, self.height);
        let (y, uv) = self.data.split_at_mut(luma);
        Nv12PlanesMut {
            y,
            stride_y: self.width as usize,
            uv,
            stride_uv: cw * 2,
        }
    }
}
