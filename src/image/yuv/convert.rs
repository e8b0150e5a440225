//! Planar I420 to semi-planar NV12.
//!
//! The luma plane is copied row by row; the two quarter-size chroma planes
//! are interleaved into one `UVUV...` plane. Negative heights flip the
//! source vertically.

use rayon::prelude::*;

use super::error::YuvError;
use crate::config::cfg;

/// Borrowed I420 source: three planes with their strides.
#[derive(Debug, Clone, Copy)]
pub struct I420Planes<'a> {
    pub y: &'a [u8],
    pub stride_y: usize,
    pub u: &'a [u8],
    pub stride_u: usize,
    pub v: &'a [u8],
    pub stride_v: usize,
}

/// Borrowed NV12 destination: luma plane and interleaved chroma plane.
#[derive(Debug)]
pub struct Nv12PlanesMut<'a> {
    pub y: &'a mut [u8],
    pub stride_y: usize,
    pub uv: &'a mut [u8],
    pub stride_uv: usize,
}

/// Geometry shared by all planes of one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Geometry {
    width: usize,
    height: usize,
    chroma_width: usize,
    chroma_height: usize,
    flip: bool,
}

impl Geometry {
    fn new(width: i32, height: i32) -> Result<Self, YuvError> {
        if width <= 0 || height == 0 {
            return Err(YuvError::InvalidDimensions { width, height });
        }
        let width = width as usize;
        let abs_height = height.unsigned_abs() as usize;
        Ok(Self {
            width,
            height: abs_height,
            chroma_width: width.div_ceil(2),
            chroma_height: abs_height.div_ceil(2),
            flip: height < 0,
        })
    }
}

/// Convert I420 planes into NV12 planes.
///
/// Every plane is checked against its stride and the frame size before any
/// byte is written, so a failed call leaves `dst` untouched.
pub fn try_i420_to_nv12(
    src: &I420Planes<'_>,
    dst: &mut Nv12PlanesMut<'_>,
    width: i32,
    height: i32,
) -> Result<(), YuvError> {
    let geo = Geometry::new(width, height)?;

    check_plane("src_y", src.y.len(), src.stride_y, geo.width, geo.height)?;
    check_plane("src_u", src.u.len(), src.stride_u, geo.chroma_width, geo.chroma_height)?;
    check_plane("src_v", src.v.len(), src.stride_v, geo.chroma_width, geo.chroma_height)?;
    check_plane("dst_y", dst.y.len(), dst.stride_y, geo.width, geo.height)?;
    check_plane(
        "dst_uv",
        dst.uv.len(),
        dst.stride_uv,
        geo.chroma_width * 2,
        geo.chroma_height,
    )?;

    let parallel = geo.width * geo.height >= cfg().yuv.parallel_threshold;

    copy_plane(
        src.y,
        src.stride_y,
        dst.y,
        dst.stride_y,
        geo.width,
        geo.height,
        geo.flip,
        parallel,
    );
    merge_uv(src, dst.uv, dst.stride_uv, &geo, parallel);

    Ok(())
}

/// A plane of `rows` rows needs `(rows - 1) * stride + row` bytes; the last
/// row may stop short of the stride.
fn check_plane(
    plane: &'static str,
    len: usize,
    stride: usize,
    row: usize,
    rows: usize,
) -> Result<(), YuvError> {
    if stride < row {
        return Err(YuvError::StrideTooSmall { plane, stride, row });
    }
    let needed = (rows - 1)
        .checked_mul(stride)
        .and_then(|n| n.checked_add(row))
        .ok_or(YuvError::PlaneOverflow { plane, stride, rows })?;
    if len < needed {
        return Err(YuvError::BufferTooSmall { plane, len, needed });
    }
    Ok(())
}

#[inline]
fn source_row(index: usize, rows: usize, flip: bool) -> usize {
    if flip { rows - 1 - index } else { index }
}

#[allow(clippy::too_many_arguments)]
fn copy_plane(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
    flip: bool,
    parallel: bool,
) {
    let copy_row = |(i, row): (usize, &mut [u8])| {
        let start = source_row(i, height, flip) * src_stride;
        row[..width].copy_from_slice(&src[start..start + width]);
    };

    if parallel {
        dst.par_chunks_mut(dst_stride)
            .take(height)
            .enumerate()
            .for_each(copy_row);
    } else {
        dst.chunks_mut(dst_stride)
            .take(height)
            .enumerate()
            .for_each(copy_row);
    }
}

fn merge_uv(
    src: &I420Planes<'_>,
    dst: &mut [u8],
    dst_stride: usize,
    geo: &Geometry,
    parallel: bool,
) {
    let half_width = geo.chroma_width;
    let rows = geo.chroma_height;

    let merge_row = |(i, row): (usize, &mut [u8])| {
        let src_row = source_row(i, rows, geo.flip);
        let u_start = src_row * src.stride_u;
        let v_start = src_row * src.stride_v;
        let u_row = &src.u[u_start..u_start + half_width];
        let v_row = &src.v[v_start..v_start + half_width];

        for ((pair, &u), &v) in row[..half_width * 2]
            .chunks_exact_mut(2)
            .zip(u_row)
            .zip(v_row)
        {
            pair[0] = u;
            pair[1] = v;
        }
    };

    if parallel {
        dst.par_chunks_mut(dst_stride)
            .take(rows)
            .enumerate()
            .for_each(merge_row);
    } else {
        dst.chunks_mut(dst_stride)
            .take(rows)
            .enumerate()
            .for_each(merge_row);
    }
}
