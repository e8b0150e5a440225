use thiserror::Error;

/// Reasons an I420 to NV12 conversion is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YuvError {
    #[error("invalid frame dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("{plane} stride {stride} is smaller than row width {row}")]
    StrideTooSmall {
        plane: &'static str,
        stride: usize,
        row: usize,
    },

    #[error("{plane} plane holds {len} bytes, needs at least {needed}")]
    BufferTooSmall {
        plane: &'static str,
        len: usize,
        needed: usize,
    },

    #[error("{plane} plane of {rows} rows at stride {stride} overflows the address space")]
    PlaneOverflow {
        plane: &'static str,
        stride: usize,
        rows: usize,
    },
}
