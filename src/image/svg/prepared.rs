//! Prepared document codec.
//!
//! A prepared document is the normalized SVG produced by usvg plus the
//! pattern geometry, framed so that render calls can reject anything that
//! did not come out of [`encode`](PreparedDocument::encode).
//!
//! # Layout (little endian)
//!
//! ```text
//! magic "TSRP" | version u8 | flags u8
//! width f32 | height f32 | rect count u32 | rects (cx, cy, side, rotation, scale)
//! svg length u32 | svg bytes | blake3 of everything above (32 bytes)
//! ```

use thiserror::Error;

use super::pattern::{PatternGeometry, PatternRect};

const MAGIC: &[u8; 4] = b"TSRP";
const VERSION: u8 = 1;
const FLAG_PATTERN: u8 = 0b0000_0001;
const CHECKSUM_LEN: usize = blake3::OUT_LEN;
const HEADER_LEN: usize = 4 + 1 + 1 + 4 + 4 + 4;
const RECT_LEN: usize = 5 * 4;

/// Why a byte buffer is not a valid prepared document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreparedError {
    #[error("buffer too short ({0} bytes)")]
    TooShort(usize),

    #[error("bad magic")]
    BadMagic,

    #[error("unsupported version {0}")]
    UnsupportedVersion(u8),

    #[error("checksum mismatch")]
    ChecksumMismatch,

    #[error("truncated while reading {0}")]
    Truncated(&'static str),

    #[error("svg payload is not valid utf-8")]
    InvalidUtf8,

    #[error("{0} trailing bytes after svg payload")]
    TrailingBytes(usize),
}

/// Decoded prepared document.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedDocument {
    /// Intrinsic size of the normalized SVG.
    pub size: (f32, f32),
    /// Whether placeholder rects were extracted (and removed from `svg`).
    pub pattern: bool,
    pub rects: Vec<PatternRect>,
    /// Normalized SVG markup.
    pub svg: String,
}

impl PreparedDocument {
    pub fn geometry(&self) -> PatternGeometry {
        PatternGeometry {
            size: self.size,
            rects: self.rects.clone(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(
            HEADER_LEN + self.rects.len() * RECT_LEN + 4 + self.svg.len() + CHECKSUM_LEN,
        );
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.push(if self.pattern { FLAG_PATTERN } else { 0 });
        buf.extend_from_slice(&self.size.0.to_le_bytes());
        buf.extend_from_slice(&self.size.1.to_le_bytes());
        buf.extend_from_slice(&(self.rects.len() as u32).to_le_bytes());
        for rect in &self.rects {
            for value in [
                rect.center.0,
                rect.center.1,
                rect.side,
                rect.rotation,
                rect.scale,
            ] {
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }
        buf.extend_from_slice(&(self.svg.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.svg.as_bytes());

        let checksum = blake3::hash(&buf);
        buf.extend_from_slice(checksum.as_bytes());
        buf
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PreparedError> {
        if bytes.len() < HEADER_LEN + 4 + CHECKSUM_LEN {
            return Err(PreparedError::TooShort(bytes.len()));
        }
        if &bytes[..4] != MAGIC {
            return Err(PreparedError::BadMagic);
        }
        if bytes[4] != VERSION {
            return Err(PreparedError::UnsupportedVersion(bytes[4]));
        }

        let (body, checksum) = bytes.split_at(bytes.len() - CHECKSUM_LEN);
        if blake3::hash(body).as_bytes().as_slice() != checksum {
            return Err(PreparedError::ChecksumMismatch);
        }

        let mut cursor = Cursor::new(&body[5..]);
        let flags = cursor.u8("flags")?;
        let size = (cursor.f32("width")?, cursor.f32("height")?);
        let count = cursor.u32("rect count")? as usize;

        let mut rects = Vec::with_capacity(count.min(cursor.remaining() / RECT_LEN));
        for _ in 0..count {
            rects.push(PatternRect {
                center: (cursor.f32("rect")?, cursor.f32("rect")?),
                side: cursor.f32("rect")?,
                rotation: cursor.f32("rect")?,
                scale: cursor.f32("rect")?,
            });
        }

        let svg_len = cursor.u32("svg length")? as usize;
        let svg = cursor.take(svg_len, "svg")?;
        let svg = std::str::from_utf8(svg)
            .map_err(|_| PreparedError::InvalidUtf8)?
            .to_owned();
        if cursor.remaining() > 0 {
            return Err(PreparedError::TrailingBytes(cursor.remaining()));
        }

        Ok(Self {
            size,
            pattern: flags & FLAG_PATTERN != 0,
            rects,
            svg,
        })
    }
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize, what: &'static str) -> Result<&'a [u8], PreparedError> {
        if self.remaining() < n {
            return Err(PreparedError::Truncated(what));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, what: &'static str) -> Result<[u8; N], PreparedError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    fn u8(&mut self, what: &'static str) -> Result<u8, PreparedError> {
        Ok(self.array::<1>(what)?[0])
    }

    fn u32(&mut self, what: &'static str) -> Result<u32, PreparedError> {
        self.array(what).map(u32::from_le_bytes)
    }

    fn f32(&mut self, what: &'static str) -> Result<f32, PreparedError> {
        self.array(what).map(f32::from_le_bytes)
    }
}
