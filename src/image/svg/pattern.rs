//! Pattern placeholder discovery.
//!
//! A pattern SVG marks the tiles where a symbol can be stamped with plain
//! `<rect>` elements. The markup is scanned with quick-xml to find those
//! rects, tag each with an id and write a copy without them. Their geometry
//! is then read back from the usvg tree of the tagged copy, so every
//! viewport, `preserveAspectRatio`, unit and CSS transform is resolved the
//! same way the renderer resolves it.
//!
//! Rects inside non-rendered containers (`defs`, `clipPath`, `mask`,
//! `pattern`, `symbol`, `marker`) are ignored and kept.

use std::borrow::Cow;

use quick_xml::{
    Reader, Writer,
    events::{BytesStart, Event},
};
use serde::{Deserialize, Serialize};

use super::error::SvgError;
use super::transform::{map_point, rotation_degrees, uniform_scale};

const NON_RENDERED: &[&[u8]] = &[
    b"defs",
    b"clipPath",
    b"mask",
    b"pattern",
    b"symbol",
    b"marker",
];

/// Id given to placeholders that carry none.
const TILE_ID_PREFIX: &str = "tessera-tile-";

/// Symbols only land on tiles whose center lies strictly inside this band
/// of the canvas height.
const SYMBOL_BAND: (f32, f32) = (0.1, 0.9);

/// One tile of a decorative pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternRect {
    /// Center in canvas coordinates.
    pub center: (f32, f32),
    /// Side length in the rect's own user space.
    pub side: f32,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Uniform scale from the rect's user space to the canvas.
    pub scale: f32,
}

/// Canvas size plus the ordered list of tiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternGeometry {
    pub size: (f32, f32),
    pub rects: Vec<PatternRect>,
}

impl PatternGeometry {
    /// Rect at `index`, wrapping around (negative indices count from the end).
    pub fn rect(&self, index: i32) -> Option<&PatternRect> {
        if self.rects.is_empty() {
            return None;
        }
        let len = self.rects.len() as i64;
        self.rects.get((index as i64).rem_euclid(len) as usize)
    }

    /// Rects whose center lies inside the vertical band
    /// `[min_fraction, max_fraction]` of the canvas height, exclusive.
    pub fn rects_in_vertical_band(
        &self,
        min_fraction: f32,
        max_fraction: f32,
    ) -> impl Iterator<Item = &PatternRect> {
        let (min_y, max_y) = (self.size.1 * min_fraction, self.size.1 * max_fraction);
        self.rects
            .iter()
            .filter(move |r| r.center.1 > min_y && r.center.1 < max_y)
    }

    /// Tile receiving a symbol: `index` wraps over the tiles away from the
    /// top and bottom edges. `None` when no tile qualifies.
    pub fn symbol_rect(&self, index: i32) -> Option<&PatternRect> {
        let candidates: Vec<&PatternRect> =
            self.rects_in_vertical_band(SYMBOL_BAND.0, SYMBOL_BAND.1).collect();
        if candidates.is_empty() {
            return None;
        }
        let len = candidates.len() as i64;
        Some(candidates[(index as i64).rem_euclid(len) as usize])
    }
}

/// Result of a markup scan.
pub(super) struct Scan {
    pub geometry: PatternGeometry,
    /// Markup with placeholder rects removed.
    pub stripped: Vec<u8>,
}

/// Placeholder ids plus the two rewritten copies of the markup.
struct Marked {
    tagged: Vec<u8>,
    stripped: Vec<u8>,
    ids: Vec<String>,
}

/// Extract pattern geometry from raw (or gzip-compressed) SVG bytes.
pub fn extract_pattern(data: &[u8]) -> Result<PatternGeometry, SvgError> {
    scan(data).map(|scan| scan.geometry)
}

/// Locate pattern rects and produce a copy of the markup without them.
pub(super) fn scan(data: &[u8]) -> Result<Scan, SvgError> {
    if data.is_empty() {
        return Err(SvgError::Empty);
    }

    let data = decompress(data)?;
    let marked = mark_placeholders(&data)?;
    let tree = super::parse_tree(&marked.tagged)?;

    let rects = marked
        .ids
        .iter()
        .filter_map(|id| placement(&tree, id))
        .collect();

    Ok(Scan {
        geometry: PatternGeometry {
            size: (tree.size().width(), tree.size().height()),
            rects,
        },
        stripped: marked.stripped,
    })
}

/// Inflate svgz input; plain markup passes through.
fn decompress(data: &[u8]) -> Result<Cow<'_, [u8]>, SvgError> {
    if data.starts_with(&[0x1f, 0x8b]) {
        Ok(Cow::Owned(usvg::decompress_svgz(data)?))
    } else {
        Ok(Cow::Borrowed(data))
    }
}

fn mark_placeholders(data: &[u8]) -> Result<Marked, SvgError> {
    let mut reader = Reader::from_reader(data);
    let mut tagged = Writer::new(Vec::with_capacity(data.len() + 64));
    let mut stripped = Writer::new(Vec::with_capacity(data.len()));
    let mut hidden: Vec<bool> = Vec::new();
    let mut ids = Vec::new();
    let mut seen_root = false;
    // > 0 while inside a placeholder
    let mut skip_depth = 0usize;

    loop {
        let event = reader.read_event()?;
        let mut replacement = None;
        let mut keep = skip_depth == 0;

        match &event {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) => {
                let is_start = matches!(event, Event::Start(_));
                let name = e.local_name();
                if !seen_root {
                    if name.as_ref() != b"svg" {
                        return Err(SvgError::MissingRoot);
                    }
                    seen_root = true;
                }

                let is_hidden = hidden.last().copied().unwrap_or(false)
                    || NON_RENDERED.contains(&name.as_ref());
                if is_start {
                    hidden.push(is_hidden);
                }

                if skip_depth > 0 {
                    skip_depth += usize::from(is_start);
                } else if name.as_ref() == b"rect" && !is_hidden {
                    let (id, tag) = tag_placeholder(e, ids.len())?;
                    ids.push(id);
                    replacement = Some(if is_start {
                        Event::Start(tag)
                    } else {
                        Event::Empty(tag)
                    });
                    keep = false;
                    skip_depth = usize::from(is_start);
                }
            }
            Event::End(_) => {
                hidden.pop();
                if skip_depth > 0 {
                    skip_depth -= 1;
                }
            }
            _ => {}
        }

        if keep {
            stripped.write_event(event.borrow())?;
        }
        tagged.write_event(replacement.unwrap_or(event))?;
    }

    if !seen_root {
        return Err(SvgError::MissingRoot);
    }
    Ok(Marked {
        tagged: tagged.into_inner(),
        stripped: stripped.into_inner(),
        ids,
    })
}

/// The placeholder's id, giving it a generated one when it has none.
fn tag_placeholder(
    e: &BytesStart<'_>,
    index: usize,
) -> Result<(String, BytesStart<'static>), SvgError> {
    if let Some(id) = attr(e, b"id")?
        && !id.is_empty()
    {
        return Ok((id, e.to_owned()));
    }

    let id = format!("{TILE_ID_PREFIX}{index}");
    let mut tag = BytesStart::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attribute in e.attributes() {
        let attribute = attribute?;
        if attribute.key.local_name().as_ref() != b"id" {
            tag.push_attribute(attribute);
        }
    }
    tag.push_attribute(("id", id.as_str()));
    Ok((id, tag))
}

/// Tile geometry of the path usvg built for placeholder `id`.
///
/// Placeholders usvg does not draw (`display="none"`, zero size) have no
/// path and yield `None`.
fn placement(tree: &usvg::Tree, id: &str) -> Option<PatternRect> {
    let Some(usvg::Node::Path(path)) = tree.node_by_id(id) else {
        return None;
    };
    let bounds = path.data().bounds();
    let (w, h) = (bounds.width(), bounds.height());
    if !(w > 0.0 && h > 0.0) {
        return None;
    }

    let transform = path.abs_transform();
    Some(PatternRect {
        center: map_point(&transform, bounds.x() + w / 2.0, bounds.y() + h / 2.0),
        side: w.min(h),
        rotation: rotation_degrees(&transform),
        scale: uniform_scale(&transform),
    })
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, SvgError> {
    for attribute in e.attributes() {
        let attribute = attribute?;
        if attribute.key.local_name().as_ref() == key {
            return Ok(Some(String::from_utf8_lossy(&attribute.value).into_owned()));
        }
    }
    Ok(None)
}
