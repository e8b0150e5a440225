//! SVG preparation, pattern extraction and rendering.
//!
//! Parse once, render many: [`prepare_svg_image`] normalizes an SVG with
//! usvg (and optionally pulls out its pattern tiles) into an opaque buffer
//! that the render calls rasterize at any size and scale.
//!
//! # Modules
//!
//! - [`pattern`]: placeholder `<rect>` discovery and stripping (quick-xml,
//!   geometry from the usvg tree)
//! - [`prepared`]: framed, checksummed prepared-document codec
//! - [`render`]: resvg rasterization, fit transform, symbol stamping, tint
//! - [`transform`]: rotation, scale and point mapping of usvg transforms
//! - [`color`]: straight-alpha colors
//!
//! # Architecture
//!
//! ```text
//! SVG bytes ──► pattern::scan ──► usvg normalize ──► PreparedDocument::encode
//!                                                          │
//!          RenderOptions ──► render_prepared_image ◄───────┘
//!                                   │
//!                        (symbol) composite_symbol
//! ```
//!
//! Every adapter returns `None` on failure and logs the cause with
//! `debug!`; the `try_*` variants return the [`SvgError`].

mod color;
mod error;
mod pattern;
mod prepared;
mod render;
mod transform;

pub use color::Color;
pub use error::SvgError;
pub use pattern::{PatternGeometry, PatternRect, extract_pattern};
pub use prepared::{PreparedDocument, PreparedError};
pub use render::RenderOptions;

use image::RgbaImage;

use crate::debug;

/// Collapse an error into an absent result, logging the cause.
fn absent<T>(operation: &str, result: Result<T, SvgError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            debug!("svg"; "{} failed: {}", operation, err);
            None
        }
    }
}

fn parse_tree(data: &[u8]) -> Result<usvg::Tree, SvgError> {
    Ok(usvg::Tree::from_data(data, &usvg::Options::default())?)
}

// ============================================================================
// Preparation
// ============================================================================

/// Normalize SVG bytes into a prepared document.
///
/// With `pattern`, placeholder rects are recorded and removed from the
/// drawing. Gzip-compressed input (svgz) is accepted.
pub fn try_prepare_svg_image(data: &[u8], pattern: bool) -> Result<Vec<u8>, SvgError> {
    if data.is_empty() {
        return Err(SvgError::Empty);
    }

    let (tree, rects) = if pattern {
        let scan = pattern::scan(data)?;
        (parse_tree(&scan.stripped)?, scan.geometry.rects)
    } else {
        (parse_tree(data)?, Vec::new())
    };

    let size = tree.size();
    let svg = tree.to_string(&usvg::WriteOptions {
        indent: usvg::Indent::None,
        ..Default::default()
    });

    Ok(PreparedDocument {
        size: (size.width(), size.height()),
        pattern,
        rects,
        svg,
    }
    .encode())
}

pub fn prepare_svg_image(data: &[u8], pattern: bool) -> Option<Vec<u8>> {
    absent("prepare", try_prepare_svg_image(data, pattern))
}

/// Pattern tiles and canvas size of raw SVG bytes.
pub fn gift_pattern_data(data: &[u8]) -> Option<PatternGeometry> {
    absent("pattern", extract_pattern(data))
}

// ============================================================================
// Rendering
// ============================================================================

/// Rasterize a prepared document.
pub fn try_render_prepared_image(
    prepared: &[u8],
    options: &RenderOptions,
) -> Result<RgbaImage, SvgError> {
    try_render_prepared_image_with_symbol(prepared, options, None, 0)
}

pub fn render_prepared_image(prepared: &[u8], options: &RenderOptions) -> Option<RgbaImage> {
    absent("render", try_render_prepared_image(prepared, options))
}

/// Rasterize a prepared document and stamp `symbol` on a pattern tile.
///
/// Only tiles whose center lies strictly between 10% and 90% of the canvas
/// height take a symbol; `rect_index` wraps over those. Without a symbol or
/// such a tile this is a plain render.
pub fn try_render_prepared_image_with_symbol(
    prepared: &[u8],
    options: &RenderOptions,
    symbol: Option<&RgbaImage>,
    rect_index: i32,
) -> Result<RgbaImage, SvgError> {
    let document = PreparedDocument::decode(prepared)?;
    let target = options.pixel_size()?;
    let tree = parse_tree(document.svg.as_bytes())?;

    let transform = render::content_transform(document.size, target, options.fit);
    let mut pixmap = render::rasterize(&tree, target, options.background, transform)?;

    let geometry = document.geometry();
    if let Some(symbol) = symbol
        && let Some(rect) = geometry.symbol_rect(rect_index)
    {
        render::composite_symbol(&mut pixmap, symbol, rect, transform)?;
    }

    render::into_rgba_image(&pixmap)
}

pub fn render_prepared_image_with_symbol(
    prepared: &[u8],
    options: &RenderOptions,
    symbol: Option<&RgbaImage>,
    rect_index: i32,
) -> Option<RgbaImage> {
    absent(
        "render with symbol",
        try_render_prepared_image_with_symbol(prepared, options, symbol, rect_index),
    )
}

/// One-shot render of raw SVG bytes.
///
/// A zero `size` renders at the SVG's intrinsic size. `foreground` tints
/// every painted pixel; `opaque` flattens onto the background (white when
/// absent). Content is always aspect-fit.
pub fn try_draw_svg_image(
    data: &[u8],
    size: (f32, f32),
    background: Option<Color>,
    foreground: Option<Color>,
    scale: f32,
    opaque: bool,
) -> Result<RgbaImage, SvgError> {
    if data.is_empty() {
        return Err(SvgError::Empty);
    }

    let tree = parse_tree(data)?;
    let intrinsic = (tree.size().width(), tree.size().height());
    let size = if size.0 <= 0.0 && size.1 <= 0.0 {
        intrinsic
    } else {
        size
    };
    let target = render::pixel_size(size, scale)?;
    let transform = render::content_transform(intrinsic, target, true);

    let background = match (background, opaque) {
        (Some(color), true) => Some(color.over(Color::WHITE)),
        (None, true) => Some(Color::WHITE),
        (color, false) => color,
    };

    let mut layer = render::rasterize(&tree, target, Color::TRANSPARENT, transform)?;
    if let Some(foreground) = foreground {
        render::tint(&mut layer, foreground);
    }
    let pixmap = match background {
        Some(color) => render::over_background(&layer, color)?,
        None => layer,
    };

    render::into_rgba_image(&pixmap)
}

pub fn draw_svg_image(
    data: &[u8],
    size: (f32, f32),
    background: Option<Color>,
    foreground: Option<Color>,
    scale: f32,
    opaque: bool,
) -> Option<RgbaImage> {
    absent(
        "draw",
        try_draw_svg_image(data, size, background, foreground, scale, opaque),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// 100x100 canvas: a blue dot in the corner and one tile in the middle.
    const TILE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
  <circle cx="10" cy="10" r="5" fill="#0000ff"/>
  <rect x="40" y="40" width="20" height="20" fill="#000000"/>
</svg>"##;

    /// 100x50 canvas filled with red.
    const WIDE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="50">
  <rect width="100" height="50" fill="#ff0000"/>
</svg>"##;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn solid(width: u32, height: u32, pixel: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(width, height, pixel)
    }

    /// Symbols are resampled, so allow a little filtering error.
    fn assert_near(actual: &Rgba<u8>, expected: Rgba<u8>) {
        let close = actual
            .0
            .iter()
            .zip(expected.0)
            .all(|(&a, e)| a.abs_diff(e) <= 3);
        assert!(close, "expected ~{:?}, got {:?}", expected.0, actual.0);
    }

    #[test]
    fn test_render_size_follows_scale() {
        let prepared = prepare_svg_image(TILE_SVG.as_bytes(), false).unwrap();
        let options = RenderOptions::new(40.0, 30.0).with_scale(2.0);
        let image = render_prepared_image(&prepared, &options).unwrap();
        assert_eq!(image.dimensions(), (80, 60));
    }

    #[test]
    fn test_render_is_deterministic() {
        let prepared = prepare_svg_image(TILE_SVG.as_bytes(), true).unwrap();
        let options = RenderOptions::new(64.0, 64.0)
            .with_background(Color::WHITE)
            .with_scale(1.5);
        let first = render_prepared_image(&prepared, &options).unwrap();
        let second = render_prepared_image(&prepared, &options).unwrap();
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn test_prepare_rejects_bad_input() {
        assert!(prepare_svg_image(b"", false).is_none());
        assert!(prepare_svg_image(b"not an svg", false).is_none());
        assert!(prepare_svg_image(b"<svg", true).is_none());
    }

    #[test]
    fn test_render_rejects_foreign_buffers() {
        let options = RenderOptions::new(10.0, 10.0);
        assert!(render_prepared_image(b"", &options).is_none());
        assert!(render_prepared_image(TILE_SVG.as_bytes(), &options).is_none());
        assert!(render_prepared_image_with_symbol(b"junk", &options, None, 0).is_none());

        let mut prepared = prepare_svg_image(TILE_SVG.as_bytes(), false).unwrap();
        prepared[10] ^= 0x55;
        assert!(render_prepared_image(&prepared, &options).is_none());
    }

    #[test]
    fn test_pattern_prepare_hides_placeholders() {
        let options = RenderOptions::new(100.0, 100.0).with_background(Color::WHITE);

        let plain = prepare_svg_image(TILE_SVG.as_bytes(), false).unwrap();
        let image = render_prepared_image(&plain, &options).unwrap();
        assert_eq!(*image.get_pixel(50, 50), BLACK);

        let pattern = prepare_svg_image(TILE_SVG.as_bytes(), true).unwrap();
        let image = render_prepared_image(&pattern, &options).unwrap();
        assert_eq!(*image.get_pixel(50, 50), WHITE);
        assert_eq!(*image.get_pixel(10, 10), Rgba([0, 0, 255, 255]));

        let document = PreparedDocument::decode(&pattern).unwrap();
        assert!(document.pattern);
        assert_eq!(document.rects.len(), 1);
        assert_eq!(document.rects[0].center, (50.0, 50.0));
    }

    #[test]
    fn test_symbol_is_centered_on_tile() {
        let prepared = prepare_svg_image(TILE_SVG.as_bytes(), true).unwrap();
        let options = RenderOptions::new(100.0, 100.0).with_background(Color::WHITE);
        let symbol = solid(8, 8, RED);

        let image =
            render_prepared_image_with_symbol(&prepared, &options, Some(&symbol), 0).unwrap();

        // the 20x20 tile spans 40..60
        assert_near(image.get_pixel(50, 50), RED);
        assert_near(image.get_pixel(42, 42), RED);
        assert_near(image.get_pixel(57, 57), RED);
        assert_eq!(*image.get_pixel(35, 50), WHITE);
        assert_eq!(*image.get_pixel(65, 50), WHITE);
    }

    #[test]
    fn test_symbol_follows_scale_factor() {
        let prepared = prepare_svg_image(TILE_SVG.as_bytes(), true).unwrap();
        let options = RenderOptions::new(100.0, 100.0)
            .with_background(Color::WHITE)
            .with_scale(2.0);
        let symbol = solid(4, 4, RED);

        let image =
            render_prepared_image_with_symbol(&prepared, &options, Some(&symbol), 7).unwrap();

        assert_eq!(image.dimensions(), (200, 200));
        assert_near(image.get_pixel(100, 100), RED);
        assert_eq!(*image.get_pixel(70, 100), WHITE);
    }

    #[test]
    fn test_symbol_follows_tile_rotation_and_scale() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
  <g transform="translate(50 50)">
    <rect x="-5" y="-5" width="10" height="10" transform="rotate(45) scale(2)"/>
  </g>
</svg>"#;
        let prepared = prepare_svg_image(svg.as_bytes(), true).unwrap();
        let options = RenderOptions::new(100.0, 100.0).with_background(Color::WHITE);
        let symbol = solid(10, 10, RED);

        let image =
            render_prepared_image_with_symbol(&prepared, &options, Some(&symbol), 0).unwrap();

        // 20x20 after scale(2), turned into a diamond reaching ~14px from the center
        assert_near(image.get_pixel(50, 50), RED);
        assert_near(image.get_pixel(50, 38), RED);
        assert_near(image.get_pixel(61, 50), RED);
        assert_near(image.get_pixel(38, 50), RED);
        // corners of the unrotated square stay empty
        assert_eq!(*image.get_pixel(58, 42), WHITE);
        assert_eq!(*image.get_pixel(41, 58), WHITE);
        assert_eq!(*image.get_pixel(50, 33), WHITE);
    }

    #[test]
    fn test_symbol_skips_edge_tiles() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100">
  <rect x="0" y="0" width="8" height="8"/>
  <rect x="40" y="40" width="20" height="20"/>
  <rect x="92" y="92" width="8" height="8"/>
</svg>"#;
        let prepared = prepare_svg_image(svg.as_bytes(), true).unwrap();
        assert_eq!(PreparedDocument::decode(&prepared).unwrap().rects.len(), 3);

        let options = RenderOptions::new(100.0, 100.0).with_background(Color::WHITE);
        let symbol = solid(8, 8, RED);
        for index in [0, 1, 2, -1] {
            let image =
                render_prepared_image_with_symbol(&prepared, &options, Some(&symbol), index)
                    .unwrap();
            assert_near(image.get_pixel(50, 50), RED);
            assert_eq!(*image.get_pixel(4, 4), WHITE);
            assert_eq!(*image.get_pixel(96, 96), WHITE);
        }
    }

    #[test]
    fn test_prepare_accepts_svgz() {
        // gzip member around one stored deflate block
        let plain = TILE_SVG.as_bytes();
        let len = plain.len() as u16;
        let mut svgz = vec![0x1f, 0x8b, 8, 0, 0, 0, 0, 0, 0, 0xff, 0x01];
        svgz.extend_from_slice(&len.to_le_bytes());
        svgz.extend_from_slice(&(!len).to_le_bytes());
        svgz.extend_from_slice(plain);
        let mut crc = !0u32;
        for &byte in plain {
            crc ^= u32::from(byte);
            for _ in 0..8 {
                crc = (crc >> 1) ^ (0xEDB8_8320 & (crc & 1).wrapping_neg());
            }
        }
        svgz.extend_from_slice(&(!crc).to_le_bytes());
        svgz.extend_from_slice(&(plain.len() as u32).to_le_bytes());

        for pattern in [false, true] {
            let from_svgz = prepare_svg_image(&svgz, pattern).unwrap();
            let from_plain = prepare_svg_image(plain, pattern).unwrap();
            assert_eq!(from_svgz, from_plain);
        }
    }

    #[test]
    fn test_symbol_without_tiles_renders_plain() {
        let prepared = prepare_svg_image(TILE_SVG.as_bytes(), false).unwrap();
        let options = RenderOptions::new(100.0, 100.0).with_background(Color::WHITE);
        let symbol = solid(8, 8, RED);

        let stamped =
            render_prepared_image_with_symbol(&prepared, &options, Some(&symbol), 0).unwrap();
        let plain = render_prepared_image(&prepared, &options).unwrap();
        assert_eq!(stamped, plain);
    }

    #[test]
    fn test_fit_letterboxes_and_stretch_fills() {
        let prepared = prepare_svg_image(WIDE_SVG.as_bytes(), false).unwrap();
        let base = RenderOptions::new(100.0, 100.0).with_background(Color::WHITE);

        let fit = render_prepared_image(&prepared, &base.with_fit(true)).unwrap();
        assert_eq!(*fit.get_pixel(50, 5), WHITE);
        assert_eq!(*fit.get_pixel(50, 50), RED);
        assert_eq!(*fit.get_pixel(50, 95), WHITE);

        let stretch = render_prepared_image(&prepared, &base.with_fit(false)).unwrap();
        assert_eq!(*stretch.get_pixel(50, 5), RED);
        assert_eq!(*stretch.get_pixel(50, 95), RED);
    }

    #[test]
    fn test_draw_uses_intrinsic_size_when_zero() {
        let image = draw_svg_image(WIDE_SVG.as_bytes(), (0.0, 0.0), None, None, 1.0, false).unwrap();
        assert_eq!(image.dimensions(), (100, 50));
        assert_eq!(*image.get_pixel(10, 10), RED);
    }

    #[test]
    fn test_draw_tints_foreground_over_background() {
        let image = draw_svg_image(
            TILE_SVG.as_bytes(),
            (100.0, 100.0),
            Some(Color::WHITE),
            Some(Color::rgb(0, 255, 0)),
            1.0,
            false,
        )
        .unwrap();
        assert_eq!(*image.get_pixel(50, 50), Rgba([0, 255, 0, 255]));
        assert_eq!(*image.get_pixel(10, 10), Rgba([0, 255, 0, 255]));
        assert_eq!(*image.get_pixel(80, 80), WHITE);
    }

    #[test]
    fn test_draw_opaque_flattens_transparency() {
        let image = draw_svg_image(TILE_SVG.as_bytes(), (50.0, 50.0), None, None, 1.0, true).unwrap();
        assert!(image.pixels().all(|p| p.0[3] == 255));
        assert_eq!(*image.get_pixel(45, 5), WHITE);

        let transparent =
            draw_svg_image(TILE_SVG.as_bytes(), (50.0, 50.0), None, None, 1.0, false).unwrap();
        assert_eq!(transparent.get_pixel(45, 5).0[3], 0);
    }

    #[test]
    fn test_draw_rejects_bad_input() {
        assert!(draw_svg_image(b"", (10.0, 10.0), None, None, 1.0, false).is_none());
        assert!(draw_svg_image(b"<svg>", (10.0, 10.0), None, None, 1.0, false).is_none());
    }

    #[test]
    fn test_gift_pattern_data() {
        let geometry = gift_pattern_data(TILE_SVG.as_bytes()).unwrap();
        assert_eq!(geometry.size, (100.0, 100.0));
        assert_eq!(geometry.rects.len(), 1);
        assert!(gift_pattern_data(b"<nope/>").is_none());
    }
}
