//! Rasterization with resvg.
//!
//! All renders go through the same content transform: the SVG's intrinsic
//! size is mapped onto the pixel target either uniformly and centered
//! (`fit`) or stretched per axis. Symbol compositing reuses that transform so
//! a stamped symbol stays aligned with its pattern tile in both modes.

use image::RgbaImage;
use resvg::tiny_skia::{self, IntSize, Pixmap, PixmapPaint, PremultipliedColorU8, Transform};

use super::color::Color;
use super::error::SvgError;
use super::pattern::PatternRect;
use crate::config::cfg;

/// Parameters shared by the prepared-document render calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    /// Target size in points; the bitmap is `size * scale` pixels.
    pub size: (f32, f32),
    /// Fills the whole bitmap before the SVG is drawn.
    pub background: Color,
    /// Device scale factor. Non-positive or non-finite values mean `1.0`.
    pub scale: f32,
    /// Preserve aspect ratio (centered) instead of stretching.
    pub fit: bool,
}

impl RenderOptions {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: (width, height),
            background: Color::TRANSPARENT,
            scale: 1.0,
            fit: true,
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_fit(mut self, fit: bool) -> Self {
        self.fit = fit;
        self
    }

    /// Bitmap dimensions these options produce.
    pub fn pixel_size(&self) -> Result<(u32, u32), SvgError> {
        pixel_size(self.size, self.scale)
    }
}

#[inline]
fn effective_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 { scale } else { 1.0 }
}

/// `round(size * scale)`, bounded by `[svg] max_pixels`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(super) fn pixel_size(size: (f32, f32), scale: f32) -> Result<(u32, u32), SvgError> {
    let scale = effective_scale(scale);
    let (w, h) = ((size.0 * scale).round(), (size.1 * scale).round());
    if !(w >= 1.0 && h >= 1.0) || w > u32::MAX as f32 || h > u32::MAX as f32 {
        return Err(SvgError::InvalidRenderSize {
            width: size.0,
            height: size.1,
        });
    }

    let (width, height) = (w as u32, h as u32);
    let limit = cfg().svg.max_pixels;
    if u64::from(width) * u64::from(height) > limit {
        return Err(SvgError::TooLarge {
            width,
            height,
            limit,
        });
    }
    Ok((width, height))
}

/// Map content of `content` size onto a `target` bitmap.
pub(super) fn content_transform(content: (f32, f32), target: (u32, u32), fit: bool) -> Transform {
    let (tw, th) = (target.0 as f32, target.1 as f32);
    let sx = tw / content.0;
    let sy = th / content.1;
    if fit {
        let s = sx.min(sy);
        Transform::from_row(s, 0.0, 0.0, s, (tw - content.0 * s) / 2.0, (th - content.1 * s) / 2.0)
    } else {
        Transform::from_scale(sx, sy)
    }
}

/// Render `tree` onto a fresh pixmap filled with `background`.
pub(super) fn rasterize(
    tree: &usvg::Tree,
    target: (u32, u32),
    background: Color,
    transform: Transform,
) -> Result<Pixmap, SvgError> {
    let mut pixmap = Pixmap::new(target.0, target.1).ok_or(SvgError::Pixmap(target.0, target.1))?;
    if background.a > 0 {
        pixmap.fill(background.to_skia());
    }
    resvg::render(tree, transform, &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Draw `symbol` centered on `rect`, its longer side matching the tile.
pub(super) fn composite_symbol(
    pixmap: &mut Pixmap,
    symbol: &RgbaImage,
    rect: &PatternRect,
    content: Transform,
) -> Result<(), SvgError> {
    let symbol = premultiplied_pixmap(symbol)?;
    let (w, h) = (symbol.width() as f32, symbol.height() as f32);
    let k = rect.side * rect.scale / w.max(h);

    let transform = content
        .pre_translate(rect.center.0, rect.center.1)
        .pre_concat(Transform::from_rotate(rect.rotation))
        .pre_scale(k, k)
        .pre_translate(-w / 2.0, -h / 2.0);

    let paint = PixmapPaint {
        quality: tiny_skia::FilterQuality::Bicubic,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, symbol.as_ref(), &paint, transform, None);
    Ok(())
}

/// Replace the color of every painted pixel, keeping its coverage.
pub(super) fn tint(pixmap: &mut Pixmap, color: Color) {
    for pixel in pixmap.pixels_mut() {
        let alpha = mul_div255(pixel.alpha(), color.a);
        if let Some(tinted) = PremultipliedColorU8::from_rgba(
            mul_div255(color.r, alpha),
            mul_div255(color.g, alpha),
            mul_div255(color.b, alpha),
            alpha,
        ) {
            *pixel = tinted;
        }
    }
}

/// Draw `layer` over a new pixmap filled with `background`.
pub(super) fn over_background(layer: &Pixmap, background: Color) -> Result<Pixmap, SvgError> {
    let mut out =
        Pixmap::new(layer.width(), layer.height()).ok_or(SvgError::Pixmap(layer.width(), layer.height()))?;
    out.fill(background.to_skia());
    out.draw_pixmap(
        0,
        0,
        layer.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Ok(out)
}

/// Convert a premultiplied pixmap into a straight-alpha RGBA image.
pub(super) fn into_rgba_image(pixmap: &Pixmap) -> Result<RgbaImage, SvgError> {
    let mut raw = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let c = pixel.demultiply();
        raw.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), raw)
        .ok_or(SvgError::Pixmap(pixmap.width(), pixmap.height()))
}

fn premultiplied_pixmap(image: &RgbaImage) -> Result<Pixmap, SvgError> {
    let size = IntSize::from_wh(image.width(), image.height()).ok_or(SvgError::EmptySymbol)?;
    let mut data = image.as_raw().clone();
    for px in data.chunks_exact_mut(4) {
        let a = px[3];
        px[0] = mul_div255(px[0], a);
        px[1] = mul_div255(px[1], a);
        px[2] = mul_div255(px[2], a);
    }
    Pixmap::from_vec(data, size).ok_or(SvgError::Pixmap(image.width(), image.height()))
}

#[inline]
fn mul_div255(a: u8, b: u8) -> u8 {
    ((u16::from(a) * u16::from(b) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::svg::transform::map_point;

    #[test]
    fn test_pixel_size_applies_scale() {
        assert_eq!(pixel_size((40.0, 30.0), 2.0).unwrap(), (80, 60));
        assert_eq!(pixel_size((10.4, 10.6), 1.0).unwrap(), (10, 11));
        assert_eq!(pixel_size((10.0, 10.0), 0.0).unwrap(), (10, 10));
        assert_eq!(pixel_size((10.0, 10.0), f32::NAN).unwrap(), (10, 10));
    }

    #[test]
    fn test_pixel_size_rejects_empty_and_huge() {
        assert!(matches!(
            pixel_size((0.0, 10.0), 1.0),
            Err(SvgError::InvalidRenderSize { .. })
        ));
        assert!(matches!(
            pixel_size((f32::INFINITY, 10.0), 1.0),
            Err(SvgError::InvalidRenderSize { .. })
        ));
        assert!(matches!(
            pixel_size((100_000.0, 100_000.0), 1.0),
            Err(SvgError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_content_transform_fit_centers() {
        let t = content_transform((100.0, 50.0), (200, 200), true);
        assert_eq!(map_point(&t, 0.0, 0.0), (0.0, 50.0));
        assert_eq!(map_point(&t, 100.0, 50.0), (200.0, 150.0));
    }

    #[test]
    fn test_content_transform_stretch() {
        let t = content_transform((100.0, 50.0), (200, 200), false);
        assert_eq!(map_point(&t, 100.0, 50.0), (200.0, 200.0));
        assert_eq!(map_point(&t, 50.0, 25.0), (100.0, 100.0));
    }

    #[test]
    fn test_tint_keeps_coverage() {
        let mut pixmap = Pixmap::new(2, 1).unwrap();
        pixmap.pixels_mut()[0] = PremultipliedColorU8::from_rgba(10, 20, 30, 128).unwrap();

        tint(&mut pixmap, Color::rgb(255, 0, 0));
        let image = into_rgba_image(&pixmap).unwrap();

        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0, 128]);
        assert_eq!(image.get_pixel(1, 0).0[3], 0);
    }

    #[test]
    fn test_mul_div255() {
        assert_eq!(mul_div255(255, 255), 255);
        assert_eq!(mul_div255(255, 0), 0);
        assert_eq!(mul_div255(128, 255), 128);
    }
}
