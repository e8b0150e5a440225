//! `prepare`, `pattern` and `render` commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use image::RgbaImage;
use tessera::config::cfg;
use tessera::image::svg::{
    Color, PreparedDocument, RenderOptions, extract_pattern, try_draw_svg_image,
    try_prepare_svg_image, try_render_prepared_image_with_symbol,
};
use tessera::log;

use super::args::RenderArgs;

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Write a prepared document for `input`.
pub fn prepare(input: &Path, output: &Path, pattern: bool) -> Result<()> {
    let data = read(input)?;
    let prepared = try_prepare_svg_image(&data, pattern)
        .with_context(|| format!("failed to prepare {}", input.display()))?;
    fs::write(output, &prepared)
        .with_context(|| format!("failed to write {}", output.display()))?;
    log!("svg"; "prepared {} ({} bytes)", output.display(), prepared.len());
    Ok(())
}

/// Print the pattern geometry as pretty JSON.
pub fn pattern(input: &Path) -> Result<()> {
    let data = read(input)?;
    let geometry = extract_pattern(&data)
        .with_context(|| format!("failed to read pattern from {}", input.display()))?;
    println!("{}", serde_json::to_string_pretty(&geometry)?);
    Ok(())
}

pub fn render(args: &RenderArgs) -> Result<()> {
    let data = read(&args.input)?;
    let scale = args.scale.unwrap_or_else(|| cfg().svg.default_scale);
    let symbol = args.symbol.as_deref().map(load_symbol).transpose()?;

    // Plain SVG without a symbol or stretch goes through the one-shot path.
    let image = if !args.prepared && symbol.is_none() && args.fit != Some(false) {
        try_draw_svg_image(
            &data,
            (args.width, args.height),
            args.background,
            args.foreground,
            scale,
            args.opaque,
        )?
    } else {
        let prepared = if args.prepared {
            data
        } else {
            try_prepare_svg_image(&data, symbol.is_some())?
        };
        let size = if args.width > 0.0 && args.height > 0.0 {
            (args.width, args.height)
        } else {
            PreparedDocument::decode(&prepared)?.size
        };
        let background = match (args.background, args.opaque) {
            (Some(color), true) => color.over(Color::WHITE),
            (None, true) => Color::WHITE,
            (color, false) => color.unwrap_or(Color::TRANSPARENT),
        };
        let options = RenderOptions::new(size.0, size.1)
            .with_background(background)
            .with_scale(scale)
            .with_fit(args.fit.unwrap_or(true));
        try_render_prepared_image_with_symbol(&prepared, &options, symbol.as_ref(), args.rect_index)?
    };

    image
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    log!("render"; "wrote {}x{} to {}", image.width(), image.height(), args.output.display());
    Ok(())
}

fn load_symbol(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path)
        .with_context(|| format!("failed to load symbol {}", path.display()))?;
    Ok(image.into_rgba8())
}
