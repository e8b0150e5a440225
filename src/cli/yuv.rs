//! `yuv` command.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tessera::image::yuv::I420Frame;
use tessera::log;

/// Convert a packed I420 file into a packed NV12 file.
pub fn convert(input: &Path, output: &Path, width: u32, height: u32) -> Result<()> {
    let data = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let frame = I420Frame::from_bytes(width, height, data)
        .with_context(|| format!("{} is not a {width}x{height} I420 frame", input.display()))?;
    let nv12 = frame.to_nv12()?;

    fs::write(output, nv12.as_bytes())
        .with_context(|| format!("failed to write {}", output.display()))?;
    log!("yuv"; "wrote {}x{} nv12 to {}", width, height, output.display());
    Ok(())
}
