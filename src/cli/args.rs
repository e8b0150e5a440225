//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;
use tessera::image::svg::Color;

/// SVG pattern rendering and pixel format conversion
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: tessera.toml)
    #[arg(short = 'C', long, global = true, default_value = "tessera.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Parse an SVG once into a prepared document for repeated renders
    #[command(visible_alias = "p")]
    Prepare {
        /// SVG file
        #[arg(value_hint = clap::ValueHint::FilePath)]
        input: PathBuf,

        /// Prepared document output path
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: PathBuf,

        /// Record pattern tiles and hide their placeholder rects
        #[arg(long)]
        pattern: bool,
    },

    /// Print the pattern geometry of an SVG as JSON
    Pattern {
        /// SVG file
        #[arg(value_hint = clap::ValueHint::FilePath)]
        input: PathBuf,
    },

    /// Render an SVG or a prepared document to PNG
    #[command(visible_alias = "r")]
    Render {
        #[command(flatten)]
        args: RenderArgs,
    },

    /// Convert a packed I420 frame to NV12
    Yuv {
        /// I420 input file (Y, U, V planes without padding)
        #[arg(value_hint = clap::ValueHint::FilePath)]
        input: PathBuf,

        /// NV12 output file
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: PathBuf,

        /// Frame width in pixels
        #[arg(long)]
        width: u32,

        /// Frame height in pixels
        #[arg(long)]
        height: u32,
    },
}

/// Render command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct RenderArgs {
    /// SVG file, or a prepared document with --prepared
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// PNG output path
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,

    /// Treat the input as a prepared document
    #[arg(long)]
    pub prepared: bool,

    /// Target width in points (0: intrinsic)
    #[arg(long, default_value_t = 0.0)]
    pub width: f32,

    /// Target height in points (0: intrinsic)
    #[arg(long, default_value_t = 0.0)]
    pub height: f32,

    /// Pixels per point (default: svg.default_scale)
    #[arg(short, long)]
    pub scale: Option<f32>,

    /// Background color (#rrggbb or #rrggbbaa)
    #[arg(short, long)]
    pub background: Option<Color>,

    /// Tint every painted pixel (plain SVG input only)
    #[arg(short, long)]
    pub foreground: Option<Color>,

    /// Keep the aspect ratio (false stretches to the target size)
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub fit: Option<bool>,

    /// Flatten onto the background, white when none is given
    #[arg(long)]
    pub opaque: bool,

    /// Image stamped onto a pattern tile
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub symbol: Option<PathBuf>,

    /// Pattern tile receiving the symbol (wraps around)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub rect_index: i32,
}
