//! tessera - SVG pattern rendering and I420 to NV12 conversion.

mod cli;

use anyhow::{Context, Result};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use tessera::config::{TesseraConfig, init_config};
use tessera::log;
use tessera::logger::set_verbose;

fn main() {
    if let Err(err) = run() {
        log!("error"; "{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    set_verbose(cli.verbose);

    let config = TesseraConfig::load(&cli.config)
        .with_context(|| format!("invalid config {}", cli.config.display()))?;
    init_config(config);

    match &cli.command {
        Commands::Prepare {
            input,
            output,
            pattern,
        } => cli::svg::prepare(input, output, *pattern),
        Commands::Pattern { input } => cli::svg::pattern(input),
        Commands::Render { args } => cli::svg::render(args),
        Commands::Yuv {
            input,
            output,
            width,
            height,
        } => cli::yuv::convert(input, output, *width, *height),
    }
}
