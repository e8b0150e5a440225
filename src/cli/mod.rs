//! Command-line interface module.

mod args;
pub mod svg;
pub mod yuv;

pub use args::{Cli, Commands};
