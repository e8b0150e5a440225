//! Configuration section definitions.
//!
//! Each module corresponds to a section in `tessera.toml`:
//!
//! | Module     | TOML Section   | Purpose                               |
//! |------------|----------------|---------------------------------------|
//! | `svg`      | `[svg]`        | Default scale, render size limit      |
//! | `yuv`      | `[yuv]`        | Parallel conversion threshold         |
//! | `contacts` | `[contacts]`   | App reference label and URL prefix    |

mod contacts;
mod svg;
mod yuv;

pub use contacts::ContactsConfig;
pub use svg::SvgConfig;
pub use yuv::YuvConfig;
