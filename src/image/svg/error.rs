use quick_xml::events::attributes::AttrError;
use thiserror::Error;

use super::prepared::PreparedError;

/// Errors raised while preparing or rendering SVG content.
///
/// The public adapters collapse these into `None`; the `try_*` variants
/// expose them.
#[derive(Debug, Error)]
pub enum SvgError {
    #[error("empty svg data")]
    Empty,

    #[error("failed to parse svg")]
    Parse(#[from] usvg::Error),

    #[error("malformed svg markup")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed svg attribute")]
    Attr(#[from] AttrError),

    #[error("failed to write svg markup")]
    Io(#[from] std::io::Error),

    #[error("document has no <svg> root element")]
    MissingRoot,

    #[error("invalid prepared document")]
    Prepared(#[from] PreparedError),

    #[error("invalid render size {width}x{height}")]
    InvalidRenderSize { width: f32, height: f32 },

    #[error("render of {width}x{height} pixels exceeds the limit of {limit}")]
    TooLarge { width: u32, height: u32, limit: u64 },

    #[error("failed to allocate a {0}x{1} pixmap")]
    Pixmap(u32, u32),

    #[error("symbol image is empty")]
    EmptySymbol,
}
