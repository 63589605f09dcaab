//! Stable JSON emission for the API surface.
//!
//! Key order is guaranteed by struct field order plus insertion-ordered
//! maps; the emitter writes two spaces per indent level and a trailing
//! newline, so re-parsing and re-rendering a file is byte-identical.

use super::ApiMap;
use crate::error::Result;

/// Renders the ApiMap in its canonical on-disk form.
#[must_use]
pub fn render_api_json(api: &ApiMap) -> String {
    let mut out = serde_json::to_string_pretty(api).expect("api map serializes");
    out.push('\n');
    out
}

/// Parses an API file previously written by [`render_api_json`] (or the
/// equivalent external builder).
pub fn parse_api_json(text: &str) -> Result<ApiMap> {
    Ok(serde_json::from_str(text)?)
}
