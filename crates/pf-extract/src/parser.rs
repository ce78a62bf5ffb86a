//! Positional parser for one simulator output report.

use crate::layout::ParserLayout;
use crate::{ExtractError, ExtractResult};
use pf_core::{Field, Schema, finite};
use std::path::Path;

/// Parse a single numeric token as the simulator prints it.
///
/// Accepts Fortran `D` exponents (`1.25D+03`). Overflow fields (`******`),
/// empty tokens and non-finite values are missing.
pub fn parse_real(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() || token.starts_with('*') {
        return None;
    }
    let parsed = if token.contains(['D', 'd']) {
        token.replace(['D', 'd'], "E").parse::<f64>()
    } else {
        token.parse::<f64>()
    };
    parsed.ok().and_then(finite)
}

/// Value of a `label: value` header line (text after the first colon).
pub fn parse_header_value(line: &str) -> Option<f64> {
    let (_, value) = line.split_once(':')?;
    parse_real(value)
}

/// Value of a `label = value km` summary line (text after the first `=`,
/// unit suffix stripped).
pub fn parse_summary_value(line: &str) -> Option<f64> {
    let (_, value) = line.split_once('=')?;
    let value = value.trim();
    let value = value.strip_suffix("km").unwrap_or(value);
    parse_real(value)
}

/// Whitespace-separated profile row; each token parses on its own.
pub fn parse_profile_line(line: &str) -> Vec<Option<f64>> {
    line.split_whitespace().map(parse_real).collect()
}

/// Pad with missing values or truncate so callers always get `expected` slots.
pub fn normalize_width(mut values: Vec<Option<f64>>, expected: usize) -> Vec<Option<f64>> {
    values.resize(expected, None);
    values
}

/// Decode raw report bytes, replacing invalid UTF-8 and dropping a BOM.
pub fn decode_output(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text.into_owned(),
    }
}

/// Extract exactly `expected_len` values from report text.
///
/// Slots follow [`Field::ALL`] order: header values start at the layout's
/// first header field, summary values start at [`Field::PlumeHeight`], and
/// profile tokens start at [`Field::ProfileIndex`].
pub fn parse_output(text: &str, layout: &ParserLayout, expected_len: usize) -> Vec<Option<f64>> {
    let lines: Vec<&str> = text.lines().collect();
    let n = lines.len();
    let mut values = vec![None; Field::BASE_WIDTH];

    let header = layout.header_lines();
    let first = layout.header_first_field.index();
    for (i, line) in lines
        .iter()
        .enumerate()
        .skip(header.start)
        .take(header.len())
    {
        values[first + i - header.start] = parse_header_value(line);
    }

    // Summary: the `summary_lines` lines before the final line.
    let end = n.saturating_sub(1);
    let start = n.saturating_sub(1 + layout.summary_lines);
    for (slot, line) in lines[start..end].iter().enumerate() {
        values[Field::PlumeHeight.index() + slot] = parse_summary_value(line);
    }

    if let Some(profile) = layout.profile_line
        && n > profile
    {
        values.extend(parse_profile_line(lines[profile]));
    }

    normalize_width(values, expected_len)
}

/// File-backed parser bound to a layout and an output schema.
#[derive(Debug, Clone)]
pub struct OutputParser {
    layout: ParserLayout,
    schema: Schema,
}

impl OutputParser {
    pub fn new(layout: ParserLayout, schema: Schema) -> ExtractResult<Self> {
        layout.validate()?;
        Ok(Self { layout, schema })
    }

    pub fn layout(&self) -> &ParserLayout {
        &self.layout
    }

    pub fn schema(&self) -> Schema {
        self.schema
    }

    pub fn parse_text(&self, text: &str) -> Vec<Option<f64>> {
        parse_output(text, &self.layout, self.schema.width())
    }

    /// Only I/O failures are errors; content problems become missing values.
    pub fn parse_file(&self, path: &Path) -> ExtractResult<Vec<Option<f64>>> {
        let bytes = std::fs::read(path).map_err(|e| ExtractError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(self.parse_text(&decode_output(&bytes)))
    }
}
