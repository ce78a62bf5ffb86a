//! Line offsets of the simulator's output report.
//!
//! The report format is owned by the simulator and has no version marker, so
//! each known variant is captured here as a preset. Line numbers are 0-based.

use crate::{ExtractError, ExtractResult};
use pf_core::Field;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Header lines when tropospheric properties were given inline.
pub const STANDARD_HEADER_LINES: Range<usize> = 7..20;

/// Header lines when the run read an atmospheric sounding file.
pub const SOUNDING_HEADER_LINES: Range<usize> = 5..15;

/// Summary lines sit immediately before the final line of the report.
pub const SUMMARY_LINES: usize = 3;

/// First row of the vertical profile table.
pub const PROFILE_LINE: usize = 24;

/// Positional extraction rules for one report variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserLayout {
    pub name: String,
    pub version: u32,
    /// First header line (inclusive).
    pub header_start: usize,
    /// Last header line (exclusive).
    pub header_end: usize,
    /// Field receiving the first header value; the rest follow in column order.
    pub header_first_field: Field,
    /// Number of `label = value km` lines before the final line.
    pub summary_lines: usize,
    /// Profile row, read only when the file has more lines than this index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_line: Option<usize>,
}

impl ParserLayout {
    pub fn standard() -> Self {
        Self {
            name: "standard".to_string(),
            version: 1,
            header_start: STANDARD_HEADER_LINES.start,
            header_end: STANDARD_HEADER_LINES.end,
            header_first_field: Field::Humidity,
            summary_lines: SUMMARY_LINES,
            profile_line: Some(PROFILE_LINE),
        }
    }

    /// Sounding runs drop humidity, air temperature and air pressure from the
    /// header; the header starts at the vent diameter.
    pub fn sounding() -> Self {
        Self {
            name: "sounding".to_string(),
            version: 1,
            header_start: SOUNDING_HEADER_LINES.start,
            header_end: SOUNDING_HEADER_LINES.end,
            header_first_field: Field::VentDiameter,
            summary_lines: SUMMARY_LINES,
            profile_line: Some(PROFILE_LINE),
        }
    }

    pub fn preset(name: &str) -> ExtractResult<Self> {
        match name {
            "standard" => Ok(Self::standard()),
            "sounding" => Ok(Self::sounding()),
            other => Err(ExtractError::UnknownPreset(other.to_string())),
        }
    }

    pub fn header_lines(&self) -> Range<usize> {
        self.header_start..self.header_end
    }

    /// Header and summary values must land in the header/summary columns and
    /// must not overlap each other.
    pub fn validate(&self) -> ExtractResult<()> {
        let invalid = |what: &str| ExtractError::InvalidLayout {
            name: self.name.clone(),
            what: what.to_string(),
        };

        if self.header_end <= self.header_start {
            return Err(invalid("header range is empty"));
        }
        let header_len = self.header_end - self.header_start;
        if self.header_first_field.index() + header_len > Field::PlumeHeight.index() {
            return Err(invalid("header values overflow into summary columns"));
        }
        let summary_columns = Field::BASE_WIDTH - Field::PlumeHeight.index();
        if self.summary_lines == 0 || self.summary_lines > summary_columns {
            return Err(invalid("summary line count must be 1..=3"));
        }
        if let Some(line) = self.profile_line
            && line < self.header_end
        {
            return Err(invalid("profile line lies inside the header"));
        }
        Ok(())
    }
}

impl Default for ParserLayout {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_valid() {
        ParserLayout::standard().validate().unwrap();
        ParserLayout::sounding().validate().unwrap();
    }

    #[test]
    fn standard_header_fills_thirteen_columns() {
        let layout = ParserLayout::standard();
        assert_eq!(layout.header_lines().len(), 13);
        assert_eq!(
            layout.header_first_field.index() + layout.header_lines().len(),
            Field::PlumeHeight.index()
        );
    }

    #[test]
    fn overflowing_header_is_rejected() {
        let mut layout = ParserLayout::standard();
        layout.header_first_field = Field::AirTemperature;
        let err = layout.validate().unwrap_err();
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn unknown_preset() {
        assert!(matches!(
            ParserLayout::preset("legacy"),
            Err(ExtractError::UnknownPreset(_))
        ));
        assert_eq!(ParserLayout::preset("sounding").unwrap().header_start, 5);
    }
}
