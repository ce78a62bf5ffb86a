//! pf-extract: turns simulator output files into a [`Dataset`](pf_core::Dataset).
//!
//! The simulator writes a fixed-position text report. Nothing in it is keyed,
//! so extraction is purely positional and every offset lives in a named
//! [`ParserLayout`]. Parsing never fails on content: anything unreadable
//! becomes a missing value.

pub mod assemble;
pub mod error;
pub mod layout;
pub mod parser;

pub use assemble::{
    AssemblyOptions, AssemblyReport, RunExtractor, assemble, list_output_files, natural_cmp,
};
pub use error::{ExtractError, ExtractResult};
pub use layout::ParserLayout;
pub use parser::{
    OutputParser, decode_output, normalize_width, parse_header_value, parse_output,
    parse_profile_line, parse_real, parse_summary_value,
};
