//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

/// What a stored run contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunKind {
    /// The enriched table of every run.
    Extraction,
    /// Collapse conditions found in an enriched table.
    Borders { conditions: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub kind: RunKind,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub source_dir: String,
    pub layout: String,
    pub with_profile: bool,
    pub files: usize,
    pub rows: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_files: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped_no_vent: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unclassified: Vec<String>,
    pub dry_mixture_density_kg_m3: f64,
    pub tool_version: String,
}

impl RunManifest {
    pub fn stamp_now(&mut self) {
        self.timestamp = chrono::Utc::now().to_rfc3339();
    }
}

impl RunKind {
    /// File name of the exported table inside the run directory.
    pub fn table_file(&self) -> &'static str {
        match self {
            RunKind::Extraction => "table.csv",
            RunKind::Borders { .. } => "borders.csv",
        }
    }
}
