//! Content-based hashing for run IDs.

use std::fs::File;
use std::io;
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::ResultsResult;

/// Identity of one input file as far as caching is concerned: its name and
/// the SHA-256 of its bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFingerprint {
    pub name: String,
    pub sha256: String,
}

impl SourceFingerprint {
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            sha256: format!("{:x}", Sha256::digest(bytes)),
        }
    }
}

/// Fingerprint a file by streaming its contents through the hasher.
pub fn fingerprint_file(path: &Path) -> ResultsResult<SourceFingerprint> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SourceFingerprint {
        name,
        sha256: format!("{:x}", hasher.finalize()),
    })
}

/// Stable id for a configuration applied to a set of source files.
///
/// Source order does not matter.
pub fn compute_run_id<C: Serialize>(
    config: &C,
    sources: &[SourceFingerprint],
    tool_version: &str,
) -> String {
    let mut hasher = Sha256::new();

    let config_json = serde_json::to_string(config).unwrap_or_default();
    hasher.update(config_json.as_bytes());

    let mut sorted: Vec<&SourceFingerprint> = sources.iter().collect();
    sorted.sort();
    for source in sorted {
        hasher.update(source.name.as_bytes());
        hasher.update([0u8]);
        hasher.update(source.sha256.as_bytes());
        hasher.update([0u8]);
    }

    hasher.update(tool_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
