//! Run storage API.

use crate::types::RunManifest;
use crate::{ResultsError, ResultsResult};
use std::fs;
use std::path::{Path, PathBuf};

const MANIFEST_FILE: &str = "manifest.json";

#[derive(Clone, Debug)]
pub struct ResultStore {
    root_dir: PathBuf,
}

impl ResultStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store kept beside a directory of simulator output.
    pub fn for_source_dir(source_dir: &Path) -> ResultsResult<Self> {
        Self::new(source_dir.join(".plumeflow").join("runs"))
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> ResultsResult<PathBuf> {
        let valid = !run_id.is_empty()
            && run_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ResultsError::InvalidRunId(run_id.to_string()));
        }
        Ok(self.root_dir.join(run_id))
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id)
            .map(|dir| dir.join(MANIFEST_FILE).exists())
            .unwrap_or(false)
    }

    /// Write the table first and the manifest last, so a present manifest
    /// always has its table.
    pub fn save_run(&self, manifest: &RunManifest, table_csv: &str) -> ResultsResult<PathBuf> {
        let run_dir = self.run_dir(&manifest.run_id)?;
        fs::create_dir_all(&run_dir)?;

        let table_path = run_dir.join(manifest.kind.table_file());
        fs::write(&table_path, table_csv)?;

        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join(MANIFEST_FILE), manifest_json)?;

        tracing::debug!(run_id = %manifest.run_id, path = %table_path.display(), "run saved");
        Ok(table_path)
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id)?.join(MANIFEST_FILE);

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        let manifest = serde_json::from_str(&content)?;
        Ok(manifest)
    }

    pub fn table_path(&self, manifest: &RunManifest) -> ResultsResult<PathBuf> {
        Ok(self.run_dir(&manifest.run_id)?.join(manifest.kind.table_file()))
    }

    pub fn load_table(&self, run_id: &str) -> ResultsResult<String> {
        let manifest = self.load_manifest(run_id)?;
        let path = self.table_path(&manifest)?;
        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        Ok(fs::read_to_string(path)?)
    }

    /// Every stored run, oldest first.
    pub fn list_runs(&self) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                match self.load_manifest(&run_id) {
                    Ok(manifest) => runs.push(manifest),
                    Err(e) => tracing::debug!(run_id, error = %e, "skipping run directory"),
                }
            }
        }

        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id)?;
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}
