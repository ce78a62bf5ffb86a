//! Batch assembly of run records into a dataset.

use crate::parser::OutputParser;
use crate::{ExtractError, ExtractResult};
use pf_core::{Dataset, Field, RunRecord, Schema};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Source of per-run value vectors.
///
/// Implementations return exactly `width` slots on success. An `Err` marks the
/// whole run as unreadable; the assembler records it as all-missing.
pub trait RunExtractor: Sync {
    fn extract(&self, path: &Path, width: usize) -> ExtractResult<Vec<Option<f64>>>;

    /// Schema the extractor is bound to, if any. It takes precedence over
    /// [`AssemblyOptions::schema`].
    fn schema(&self) -> Option<Schema> {
        None
    }
}

impl RunExtractor for OutputParser {
    fn extract(&self, path: &Path, width: usize) -> ExtractResult<Vec<Option<f64>>> {
        let values = self.parse_file(path)?;
        Ok(crate::normalize_width(values, width))
    }

    fn schema(&self) -> Option<Schema> {
        Some(OutputParser::schema(self))
    }
}

impl<F> RunExtractor for F
where
    F: Fn(&Path, usize) -> ExtractResult<Vec<Option<f64>>> + Sync,
{
    fn extract(&self, path: &Path, width: usize) -> ExtractResult<Vec<Option<f64>>> {
        self(path, width)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AssemblyOptions {
    /// Used only when the extractor is not bound to a schema.
    pub schema: Schema,
    /// Fan out across files with rayon. Output order is unchanged.
    pub parallel: bool,
}

impl Default for AssemblyOptions {
    fn default() -> Self {
        Self {
            schema: Schema::BASE,
            parallel: true,
        }
    }
}

/// What happened to each input file during assembly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssemblyReport {
    pub files: usize,
    /// Files that could not be read at all.
    pub failed: Vec<String>,
    /// Rows removed because the vent diameter was missing.
    pub dropped_no_vent: Vec<String>,
}

impl AssemblyReport {
    pub fn kept(&self) -> usize {
        self.files - self.dropped_no_vent.len()
    }
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Extract every file into one dataset, then drop rows without a vent
/// diameter.
///
/// A failure on one file never affects the others.
pub fn assemble<E>(
    paths: &[PathBuf],
    extractor: &E,
    options: AssemblyOptions,
) -> (Dataset, AssemblyReport)
where
    E: RunExtractor + ?Sized,
{
    let schema = match extractor.schema() {
        Some(bound) => {
            if bound != options.schema {
                tracing::debug!(?bound, requested = ?options.schema, "using extractor schema");
            }
            bound
        }
        None => options.schema,
    };
    let width = schema.width();
    tracing::info!(
        files = paths.len(),
        width,
        parallel = options.parallel,
        "assembling dataset"
    );

    let extract_one = |path: &PathBuf| -> (RunRecord, bool) {
        let source = source_name(path);
        match extractor.extract(path, width) {
            Ok(values) => (RunRecord::from_values(source, schema, values), true),
            Err(e) => {
                tracing::warn!(
                    file = %source,
                    error = %e,
                    "unreadable output file, recording as missing"
                );
                (RunRecord::missing(source, schema), false)
            }
        }
    };

    let extracted: Vec<(RunRecord, bool)> = if options.parallel {
        paths.par_iter().map(extract_one).collect()
    } else {
        paths.iter().map(extract_one).collect()
    };

    let mut report = AssemblyReport {
        files: paths.len(),
        ..Default::default()
    };
    let mut dataset = Dataset::new(schema);
    for (record, ok) in extracted {
        if !ok {
            report.failed.push(record.source.clone());
        }
        // Width is fixed by RunRecord::from_values, so push cannot fail here.
        if let Err(e) = dataset.push(record) {
            tracing::error!(error = %e, "record rejected by dataset");
        }
    }

    report.dropped_no_vent = dataset.drop_missing(Field::VentDiameter);
    if !report.dropped_no_vent.is_empty() {
        tracing::info!(
            dropped = report.dropped_no_vent.len(),
            "dropped rows without a vent diameter"
        );
    }

    (dataset, report)
}

/// Compare file names treating digit runs as numbers (`run2` < `run10`).
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();
    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let xs = take_digits(&mut ai);
                let ys = take_digits(&mut bi);
                let xt = xs.trim_start_matches('0');
                let yt = ys.trim_start_matches('0');
                let ord = xt
                    .len()
                    .cmp(&yt.len())
                    .then_with(|| xt.cmp(yt))
                    .then_with(|| xs.len().cmp(&ys.len()));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                ai.next();
                bi.next();
            }
        }
    }
}

fn take_digits(it: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut s = String::new();
    while let Some(c) = it.peek().copied() {
        if !c.is_ascii_digit() {
            break;
        }
        s.push(c);
        it.next();
    }
    s
}

/// All `*.txt` files directly inside `dir`, in natural file-name order.
pub fn list_output_files(dir: &Path) -> ExtractResult<Vec<PathBuf>> {
    let list_err = |e: std::io::Error| ExtractError::ListDir {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort_by(|a, b| natural_cmp(&source_name(a), &source_name(b)));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn natural_order() {
        let mut names = vec!["run10.txt", "run2.txt", "run1.txt", "run02.txt", "a.txt"];
        names.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(names, ["a.txt", "run1.txt", "run2.txt", "run02.txt", "run10.txt"]);
    }

    #[test]
    fn failing_extractor_isolated_per_file() {
        let extractor = |path: &Path, width: usize| -> ExtractResult<Vec<Option<f64>>> {
            if path.ends_with("bad.txt") {
                return Err(ExtractError::Read {
                    path: path.to_path_buf(),
                    source: std::io::Error::other("boom"),
                });
            }
            let mut v = vec![Some(1.0); width];
            v[Field::Humidity.index()] = None;
            Ok(v)
        };
        let paths = vec![
            PathBuf::from("good1.txt"),
            PathBuf::from("bad.txt"),
            PathBuf::from("good2.txt"),
        ];

        for parallel in [false, true] {
            let (ds, report) = assemble(
                &paths,
                &extractor,
                AssemblyOptions {
                    schema: Schema::BASE,
                    parallel,
                },
            );
            assert_eq!(report.files, 3);
            assert_eq!(report.failed, vec!["bad.txt".to_string()]);
            // The unreadable file has no vent diameter and is filtered out.
            assert_eq!(report.dropped_no_vent, vec!["bad.txt".to_string()]);
            assert_eq!(report.kept(), 2);
            let sources: Vec<_> = ds.iter().map(|r| r.source.as_str()).collect();
            assert_eq!(sources, ["good1.txt", "good2.txt"]);
            assert_eq!(ds.records()[0].get(Field::Humidity), None);
            assert_eq!(ds.records()[0].get(Field::VentDiameter), Some(1.0));
        }
    }

    #[test]
    fn wrong_width_from_extractor_is_normalized() {
        let extractor =
            |_: &Path, _: usize| -> ExtractResult<Vec<Option<f64>>> { Ok(vec![Some(3.0); 50]) };
        let paths = [PathBuf::from("x.txt")];
        let (ds, _) = assemble(&paths, &extractor, AssemblyOptions::default());
        assert_eq!(ds.records()[0].width(), 16);
    }
}
