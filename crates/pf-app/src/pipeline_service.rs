//! Extraction pipeline: list, assemble, derive, export, with a result cache.

use std::path::{Path, PathBuf};
use std::time::Instant;

use pf_derive::{BorderPoint, DerivedTable, derive_table, detect_borders};
use pf_extract::{AssemblyOptions, AssemblyReport, OutputParser, assemble, list_output_files};
use pf_results::{
    ResultStore, RunKind, RunManifest, SourceFingerprint, compute_run_id, fingerprint_file,
};

use crate::config_service::PipelineConfig;
use crate::error::{AppError, AppResult};
use crate::export;
use crate::progress::{PipelineProgressEvent, PipelineStage};

pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    pub use_cache: bool,
    /// Defaults to `<source_dir>/.plumeflow/runs`.
    pub store_dir: Option<PathBuf>,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            store_dir: None,
        }
    }
}

pub struct ExtractionRequest<'a> {
    pub source_dir: &'a Path,
    pub config: &'a PipelineConfig,
    pub options: ExtractionOptions,
}

/// In-memory result of one pass over a directory.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub files: Vec<PathBuf>,
    pub report: AssemblyReport,
    pub table: DerivedTable,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineTiming {
    pub assemble_time_s: f64,
    pub derive_time_s: f64,
    pub save_time_s: f64,
    pub total_time_s: f64,
}

#[derive(Debug, Clone)]
pub struct ExtractionResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub table_path: PathBuf,
    pub loaded_from_cache: bool,
    pub timing: PipelineTiming,
}

#[derive(Debug, Clone)]
pub struct BordersResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub table_path: PathBuf,
    pub points: Vec<BorderPoint>,
}

type ProgressCallback<'a> = Option<&'a mut dyn FnMut(PipelineProgressEvent)>;

fn emit_progress(
    progress_cb: &mut ProgressCallback<'_>,
    stage: PipelineStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(PipelineProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Content fingerprints of the source files.
#[derive(Debug, Default)]
struct SourceFingerprints {
    sources: Vec<SourceFingerprint>,
    /// Files whose bytes could not be read. They are left out of the run id.
    unreadable: Vec<PathBuf>,
}

fn fingerprints(files: &[PathBuf]) -> SourceFingerprints {
    let mut fps = SourceFingerprints::default();
    for path in files {
        match fingerprint_file(path) {
            Ok(fp) => fps.sources.push(fp),
            Err(e) => {
                tracing::warn!(
                    file = %path.display(),
                    error = %e,
                    "cannot fingerprint source file"
                );
                fps.unreadable.push(path.clone());
            }
        }
    }
    fps
}

fn open_store(request: &ExtractionRequest) -> AppResult<ResultStore> {
    let store = match &request.options.store_dir {
        Some(dir) => ResultStore::new(dir.clone())?,
        None => ResultStore::for_source_dir(request.source_dir)?,
    };
    Ok(store)
}

fn base_manifest(
    run_id: String,
    kind: RunKind,
    source_dir: &Path,
    config: &PipelineConfig,
    extraction: &Extraction,
) -> AppResult<RunManifest> {
    let layout = config.extraction.parser_layout()?;
    let mut manifest = RunManifest {
        run_id,
        kind,
        timestamp: String::new(),
        source_dir: source_dir.display().to_string(),
        layout: layout.name,
        with_profile: config.extraction.with_profile,
        files: extraction.report.files,
        rows: extraction.table.len(),
        failed_files: extraction.report.failed.clone(),
        dropped_no_vent: extraction.report.dropped_no_vent.clone(),
        unclassified: extraction.table.unclassified.clone(),
        dry_mixture_density_kg_m3: extraction.table.dry_mixture_density,
        tool_version: TOOL_VERSION.to_string(),
    };
    manifest.stamp_now();
    Ok(manifest)
}

/// List, assemble and derive without touching the result store.
pub fn run_extraction(source_dir: &Path, config: &PipelineConfig) -> AppResult<Extraction> {
    run_extraction_timed(source_dir, config, &mut PipelineTiming::default(), &mut None)
}

fn run_extraction_timed(
    source_dir: &Path,
    config: &PipelineConfig,
    timing: &mut PipelineTiming,
    progress_cb: &mut ProgressCallback<'_>,
) -> AppResult<Extraction> {
    let started = Instant::now();
    let files = list_output_files(source_dir)?;
    if files.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "No output files (*.txt) in {}",
            source_dir.display()
        )));
    }
    extract_files(files, config, timing, progress_cb, started)
}

fn extract_files(
    files: Vec<PathBuf>,
    config: &PipelineConfig,
    timing: &mut PipelineTiming,
    progress_cb: &mut ProgressCallback<'_>,
    started: Instant,
) -> AppResult<Extraction> {
    emit_progress(
        progress_cb,
        PipelineStage::Assembling,
        started,
        Some(format!("{} files", files.len())),
    );
    let assemble_started = Instant::now();
    let parser = OutputParser::new(
        config.extraction.parser_layout()?,
        config.extraction.schema(),
    )?;
    let (dataset, report) = assemble(
        &files,
        &parser,
        AssemblyOptions {
            schema: config.extraction.schema(),
            parallel: config.extraction.parallel,
        },
    );
    timing.assemble_time_s = assemble_started.elapsed().as_secs_f64();

    emit_progress(progress_cb, PipelineStage::Deriving, started, None);
    let derive_started = Instant::now();
    let table = derive_table(&dataset, &config.derivation, &config.regime)?;
    timing.derive_time_s = derive_started.elapsed().as_secs_f64();

    tracing::info!(
        files = report.files,
        failed = report.failed.len(),
        rows = table.len(),
        unclassified = table.unclassified.len(),
        "extraction finished"
    );

    Ok(Extraction {
        files,
        report,
        table,
    })
}

/// Extract a directory or load the cached table.
pub fn ensure_extraction(request: &ExtractionRequest) -> AppResult<ExtractionResponse> {
    ensure_extraction_with_progress(request, None)
}

/// Extract a directory or load the cached table, streaming progress events.
///
/// The cache key covers the config, the tool version, and each source file's
/// name and content hash. The cache is bypassed when any file cannot be hashed.
pub fn ensure_extraction_with_progress(
    request: &ExtractionRequest,
    mut progress_cb: ProgressCallback<'_>,
) -> AppResult<ExtractionResponse> {
    let started = Instant::now();
    let mut timing = PipelineTiming::default();

    emit_progress(
        &mut progress_cb,
        PipelineStage::ListingFiles,
        started,
        Some(request.source_dir.display().to_string()),
    );
    let files = list_output_files(request.source_dir)?;
    if files.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "No output files (*.txt) in {}",
            request.source_dir.display()
        )));
    }

    emit_progress(&mut progress_cb, PipelineStage::CheckingCache, started, None);
    let fps = fingerprints(&files);
    let run_id = compute_run_id(request.config, &fps.sources, TOOL_VERSION);
    let store = open_store(request)?;

    // A cached table cannot vouch for files that were not hashed.
    let cache_usable = request.options.use_cache && fps.unreadable.is_empty();
    if request.options.use_cache && !cache_usable {
        tracing::info!(
            unreadable = fps.unreadable.len(),
            "skipping result cache, some sources could not be fingerprinted"
        );
    }

    if cache_usable && store.has_run(&run_id) {
        emit_progress(
            &mut progress_cb,
            PipelineStage::LoadingCachedResult,
            started,
            None,
        );
        let manifest = store.load_manifest(&run_id)?;
        let table_path = store.table_path(&manifest)?;
        timing.total_time_s = started.elapsed().as_secs_f64();
        emit_progress(&mut progress_cb, PipelineStage::Completed, started, None);

        return Ok(ExtractionResponse {
            run_id,
            manifest,
            table_path,
            loaded_from_cache: true,
            timing,
        });
    }

    let extraction = extract_files(files, request.config, &mut timing, &mut progress_cb, started)?;

    emit_progress(&mut progress_cb, PipelineStage::SavingResults, started, None);
    let save_started = Instant::now();
    let manifest = base_manifest(
        run_id.clone(),
        RunKind::Extraction,
        request.source_dir,
        request.config,
        &extraction,
    )?;
    let table_path = store.save_run(&manifest, &export::table_to_csv(&extraction.table))?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        PipelineStage::Completed,
        started,
        Some(format!("{} rows", manifest.rows)),
    );

    Ok(ExtractionResponse {
        run_id,
        manifest,
        table_path,
        loaded_from_cache: false,
        timing,
    })
}

/// Extract a directory and store its collapse conditions.
pub fn find_collapse_borders(request: &ExtractionRequest) -> AppResult<BordersResponse> {
    find_collapse_borders_with_progress(request, None)
}

/// Borders run with progress events. Never served from the cache.
pub fn find_collapse_borders_with_progress(
    request: &ExtractionRequest,
    mut progress_cb: ProgressCallback<'_>,
) -> AppResult<BordersResponse> {
    let started = Instant::now();
    let mut timing = PipelineTiming::default();
    emit_progress(
        &mut progress_cb,
        PipelineStage::ListingFiles,
        started,
        Some(request.source_dir.display().to_string()),
    );
    let extraction =
        run_extraction_timed(request.source_dir, request.config, &mut timing, &mut progress_cb)?;

    emit_progress(&mut progress_cb, PipelineStage::DetectingBorders, started, None);
    let points = detect_borders(&extraction.table, &request.config.borders);

    // Distinct from the extraction run id so both can live in one store.
    let run_id = compute_run_id(
        &(request.config, "borders"),
        &fingerprints(&extraction.files).sources,
        TOOL_VERSION,
    );
    let manifest = base_manifest(
        run_id.clone(),
        RunKind::Borders {
            conditions: points.len(),
        },
        request.source_dir,
        request.config,
        &extraction,
    )?;

    emit_progress(&mut progress_cb, PipelineStage::SavingResults, started, None);
    let store = open_store(request)?;
    let table_path = store.save_run(
        &manifest,
        &export::borders_to_csv(&extraction.table, &points),
    )?;
    emit_progress(
        &mut progress_cb,
        PipelineStage::Completed,
        started,
        Some(format!("{} border points", points.len())),
    );

    Ok(BordersResponse {
        run_id,
        manifest,
        table_path,
        points,
    })
}

/// Stored runs, most recent first.
pub fn list_runs(store_dir: &Path) -> AppResult<Vec<RunManifest>> {
    let store = ResultStore::new(store_dir.to_path_buf())?;
    let mut runs = store.list_runs()?;
    runs.reverse();
    Ok(runs)
}

pub fn load_run(store_dir: &Path, run_id: &str) -> AppResult<(RunManifest, String)> {
    let store = ResultStore::new(store_dir.to_path_buf())?;
    let manifest = store.load_manifest(run_id)?;
    let table = store.load_table(run_id)?;
    Ok((manifest, table))
}
