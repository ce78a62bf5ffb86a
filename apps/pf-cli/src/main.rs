use clap::{Parser, Subcommand};
use pf_app::{
    AppError, AppResult, ExtractionOptions, ExtractionRequest, PipelineConfig,
    PipelineProgressEvent, PipelineTiming, deck_service, pipeline_service,
};
use pf_deck::RunSpec;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(about = "plumeflow CLI - volcanic plume run extraction and batch tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a directory of simulator reports into an enriched table
    Extract {
        /// Directory holding the simulator's *.txt reports
        source_dir: PathBuf,
        /// Pipeline config YAML (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Result store directory (defaults to <source_dir>/.plumeflow/runs)
        #[arg(long)]
        store: Option<PathBuf>,
        /// Skip cache and force re-extraction
        #[arg(long)]
        no_cache: bool,
        /// Also copy the table CSV here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Find collapse conditions in a directory of reports
    Borders {
        /// Directory holding the simulator's *.txt reports
        source_dir: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        store: Option<PathBuf>,
        /// Also copy the borders CSV here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write simulator input decks
    Decks {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Rerun every row of this report directory at its adjusted vent diameter
        #[arg(long)]
        rerun_from: Option<PathBuf>,
    },
    /// Write input decks and run the simulator over them
    Simulate {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        rerun_from: Option<PathBuf>,
        /// Simulator executable (overrides the config)
        #[arg(long)]
        executable: Option<PathBuf>,
        /// Per-run timeout in seconds (overrides the config)
        #[arg(long)]
        timeout_s: Option<f64>,
    },
    /// Write a default config file
    InitConfig {
        /// Path of the YAML file to create
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// List stored runs
    Runs {
        /// Result store directory
        store: PathBuf,
    },
    /// Show details of a stored run
    ShowRun {
        /// Result store directory
        store: PathBuf,
        /// Run ID to display
        run_id: String,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            source_dir,
            config,
            store,
            no_cache,
            output,
        } => cmd_extract(
            &source_dir,
            config.as_deref(),
            store,
            !no_cache,
            output.as_deref(),
        ),
        Commands::Borders {
            source_dir,
            config,
            store,
            output,
        } => cmd_borders(&source_dir, config.as_deref(), store, output.as_deref()),
        Commands::Decks { config, rerun_from } => {
            cmd_decks(config.as_deref(), rerun_from.as_deref()).map(|_| ())
        }
        Commands::Simulate {
            config,
            rerun_from,
            executable,
            timeout_s,
        } => cmd_simulate(
            config.as_deref(),
            rerun_from.as_deref(),
            executable,
            timeout_s,
        ),
        Commands::InitConfig { path, force } => cmd_init_config(&path, force),
        Commands::Runs { store } => cmd_runs(&store),
        Commands::ShowRun { store, run_id } => cmd_show_run(&store, &run_id),
    }
}

fn load_config(path: Option<&Path>) -> AppResult<PipelineConfig> {
    let config = pf_app::load_or_default(path)?;
    pf_app::validate_config(&config)?;
    tracing::debug!(?config, "loaded pipeline config");
    Ok(config)
}

/// Progress callback that redraws at most every 100 ms or on a stage change.
fn progress_renderer() -> impl FnMut(PipelineProgressEvent) {
    let mut last_emit = Instant::now();
    let mut last_stage = None;
    move |event| {
        let emit_now = last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
        if emit_now {
            render_cli_progress(&event);
            last_stage = Some(event.stage);
            last_emit = Instant::now();
        }
    }
}

fn cmd_extract(
    source_dir: &Path,
    config_path: Option<&Path>,
    store: Option<PathBuf>,
    use_cache: bool,
    output: Option<&Path>,
) -> AppResult<()> {
    println!("Extracting reports in: {}", source_dir.display());
    let config = load_config(config_path)?;

    let request = ExtractionRequest {
        source_dir,
        config: &config,
        options: ExtractionOptions {
            use_cache,
            store_dir: store,
        },
    };

    let mut render = progress_renderer();
    let response = pipeline_service::ensure_extraction_with_progress(&request, Some(&mut render))?;
    clear_progress_line();

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Extraction completed: {}", response.run_id);
        print_timing_summary(&response.timing);
    }

    let manifest = &response.manifest;
    println!("  Files: {}", manifest.files);
    println!("  Rows: {}", manifest.rows);
    println!(
        "  Dry mixture density: {} kg/m3",
        manifest.dry_mixture_density_kg_m3
    );
    print_file_list("Failed to read", &manifest.failed_files);
    print_file_list("Dropped (no vent diameter)", &manifest.dropped_no_vent);
    print_file_list("Unclassified (no regime threshold)", &manifest.unclassified);
    println!("  Table: {}", response.table_path.display());

    if let Some(path) = output {
        std::fs::copy(&response.table_path, path)?;
        println!("✓ Copied table to {}", path.display());
    }
    Ok(())
}

fn cmd_borders(
    source_dir: &Path,
    config_path: Option<&Path>,
    store: Option<PathBuf>,
    output: Option<&Path>,
) -> AppResult<()> {
    println!("Finding collapse borders in: {}", source_dir.display());
    let config = load_config(config_path)?;

    let request = ExtractionRequest {
        source_dir,
        config: &config,
        options: ExtractionOptions {
            use_cache: false,
            store_dir: store,
        },
    };

    let mut render = progress_renderer();
    let response =
        pipeline_service::find_collapse_borders_with_progress(&request, Some(&mut render))?;
    clear_progress_line();

    println!("✓ Borders stored: {}", response.run_id);
    if response.points.is_empty() {
        println!("  No collapse conditions found");
    } else {
        println!("  Collapse conditions: {}", response.points.len());
        for point in &response.points {
            println!(
                "    u={} m/s  T={} C  w={}  jump={:.3} km (threshold {:.3} km)",
                point.velocity_mps,
                point.temperature_c,
                point.water_fraction,
                point.jump_km,
                point.threshold_km
            );
        }
    }
    println!("  Table: {}", response.table_path.display());

    if let Some(path) = output {
        std::fs::copy(&response.table_path, path)?;
        println!("✓ Copied borders to {}", path.display());
    }
    Ok(())
}

fn planned_runs(config: &PipelineConfig, rerun_from: Option<&Path>) -> AppResult<Vec<RunSpec>> {
    match rerun_from {
        Some(dir) => {
            let extraction = pipeline_service::run_extraction(dir, config)?;
            let runs = deck_service::rerun_specs(&extraction.table, &config.borders);
            if runs.is_empty() {
                return Err(AppError::InvalidInput(format!(
                    "No rows in {} match the border conditions",
                    dir.display()
                )));
            }
            Ok(runs)
        }
        None => deck_service::plan_runs(&config.decks),
    }
}

fn cmd_decks(config_path: Option<&Path>, rerun_from: Option<&Path>) -> AppResult<Vec<PathBuf>> {
    let config = load_config(config_path)?;
    let runs = planned_runs(&config, rerun_from)?;

    let diameters = distinct_count(runs.iter().map(|r| r.vent_diameter_m));
    let decks = deck_service::generate_decks(&config.decks, &runs)?;
    println!(
        "✓ Wrote {} decks to {} ({} vent diameters)",
        decks.len(),
        config.decks.input_dir.display(),
        diameters
    );
    println!("  Simulator output: {}", config.decks.output_dir.display());
    Ok(decks)
}

fn cmd_simulate(
    config_path: Option<&Path>,
    rerun_from: Option<&Path>,
    executable: Option<PathBuf>,
    timeout_s: Option<f64>,
) -> AppResult<()> {
    let mut config = load_config(config_path)?;
    if executable.is_some() {
        config.simulator.executable = executable;
    }
    if let Some(timeout_s) = timeout_s {
        config.simulator.timeout_s = timeout_s;
    }
    pf_app::validate_config(&config)?;

    let runs = planned_runs(&config, rerun_from)?;
    let decks = deck_service::generate_decks(&config.decks, &runs)?;
    println!(
        "Running {} decks (timeout {:.3} s)",
        decks.len(),
        config.simulator.timeout_s
    );

    let started = Instant::now();
    let report = deck_service::simulate(&config.simulator, &decks)?;
    println!(
        "  Completed: {}/{} in {:.2}s",
        report.completed.len(),
        report.attempted,
        started.elapsed().as_secs_f64()
    );

    if report.all_completed() {
        println!("✓ All runs completed");
        return Ok(());
    }
    println!("  Failed runs:");
    for failed in &report.failed {
        println!("    {}: {}", failed.deck, failed.failure);
    }
    Err(AppError::BatchFailed {
        failed: report.failed.len(),
        attempted: report.attempted,
    })
}

fn cmd_init_config(path: &Path, force: bool) -> AppResult<()> {
    if path.exists() && !force {
        return Err(AppError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    pf_app::save_config(path, &PipelineConfig::default())?;
    println!("✓ Wrote default config to {}", path.display());
    Ok(())
}

fn cmd_runs(store: &Path) -> AppResult<()> {
    let runs = pipeline_service::list_runs(store)?;

    if runs.is_empty() {
        println!("No stored runs in: {}", store.display());
    } else {
        println!("Stored runs in '{}':", store.display());
        for manifest in runs {
            println!(
                "  {} {:?} ({}, {} rows)",
                manifest.run_id, manifest.kind, manifest.timestamp, manifest.rows
            );
        }
    }
    Ok(())
}

fn cmd_show_run(store: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, table) = pipeline_service::load_run(store, run_id)?;

    println!("\nRun Summary:");
    println!("  Kind: {:?}", manifest.kind);
    println!("  Created: {}", manifest.timestamp);
    println!("  Source: {}", manifest.source_dir);
    println!(
        "  Layout: {}{}",
        manifest.layout,
        if manifest.with_profile {
            " (with profile)"
        } else {
            ""
        }
    );
    println!("  Files: {}", manifest.files);
    println!("  Rows: {}", manifest.rows);
    println!("  Tool version: {}", manifest.tool_version);
    print_file_list("Failed to read", &manifest.failed_files);
    print_file_list("Dropped (no vent diameter)", &manifest.dropped_no_vent);
    print_file_list("Unclassified (no regime threshold)", &manifest.unclassified);

    if let Some(header) = table.lines().next() {
        let columns: Vec<&str> = header.split(',').collect();
        println!("\nColumns ({}):", columns.len());
        for column in columns {
            println!("  {}", column);
        }
    }

    Ok(())
}

fn print_file_list(title: &str, files: &[String]) {
    if files.is_empty() {
        return;
    }
    println!("  {} ({}):", title, files.len());
    for file in files {
        println!("    {}", file);
    }
}

fn distinct_count(values: impl Iterator<Item = f64>) -> usize {
    let mut bits: Vec<u64> = values.map(f64::to_bits).collect();
    bits.sort_unstable();
    bits.dedup();
    bits.len()
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &PipelineProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  elapsed={:.2}s",
        spinner[spin_idx],
        event.stage.label(),
        event.elapsed_wall_s
    );
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{}", line);
    let _ = io::stdout().flush();
}

fn print_timing_summary(timing: &PipelineTiming) {
    let total = timing.total_time_s.max(1.0e-12);
    let assemble_pct = 100.0 * timing.assemble_time_s / total;
    let derive_pct = 100.0 * timing.derive_time_s / total;
    let save_pct = 100.0 * timing.save_time_s / total;

    println!("\nTiming summary:");
    println!(
        "  Assemble: {:.3}s ({:.1}%)",
        timing.assemble_time_s, assemble_pct
    );
    println!("  Derive:   {:.3}s ({:.1}%)", timing.derive_time_s, derive_pct);
    println!("  Save:     {:.3}s ({:.1}%)", timing.save_time_s, save_pct);
    println!("  Total:    {:.3}s", timing.total_time_s);
}
