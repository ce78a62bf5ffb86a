use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use pf_app::{
    ExtractionOptions, ExtractionRequest, PipelineConfig, PipelineStage, ensure_extraction,
    ensure_extraction_with_progress, find_collapse_borders, find_collapse_borders_with_progress,
    list_runs, load_config, load_run, run_extraction, save_config, validate_config,
};
use pf_derive::Regime;
use pf_results::RunKind;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

/// Minimal simulator report: 7 banner lines, 13 header values, summary.
fn report(vent: f64, velocity: f64, temp: f64, rho: f64, water: f64, height: f64) -> String {
    let header = [0.0, 0.0, 1.0, vent, 0.0, velocity, temp, 0.03, 1000.0, 2500.0, rho, water, 1.0e8];
    let mut lines: Vec<String> = (0..7).map(|i| format!("  banner line {i}")).collect();
    for (i, v) in header.iter().enumerate() {
        lines.push(format!("  input value {i}:   {v}"));
    }
    lines.push(String::new());
    lines.push(format!("  calculated height =   {height} km"));
    lines.push(format!("  sparks height =   {} km", height - 1.0));
    lines.push(format!("  mastin et al 2009 height =   {} km", height - 2.0));
    lines.push("  Done.".to_string());
    lines.join("\n")
}

fn write_reports(dir: &Path) {
    fs::create_dir_all(dir).expect("failed to create temp dir");
    fs::write(dir.join("run1.txt"), report(50.0, 100.0, 900.0, 2400.0, 0.0, 20.0)).unwrap();
    fs::write(dir.join("run2.txt"), report(50.0, 100.0, 900.0, 1200.0, 0.1, 14.0)).unwrap();
    fs::write(dir.join("run3.txt"), "simulator crashed\n").unwrap();
}

#[test]
fn extraction_matches_dry_wet_scenario() {
    let dir = unique_temp_dir("pf_app_extract");
    write_reports(&dir);

    let extraction = run_extraction(&dir, &PipelineConfig::default()).expect("extraction");
    assert_eq!(extraction.report.files, 3);
    assert_eq!(extraction.report.dropped_no_vent, vec!["run3.txt".to_string()]);

    let table = &extraction.table;
    assert_eq!(table.dry_mixture_density, 2400.0);
    let b = &table.rows[1];
    assert_eq!(b.record.source, "run2.txt");
    assert_eq!(b.adjusted_vent_diameter, Some(33.5));
    assert_eq!(b.dry_plume_height, None);
    assert_eq!(b.regime, Some(Regime::Undetermined));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn second_extraction_is_served_from_cache() {
    let dir = unique_temp_dir("pf_app_cache");
    write_reports(&dir);
    let store_dir = dir.join("store");
    let config = PipelineConfig::default();

    let request = ExtractionRequest {
        source_dir: &dir,
        config: &config,
        options: ExtractionOptions {
            use_cache: true,
            store_dir: Some(store_dir.clone()),
        },
    };

    let mut stages = Vec::new();
    let first = ensure_extraction_with_progress(&request, Some(&mut |e| stages.push(e.stage)))
        .expect("first extraction");
    assert!(!first.loaded_from_cache);
    assert_eq!(first.manifest.kind, RunKind::Extraction);
    assert_eq!(first.manifest.rows, 2);
    assert_eq!(stages.first(), Some(&PipelineStage::ListingFiles));
    assert_eq!(stages.last(), Some(&PipelineStage::Completed));
    assert!(stages.contains(&PipelineStage::Deriving));

    let csv = fs::read_to_string(&first.table_path).expect("table written");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("run1.txt,"));
    assert!(lines[1].ends_with(",dry"));

    let second = ensure_extraction(&request).expect("second extraction");
    assert!(second.loaded_from_cache);
    assert_eq!(second.run_id, first.run_id);

    let runs = list_runs(&store_dir).expect("list runs");
    assert_eq!(runs.len(), 1);
    let (manifest, table) = load_run(&store_dir, &first.run_id).expect("load run");
    assert_eq!(manifest.rows, 2);
    assert_eq!(table, csv);

    // Changing the config changes the cache key.
    let mut other = PipelineConfig::default();
    other.derivation.gravity_mps2 = 9.8;
    let third = ensure_extraction(&ExtractionRequest {
        config: &other,
        ..request
    })
    .expect("third extraction");
    assert!(!third.loaded_from_cache);
    assert_ne!(third.run_id, first.run_id);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn same_size_rewrite_invalidates_cache() {
    let dir = unique_temp_dir("pf_app_rewrite");
    write_reports(&dir);
    let config = PipelineConfig::default();
    let request = ExtractionRequest {
        source_dir: &dir,
        config: &config,
        options: ExtractionOptions {
            store_dir: Some(dir.join("store")),
            ..Default::default()
        },
    };

    let first = ensure_extraction(&request).expect("first extraction");
    assert!(!first.loaded_from_cache);

    // Rerun output with a different height but identical byte length.
    let before = fs::metadata(dir.join("run2.txt")).unwrap().len();
    fs::write(dir.join("run2.txt"), report(50.0, 100.0, 900.0, 1200.0, 0.1, 15.0)).unwrap();
    assert_eq!(fs::metadata(dir.join("run2.txt")).unwrap().len(), before);

    let second = ensure_extraction(&request).expect("second extraction");
    assert!(!second.loaded_from_cache);
    assert_ne!(second.run_id, first.run_id);

    let csv = fs::read_to_string(&second.table_path).unwrap();
    let row = csv.lines().find(|l| l.starts_with("run2.txt,")).unwrap();
    assert!(row.contains(",15,14,13,"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn borders_run_is_stored() {
    let dir = unique_temp_dir("pf_app_borders");
    write_reports(&dir);
    let config = PipelineConfig::default();
    let request = ExtractionRequest {
        source_dir: &dir,
        config: &config,
        options: ExtractionOptions {
            use_cache: false,
            store_dir: Some(dir.join("store")),
        },
    };

    let mut stages = Vec::new();
    let response =
        find_collapse_borders_with_progress(&request, Some(&mut |e| stages.push(e.stage)))
            .expect("borders");
    assert!(stages.contains(&PipelineStage::DetectingBorders));
    assert_eq!(stages.last(), Some(&PipelineStage::Completed));
    assert_eq!(
        response.manifest.kind,
        RunKind::Borders {
            conditions: response.points.len()
        }
    );
    assert!(response.table_path.ends_with("borders.csv"));
    let csv = fs::read_to_string(&response.table_path).unwrap();
    assert!(csv.starts_with("file,initial velocity (m/s),"));

    // Same inputs, same id: the stored run is overwritten in place.
    let again = find_collapse_borders(&request).expect("borders again");
    assert_eq!(again.run_id, response.run_id);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn empty_directory_is_invalid_input() {
    let dir = unique_temp_dir("pf_app_empty");
    fs::create_dir_all(&dir).unwrap();
    let err = run_extraction(&dir, &PipelineConfig::default()).unwrap_err();
    assert!(matches!(err, pf_app::AppError::InvalidInput(_)));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn config_yaml_roundtrip() {
    let dir = unique_temp_dir("pf_app_config");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("plumeflow.yaml");

    let mut config = PipelineConfig::default();
    config.derivation.baseline_mass_flux_limit = Some(1.5e10);
    config.extraction.with_profile = true;
    save_config(&path, &config).expect("save config");

    let loaded = load_config(&path).expect("load config");
    assert_eq!(loaded, config);
    validate_config(&loaded).expect("valid config");

    assert!(matches!(
        load_config(&dir.join("missing.yaml")),
        Err(pf_app::AppError::ConfigFileRead { .. })
    ));

    let _ = fs::remove_dir_all(&dir);
}
