use pf_results::*;

fn manifest(run_id: &str, timestamp: &str, kind: RunKind) -> RunManifest {
    RunManifest {
        run_id: run_id.to_string(),
        kind,
        timestamp: timestamp.to_string(),
        source_dir: "out".to_string(),
        layout: "standard".to_string(),
        with_profile: false,
        files: 3,
        rows: 2,
        failed_files: vec!["run3.txt".to_string()],
        dropped_no_vent: vec!["run3.txt".to_string()],
        unclassified: vec![],
        dry_mixture_density_kg_m3: 2400.0,
        tool_version: "0.1.0".to_string(),
    }
}

#[test]
fn save_and_load_run() {
    let temp_dir = std::env::temp_dir().join("pf_results_test");
    let _ = std::fs::remove_dir_all(&temp_dir);

    let store = ResultStore::new(temp_dir.clone()).unwrap();
    let m = manifest("abc123", "2026-02-25T12:00:00+00:00", RunKind::Extraction);
    let csv = "vent diameter (m),regime\n50,dry\n";

    assert!(!store.has_run("abc123"));
    let path = store.save_run(&m, csv).unwrap();
    assert!(path.ends_with("abc123/table.csv"));
    assert!(store.has_run("abc123"));

    let loaded = store.load_manifest("abc123").unwrap();
    assert_eq!(loaded, m);
    assert_eq!(store.load_table("abc123").unwrap(), csv);

    let _ = std::fs::remove_dir_all(&temp_dir);
}

#[test]
fn list_and_delete_runs() {
    let temp_dir = std::env::temp_dir().join("pf_results_test_list");
    let _ = std::fs::remove_dir_all(&temp_dir);

    let store = ResultStore::new(temp_dir.clone()).unwrap();
    store
        .save_run(
            &manifest("later", "2026-03-01T00:00:00+00:00", RunKind::Borders { conditions: 4 }),
            "x\n",
        )
        .unwrap();
    store
        .save_run(
            &manifest("earlier", "2026-01-01T00:00:00+00:00", RunKind::Extraction),
            "y\n",
        )
        .unwrap();
    std::fs::create_dir_all(temp_dir.join("stray")).unwrap();

    let runs = store.list_runs().unwrap();
    let ids: Vec<_> = runs.iter().map(|m| m.run_id.as_str()).collect();
    assert_eq!(ids, ["earlier", "later"]);
    assert_eq!(store.load_table("later").unwrap(), "x\n");

    store.delete_run("later").unwrap();
    assert!(!store.has_run("later"));
    assert!(matches!(
        store.load_manifest("later"),
        Err(ResultsError::RunNotFound { .. })
    ));

    let _ = std::fs::remove_dir_all(&temp_dir);
}

#[test]
fn path_like_run_ids_rejected() {
    let temp_dir = std::env::temp_dir().join("pf_results_test_ids");
    let store = ResultStore::new(temp_dir.clone()).unwrap();
    assert!(matches!(
        store.load_manifest("../escape"),
        Err(ResultsError::InvalidRunId(_))
    ));
    assert!(!store.has_run(""));
    let _ = std::fs::remove_dir_all(&temp_dir);
}

#[test]
fn manifest_json_shape() {
    let m = manifest("abc", "2026-02-25T12:00:00+00:00", RunKind::Borders { conditions: 2 });
    let json = serde_json::to_value(&m).unwrap();
    assert_eq!(json["kind"]["type"], "Borders");
    assert_eq!(json["kind"]["conditions"], 2);
    assert!(json.get("unclassified").is_none());
}
