use mod_load_pipeline::compatibility::{
    CompatibilityDatabase, CompatibilityRecord, CompatibilityStatus,
};
use mod_load_pipeline::run_pipeline;
use mod_load_pipeline::version::SemanticVersion;
use std::fs;
use std::path::Path;

fn write_mod(root: &Path, folder: &str, manifest_json: &str) {
    let dir = root.join(folder);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("manifest.json"), manifest_json).unwrap();
    fs::write(dir.join("Entry.dll"), b"").unwrap();
}

fn no_update_url(_: &str) -> Option<String> {
    None
}

const FALLBACK: &str = "https://example.test/compat";

#[test]
fn s1_simple_chain_loads_in_dependency_order() {
    let root = tempfile::tempdir().unwrap();
    write_mod(
        root.path(),
        "A",
        r#"{"Name":"A","UniqueID":"a","Version":"1.0.0","EntryDll":"Entry.dll"}"#,
    );
    write_mod(
        root.path(),
        "B",
        r#"{"Name":"B","UniqueID":"b","Version":"1.0.0","EntryDll":"Entry.dll",
           "Dependencies":[{"UniqueID":"a","MinimumVersion":"1.0.0"}]}"#,
    );
    write_mod(
        root.path(),
        "C",
        r#"{"Name":"C","UniqueID":"c","Version":"1.0.0","EntryDll":"Entry.dll",
           "Dependencies":[{"UniqueID":"b","MinimumVersion":"1.0.0"}]}"#,
    );

    let result = run_pipeline(
        root.path(),
        &SemanticVersion::new(1, 0, 0),
        &CompatibilityDatabase::new(),
        &no_update_url,
        FALLBACK,
    )
    .unwrap();

    assert_eq!(result.len(), 3);
    assert!(result.iter().all(|m| m.is_found()));
    let names: Vec<&str> = result.iter().map(|m| m.display_name.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);
}

#[test]
fn s2_missing_required_dependency() {
    let root = tempfile::tempdir().unwrap();
    write_mod(
        root.path(),
        "A",
        r#"{"Name":"A","UniqueID":"a","Version":"1.0.0","EntryDll":"Entry.dll",
           "Dependencies":[{"UniqueID":"x"}]}"#,
    );

    let result = run_pipeline(
        root.path(),
        &SemanticVersion::new(1, 0, 0),
        &CompatibilityDatabase::new(),
        &no_update_url,
        FALLBACK,
    )
    .unwrap();

    assert_eq!(result.len(), 1);
    assert!(result[0].is_failed());
    assert_eq!(
        result[0].error(),
        Some("it requires mods which aren't installed (x)")
    );
}

#[test]
fn s3_version_shortfall_fails_dependent_only() {
    let root = tempfile::tempdir().unwrap();
    write_mod(
        root.path(),
        "A",
        r#"{"Name":"A","UniqueID":"a","Version":"1.0.0","EntryDll":"Entry.dll"}"#,
    );
    write_mod(
        root.path(),
        "B",
        r#"{"Name":"B","UniqueID":"b","Version":"1.0.0","EntryDll":"Entry.dll",
           "Dependencies":[{"UniqueID":"a","MinimumVersion":"2.0.0"}]}"#,
    );

    let result = run_pipeline(
        root.path(),
        &SemanticVersion::new(1, 0, 0),
        &CompatibilityDatabase::new(),
        &no_update_url,
        FALLBACK,
    )
    .unwrap();

    let a = result.iter().find(|m| m.display_name == "A").unwrap();
    let b = result.iter().find(|m| m.display_name == "B").unwrap();
    assert!(a.is_found());
    assert_eq!(
        b.error(),
        Some("it needs newer versions of some mods: A (needs 2.0.0 or later)")
    );
}

#[test]
fn s4_cycle_fails_every_member_and_terminates() {
    let root = tempfile::tempdir().unwrap();
    write_mod(
        root.path(),
        "A",
        r#"{"Name":"A","UniqueID":"a","Version":"1.0.0","EntryDll":"Entry.dll",
           "Dependencies":[{"UniqueID":"b"}]}"#,
    );
    write_mod(
        root.path(),
        "B",
        r#"{"Name":"B","UniqueID":"b","Version":"1.0.0","EntryDll":"Entry.dll",
           "Dependencies":[{"UniqueID":"a"}]}"#,
    );

    let result = run_pipeline(
        root.path(),
        &SemanticVersion::new(1, 0, 0),
        &CompatibilityDatabase::new(),
        &no_update_url,
        FALLBACK,
    )
    .unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|m| m.is_failed()));
}

#[test]
fn s5_assume_broken_builds_the_full_update_url_chain() {
    let root = tempfile::tempdir().unwrap();
    write_mod(
        root.path(),
        "A",
        r#"{"Name":"A","UniqueID":"a","Version":"1.5.0","EntryDll":"Entry.dll",
           "UpdateKeys":["Nexus:42"]}"#,
    );
    let db = CompatibilityDatabase::from_records([(
        "a".to_string(),
        CompatibilityRecord {
            status: CompatibilityStatus::AssumeBroken,
            reason_phrase: Some("crashes on load".to_string()),
            status_upper_version: Some(SemanticVersion::new(2, 0, 0)),
            alternative_url: Some("https://alt".to_string()),
            display_name: None,
            update_key: None,
        },
    )]);
    let update_url_for = |key: &str| -> Option<String> {
        assert_eq!(key, "Nexus:42");
        Some("https://nexus.../42".to_string())
    };

    let result = run_pipeline(
        root.path(),
        &SemanticVersion::new(1, 0, 0),
        &db,
        &update_url_for,
        "https://smapi.io/compat",
    )
    .unwrap();

    assert_eq!(
        result[0].error(),
        Some(
            "crashes on load. Please check for a version newer than 2.0.0 at https://nexus.../42 or https://alt or https://smapi.io/compat"
        )
    );
}

#[test]
fn s6_duplicate_unique_ids_fail_both_mods() {
    let root = tempfile::tempdir().unwrap();
    write_mod(
        root.path(),
        "A",
        r#"{"Name":"A","UniqueID":"com.example.foo","Version":"1.0.0","EntryDll":"Entry.dll"}"#,
    );
    write_mod(
        root.path(),
        "B",
        r#"{"Name":"B","UniqueID":"COM.EXAMPLE.FOO","Version":"1.0.0","EntryDll":"Entry.dll"}"#,
    );

    let result = run_pipeline(
        root.path(),
        &SemanticVersion::new(1, 0, 0),
        &CompatibilityDatabase::new(),
        &no_update_url,
        FALLBACK,
    )
    .unwrap();

    assert!(result.iter().all(|m| m.is_failed()));
    assert!(result
        .iter()
        .all(|m| m.error().unwrap().contains("is used by multiple mods")));
}

#[test]
fn conservation_no_mod_is_dropped() {
    let root = tempfile::tempdir().unwrap();
    write_mod(root.path(), "A", r#"{"Name":"A","UniqueID":"a","Version":"1.0.0"}"#);
    write_mod(root.path(), "B", r#"{"Name":"B","UniqueID":"b","Version":"1.0.0"}"#);
    fs::create_dir_all(root.path().join("NoManifestHere")).unwrap();

    let result = run_pipeline(
        root.path(),
        &SemanticVersion::new(1, 0, 0),
        &CompatibilityDatabase::new(),
        &no_update_url,
        FALLBACK,
    )
    .unwrap();

    assert_eq!(result.len(), 3);
}

#[test]
fn transitive_failure_propagates_to_dependents() {
    let root = tempfile::tempdir().unwrap();
    // A has a manifest with a registered unique_id but fails validation (no entry-point or
    // content-pack field), so it's Failed going into the resolver rather than missing entirely.
    write_mod(root.path(), "A", r#"{"Name":"A","UniqueID":"a","Version":"1.0.0"}"#);
    write_mod(
        root.path(),
        "B",
        r#"{"Name":"B","UniqueID":"b","Version":"1.0.0","EntryDll":"Entry.dll",
           "Dependencies":[{"UniqueID":"a"}]}"#,
    );

    let result = run_pipeline(
        root.path(),
        &SemanticVersion::new(1, 0, 0),
        &CompatibilityDatabase::new(),
        &no_update_url,
        FALLBACK,
    )
    .unwrap();

    let a = result.iter().find(|m| m.display_name == "A").unwrap();
    let b = result.iter().find(|m| m.display_name == "B").unwrap();
    assert!(a.is_failed());
    assert!(b.is_failed());
    assert_eq!(
        b.error(),
        Some("it needs the 'A' mod, which couldn't be loaded.")
    );
}

#[test]
fn determinism_repeated_runs_match() {
    let root = tempfile::tempdir().unwrap();
    write_mod(root.path(), "A", r#"{"Name":"A","UniqueID":"a","Version":"1.0.0","EntryDll":"Entry.dll"}"#);
    write_mod(
        root.path(),
        "B",
        r#"{"Name":"B","UniqueID":"b","Version":"1.0.0","EntryDll":"Entry.dll",
           "Dependencies":[{"UniqueID":"a"}]}"#,
    );

    let run = || {
        run_pipeline(
            root.path(),
            &SemanticVersion::new(1, 0, 0),
            &CompatibilityDatabase::new(),
            &no_update_url,
            FALLBACK,
        )
        .unwrap()
        .into_iter()
        .map(|m| (m.display_name, m.is_found()))
        .collect::<Vec<_>>()
    };

    assert_eq!(run(), run());
}

#[test]
fn missing_root_directory_is_a_fatal_pipeline_error() {
    let result = run_pipeline(
        Path::new("/definitely/does/not/exist/anywhere"),
        &SemanticVersion::new(1, 0, 0),
        &CompatibilityDatabase::new(),
        &no_update_url,
        FALLBACK,
    );
    assert!(result.is_err());
}
