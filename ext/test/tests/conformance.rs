//! Conformance tests that run YAML fixtures against rematch
//!
//! Run with: cargo test -p rematch-test --test conformance --features rematch-test/fixtures
//!
//! Note: This test file requires the `fixtures` feature to be enabled.

#![cfg(feature = "fixtures")]

use rematch_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

/// The workspace `fixtures/` directory
fn fixtures_dir() -> PathBuf {
    // The manifest dir is ext/test; the workspace root is two levels up
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let root = manifest_dir
        .parent() // ext
        .and_then(Path::parent) // workspace
        .expect("Could not find workspace root");

    root.join("fixtures")
}

/// Load and run every fixture in one file
fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    println!("Running fixture file: {}", path.display());

    let yaml = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));

    // Parse potentially multiple fixtures (separated by ---)
    let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
        panic!("Failed to parse {}: {}", path.display(), e);
    });
    assert!(!fixtures.is_empty(), "{} has no fixtures", path.display());

    for fixture in fixtures {
        println!("  Running: {}", fixture.name);
        fixture.run_and_assert();
    }
}

#[test]
fn test_structural() {
    run_fixture_file("structural.yaml");
}

#[test]
fn test_quantifiers() {
    run_fixture_file("quantifiers.yaml");
}

#[test]
fn test_combinators() {
    run_fixture_file("combinators.yaml");
}

#[test]
fn test_registry() {
    run_fixture_file("registry.yaml");
}

#[test]
fn every_fixture_file_is_covered() {
    let mut files: Vec<String> = fs::read_dir(fixtures_dir())
        .expect("read fixtures dir")
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            let is_yaml = path
                .extension()
                .is_some_and(|e| e == "yaml" || e == "yml");
            is_yaml.then(|| path.file_name()?.to_str().map(str::to_owned))?
        })
        .collect();
    files.sort();
    assert_eq!(
        files,
        [
            "combinators.yaml",
            "quantifiers.yaml",
            "registry.yaml",
            "structural.yaml"
        ]
    );
}
