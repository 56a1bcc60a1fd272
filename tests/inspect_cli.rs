//! Runs the `inspect` example against generated and unreadable stub files.

mod common;

use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

use espstubgen::pipeline::generate;
use espstubgen::targets::TargetSpec;

use common::{stub_assignment, stub_dict, stub_token};

/// `cargo test` builds examples into target/<profile>/examples/.
fn inspect_bin() -> PathBuf {
    let path = std::env::current_exe()
        .expect("Failed to get current exe")
        .parent()
        .expect("No parent")
        .parent()
        .expect("No grandparent")
        .join("examples")
        .join(format!("inspect{}", std::env::consts::EXE_SUFFIX));
    assert!(path.exists(), "inspect example not built at {:?}", path);
    path
}

#[test]
fn inspect_prints_stub_layout() {
    let dir = TempDir::new().unwrap();
    let targets = [TargetSpec::new("alpha", "ALPHA_MARKER")];
    let source = stub_assignment("ALPHA_MARKER", &stub_token(&stub_dict(b"AB", b"CDE")));
    generate(&source, &targets, dir.path()).unwrap();

    let output = Command::new(inspect_bin())
        .arg(dir.path().join("alpha.json"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Text size: 2 bytes"), "{}", stdout);
    assert!(stdout.contains("Data size: 3 bytes"), "{}", stdout);
}

#[test]
fn inspect_fails_on_missing_file() {
    let dir = TempDir::new().unwrap();

    let output = Command::new(inspect_bin())
        .arg(dir.path().join("absent.json"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error reading stub"));
}

#[test]
fn inspect_fails_on_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"text\": 5}").unwrap();

    let output = Command::new(inspect_bin()).arg(&path).output().unwrap();

    assert!(!output.status.success());
}
