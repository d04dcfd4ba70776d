//! CLI-level end-to-end tests: help/version output and basic flag wiring.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ulpcl_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_ulpcl"))
}

#[test]
fn help_output_mentions_usage() {
    let mut cmd = ulpcl_bin();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage").or(predicate::str::contains("ulpcl")));
}

#[test]
fn version_output_matches_package_version() {
    let mut cmd = ulpcl_bin();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn compiles_single_input_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("pack.ulp");
    std::fs::write(
        &input,
        r#"@language : "en" @lcid : "1033" { @content { #hello : "Hello" } }"#,
    )
    .unwrap();
    let out = dir.path().join("out");

    let mut cmd = ulpcl_bin();
    cmd.arg("--input")
        .arg(&input)
        .arg("--output-dir")
        .arg(&out);

    cmd.assert().success();
    assert!(out.join("pack.umc").exists());
}

#[test]
fn symbol_file_flag_emits_sym_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("pack.ulp");
    std::fs::write(
        &input,
        r#"@language : "en" @lcid : "1033" { @content { #hello : "Hello" } }"#,
    )
    .unwrap();
    let out = dir.path().join("out");

    let mut cmd = ulpcl_bin();
    cmd.arg("--input")
        .arg(&input)
        .arg("--output-dir")
        .arg(&out)
        .arg("--symbol-file");

    cmd.assert().success();
    assert!(out.join("pack.sym").exists());
}

#[test]
fn rejects_nonexistent_input() {
    let dir = TempDir::new().unwrap();
    let mut cmd = ulpcl_bin();
    cmd.arg("--input")
        .arg(dir.path().join("missing.ulp"))
        .arg("--output-dir")
        .arg(dir.path().join("out"));

    cmd.assert().failure();
}

#[test]
fn input_dir_discovers_all_packs() {
    let dir = TempDir::new().unwrap();
    for name in ["a.ulp", "b.ulp"] {
        std::fs::write(
            dir.path().join(name),
            r#"@language : "en" @lcid : "1033" { @content { #m : "v" } }"#,
        )
        .unwrap();
    }
    let out = dir.path().join("out");

    let mut cmd = ulpcl_bin();
    cmd.arg("--input-dir")
        .arg(dir.path())
        .arg("--output-dir")
        .arg(&out);

    cmd.assert().success();
    assert!(out.join("a.umc").exists());
    assert!(out.join("b.umc").exists());
}
