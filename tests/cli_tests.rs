use assert_cmd::Command;
use image::{ImageBuffer, Rgb};
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn write_image(dir: &Path, name: &str, width: u32, height: u32) {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 255) as u8, (y % 255) as u8, 32])
    });
    image::DynamicImage::ImageRgb8(img)
        .save(dir.join(name))
        .unwrap();
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("batchscale").unwrap();
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn test_missing_args_fails() {
    let mut cmd = Command::cargo_bin("batchscale").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_info_subcommand() {
    let mut cmd = Command::cargo_bin("batchscale").unwrap();
    cmd.arg("info");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Supported Formats"));
}

#[test]
fn test_example_config_generation() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("example.toml");

    let mut cmd = Command::cargo_bin("batchscale").unwrap();
    cmd.args(["example-config", "--output"]).arg(&config_path);
    cmd.assert().success();

    assert!(config_path.exists());

    // The generated file must validate
    let mut cmd = Command::cargo_bin("batchscale").unwrap();
    cmd.arg("config").arg(&config_path);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn test_dry_run_lists_candidates() {
    let source = TempDir::new().unwrap();
    write_image(source.path(), "one.png", 8, 8);
    let dest = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("batchscale").unwrap();
    cmd.arg("--input")
        .arg(source.path())
        .arg("--output")
        .arg(dest.path())
        .args(["--scale", "2.0", "--dry-run", "--quiet"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1 files would be processed"));

    // Dry run must not write anything
    assert_eq!(std::fs::read_dir(dest.path()).unwrap().count(), 0);
}

#[test]
fn test_end_to_end_resize() {
    let source = TempDir::new().unwrap();
    write_image(source.path(), "photo.png", 40, 20);
    let dest = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("batchscale").unwrap();
    cmd.arg("--input")
        .arg(source.path())
        .arg("--output")
        .arg(dest.path())
        .args(["--scale", "2.0", "--quiet"]);
    cmd.assert().success();

    let out = image::open(dest.path().join("photo.jpg")).unwrap();
    assert_eq!((out.width(), out.height()), (80, 40));
}

#[test]
fn test_json_output() {
    let source = TempDir::new().unwrap();
    write_image(source.path(), "photo.jpg", 10, 10);
    let dest = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("batchscale").unwrap();
    cmd.arg("--input")
        .arg(source.path())
        .arg("--output")
        .arg(dest.path())
        .args(["--scale", "1.0", "--json", "--quiet"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"saved\": 1"));
}

#[test]
fn test_missing_source_directory_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    let dest = dir.path().join("out");

    let mut cmd = Command::cargo_bin("batchscale").unwrap();
    cmd.arg("--input")
        .arg(&missing)
        .arg("--output")
        .arg(&dest)
        .args(["--scale", "2.0", "--quiet"]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_corrupt_input_yields_failure_exit_code() {
    let source = TempDir::new().unwrap();
    std::fs::write(source.path().join("broken.png"), b"not an image").unwrap();
    let dest = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("batchscale").unwrap();
    cmd.arg("--input")
        .arg(source.path())
        .arg("--output")
        .arg(dest.path())
        .args(["--scale", "2.0", "--quiet"]);
    cmd.assert().failure().code(2);
}
