//! CLI integration tests for chaoscrypt.
//!
//! These tests run the actual binary and check outputs, exit codes, and
//! file artifacts.

use assert_cmd::Command;
use image::{GrayImage, Luma, Rgb, RgbImage};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a Command for the chaoscrypt binary.
fn chaoscrypt() -> Command {
    Command::cargo_bin("chaoscrypt").unwrap()
}

fn rgb_fixture(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(24, 16, |x, y| Rgb([(x * 10) as u8, (y * 15) as u8, ((x + y) * 5) as u8]))
        .save(&path)
        .unwrap();
    path
}

fn gray_fixture(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    GrayImage::from_fn(20, 20, |x, y| Luma([((x * y) % 256) as u8]))
        .save(&path)
        .unwrap();
    path
}

fn pixels(path: &Path) -> Vec<u8> {
    chaoscrypt_core::Image::open(path).unwrap().into_data()
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_displays_usage() {
    chaoscrypt()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chaotic-map image encryption"))
        .stdout(predicate::str::contains("encrypt"))
        .stdout(predicate::str::contains("decrypt"))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("algorithms"));
}

#[test]
fn test_version_displays_version() {
    chaoscrypt()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("chaoscrypt"));
}

#[test]
fn test_help_shows_exit_codes() {
    chaoscrypt()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exit codes:"))
        .stdout(predicate::str::contains("64"))
        .stdout(predicate::str::contains("66"));
}

#[test]
fn test_encrypt_help_shows_options() {
    chaoscrypt()
        .args(["encrypt", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--key"))
        .stdout(predicate::str::contains("--algorithm"))
        .stdout(predicate::str::contains("--nonce"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_missing_required_args_is_rejected_by_clap() {
    chaoscrypt()
        .args(["encrypt", "photo.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--key"));
}

// ============================================================================
// Algorithms Command Tests
// ============================================================================

#[test]
fn test_algorithms_lists_every_family() {
    let assert = chaoscrypt().arg("algorithms").assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    for id in ["logistic", "fodhnn", "2dlasm", "bulban", "acm_2dscl"] {
        assert!(stdout.contains(id), "{id} missing from:\n{stdout}");
    }
}

#[test]
fn test_algorithms_quiet_prints_bare_ids() {
    chaoscrypt()
        .args(["algorithms", "--quiet"])
        .assert()
        .success()
        .stdout("logistic\nfodhnn\n2dlasm\nbulban\nacm_2dscl\n");
}

// ============================================================================
// Encrypt Command Tests
// ============================================================================

#[test]
fn test_encrypt_writes_ciphertext_and_sidecar() {
    let temp = TempDir::new().unwrap();
    let input = rgb_fixture(temp.path(), "photo.png");

    chaoscrypt()
        .args(["encrypt", "-k", "secret", "-a", "2dlasm", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Image encrypted!"))
        .stdout(predicate::str::contains("Nonce:"))
        .stdout(predicate::str::contains("NPCR:"));

    let output = temp.path().join("photo.enc.png");
    assert!(output.exists(), "ciphertext should exist");
    assert_ne!(pixels(&output), pixels(&input));

    let sidecar: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(temp.path().join("photo.enc.png.chaos.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(sidecar["algorithm"], "2dlasm");
    assert!(sidecar["nonce"].as_str().is_some_and(|n| n.len() == 32));
    assert!(sidecar["metrics"]["npcr"].as_f64().unwrap() > 90.0);
}

#[test]
fn test_encrypt_json_output() {
    let temp = TempDir::new().unwrap();
    let input = gray_fixture(temp.path(), "scan.png");
    let output = temp.path().join("cipher.png");

    let assert = chaoscrypt()
        .args([
            "encrypt",
            "--key",
            "secret",
            "--algorithm",
            "logistic",
            "--json",
            "--output",
            output.to_str().unwrap(),
            input.to_str().unwrap(),
        ])
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["algorithm"], "logistic");
    assert!(report["nonce"].is_null(), "logistic never echoes a nonce");
    assert!(report["metrics"]["entropy_encrypted"].as_f64().unwrap() > 0.0);
    assert!(output.exists());
}

#[test]
fn test_encrypt_quiet_prints_nothing() {
    let temp = TempDir::new().unwrap();
    let input = gray_fixture(temp.path(), "scan.png");

    chaoscrypt()
        .args(["-q", "encrypt", "-k", "k", "-a", "logistic", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_encrypt_missing_file_exit_66() {
    chaoscrypt()
        .args(["encrypt", "-k", "k", "-a", "logistic", "/nonexistent/photo.png"])
        .assert()
        .code(66)
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_encrypt_unknown_algorithm_exit_64() {
    let temp = TempDir::new().unwrap();
    let input = gray_fixture(temp.path(), "scan.png");

    chaoscrypt()
        .args(["encrypt", "-k", "k", "-a", "rot13", input.to_str().unwrap()])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("rot13"));
}

#[test]
fn test_encrypt_empty_key_exit_64() {
    let temp = TempDir::new().unwrap();
    let input = gray_fixture(temp.path(), "scan.png");

    chaoscrypt()
        .args(["encrypt", "-k", "", "-a", "logistic", input.to_str().unwrap()])
        .assert()
        .code(64);
}

#[test]
fn test_encrypt_not_an_image_exit_65() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("notes.png");
    fs::write(&input, b"definitely not a PNG").unwrap();

    chaoscrypt()
        .args(["encrypt", "-k", "k", "-a", "logistic", input.to_str().unwrap()])
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Failed to decode image"));
}

#[test]
fn test_encrypt_unwritable_output_exit_74() {
    let temp = TempDir::new().unwrap();
    let input = gray_fixture(temp.path(), "scan.png");
    let output = temp.path().join("missing-dir").join("cipher.png");

    chaoscrypt()
        .args([
            "encrypt",
            "-k",
            "k",
            "-a",
            "logistic",
            "-o",
            output.to_str().unwrap(),
            input.to_str().unwrap(),
        ])
        .assert()
        .code(74);
}

#[test]
fn test_encrypt_sidecar_failure_leaves_no_ciphertext() {
    let temp = TempDir::new().unwrap();
    let input = gray_fixture(temp.path(), "scan.png");
    let output = temp.path().join("cipher.png");
    // A directory squatting on the sidecar path makes the sidecar write fail
    fs::create_dir(temp.path().join("cipher.png.chaos.json")).unwrap();

    chaoscrypt()
        .args([
            "encrypt",
            "-k",
            "k",
            "-a",
            "fodhnn",
            "-o",
            output.to_str().unwrap(),
            input.to_str().unwrap(),
        ])
        .assert()
        .code(74)
        .stderr(predicate::str::contains("Failed to write sidecar"));

    assert!(!output.exists(), "ciphertext written without its nonce");
}

#[test]
fn test_encrypt_image_failure_removes_sidecar() {
    let temp = TempDir::new().unwrap();
    let input = gray_fixture(temp.path(), "scan.png");
    // The output path is a directory, so only the image write fails
    let output = temp.path().join("taken");
    fs::create_dir(&output).unwrap();

    chaoscrypt()
        .args([
            "encrypt",
            "-k",
            "k",
            "-a",
            "2dlasm",
            "-o",
            output.to_str().unwrap(),
            input.to_str().unwrap(),
        ])
        .assert()
        .code(74)
        .stderr(predicate::str::contains("Failed to write file"));

    assert!(!temp.path().join("taken.chaos.json").exists());
}

// ============================================================================
// Decrypt Command Tests
// ============================================================================

#[test]
fn test_decrypt_uses_sidecar() {
    let temp = TempDir::new().unwrap();
    let input = rgb_fixture(temp.path(), "photo.png");

    chaoscrypt()
        .args(["encrypt", "-k", "secret", "-a", "acm_2dscl", input.to_str().unwrap()])
        .assert()
        .success();

    let cipher = temp.path().join("photo.enc.png");
    chaoscrypt()
        .args(["decrypt", "-k", "secret", cipher.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Image decrypted!"));

    assert_eq!(pixels(&temp.path().join("photo.dec.png")), pixels(&input));
}

#[test]
fn test_decrypt_without_sidecar_or_algorithm_exit_64() {
    let temp = TempDir::new().unwrap();
    let input = gray_fixture(temp.path(), "scan.png");

    chaoscrypt()
        .args(["decrypt", "-k", "k", input.to_str().unwrap()])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("No algorithm given"));
}

#[test]
fn test_decrypt_missing_nonce_exit_64() {
    let temp = TempDir::new().unwrap();
    let input = gray_fixture(temp.path(), "scan.png");

    chaoscrypt()
        .args(["decrypt", "-k", "k", "-a", "fodhnn", input.to_str().unwrap()])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("fodhnn"));
}

#[test]
fn test_decrypt_colour_input_for_grayscale_family_exit_65() {
    let temp = TempDir::new().unwrap();
    let input = rgb_fixture(temp.path(), "photo.png");

    chaoscrypt()
        .args(["decrypt", "-k", "k", "-a", "bulban", input.to_str().unwrap()])
        .assert()
        .code(65);
}

// ============================================================================
// Analyze Command Tests
// ============================================================================

#[test]
fn test_analyze_json_reports_metrics() {
    let temp = TempDir::new().unwrap();
    let input = gray_fixture(temp.path(), "scan.png");

    chaoscrypt()
        .args(["encrypt", "-k", "k", "-a", "bulban", input.to_str().unwrap()])
        .assert()
        .success();

    let cipher = temp.path().join("scan.enc.png");
    let assert = chaoscrypt()
        .args(["analyze", "--json", input.to_str().unwrap(), cipher.to_str().unwrap()])
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert!(report["metrics"]["npcr"].as_f64().unwrap() > 90.0);
    assert!(report["psnr"].as_f64().unwrap() < 20.0);
    assert!(report["histogram_correlation"].is_number());
    assert_eq!(report["geometry"]["width"], 20);
}

#[test]
fn test_analyze_identical_images() {
    let temp = TempDir::new().unwrap();
    let input = rgb_fixture(temp.path(), "photo.png");

    chaoscrypt()
        .args(["analyze", input.to_str().unwrap(), input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("identical"));
}

#[test]
fn test_analyze_mismatched_sizes_exit_65() {
    let temp = TempDir::new().unwrap();
    let a = rgb_fixture(temp.path(), "a.png");
    let b = gray_fixture(temp.path(), "b.png");

    chaoscrypt()
        .args(["analyze", a.to_str().unwrap(), b.to_str().unwrap()])
        .assert()
        .code(65);
}
