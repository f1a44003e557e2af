//! CLI command integration tests.
//! CURV_CONFIG is cleared so a developer's environment cannot leak in.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn curv_cmd() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("curv").unwrap();
    cmd.env_remove("CURV_CONFIG");
    cmd
}

#[test]
fn metric_minkowski_default() {
    curv_cmd()
        .arg("metric")
        .assert()
        .success()
        .stdout(predicate::str::contains("g_μν:"))
        .stdout(predicate::str::contains("-1.000000e0"))
        .stdout(predicate::str::contains("g^μν:"));
}

#[test]
fn metric_json_is_a_tensor_snapshot() {
    let output = curv_cmd()
        .args(["metric", "--json", "--spacetime", "sphere", "--param", "2"])
        .args(["--point", "1.0,0.0"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["metric"]["rank"], 2);
    assert_eq!(value["metric"]["variance"][0], "co");
    assert_eq!(value["inverse"]["variance"][0], "contra");
    assert_eq!(value["metric"]["components"][0], 4.0);
}

#[test]
fn christoffel_sphere_lists_nonzero_symbols() {
    curv_cmd()
        .args(["christoffel", "--spacetime", "sphere", "--point", "1.0,0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Γ^0_11"))
        .stdout(predicate::str::contains("Γ^1_01"))
        .stdout(predicate::str::contains("Γ^0_00").not());
}

#[test]
fn christoffel_minkowski_vanishes() {
    curv_cmd()
        .arg("christoffel")
        .assert()
        .success()
        .stdout(predicate::str::contains("(all Christoffel symbols vanish)"));
}

#[test]
fn curvature_minkowski_is_flat() {
    curv_cmd()
        .arg("curvature")
        .assert()
        .success()
        .stdout(predicate::str::contains("flat:          yes"))
        .stdout(predicate::str::contains("riemann flat:  yes"));
}

#[test]
fn curvature_de_sitter_json() {
    let output = curv_cmd()
        .args(["curvature", "--json", "--spacetime", "de-sitter", "--param", "0.5"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let scalar = value["ricciScalar"].as_f64().unwrap();
    assert!((scalar - 3.0).abs() < 1e-3, "R = 12 H² = 3, got {scalar}");
    assert_eq!(value["flat"], false);
}

#[test]
fn interval_classification() {
    curv_cmd()
        .args(["interval", "--tangent", "1,0.5,0,0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("interval:  timelike"))
        .stdout(predicate::str::contains("causal:    yes"));

    curv_cmd()
        .args(["interval", "--tangent", "1,1,0,0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("interval:  lightlike"));
}

#[test]
fn interval_json_spacelike() {
    let output = curv_cmd()
        .args(["interval", "--json", "--tangent", "0,-2,0,0"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["interval"], "spacelike");
    assert_eq!(value["causal"], false);
    assert_eq!(value["ds2"], 4.0);
}

#[test]
fn wrong_point_dimension_fails_with_context() {
    curv_cmd()
        .args(["curvature", "--spacetime", "schwarzschild", "--point", "0,3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to evaluate flatness"))
        .stderr(predicate::str::contains("shape mismatch"));
}

#[test]
fn curvature_at_horizon_fails_with_context() {
    curv_cmd()
        .args(["curvature", "--spacetime", "schwarzschild", "--point", "0,1,1,0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to evaluate flatness"))
        .stderr(predicate::str::contains("singular"));
}

#[test]
fn singular_point_fails() {
    curv_cmd()
        .args(["metric", "--spacetime", "schwarzschild", "--point", "0,1,1,0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("singular"));
}

#[test]
fn config_file_is_honored() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("curv.toml");
    // a huge tolerance hides every symbol
    std::fs::write(&path, "tolerance = 10.0\n\n[differentiation]\nmetric_step = 1e-6\n").unwrap();

    curv_cmd()
        .args(["christoffel", "--spacetime", "sphere", "--point", "1.0,0.0"])
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("(all Christoffel symbols vanish)"));
}

#[test]
fn config_from_environment() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("curv.toml");
    std::fs::write(&path, "tolerance = 10.0\n").unwrap();

    curv_cmd()
        .env("CURV_CONFIG", &path)
        .args(["christoffel", "--spacetime", "sphere", "--point", "1.0,0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(all Christoffel symbols vanish)"));
}

#[test]
fn invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[differentiation]\nmetric_step = -1.0\n").unwrap();

    curv_cmd()
        .arg("metric")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}
