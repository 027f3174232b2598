//! Integration tests for the Sigillum CLI.
//!
//! Each test writes policy fixtures into a temporary directory, invokes the
//! `sigillum` binary via `assert_cmd`, and checks outputs and exit codes.

#![allow(deprecated)] // cargo_bin deprecation, macro replacement not yet stable

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

/// Convenience: get a `Command` for the `sigillum` binary.
fn sigillum() -> Command {
    Command::cargo_bin("sigillum").expect("sigillum binary not found")
}

fn org_policy() -> serde_json::Value {
    serde_json::json!({
        "format": 1,
        "roots": {
            "build": [
                {
                    "id": "https://github.com/actions/runner/github-hosted",
                    "name": "github_actions_level_3",
                    "slsaLevel": 3
                }
            ]
        }
    })
}

fn project_policy(uri: &str) -> serde_json::Value {
    serde_json::json!({
        "format": 1,
        "package": {
            "uri": uri,
            "environment": { "anyOf": ["dev", "prod"] }
        },
        "buildRequirements": {
            "requireSlsaBuilder": "github_actions_level_3",
            "repository": { "uri": "https://github.com/org/app" }
        }
    })
}

/// Write `org.json` and a `projects/` directory. Returns (org, projects).
fn write_fixtures(dir: &Path, projects: &[(&str, serde_json::Value)]) -> (PathBuf, PathBuf) {
    let org = dir.join("org.json");
    std::fs::write(&org, org_policy().to_string()).expect("write org");
    let projects_dir = dir.join("projects");
    std::fs::create_dir_all(&projects_dir).expect("mkdir");
    for (name, value) in projects {
        let path = projects_dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(path, value.to_string()).expect("write project");
    }
    (org, projects_dir)
}

// ─── validate tests ─────────────────────────────────────────

#[test]
fn validate_accepts_valid_policies() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (org, projects) = write_fixtures(
        dir.path(),
        &[
            ("app.json", project_policy("docker.io/org/app")),
            ("team/web.json", project_policy("docker.io/org/web")),
        ],
    );

    sigillum()
        .args(["release", "validate"])
        .arg(&org)
        .arg(&projects)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 project policies"));
}

#[test]
fn validate_json_prints_evidence() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (org, projects) =
        write_fixtures(dir.path(), &[("app.json", project_policy("docker.io/org/app"))]);

    let output = sigillum()
        .args(["release", "validate", "--json"])
        .arg(&org)
        .arg(&projects)
        .output()
        .expect("run");
    assert!(output.status.success());

    let evidence: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let org_sha = evidence["org"]["digest"]["sha256"].as_str().expect("sha256");
    assert_eq!(org_sha.len(), 64);
    assert_eq!(evidence.as_object().expect("object").len(), 2);
}

#[test]
fn validate_rejects_duplicate_packages() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (org, projects) = write_fixtures(
        dir.path(),
        &[
            ("a.json", project_policy("docker.io/org/app")),
            ("b.json", project_policy("docker.io/org/app")),
        ],
    );

    sigillum()
        .args(["release", "validate"])
        .arg(&org)
        .arg(&projects)
        .assert()
        .failure()
        .stderr(predicate::str::contains("more than one project policy"));
}

#[test]
fn validate_rejects_tagged_package() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (org, projects) =
        write_fixtures(dir.path(), &[("app.json", project_policy("docker.io/org/app:1.0"))]);

    sigillum()
        .args(["release", "validate"])
        .arg(&org)
        .arg(&projects)
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not pin a tag"));
}

#[test]
fn validate_rejects_unknown_builder() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut project = project_policy("docker.io/org/app");
    project["buildRequirements"]["requireSlsaBuilder"] = "nobody".into();
    let (org, projects) = write_fixtures(dir.path(), &[("app.json", project)]);

    sigillum()
        .args(["release", "validate"])
        .arg(&org)
        .arg(&projects)
        .assert()
        .failure();
}

#[test]
fn validate_rejects_malformed_org() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (org, projects) =
        write_fixtures(dir.path(), &[("app.json", project_policy("docker.io/org/app"))]);
    std::fs::write(&org, "{ not json").expect("overwrite org");

    sigillum()
        .args(["release", "validate"])
        .arg(&org)
        .arg(&projects)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid input"));
}

#[test]
fn validate_skips_org_inside_projects_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let org = dir.path().join("org.json");
    std::fs::write(&org, org_policy().to_string()).expect("write org");
    std::fs::write(
        dir.path().join("app.json"),
        project_policy("docker.io/org/app").to_string(),
    )
    .expect("write project");

    sigillum()
        .args(["release", "validate"])
        .arg(&org)
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 project policies"));
}

#[test]
fn validate_requires_two_paths() {
    sigillum()
        .args(["release", "validate", "only-one"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn validate_missing_org_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    sigillum()
        .args(["release", "validate"])
        .arg(dir.path().join("missing.json"))
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open organization policy"));
}

#[cfg(unix)]
#[test]
fn validate_checks_symlinked_project() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (org, projects) = write_fixtures(dir.path(), &[]);
    let shared = dir.path().join("shared.json");
    std::fs::write(&shared, project_policy("docker.io/org/app:1.0").to_string())
        .expect("write project");
    std::os::unix::fs::symlink(&shared, projects.join("app.json")).expect("symlink");

    sigillum()
        .args(["release", "validate"])
        .arg(&org)
        .arg(&projects)
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not pin a tag"));
}
