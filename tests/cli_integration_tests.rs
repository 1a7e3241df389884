// End-to-end tests for the wp binary
// Each test runs in its own temporary directory so config and case files stay isolated

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn wp(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("wp").unwrap();
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .env("WORLD_PROPERTY_LEGAL_AI__SIMULATED_LATENCY_MS", "0");
    cmd
}

fn open_case(dir: &Path) -> String {
    let output = wp(dir)
        .args([
            "open",
            "--offer-id",
            "offer-1",
            "--property-id",
            "prop-1",
            "--amount",
            "45000000",
            "--currency",
            "GBP",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    stdout
        .lines()
        .find(|line| line.contains("Case:"))
        .and_then(|line| line.split_whitespace().last())
        .map(str::to_string)
        .expect("case id in output")
}

#[test]
fn test_no_subcommand_shows_getting_started() {
    let temp_dir = TempDir::new().unwrap();
    wp(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("wp stages"))
        .stdout(predicate::str::contains("wp open"));
}

#[test]
fn test_stages_lists_workflow_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let output = wp(temp_dir.path()).arg("stages").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let positions: Vec<usize> = [
        "1. OfferCreated",
        "2. AIConsultation",
        "3. LegalPackRequested",
        "4. DueDiligence",
        "5. Contracts",
        "6. Completion",
    ]
    .iter()
    .map(|needle| stdout.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
    .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_case_lifecycle_persists_between_runs() {
    let temp_dir = TempDir::new().unwrap();
    let case_id = open_case(temp_dir.path());

    wp(temp_dir.path())
        .args(["advance", &case_id, "AIConsultation", "--actor", "buyer-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OfferCreated → AIConsultation"));

    wp(temp_dir.path())
        .args(["status", &case_id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stage: AIConsultation (2/6)"))
        .stdout(predicate::str::contains("Version: 2"));

    let audit_log = temp_dir.path().join(".world-property/audit.jsonl");
    let audit = std::fs::read_to_string(audit_log).unwrap();
    assert_eq!(audit.lines().count(), 2);
    assert!(audit.contains("legal.case.advanced"));
}

#[test]
fn test_skipping_a_stage_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let case_id = open_case(temp_dir.path());

    wp(temp_dir.path())
        .args(["advance", &case_id, "Contracts"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Transition rejected"))
        .stdout(predicate::str::contains("remains at OfferCreated"));

    wp(temp_dir.path())
        .args(["advance", &case_id, "Escrow"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Transition rejected"));
}

#[test]
fn test_invalid_offer_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    wp(temp_dir.path())
        .args([
            "open",
            "--offer-id",
            "offer-1",
            "--property-id",
            "prop-1",
            "--amount",
            "-5",
            "--currency",
            "pounds",
        ])
        .assert()
        .failure()
        .stdout(predicate::str::contains("amount_minor: must be positive"));
}

#[test]
fn test_status_of_unknown_case_fails() {
    let temp_dir = TempDir::new().unwrap();
    wp(temp_dir.path())
        .args(["status", "missing-case"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Legal case not found"));
}

#[test]
fn test_memory_backend_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("world-property.toml"),
        "[store]\nbackend = \"memory\"\ndirectory = \"unused\"\n",
    )
    .unwrap();

    open_case(temp_dir.path());
    assert!(!temp_dir.path().join("unused").exists());
    wp(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("LEGAL CASES (0)"));
}

#[test]
fn test_convert_uses_mock_rates() {
    let temp_dir = TempDir::new().unwrap();
    wp(temp_dir.path())
        .args(["convert", "100", "gbp", "EUR"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100.00 GBP = 117.00 EUR"));

    wp(temp_dir.path())
        .args(["convert", "100", "GBP", "XYZ"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Supported currencies"));
}

#[test]
fn test_consult_returns_brief() {
    let temp_dir = TempDir::new().unwrap();
    let case_id = open_case(temp_dir.path());

    wp(temp_dir.path())
        .args(["consult", &case_id, "--country", "gb"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CLARIFYING QUESTIONS"))
        .stdout(predicate::str::contains("Recommended next stage: LegalPackRequested"));
}

#[test]
fn test_playbook_validation() {
    let temp_dir = TempDir::new().unwrap();
    let sample = Path::new(env!("CARGO_MANIFEST_DIR")).join("playbooks/gb.toml");

    wp(temp_dir.path())
        .args(["playbook", "validate"])
        .arg(&sample)
        .assert()
        .success()
        .stdout(predicate::str::contains("Playbook for GB is valid"));

    let broken = temp_dir.path().join("broken.toml");
    std::fs::write(
        &broken,
        "country_code = \"gb\"\nstages = [\"Contracts\", \"OfferCreated\"]\ntypical_timeline_days = 0\n",
    )
    .unwrap();

    wp(temp_dir.path())
        .args(["playbook", "validate"])
        .arg(&broken)
        .assert()
        .failure()
        .stdout(predicate::str::contains("country_code"))
        .stdout(predicate::str::contains("typical_timeline_days"));
}
