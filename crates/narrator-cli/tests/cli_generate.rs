use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

fn narrator(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("narrator").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("ELEVENLABS_API_KEY")
        .env_remove("NARRATOR_LOG");
    cmd
}

fn write_script(dir: &TempDir) {
    fs::write(
        dir.path().join("dialogs.yaml"),
        r#"
version: 1
dialogs:
  - id: one
    text: "Hmm."
  - id: pause
    text: "..."
  - id: again
    text: "Hmm."
  - id: two
    text: "Hello, World!"
"#,
    )
    .unwrap();
}

#[test]
fn test_placeholder_generation_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write_script(&dir);

    narrator(&dir)
        .args(["generate", "--placeholder", "--out", "audio"])
        .assert()
        .success()
        .stderr(contains("placeholder=2 skipped=0 silence=1"));

    assert!(dir.path().join("audio/dialog_2253126.mp3").is_file());
    assert!(dir.path().join("audio/dialog_1498789909.mp3").is_file());
    assert!(dir.path().join("audio/silent.mp3").is_file());

    narrator(&dir)
        .args(["generate", "--placeholder", "--out", "audio", "--report", "out/report.json"])
        .assert()
        .success()
        .stderr(contains("placeholder=0 skipped=2 silence=1"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("out/report.json")).unwrap())
            .unwrap();
    assert_eq!(report["skipped"], 2);
    assert_eq!(report["items"][0]["outcome"], "skipped");
    assert_eq!(report["items"][0]["fingerprint"], "2253126");
}

#[test]
fn test_live_generation_without_key_is_config_error() {
    let dir = TempDir::new().unwrap();
    write_script(&dir);

    narrator(&dir)
        .args(["generate", "--out", "audio"])
        .assert()
        .code(2)
        .stderr(contains("ELEVENLABS_API_KEY"));

    assert!(!dir.path().join("audio").exists());
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    write_script(&dir);

    narrator(&dir)
        .args(["generate", "--dry-run", "--out", "audio"])
        .assert()
        .success()
        .stderr(contains("planned=2"));

    assert!(!dir.path().join("audio").exists());
}

#[test]
fn test_bad_script_is_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("dialogs.yaml"), "version: 1\ndialogs: []\n").unwrap();

    narrator(&dir)
        .args(["generate", "--placeholder"])
        .assert()
        .code(2)
        .stderr(contains("script has no dialogs"));
}

#[test]
fn test_init_then_generate() {
    let dir = TempDir::new().unwrap();

    narrator(&dir).arg("init").assert().success().stderr(contains("created dialogs.yaml"));
    narrator(&dir).arg("init").assert().success().stderr(contains("already exists"));

    narrator(&dir)
        .args(["generate", "--placeholder"])
        .assert()
        .success();
    assert!(dir
        .path()
        .join("public/audio/dialog/dialog_2067526406.mp3")
        .is_file());
}
