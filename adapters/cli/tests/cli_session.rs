use std::{fs, path::PathBuf, process::Command};

fn horde() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_horde"));
    let _ = command.env_remove("RUST_LOG");
    command
}

fn scratch_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("horde-cli-{}-{name}.toml", std::process::id()));
    fs::write(&path, contents).expect("failed to write scratch config");
    path
}

#[test]
fn short_session_completes() {
    let output = horde()
        .args(["--waves", "3", "--wave-seconds", "1", "--seed", "9"])
        .output()
        .expect("failed to launch horde binary");

    assert!(output.status.success(), "horde should exit cleanly");
    let logs = String::from_utf8_lossy(&output.stdout);
    assert!(logs.contains("session finished"), "missing summary: {logs}");
}

#[test]
fn catalog_mode_runs_from_config_file() {
    let path = scratch_config(
        "catalog",
        r#"
        mode = "rule_catalog"
        waves = 2
        wave_seconds = 1.0
        "#,
    );

    let status = horde()
        .arg("--config")
        .arg(&path)
        .status()
        .expect("failed to launch horde binary");
    let _ = fs::remove_file(&path);

    assert!(status.success());
}

#[test]
fn unknown_override_template_is_rejected() {
    let path = scratch_config(
        "unknown",
        r#"
        mode = "rule_catalog"

        [[catalog.overrides]]
        template = "ghost"
        interval = 2
        "#,
    );

    let output = horde()
        .arg("--config")
        .arg(&path)
        .output()
        .expect("failed to launch horde binary");
    let _ = fs::remove_file(&path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ghost"), "unexpected error output: {stderr}");
}
