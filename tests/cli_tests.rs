//! Binary smoke tests

use assert_cmd::Command;
use tempfile::TempDir;

fn overlay_render() -> Command {
    Command::cargo_bin("overlay-render").unwrap()
}

#[test]
fn test_help_lists_commands() {
    let output = overlay_render().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["render", "detect", "badge"] {
        assert!(stdout.contains(command), "missing {} in help", command);
    }
}

#[test]
fn test_detect_without_ffmpeg_reports_software() {
    let output = overlay_render()
        .args(["detect", "--ffmpeg", "/nonexistent/ffmpeg"])
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert!(output.status.success());

    let capability: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(capability, serde_json::json!({"type": "none", "available": false}));
}

#[test]
fn test_badge_command_writes_png() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("badge.png");

    overlay_render()
        .args(["badge", "--size", "64", "--output"])
        .arg(&path)
        .assert()
        .success();

    let badge = image::open(&path).unwrap().to_rgba8();
    assert_eq!(badge.dimensions(), (64, 64));
}

#[test]
fn test_render_rejects_missing_input() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("render.toml");
    std::fs::write(
        &config,
        format!(
            "[output]\noutput_dir = {:?}\nscratch_dir = {:?}\n",
            dir.path().join("out"),
            dir.path().join("scratch")
        ),
    )
    .unwrap();

    overlay_render()
        .args(["render", "--input", "/nonexistent/video.mp4", "--overlays"])
        .arg(r#"[{"type":"text","startTime":0,"endTime":1,"x":50,"y":50,"text":"Hi"}]"#)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();
}

#[test]
fn test_badge_size_is_range_checked() {
    overlay_render()
        .args(["badge", "--output", "badge.png", "--size", "4"])
        .assert()
        .failure();
}
