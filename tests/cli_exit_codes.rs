use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use dinspect_lib::output::PromptKind;
use dinspect_lib::types::{BoundingBox, ComputedStyle, DomNode, ResourceKind};
use dinspect_lib::{save_snapshot, DinspectOutput, PageSnapshot};
use tempfile::TempDir;

fn node(id: &str, tag: &str, parent: Option<&str>, children: &[&str]) -> DomNode {
    let mut node = DomNode::new(id, tag);
    node.parent = parent.map(str::to_string);
    node.children = children.iter().map(|c| c.to_string()).collect();
    node
}

/// A small page: optional title, an H1 hero with styles and a CTA button.
fn page(title: &str) -> PageSnapshot {
    let mut snapshot = PageSnapshot::new("https://example.com/");
    snapshot.title = title.to_string();

    let html = node("n0", "html", None, &["n1"]);
    let body = node("n1", "body", Some("n0"), &["n2", "n3"]);

    let mut hero = node("n2", "h1", Some("n1"), &[]);
    hero.attributes.insert("class".into(), "hero".into());
    hero.text = Some("Welcome".into());
    hero.bounding_box = BoundingBox::new(0.0, 0.0, 400.0, 60.0);
    hero.computed_style = Some(ComputedStyle::from_iter([
        ("font-family", "Inter, sans-serif"),
        ("font-weight", "700"),
        ("font-size", "48px"),
        ("color", "rgb(17, 24, 39)"),
        ("background-color", "rgb(255, 255, 255)"),
        ("padding-top", "16px"),
        ("margin-bottom", "24px"),
    ]));

    let mut cta = node("n3", "button", Some("n1"), &[]);
    cta.attributes.insert("id".into(), "cta".into());
    cta.text = Some("Start".into());
    cta.bounding_box = BoundingBox::new(0.0, 100.0, 120.0, 40.0);
    cta.computed_style = Some(ComputedStyle::from_iter([
        ("color", "rgb(255, 255, 255)"),
        ("background-color", "rgb(59, 130, 246)"),
    ]));

    snapshot.nodes = vec![html, body, hero, cta];
    snapshot
}

fn write_page(dir: &TempDir, title: &str) -> PathBuf {
    let path = dir.path().join("page.json");
    save_snapshot(&path, &page(title)).expect("write snapshot");
    path
}

/// Empty config so a central config on the machine never leaks in.
fn write_config(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("dinspect.toml");
    std::fs::write(&path, "").expect("write config");
    path
}

fn run(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dinspect"))
        .arg("--config")
        .arg(write_config(dir))
        .args(args)
        .env_remove("GEMINI_API_KEY")
        .env_remove("PORT")
        .env_remove("DINSPECT_BACKEND_URL")
        .output()
        .expect("run dinspect")
}

fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}

fn parse(stdout: &[u8]) -> DinspectOutput {
    serde_json::from_slice(stdout).expect("output should be valid JSON")
}

#[test]
fn inspect_snapshot_exits_zero() {
    let dir = TempDir::new().expect("tempdir");
    let snapshot = write_page(&dir, "Fixture");

    let output = run(&dir, &["inspect", path_arg(&snapshot), "--palette-css"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    match parse(&output.stdout) {
        DinspectOutput::Inspect(out) => {
            assert!(matches!(out.source.kind, ResourceKind::Snapshot));
            assert_eq!(out.data.meta.title, "Fixture");
            assert!(out.data.fonts.iter().any(|f| f.family == "Inter"));
            assert!(out.data.colors.iter().any(|c| c.hex == "#3B82F6"));
            assert!(out.palette_css.unwrap_or_default().contains("--color-1"));
        }
        other => panic!("expected inspect output, got {other:?}"),
    }
}

#[test]
fn inspect_only_limits_extractors() {
    let dir = TempDir::new().expect("tempdir");
    let snapshot = write_page(&dir, "Fixture");

    let output = run(&dir, &["inspect", path_arg(&snapshot), "--only", "spacing"]);
    assert_eq!(output.status.code(), Some(0));

    match parse(&output.stdout) {
        DinspectOutput::Inspect(out) => {
            assert!(out.data.fonts.is_empty());
            assert!(out.data.red_flags.is_empty());
            assert_eq!(out.data.spacing, vec![16, 24]);
        }
        other => panic!("expected inspect output, got {other:?}"),
    }
}

#[test]
fn flags_without_threshold_exit_zero() {
    let dir = TempDir::new().expect("tempdir");
    let snapshot = write_page(&dir, "");

    let output = run(&dir, &["flags", path_arg(&snapshot)]);
    assert_eq!(output.status.code(), Some(0));

    match parse(&output.stdout) {
        DinspectOutput::Flags(out) => {
            assert!(out.passed);
            assert!(out.red_flags.iter().any(|f| f.id == "seo-missing-title"));
        }
        other => panic!("expected flags output, got {other:?}"),
    }
}

#[test]
fn flags_exit_one_when_threshold_reached() {
    let dir = TempDir::new().expect("tempdir");
    let snapshot = write_page(&dir, "");

    let output = run(&dir, &["flags", path_arg(&snapshot), "--fail-on", "critical"]);
    assert_eq!(output.status.code(), Some(1));

    match parse(&output.stdout) {
        DinspectOutput::Flags(out) => {
            assert!(!out.passed);
            assert_eq!(out.worst, Some(dinspect_lib::types::Severity::Critical));
        }
        other => panic!("expected flags output, got {other:?}"),
    }
}

#[test]
fn missing_snapshot_exits_two_with_hint() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("missing.json");

    let output = run(&dir, &["inspect", path_arg(&missing)]);
    assert_eq!(output.status.code(), Some(2));

    match parse(&output.stdout) {
        DinspectOutput::Error(err) => {
            assert!(err.error.message.contains("Snapshot file not found"));
            assert!(err.error.remediation.is_some());
        }
        other => panic!("expected error output, got {other:?}"),
    }
}

#[test]
fn scroll_control_needs_live_page() {
    let dir = TempDir::new().expect("tempdir");
    let snapshot = write_page(&dir, "Fixture");

    let output = run(
        &dir,
        &["scroll", path_arg(&snapshot), "--control", "gsap-st-0", "--action", "restart"],
    );
    assert_eq!(output.status.code(), Some(2));
    assert!(matches!(parse(&output.stdout), DinspectOutput::Error(_)));
}

#[test]
fn element_reports_card_and_guides() {
    let dir = TempDir::new().expect("tempdir");
    let snapshot = write_page(&dir, "Fixture");

    let output = run(
        &dir,
        &["element", path_arg(&snapshot), "--selector", ".hero", "--compare", "#cta"],
    );
    assert_eq!(output.status.code(), Some(0));

    match parse(&output.stdout) {
        DinspectOutput::Element(out) => {
            assert_eq!(out.card.tag, "h1");
            assert_eq!(out.card.typography.size, 48);
            assert_eq!(out.guides.first().map(|g| g.length), Some(40));
        }
        other => panic!("expected element output, got {other:?}"),
    }
}

#[test]
fn prompt_visual_uses_imagine_prefix() {
    let dir = TempDir::new().expect("tempdir");
    let snapshot = write_page(&dir, "Fixture");

    let output = run(&dir, &["prompt", path_arg(&snapshot), "--kind", "visual"]);
    assert_eq!(output.status.code(), Some(0));

    match parse(&output.stdout) {
        DinspectOutput::Prompt(out) => {
            assert_eq!(out.kind, PromptKind::Visual);
            assert!(out.text.starts_with("/imagine prompt:"));
        }
        other => panic!("expected prompt output, got {other:?}"),
    }
}

#[test]
fn pretty_writes_json_when_output_path_set() {
    let dir = TempDir::new().expect("tempdir");
    let snapshot = write_page(&dir, "Fixture");
    let out_path = dir.path().join("out.json");

    let output = run(
        &dir,
        &["inspect", path_arg(&snapshot), "--format", "pretty", "-o", path_arg(&out_path)],
    );
    assert_eq!(output.status.code(), Some(0));

    let content = std::fs::read_to_string(&out_path).expect("read output file");
    let value: serde_json::Value = serde_json::from_str(&content).expect("pretty file is JSON");
    assert_eq!(value["mode"], "inspect");
    assert_eq!(value["meta"]["title"], "Fixture");
}

#[test]
fn serve_without_api_key_exits_two() {
    let dir = TempDir::new().expect("tempdir");

    let output = run(&dir, &["serve", "--port", "0"]);
    assert_eq!(output.status.code(), Some(2));

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("error output is JSON when piped");
    assert_eq!(value["mode"], "error");
    assert!(value["error"]["message"]
        .as_str()
        .unwrap_or_default()
        .contains("GEMINI_API_KEY"));
}
