use predicates::prelude::*;
use std::process::Command;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::from(Command::new(env!("CARGO_BIN_EXE_cppscan")))
}

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

// -- stdin mode --

#[test]
fn stdin_mode_produces_text_outline() {
    let input = std::fs::read_to_string(fixture_path("Widget.h")).unwrap();

    let assert = cmd().write_stdin(input).assert().success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    assert!(output.starts_with("file <stdin>\n"));
    assert!(output.contains("namespace ui (line"));
    assert!(output.contains("struct ui::Rect (line"));
    assert!(output.contains("class ui::Widget : public Object, private RefCounter (line"));
    assert!(output.contains("[WIDGET] Base class for interactive UI elements"));
    assert!(output.contains("attributes: Serializable, Editable"));
    assert!(output.contains("enum State: Idle, Hovered = 2, Pressed"));
    assert!(output.contains("typedef WidgetList = Vector<Widget*>"));
    assert!(output.contains("void Widget() (public)"));
    assert!(output.contains("virtual void Draw() (public)"));
    assert!(output.contains("int Depth() const (public)"));
    assert!(output.contains("static Widget* Create(String& name) (public)"));
    assert!(output.contains("String mName (private)"));
    assert!(output.contains("bool mVisible (private)"));
    assert!(output.contains("using namespace ui"));
}

#[test]
fn stdin_mode_json_format() {
    let input = std::fs::read_to_string(fixture_path("Widget.h")).unwrap();

    let assert = cmd()
        .args(["-f", "json"])
        .write_stdin(input)
        .assert()
        .success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    assert!(output.contains("\"file\": \"<stdin>\""));
    assert!(output.contains("\"kind\": \"namespace\""));
    assert!(output.contains("\"full_name\": \"ui::Widget\""));
    assert!(output.contains("\"short_definition\": \"WIDGET\""));
    assert!(output.contains("\"name\": \"Draw\""));
    assert!(output.contains("\"virtual\": true"));
}

#[test]
fn stdin_mode_template_declarations() {
    let input = std::fs::read_to_string(fixture_path("Math.h")).unwrap();

    let assert = cmd().write_stdin(input).assert().success();
    let output = String::from_utf8(assert.get_output().stdout.clone()).unwrap();

    assert!(output.contains("enum Sign: Negative = -1, Zero, Positive"));
    assert!(output.contains("template<typename T> T Clamp(T value, T low, T high) (public)"));
    assert!(output.contains("struct math::Range"));
}

// -- file mode --

#[test]
fn file_mode_creates_output() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("Widget.h"))
        .assert()
        .success();

    let output = std::fs::read_to_string(dir.path().join("Widget.txt")).unwrap();
    assert!(output.contains("class ui::Widget"));
}

#[test]
fn file_mode_multiple_files() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("Widget.h"))
        .arg(fixture_path("Math.h"))
        .assert()
        .success();

    assert!(dir.path().join("Widget.txt").exists());
    assert!(dir.path().join("Math.txt").exists());
}

#[test]
fn file_mode_json_extension() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap(), "-f", "json"])
        .arg(fixture_path("Widget.h"))
        .assert()
        .success();

    let output = std::fs::read_to_string(dir.path().join("Widget.json")).unwrap();
    assert!(output.contains("\"full_name\": \"ui::Widget\""));
}

#[test]
fn file_mode_scans_directory() {
    let dir = TempDir::new().unwrap();
    let fixtures = format!("{}/tests/fixtures", env!("CARGO_MANIFEST_DIR"));

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(&fixtures)
        .assert()
        .success();

    assert!(dir.path().join("Widget.txt").exists());
    assert!(dir.path().join("Math.txt").exists());
}

#[test]
fn file_mode_warns_on_missing_input() {
    let dir = TempDir::new().unwrap();

    cmd()
        .args(["-o", dir.path().to_str().unwrap()])
        .arg(fixture_path("Widget.h"))
        .arg("does-not-exist.h")
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: no files matched"));

    assert!(dir.path().join("Widget.txt").exists());
}

// -- error handling --

#[test]
fn file_mode_requires_output_dir() {
    cmd()
        .arg(fixture_path("Widget.h"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output is required"));
}

#[test]
fn unknown_format_is_rejected() {
    cmd()
        .args(["-f", "yaml"])
        .write_stdin("int x;")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}
