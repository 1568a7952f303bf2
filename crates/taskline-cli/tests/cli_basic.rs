//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against a throwaway config file.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).expect("write fixture");
        path
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_taskline"));
        cmd.arg("--config")
            .arg(self.path("config.toml"))
            .args(args)
            .current_dir(self.dir.path())
            .env_remove("OPENAI_API_KEY")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Run and return (stdout, stderr, exit code).
    fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = self
            .command(args)
            .output()
            .expect("Failed to execute CLI command");
        (
            String::from_utf8_lossy(&output.stdout).to_string(),
            String::from_utf8_lossy(&output.stderr).to_string(),
            output.status.code().unwrap_or(-1),
        )
    }
}

const REPORT_THEN_BREAK: &str = r#"{
  "schedule_date": "2024-09-24",
  "tasks": [
    {"task_name": "Write report", "start_time": "09:00", "end_time": "10:00", "duration_minutes": 60},
    {"task_name": "Break", "start_time": "10:00", "end_time": "10:15", "duration_minutes": 15}
  ]
}"#;

fn arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

#[test]
fn test_timer_missing_schedule_fails() {
    let sb = Sandbox::new();
    let (_, stderr, code) = sb.run(&["timer", "does-not-exist.json"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
    assert!(stderr.contains("does-not-exist.json"));
}

#[test]
fn test_timer_malformed_schedule_fails() {
    let sb = Sandbox::new();
    let file = sb.write("schedule.json", "{ not json");
    let (_, stderr, code) = sb.run(&["timer", arg(&file)]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_timer_empty_schedule_exits_cleanly() {
    let sb = Sandbox::new();
    let file = sb.write("schedule.json", r#"{"tasks": []}"#);
    let (stdout, _, code) = sb.run(&["timer", arg(&file)]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No tasks found"));
}

#[test]
fn test_schedule_show() {
    let sb = Sandbox::new();
    let file = sb.write("schedule.json", REPORT_THEN_BREAK);
    let (stdout, _, code) = sb.run(&["schedule", "show", arg(&file)]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Schedule for 2024-09-24"));
    assert!(stdout.contains("09:00-10:00"));
    assert!(stdout.contains("Write report"));
    assert!(stdout.contains("2 tasks, 75 min total"));
}

#[test]
fn test_schedule_show_json_normalizes_aliases() {
    let sb = Sandbox::new();
    let file = sb.write(
        "bare.json",
        r#"[{"name": "Read", "start": "08:00", "end": "08:30"}]"#,
    );
    let (stdout, _, code) = sb.run(&["schedule", "show", "--json", arg(&file)]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(parsed["tasks"][0]["task_name"], "Read");
    assert_eq!(parsed["tasks"][0]["duration_minutes"], 30);
}

#[test]
fn test_schedule_validate() {
    let sb = Sandbox::new();
    let good = sb.write("good.json", REPORT_THEN_BREAK);
    let (stdout, _, code) = sb.run(&["schedule", "validate", arg(&good)]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("ok"));

    let bad = sb.write(
        "bad.json",
        r#"{"tasks": [
            {"task_name": "A", "start_time": "09:00", "end_time": "10:00", "duration_minutes": 60},
            {"task_name": "B", "start_time": "09:30", "end_time": "10:30", "duration_minutes": 60}
        ]}"#,
    );
    let (stdout, stderr, code) = sb.run(&["schedule", "validate", arg(&bad)]);
    assert_eq!(code, 1);
    assert!(stdout.contains("task #2 overlaps task #1"));
    assert!(stderr.contains("1 issue(s)"));
}

#[test]
fn test_config_get_set() {
    let sb = Sandbox::new();
    let (stdout, _, code) = sb.run(&["config", "get", "llm.model"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "gpt-4o");
    assert!(sb.path("config.toml").exists(), "defaults are written on first load");

    let (_, _, code) = sb.run(&["config", "set", "timer.anchor", "schedule"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = sb.run(&["config", "get", "timer.anchor"]);
    assert_eq!(stdout.trim(), "schedule");

    let (_, _, code) = sb.run(&["config", "set", "planning.short_break", "10"]);
    assert_eq!(code, 0);
    let (stdout, _, code) = sb.run(&["config", "show"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("short_break = 10"));
}

#[test]
fn test_config_rejects_unknown_and_invalid() {
    let sb = Sandbox::new();
    let (_, stderr, code) = sb.run(&["config", "set", "llm.nope", "x"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown config key"));

    let (_, _, code) = sb.run(&["config", "set", "timer.anchor", "sideways"]);
    assert_eq!(code, 1);

    let (_, _, code) = sb.run(&["config", "get", "llm.nope"]);
    assert_eq!(code, 1);
}

#[test]
fn test_generate_missing_task_file_fails() {
    let sb = Sandbox::new();
    for sub in ["generate", "generator"] {
        let (_, stderr, code) = sb.run(&[sub, "tasks.txt"]);
        assert_eq!(code, 1, "{sub}");
        assert!(stderr.contains("cannot read task file"));
    }
    assert!(!sb.path("schedule.json").exists());
}

#[test]
fn test_generate_without_api_key_fails_before_network() {
    let sb = Sandbox::new();
    let tasks = sb.write("tasks.txt", "write report\nlunch\n");
    let (_, _, code) = sb.run(&["config", "set", "llm.base_url", "http://127.0.0.1:9/v1"]);
    assert_eq!(code, 0);

    let (_, stderr, code) = sb.run(&["generate", arg(&tasks)]);
    assert_eq!(code, 1);
    assert!(stderr.contains("OPENAI_API_KEY"), "stderr: {stderr}");
}

#[test]
fn test_generate_writes_schedule_artifact() {
    let mut server = mockito::Server::new();
    let content = r#"{"schedule_date": "2024-09-24", "tasks": [{"task_name": "Write report", "start_time": "09:00", "end_time": "10:00", "duration_minutes": 60}]}"#;
    let body = serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    });
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create();

    let sb = Sandbox::new();
    let tasks = sb.write("tasks.txt", "write report\n");
    let base = format!("{}/v1", server.url());
    let (_, _, code) = sb.run(&["config", "set", "llm.base_url", &base]);
    assert_eq!(code, 0);

    let out = sb.path("plan.json");
    let output = sb
        .command(&["generate", arg(&tasks), "--output", arg(&out)])
        .env("OPENAI_API_KEY", "sk-test")
        .output()
        .expect("run generate");
    assert_eq!(output.status.code(), Some(0), "{output:?}");
    mock.assert();

    let stdout: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json on stdout");
    assert_eq!(stdout["tasks"][0]["task_name"], "Write report");

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).expect("artifact")).unwrap();
    assert_eq!(saved, stdout);
}

#[test]
fn test_generate_transport_error_fails() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .create();

    let sb = Sandbox::new();
    let tasks = sb.write("tasks.txt", "write report\n");
    let base = format!("{}/v1", server.url());
    sb.run(&["config", "set", "llm.base_url", &base]);

    let output = sb
        .command(&["generate", arg(&tasks)])
        .env("OPENAI_API_KEY", "sk-wrong")
        .output()
        .expect("run generate");
    assert_eq!(output.status.code(), Some(1));
    assert!(!sb.path("schedule.json").exists());
}

#[test]
fn test_completions() {
    let sb = Sandbox::new();
    let (stdout, _, code) = sb.run(&["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("taskline"));
}
