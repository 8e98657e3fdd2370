#![allow(deprecated)]
use assert_cmd::Command;
use mockito::{Matcher, Mock, ServerGuard};
use predicates::prelude::*;
use tempfile::TempDir;

const ENV_KEYS: &[&str] = &[
    "JIRA_URL",
    "JIRA_EMAIL",
    "JIRA_API_TOKEN",
    "JIRA_JQL",
    "JIRA_MAX_RESULTS",
    "SLACK_WEBHOOK_URL",
    "SLACK_BOT_TOKEN",
    "SLACK_CHANNEL",
    "SLACK_API_URL",
    "SLACK_SIGNING_SECRET",
    "HANDOVER_HTTP_TIMEOUT_SECS",
];

const TWO_ISSUES: &str = r#"{"issues": [
    {"key": "TCP-1", "fields": {"summary": "Printer on fire"}},
    {"key": "TCP-2", "fields": {"summary": "VPN flapping"}}
]}"#;

/// `handover` rooted at `dir` with no configuration inherited from the host.
fn handover(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("handover").unwrap();
    cmd.current_dir(dir.path()).env("HANDOVER_ROOT", dir.path());
    for key in ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd
}

/// `handover` pointed at a mock Jira.
fn handover_with_jira(dir: &TempDir, server: &ServerGuard) -> Command {
    let mut cmd = handover(dir);
    cmd.env("JIRA_URL", server.url())
        .env("JIRA_EMAIL", "ops@acme.test")
        .env("JIRA_API_TOKEN", "secret");
    cmd
}

fn mock_search(server: &mut ServerGuard) -> Mock {
    server
        .mock("GET", "/rest/api/3/search/jql")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(TWO_ISSUES)
        .create()
}

fn read_store(dir: &TempDir) -> serde_json::Value {
    let data = std::fs::read_to_string(dir.path().join("ticket_data.json")).unwrap();
    serde_json::from_str(&data).unwrap()
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn missing_config_names_the_variable() {
    let dir = TempDir::new().unwrap();
    handover(&dir)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("JIRA_URL"));
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    handover(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fill"))
        .stdout(predicate::str::contains("schedule"))
        .stdout(predicate::str::contains("serve"));
}

// ---------------------------------------------------------------------------
// list / fill / report
// ---------------------------------------------------------------------------

#[test]
fn list_shows_tickets_with_sentinels() {
    let mut server = mockito::Server::new();
    let _search = mock_search(&mut server);
    let dir = TempDir::new().unwrap();

    handover_with_jira(&dir, &server)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("TCP-1"))
        .stdout(predicate::str::contains("Printer on fire"))
        .stdout(predicate::str::contains("--"));
}

#[test]
fn fill_saves_every_ticket() {
    let mut server = mockito::Server::new();
    let _search = mock_search(&mut server);
    let dir = TempDir::new().unwrap();

    handover_with_jira(&dir, &server)
        .args(["fill", "--status", "Monitoring", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"saved\": 2"));

    let store = read_store(&dir);
    assert_eq!(store["TCP-1"]["status"], "Monitoring");
    assert_eq!(store["TCP-1"]["action"], "--");
    assert_eq!(store["TCP-2"]["summary"], "VPN flapping");
}

#[test]
fn list_json_reflects_saved_values() {
    let mut server = mockito::Server::new();
    let _search = mock_search(&mut server);
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("ticket_data.json"),
        r#"{"TCP-1": {"status": "Escalated", "action": "Page on-call", "summary": "Printer on fire", "updated_at": "2025-01-01T00:00:00Z"}}"#,
    )
    .unwrap();

    let output = handover_with_jira(&dir, &server)
        .args(["list", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["status"], "Escalated");
    assert_eq!(rows[0]["action"], "Page on-call");
    assert_eq!(rows[1]["status"], "--");
}

#[test]
fn report_prints_only_annotated_tickets() {
    let mut server = mockito::Server::new();
    let _search = mock_search(&mut server);
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("ticket_data.json"),
        r#"{"TCP-2": {"status": "--", "action": "Reboot router", "summary": "VPN flapping", "updated_at": "2025-01-01T00:00:00Z"}}"#,
    )
    .unwrap();

    handover_with_jira(&dir, &server)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("TCP-2"))
        .stdout(predicate::str::contains("Action: Reboot router"))
        .stdout(predicate::str::contains("TCP-1").not());
}

#[test]
fn corrupt_store_is_treated_as_empty() {
    let mut server = mockito::Server::new();
    let _search = mock_search(&mut server);
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("ticket_data.json"), "{not json").unwrap();

    handover_with_jira(&dir, &server)
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tickets have handover"));
}

// ---------------------------------------------------------------------------
// edit
// ---------------------------------------------------------------------------

/// An executable `$EDITOR` stand-in that runs `body` with the document path as `$1`.
#[cfg(unix)]
fn editor_script(dir: &TempDir, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.path().join("fake-editor.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn edit_unchanged_document_saves_and_removes_scratch() {
    let mut server = mockito::Server::new();
    let _search = mock_search(&mut server);
    let dir = TempDir::new().unwrap();

    handover_with_jira(&dir, &server)
        .env("EDITOR", "true")
        .arg("edit")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved 2 ticket(s)"));

    let store = read_store(&dir);
    assert_eq!(store["TCP-1"]["status"], "--");
    assert_eq!(store["TCP-2"]["summary"], "VPN flapping");
    assert!(!dir.path().join("edit_tickets.json").exists());
}

#[cfg(unix)]
#[test]
fn edit_saves_values_written_by_editor() {
    let mut server = mockito::Server::new();
    let _search = mock_search(&mut server);
    let dir = TempDir::new().unwrap();
    let editor = editor_script(
        &dir,
        r#"printf '%s' '{"TCP-1": {"ticket_number": 1, "summary": "Printer on fire", "status": "Escalated", "action": "Page on-call"}}' > "$1""#,
    );

    handover_with_jira(&dir, &server)
        .env("EDITOR", &editor)
        .arg("edit")
        .assert()
        .success();

    let store = read_store(&dir);
    assert_eq!(store["TCP-1"]["status"], "Escalated");
    assert_eq!(store["TCP-1"]["action"], "Page on-call");
}

#[test]
fn edit_aborted_by_editor_saves_nothing() {
    let mut server = mockito::Server::new();
    let _search = mock_search(&mut server);
    let dir = TempDir::new().unwrap();

    handover_with_jira(&dir, &server)
        .env("EDITOR", "false")
        .arg("edit")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("nothing was saved"));
    assert!(!dir.path().join("ticket_data.json").exists());
}

#[cfg(unix)]
#[test]
fn edit_with_invalid_json_saves_nothing() {
    let mut server = mockito::Server::new();
    let _search = mock_search(&mut server);
    let dir = TempDir::new().unwrap();
    let editor = editor_script(&dir, r#"printf 'not json' > "$1""#);

    handover_with_jira(&dir, &server)
        .env("EDITOR", &editor)
        .arg("edit")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("is not valid JSON"));
    assert!(!dir.path().join("ticket_data.json").exists());
}

// ---------------------------------------------------------------------------
// post / check
// ---------------------------------------------------------------------------

#[test]
fn post_without_sink_fails() {
    let mut server = mockito::Server::new();
    let _search = mock_search(&mut server);
    let dir = TempDir::new().unwrap();

    handover_with_jira(&dir, &server)
        .arg("post")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to post handover to Slack"));
}

#[test]
fn post_delivers_saved_values_to_webhook() {
    let mut server = mockito::Server::new();
    let _search = mock_search(&mut server);
    let hook = server
        .mock("POST", "/hook")
        .match_body(Matcher::Regex("Page on-call".into()))
        .with_status(200)
        .with_body("ok")
        .create();
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("ticket_data.json"),
        r#"{"TCP-1": {"status": "Escalated", "action": "Page on-call", "summary": "Printer on fire", "updated_at": "2025-01-01T00:00:00Z"}}"#,
    )
    .unwrap();

    handover_with_jira(&dir, &server)
        .env("SLACK_WEBHOOK_URL", format!("{}/hook", server.url()))
        .arg("post")
        .assert()
        .success()
        .stdout(predicate::str::contains("Posted handover to Slack"));
    hook.assert();
}

#[test]
fn check_reports_user_and_count() {
    let mut server = mockito::Server::new();
    let _search = mock_search(&mut server);
    let _me = server
        .mock("GET", "/rest/api/3/myself")
        .with_status(200)
        .with_body(r#"{"displayName": "Dana Ops"}"#)
        .create();
    let dir = TempDir::new().unwrap();

    handover_with_jira(&dir, &server)
        .env("SLACK_WEBHOOK_URL", "https://hooks.slack.test/abc")
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("as Dana Ops"))
        .stdout(predicate::str::contains("Query returned 2 ticket(s)"));
}

#[test]
fn check_fails_on_bad_credentials() {
    let mut server = mockito::Server::new();
    let _me = server
        .mock("GET", "/rest/api/3/myself")
        .with_status(401)
        .create();
    let dir = TempDir::new().unwrap();

    handover_with_jira(&dir, &server)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to authenticate with Jira"));
}

// ---------------------------------------------------------------------------
// schedule
// ---------------------------------------------------------------------------

#[test]
fn schedule_writes_and_removes_launch_agent() {
    let dir = TempDir::new().unwrap();
    let plist = dir.path().join("agent.plist");

    handover(&dir)
        .args(["schedule", "--preset", "night", "--output"])
        .arg(&plist)
        .assert()
        .success()
        .stdout(predicate::str::contains("23:46"));

    let content = std::fs::read_to_string(&plist).unwrap();
    assert!(content.contains("<integer>23</integer>"));
    assert!(content.contains("<integer>46</integer>"));
    assert!(content.contains("<string>post</string>"));

    handover(&dir)
        .args(["schedule", "--preset", "off", "--output"])
        .arg(&plist)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));
    assert!(!plist.exists());
}

#[test]
fn schedule_custom_requires_time() {
    let dir = TempDir::new().unwrap();
    handover(&dir)
        .args(["schedule", "--preset", "custom", "--hour", "9", "--output"])
        .arg(dir.path().join("agent.plist"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--minute"));
}

#[test]
fn schedule_rejects_unknown_preset() {
    let dir = TempDir::new().unwrap();
    handover(&dir)
        .args(["schedule", "--preset", "weekly"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown preset"));
}
