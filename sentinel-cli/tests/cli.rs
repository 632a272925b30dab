use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::process::Command;
use std::thread;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const SETTING_VARS: &[&str] = &[
    "ARGOCD_API",
    "ARGOCD_TOKEN",
    "SLACK_WEBHOOK_URL",
    "GITHUB_TOKEN",
    "GIT_REPO_URL",
    "GIT_BRANCH",
    "GIT_CHECKOUT",
    "ROLLBACK_MODE",
    "ROLLBACK_WORKFLOW",
    "REQUEST_TIMEOUT",
    "POLL_INTERVAL",
    "ERROR_BACKOFF",
    "RETRY_DELAY",
    "MAX_ATTEMPTS",
    "MONITOR_APP",
];

fn sentinel_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("sentinel"));
    for var in SETTING_VARS {
        cmd.env_remove(var);
    }
    cmd.env("RUST_LOG", "warn")
        .env("NO_COLOR", "1")
        .env("CLICOLOR", "0");
    cmd
}

/// Minimal Argo CD: answers `count` requests, routing on the request path.
fn fake_argocd(count: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");

    thread::spawn(move || {
        for _ in 0..count {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut reader = BufReader::new(stream.try_clone().expect("clone"));
            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("request line");
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("header");
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).expect("body");

            let path = request_line.split_whitespace().nth(1).unwrap_or("");
            let reply = if path == "/api/v1/applications" {
                r#"{"items": [
                    {"metadata": {"name": "argocd-monitor"}, "status": {"health": {"status": "Healthy"}, "sync": {"status": "Synced"}}},
                    {"metadata": {"name": "storefront"}, "status": {"health": {"status": "Healthy"}, "sync": {"status": "Synced"}}}
                ]}"#
            } else {
                r#"{"metadata": {"name": "storefront"}, "status": {"health": {"status": "Healthy"}, "sync": {"status": "Synced", "revision": "7e3f9a1"}}}"#
            };
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
                reply.len()
            );
            stream.write_all(response.as_bytes()).expect("write");
        }
    });

    format!("http://{addr}/api/v1")
}

#[test]
fn help_lists_run_subcommand() {
    sentinel_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("run"));
}

#[test]
fn run_help_documents_env_fallbacks() {
    sentinel_cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(contains("--once"))
        .stdout(contains("ARGOCD_TOKEN"))
        .stdout(contains("--log-format"));
}

#[test]
fn missing_token_is_a_configuration_error() {
    sentinel_cmd()
        .args(["run", "--once"])
        .assert()
        .failure()
        .stderr(contains("invalid configuration"))
        .stderr(contains("ARGOCD_TOKEN"));
}

#[test]
fn workflow_dispatch_requires_github_token() {
    sentinel_cmd()
        .args(["run", "--once"])
        .env("ARGOCD_TOKEN", "t")
        .assert()
        .failure()
        .stderr(contains("GITHUB_TOKEN"));
}

#[test]
fn unknown_rollback_mode_is_rejected_by_parser() {
    sentinel_cmd()
        .args(["run", "--once", "--rollback-mode", "teleport"])
        .assert()
        .failure()
        .stderr(contains("unknown rollback mode"));
}

#[test]
fn unknown_config_file_key_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("sentinel.yaml");
    fs::write(&path, "argocd_token: t\npoll_intervall_secs: 5\n").expect("write config");

    sentinel_cmd()
        .args(["run", "--once", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(contains("failed to parse config file"));
}

#[test]
fn once_prints_a_report_table() {
    // list + (refresh, status) for storefront; the monitor app is never read.
    let api = fake_argocd(3);

    sentinel_cmd()
        .args(["run", "--once", "--rollback-mode", "disabled"])
        .env("ARGOCD_API", &api)
        .env("ARGOCD_TOKEN", "test-token")
        .assert()
        .success()
        .stdout(contains("1 applications"))
        .stdout(contains("storefront"))
        .stdout(contains("7e3f9a1"))
        .stdout(contains("skipped: argocd-monitor"));
}

#[test]
fn once_fails_when_controller_is_unreachable() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    sentinel_cmd()
        .args(["run", "--once", "--rollback-mode", "disabled"])
        .env("ARGOCD_API", format!("http://127.0.0.1:{port}/api/v1"))
        .env("ARGOCD_TOKEN", "test-token")
        .env("REQUEST_TIMEOUT", "2")
        .assert()
        .failure()
        .stderr(contains("reconciliation cycle failed"));
}
