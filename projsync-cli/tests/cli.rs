use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::Command;
use std::thread;

use assert_cmd::prelude::*;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

// Nothing listens on the discard port, so every catalog call fails fast.
const DEAD_CATALOG: &str = "http://127.0.0.1:9";

fn projsync_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("projsync"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env_remove("PROJSYNC_TOKEN")
        .env_remove("PROJSYNC_CATALOG_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn token(payload: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
    format!("{header}.{body}.c2ln")
}

/// A loopback catalog answering every request with `respond(request_line)`.
fn stub_catalog<F>(respond: F) -> String
where
    F: Fn(&str) -> (u16, &'static str) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("request line");
            let mut content_length = 0usize;
            loop {
                let mut header = String::new();
                if reader.read_line(&mut header).unwrap_or(0) == 0 || header == "\r\n" {
                    break;
                }
                if let Some((name, value)) = header.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
            }
            let mut body = vec![0u8; content_length];
            let _ = reader.read_exact(&mut body);

            let (status, payload) = respond(request_line.trim_end());
            let _ = write!(
                stream,
                "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
                payload.len()
            );
        }
    });
    format!("http://{addr}")
}

/// A workspace with one valid manifest and one that fails to parse.
fn workspace() -> TempDir {
    let ws = TempDir::new().expect("workspace");
    let tools = ws.path().join("tools");
    fs::create_dir_all(tools.join("hammer")).unwrap();
    fs::write(
        tools.join("projsync.yaml"),
        "hammer:\n  description: Hits things\n  source: hammer\nwrench:\n  description: Turns things\n",
    )
    .unwrap();

    let broken = ws.path().join("broken");
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join("projsync.yaml"), "- not\n- a mapping\n").unwrap();
    ws
}

#[test]
fn manifests_lists_entries_and_reports_bad_files() {
    let home = TempDir::new().unwrap();
    let ws = workspace();

    projsync_cmd(home.path())
        .arg("manifests")
        .arg(ws.path())
        .assert()
        .success()
        .stdout(contains("hammer"))
        .stdout(contains("wrench"))
        .stdout(contains("Hits things"))
        .stdout(contains("broken"));
}

#[test]
fn manifests_json_is_machine_readable() {
    let home = TempDir::new().unwrap();
    let ws = workspace();

    let output = projsync_cmd(home.path())
        .args(["manifests", "--json"])
        .arg(ws.path())
        .output()
        .expect("run projsync manifests --json");
    assert!(
        output.status.success(),
        "command failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let manifests = json["manifests"].as_array().expect("manifests array");
    assert_eq!(manifests.len(), 1);
    let titles: Vec<&str> = manifests[0]["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["hammer", "wrench"]);
    assert_eq!(json["failures"].as_array().unwrap().len(), 1);
}

#[test]
fn manifests_on_empty_tree_says_so() {
    let home = TempDir::new().unwrap();
    let ws = TempDir::new().unwrap();

    projsync_cmd(home.path())
        .arg("manifests")
        .arg(ws.path())
        .assert()
        .success()
        .stdout(contains("No manifests found."));
}

#[test]
fn missing_root_fails() {
    let home = TempDir::new().unwrap();
    let ws = TempDir::new().unwrap();

    projsync_cmd(home.path())
        .arg("manifests")
        .arg(ws.path().join("nope"))
        .assert()
        .failure()
        .stderr(contains("manifest discovery failed"));
}

#[test]
fn sync_without_token_fails_before_anything_else() {
    let home = TempDir::new().unwrap();
    let ws = workspace();

    projsync_cmd(home.path())
        .arg("sync")
        .arg(ws.path())
        .assert()
        .failure()
        .stderr(contains("no catalog token"));
}

#[test]
fn token_without_identity_claim_is_rejected() {
    let home = TempDir::new().unwrap();
    let ws = workspace();

    projsync_cmd(home.path())
        .arg("plan")
        .arg(ws.path())
        .args(["--token", &token(r#"{"iat":1}"#)])
        .args(["--catalog-url", DEAD_CATALOG])
        .assert()
        .failure()
        .stderr(contains("'pusher' or 'sub'"));
}

#[test]
fn missing_catalog_url_fails() {
    let home = TempDir::new().unwrap();
    let ws = workspace();

    projsync_cmd(home.path())
        .arg("plan")
        .arg(ws.path())
        .env("PROJSYNC_TOKEN", token(r#"{"pusher":"alice"}"#))
        .assert()
        .failure()
        .stderr(contains("no catalog URL"));
}

#[test]
fn unreachable_catalog_aborts_plan() {
    let home = TempDir::new().unwrap();
    let ws = workspace();

    projsync_cmd(home.path())
        .arg("plan")
        .arg(ws.path())
        .args(["--token", &token(r#"{"sub":"alice"}"#)])
        .args(["--catalog-url", DEAD_CATALOG])
        .assert()
        .failure()
        .stderr(contains("failed to fetch ownership"));
}

#[test]
fn dry_run_still_needs_the_ownership_snapshot() {
    let home = TempDir::new().unwrap();
    let ws = workspace();

    projsync_cmd(home.path())
        .args(["sync", "--dry-run", "--delete-missing"])
        .arg(ws.path())
        .env("PROJSYNC_TOKEN", token(r#"{"pusher":"alice"}"#))
        .env("PROJSYNC_CATALOG_URL", DEAD_CATALOG)
        .assert()
        .failure()
        .stderr(contains("failed to fetch ownership"))
        .stdout(contains("[dry-run]").not());
}

#[test]
fn config_file_supplies_url_and_token() {
    let home = TempDir::new().unwrap();
    let ws = workspace();
    let dir = home.path().join(".projsync");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("config.yaml"),
        format!(
            "catalog_url: {DEAD_CATALOG}\ntoken: {}\nconcurrency: 2\n",
            token(r#"{"pusher":"alice"}"#)
        ),
    )
    .unwrap();

    // Reaching the ownership fetch proves both values were picked up.
    projsync_cmd(home.path())
        .arg("plan")
        .arg(ws.path())
        .assert()
        .failure()
        .stderr(contains("failed to fetch ownership"));
}

#[test]
fn unknown_config_keys_are_reported() {
    let home = TempDir::new().unwrap();
    let ws = workspace();
    let dir = home.path().join(".projsync");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.yaml"), "catalog: nope\n").unwrap();

    projsync_cmd(home.path())
        .arg("manifests")
        .arg(ws.path())
        .assert()
        .failure()
        .stderr(contains("config.yaml"));
}

#[test]
fn dry_run_counts_nothing_as_pushed() {
    let home = TempDir::new().unwrap();
    let ws = workspace();
    let catalog = stub_catalog(|_| (200, "{}"));

    projsync_cmd(home.path())
        .args(["sync", "--dry-run"])
        .arg(ws.path())
        .env("PROJSYNC_TOKEN", token(r#"{"pusher":"alice"}"#))
        .env("PROJSYNC_CATALOG_URL", &catalog)
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("0 pushed, 0 deleted"))
        .stdout(contains("2 would be pushed, 0 would be deleted"));
}

#[test]
fn sync_pushes_every_accepted_project() {
    let home = TempDir::new().unwrap();
    let ws = workspace();
    let catalog = stub_catalog(|_| (200, "{}"));

    projsync_cmd(home.path())
        .arg("sync")
        .arg(ws.path())
        .env("PROJSYNC_TOKEN", token(r#"{"pusher":"alice"}"#))
        .env("PROJSYNC_CATALOG_URL", &catalog)
        .assert()
        .success()
        .stdout(contains("2 pushed, 0 deleted"))
        .stdout(contains("would be pushed").not());
}

#[test]
fn declined_push_fails_the_run() {
    let home = TempDir::new().unwrap();
    let ws = workspace();
    let catalog = stub_catalog(|line| {
        if line.starts_with("PUT ") && line.contains("/projects/wrench") {
            (500, "")
        } else {
            (200, "{}")
        }
    });

    projsync_cmd(home.path())
        .arg("sync")
        .arg(ws.path())
        .env("PROJSYNC_TOKEN", token(r#"{"pusher":"alice"}"#))
        .env("PROJSYNC_CATALOG_URL", &catalog)
        .assert()
        .failure()
        .stdout(contains("1 pushed"))
        .stdout(contains("catalog declined the push"))
        .stderr(contains("1 push(es) and 0 delete(s) failed"));
}
