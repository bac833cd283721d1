// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

pub fn cq() -> Command {
    cargo_bin_cmd!("cq")
}

/// A local url nothing is listening on.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Helper to create an initialized temp directory pointing at `base_url`.
pub fn init_temp_with(base_url: &str, backend: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    cq().arg("init")
        .arg("--base-url")
        .arg(base_url)
        .arg("--backend")
        .arg(backend)
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Helper to create an initialized temp directory whose API is unreachable.
pub fn init_temp_offline() -> TempDir {
    init_temp_with(&unreachable_url(), "file")
}

/// Helper to queue a request while offline and return its queue id.
pub fn submit_offline(temp: &TempDir, method: &str, url: &str, body: Option<&str>) -> String {
    let mut cmd = cq();
    cmd.arg("submit")
        .arg("-X")
        .arg(method)
        .arg("-u")
        .arg(url)
        .arg("--offline")
        .current_dir(temp.path());
    if let Some(body) = body {
        cmd.arg("-d").arg(body);
    }
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{:?}", output);

    String::from_utf8_lossy(&output.stdout)
        .split_whitespace()
        .find(|s| s.starts_with("q-"))
        .unwrap()
        .to_string()
}

/// Queue contents as JSON.
pub fn queue_json(temp: &TempDir) -> serde_json::Value {
    let output = cq()
        .args(["queue", "list", "-o", "json"])
        .current_dir(temp.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Minimal HTTP server answering every request with `status`.
///
/// Returns the base url and the raw text of every request received.
pub fn spawn_server(status: u16) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));

    let seen = Arc::clone(&requests);
    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let raw = read_request(&mut stream);
            seen.lock().unwrap().push(raw);
            let response = format!(
                "HTTP/1.1 {} Status\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    (base_url, requests)
}

fn read_request(stream: &mut std::net::TcpStream) -> String {
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        raw.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&raw);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if raw.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&raw).into_owned()
}
