// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cq_core::{CanonicalRequest, Method};
use serde_json::{json, Value};

use super::queue::QueueStore;
use super::report::ErrorReporter;
use super::transport::{ApiClient, ApiError, ApiResponse, ApiResult};
use crate::error::{Error, ErrorKind};
use crate::storage::{KeyValueStore, MemoryStore, StorageError, StorageResult, Update};

/// Build a canonical request.
pub fn make_request(method: Method, url: &str, body: Option<Value>) -> CanonicalRequest {
    CanonicalRequest {
        url: url.to_string(),
        method,
        body,
        headers: None,
        timeout: None,
    }
}

/// Build a POST creating a patient with the given name.
pub fn post_patient(name: &str) -> CanonicalRequest {
    make_request(Method::Post, "/api/v1/patients", Some(json!({ "name": name })))
}

/// Shared switches and counters for a [`FlakyStore`].
#[derive(Default)]
pub struct StoreControl {
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
}

impl StoreControl {
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.reads() + self.writes()
    }
}

/// In-memory store that counts calls and fails on demand.
pub struct FlakyStore {
    inner: MemoryStore,
    control: Arc<StoreControl>,
}

impl FlakyStore {
    pub fn new() -> (Self, Arc<StoreControl>) {
        let control = Arc::new(StoreControl::default());
        (
            FlakyStore {
                inner: MemoryStore::new(),
                control: Arc::clone(&control),
            },
            control,
        )
    }
}

fn unavailable() -> StorageError {
    StorageError::Unavailable("injected failure".to_string())
}

impl KeyValueStore for FlakyStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        self.control.reads.fetch_add(1, Ordering::SeqCst);
        if self.control.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        self.control.writes.fetch_add(1, Ordering::SeqCst);
        if self.control.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.control.writes.fetch_add(1, Ordering::SeqCst);
        if self.control.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.remove_item(key)
    }

    fn update(
        &self,
        key: &str,
        apply: &mut dyn FnMut(Option<&str>) -> Update,
    ) -> StorageResult<()> {
        self.control.reads.fetch_add(1, Ordering::SeqCst);
        if self.control.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut blocked = false;
        self.inner.update(key, &mut |current: Option<&str>| {
            let update = apply(current);
            if update == Update::Keep {
                return update;
            }
            self.control.writes.fetch_add(1, Ordering::SeqCst);
            if self.control.fail_writes.load(Ordering::SeqCst) {
                blocked = true;
                return Update::Keep;
            }
            update
        })?;
        if blocked {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

/// A queue store over plain memory.
pub fn memory_queue() -> Arc<QueueStore> {
    Arc::new(QueueStore::new(Box::new(MemoryStore::new())))
}

/// A queue store over a [`FlakyStore`], with its control handle.
pub fn flaky_queue() -> (Arc<QueueStore>, Arc<StoreControl>) {
    let (store, control) = FlakyStore::new();
    (Arc::new(QueueStore::new(Box::new(store))), control)
}

type SendHook = Arc<dyn Fn(&CanonicalRequest) + Send + Sync>;

/// Mock API client that records requests and replays scripted results.
///
/// Unscripted sends succeed with 200.
#[derive(Clone, Default)]
pub struct MockApiClient {
    sent: Arc<Mutex<Vec<CanonicalRequest>>>,
    results: Arc<Mutex<VecDeque<ApiResult<ApiResponse>>>>,
    on_send: Option<SendHook>,
}

impl MockApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result for a later send. Results are used in order.
    pub fn push_result(&self, result: ApiResult<ApiResponse>) {
        self.results.lock().unwrap().push_back(result);
    }

    /// Queue a server error for a later send.
    pub fn push_failure(&self, status: u16) {
        self.push_result(Err(ApiError::Status {
            status,
            body: String::new(),
        }));
    }

    /// Run `hook` on every send, before the result is produced.
    pub fn with_hook(mut self, hook: impl Fn(&CanonicalRequest) + Send + Sync + 'static) -> Self {
        self.on_send = Some(Arc::new(hook));
        self
    }

    /// Requests sent so far, in order.
    pub fn sent(&self) -> Vec<CanonicalRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl ApiClient for MockApiClient {
    fn send<'a>(
        &'a self,
        request: &'a CanonicalRequest,
    ) -> Pin<Box<dyn Future<Output = ApiResult<ApiResponse>> + Send + 'a>> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(request.clone());
            if let Some(hook) = &self.on_send {
                hook(request);
            }
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ApiResponse::ok()))
        })
    }
}

/// Reporter that records every error it is handed.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    reports: Arc<Mutex<Vec<(ErrorKind, String)>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<(ErrorKind, String)> {
        self.reports.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.reports().into_iter().map(|(kind, _)| kind).collect()
    }
}

impl ErrorReporter for RecordingReporter {
    fn handle_error(&self, error: &Error, context: &str) {
        self.reports
            .lock()
            .unwrap()
            .push((error.kind(), context.to_string()));
    }
}

/// Serves one HTTP response on a local port.
///
/// Returns the base url and a handle resolving to the raw request text.
pub async fn serve_once(
    status_line: &'static str,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<String>) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if request_complete(&raw) {
                break;
            }
        }

        let response = format!(
            "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&raw).into_owned()
    });

    (base_url, handle)
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    raw.len() >= header_end + 4 + content_length
}

/// A local url nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
