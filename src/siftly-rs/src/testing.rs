//! Scripted transport for unit tests

use crate::transport::{HttpRequest, HttpResponse, Transport, TransportError};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

pub(crate) type Scripted = Result<HttpResponse, TransportError>;

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
    pub at: Instant,
}

impl RecordedCall {
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_ref()
            .map(|b| serde_json::from_slice(b).expect("recorded body is JSON"))
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .map(|v| v.to_str().expect("ascii header").to_string())
    }
}

/// Replays canned responses in order and records every request.
/// Once the script runs out it fails like an unreachable host.
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
    latency: Option<Duration>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            latency: None,
        })
    }

    pub fn with_latency(script: Vec<Scripted>, latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
            latency: Some(latency),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: request.method,
            path: request.path,
            headers: request.headers,
            body: request.body,
            at: Instant::now(),
        });

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(TransportError::Connection("connection refused".to_string())))
    }
}

pub(crate) fn json_response(status: u16, body: serde_json::Value) -> Scripted {
    Ok(HttpResponse::new(
        StatusCode::from_u16(status).unwrap(),
        serde_json::to_vec(&body).unwrap(),
    ))
}

pub(crate) fn text_response(status: u16, body: &str) -> Scripted {
    Ok(HttpResponse::new(
        StatusCode::from_u16(status).unwrap(),
        body.as_bytes().to_vec(),
    ))
}

pub(crate) fn task_json(uid: u64, status: &str) -> serde_json::Value {
    let mut task = serde_json::json!({
        "uid": uid,
        "indexUid": "movies",
        "status": status,
        "type": "documentAdditionOrUpdate",
        "enqueuedAt": "2022-01-03T10:00:00Z"
    });
    if status == "failed" {
        task["error"] = serde_json::json!({
            "message": "The primary key inference failed",
            "code": "index_primary_key_no_candidate_found",
            "type": "invalid_request",
            "link": "https://docs.meilisearch.com/errors#index_primary_key_no_candidate_found"
        });
    }
    task
}

pub(crate) fn task_info_json(uid: u64, index_uid: Option<&str>, task_type: &str) -> serde_json::Value {
    serde_json::json!({
        "taskUid": uid,
        "indexUid": index_uid,
        "status": "enqueued",
        "type": task_type,
        "enqueuedAt": "2022-01-03T10:00:00Z"
    })
}
