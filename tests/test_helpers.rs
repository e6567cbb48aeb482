#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use inliner_rs::*;
use serde_json::Value;

pub const API: &str = "http://api.test";
pub const CDN: &str = "http://cdn.test";

pub fn api(path: &str) -> String {
    format!("{}/{}", API, path)
}

pub fn cdn(path: &str) -> String {
    format!("{}/{}", CDN, path)
}

pub fn status_url(content_path: &str) -> String {
    api(&format!("content/request-json/{}", content_path))
}

pub fn test_config() -> InlinerConfig {
    InlinerConfig::builder("test-key")
        .with_api_base_url(API)
        .with_image_base_url(CDN)
        .build()
        .unwrap()
}

/// Canned reply for one request.
#[derive(Debug, Clone)]
pub enum Reply {
    Body(u16, Vec<u8>),
    Json(u16, Value),
    /// Fail with a non-retryable validation error.
    Reject(String),
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Reply::Json(200, value)
    }

    pub fn accepted() -> Self {
        Reply::Body(202, Vec::new())
    }

    pub fn not_found() -> Self {
        Reply::Body(404, b"Not Found".to_vec())
    }

    pub fn server_error() -> Self {
        Reply::Json(500, serde_json::json!({"message": "upstream exploded"}))
    }

    pub fn bytes(bytes: &[u8]) -> Self {
        Reply::Body(200, bytes.to_vec())
    }

    pub fn reject(message: &str) -> Self {
        Reply::Reject(message.to_string())
    }
}

/// In-memory transport answering by exact URL.
///
/// Each route holds a queue of replies; the last reply repeats forever.
/// Unrouted URLs answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    log: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, url: impl Into<String>, replies: Vec<Reply>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.into(), replies.into_iter().collect());
        self
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.log.lock().unwrap().iter().filter(|r| r.url == url).count()
    }

    pub fn last_to(&self, url: &str) -> Option<TransportRequest> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|r| r.url == url)
            .cloned()
    }

    fn next_reply(&self, url: &str) -> Reply {
        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) => queue.front().cloned().unwrap_or_else(Reply::not_found),
            None => Reply::not_found(),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let reply = self.next_reply(&request.url);
        self.log.lock().unwrap().push(request);

        let (status, body) = match reply {
            Reply::Body(status, body) => (status, body),
            Reply::Json(status, value) => (status, serde_json::to_vec(&value).unwrap()),
            Reply::Reject(message) => return Err(InlinerError::Validation(message)),
        };

        if !(200..300).contains(&status) {
            let message = serde_json::from_slice::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
            return Err(InlinerError::Http { status, message });
        }

        Ok(TransportResponse::new(status, body))
    }
}

/// Text value of a multipart field, if present.
pub fn form_text(request: &TransportRequest, field: &str) -> Option<String> {
    match &request.body {
        RequestBody::Multipart(parts) => parts.iter().find_map(|p| match p {
            FormPart::Text { name, value } if name == field => Some(value.clone()),
            _ => None,
        }),
        _ => None,
    }
}

/// JSON body of a request, if it has one.
pub fn json_body(request: &TransportRequest) -> Option<Value> {
    match &request.body {
        RequestBody::Json(v) => Some(v.clone()),
        _ => None,
    }
}
