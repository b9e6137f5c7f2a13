//! In-memory transport for tests
//!
//! Replies are queued per request key (`"<METHOD> <path>[?form]"`). The last
//! queued reply of a key keeps being served once the others are used up, so
//! a job can be left "submitted" forever.

use async_trait::async_trait;
use batchrun_client::{ClientError, Result, Transport};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Empty,
    Api(i64, &'static str),
    Malformed,
}

impl Reply {
    fn into_result(self) -> Result<Value> {
        match self {
            Reply::Json(value) => Ok(value),
            Reply::Empty => Err(ClientError::EmptyResponse),
            Reply::Api(code, msg) => Err(ClientError::api_error(code, msg)),
            Reply::Malformed => Err(ClientError::Malformed("<html>".to_string())),
        }
    }
}

#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue replies for a request key
    pub fn script(&self, key: impl Into<String>, replies: impl IntoIterator<Item = Reply>) {
        self.routes
            .lock()
            .unwrap()
            .entry(key.into())
            .or_default()
            .extend(replies);
    }

    /// Queue status replies for a job, one per probe
    pub fn script_statuses(&self, run_id: i64, batch_job_id: &str, statuses: &[&str]) {
        self.script(
            status_key(run_id, batch_job_id),
            statuses.iter().map(|status| status_reply(status)),
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, key: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == key).count()
    }

    fn next_reply(&self, key: String) -> Result<Value> {
        self.calls.lock().unwrap().push(key.clone());

        let mut routes = self.routes.lock().unwrap();
        let reply = match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        reply
            .map(Reply::into_result)
            .unwrap_or_else(|| Err(ClientError::api_error(404, "no scripted reply")))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, path: &str) -> Result<Value> {
        self.next_reply(format!("GET {}", path))
    }

    async fn post(&self, path: &str, form: &[(&str, String)]) -> Result<Value> {
        let mut key = format!("POST {}", path);
        if !form.is_empty() {
            let encoded: Vec<String> = form.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            key.push('?');
            key.push_str(&encoded.join("&"));
        }
        self.next_reply(key)
    }
}

pub fn status_key(run_id: i64, batch_job_id: &str) -> String {
    format!(
        "POST job/jobstatus?batch_job_id={}&runid={}",
        batch_job_id, run_id
    )
}

/// Envelope of a status answer; completed jobs ran for two minutes
pub fn status_reply(status: &str) -> Reply {
    let completed_time = if status == "completed" {
        json!("Fri, 29 Dec 2023 18:49:16 GMT")
    } else {
        Value::Null
    };

    Reply::Json(json!({
        "status_code": 200,
        "data": {
            "status": status,
            "actual_start_time": "Fri, 29 Dec 2023 18:47:16 GMT",
            "completed_time": completed_time
        }
    }))
}

/// Envelope of a successful single-job launch
pub fn launch_reply(run_id: i64, batch_job_id: &str) -> Reply {
    Reply::Json(json!({
        "status_code": 200,
        "data": { "batch_job": batch_job_id, "runid": run_id }
    }))
}

/// Answer exactly one HTTP request with `200 OK` and `body`
///
/// Returns the base URL to point an `ApiClient` at.
pub async fn serve_once(body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request: Vec<u8> = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });

    format!("http://{}/apiv2/", addr)
}
