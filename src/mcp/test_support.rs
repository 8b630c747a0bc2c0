//! Stub JSON-RPC tool service for tests

use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};
use tiny_http::{Header, Response, Server};
use tracing::subscriber::DefaultGuard;

/// A request as seen by the stub
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    /// Header names lowercased
    pub headers: HashMap<String, String>,
    pub body: Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn method(&self) -> &str {
        self.body["method"].as_str().unwrap_or_default()
    }
}

/// Canned reply for one request
#[derive(Debug, Clone)]
pub(crate) struct StubReply {
    pub status: u16,
    pub body: String,
    pub headers: Vec<(String, String)>,
    pub delay: Option<Duration>,
}

impl StubReply {
    pub fn result(id: &Value, result: Value) -> Self {
        Self::json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
    }

    pub fn error(id: &Value, code: i64, message: &str, data: Value) -> Self {
        Self::json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": code, "message": message, "data": data}
        }))
    }

    pub fn json(body: Value) -> Self {
        Self::raw(200, body.to_string())
    }

    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: Vec::new(),
            delay: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

type Handler = dyn Fn(&RecordedRequest) -> StubReply + Send + Sync;

/// Stub server bound to an ephemeral localhost port
pub(crate) struct StubServer {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    /// Serve every request through `handler`, each on its own thread
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> StubReply + Send + Sync + 'static,
    {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let url = format!("http://{}/mcp", addr);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<Handler> = Arc::new(handler);

        let recorded = requests.clone();
        thread::spawn(move || {
            for mut request in server.incoming_requests() {
                let mut raw = String::new();
                let _ = request.as_reader().read_to_string(&mut raw);
                let headers = request
                    .headers()
                    .iter()
                    .map(|h| (h.field.to_string().to_ascii_lowercase(), h.value.to_string()))
                    .collect();
                let seen = RecordedRequest {
                    headers,
                    body: serde_json::from_str(&raw).unwrap_or(Value::Null),
                };
                recorded.lock().unwrap().push(seen.clone());

                let handler = handler.clone();
                thread::spawn(move || {
                    let reply = handler(&seen);
                    if let Some(delay) = reply.delay {
                        thread::sleep(delay);
                    }
                    let mut response = Response::from_string(reply.body).with_status_code(reply.status);
                    for (name, value) in &reply.headers {
                        let header = Header::from_bytes(name.as_bytes(), value.as_bytes()).unwrap();
                        response = response.with_header(header);
                    }
                    let _ = request.respond(response);
                });
            }
        });

        Self { url, requests }
    }

    /// Answer standard HR tool-service traffic from a list of descriptors
    pub fn tool_service(tools: Value) -> Self {
        Self::start(move |req| {
            let id = req.body["id"].clone();
            match req.method() {
                "initialize" => StubReply::result(
                    &id,
                    json!({"protocolVersion": "2024-11-05", "capabilities": {"tools": {}}}),
                ),
                "tools/list" => StubReply::result(&id, json!({"tools": tools.clone()})),
                _ => StubReply::error(&id, -32601, "Method not found", Value::Null),
            }
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// URL on which nothing is listening
pub(crate) fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/mcp", addr)
}

/// Collects formatted log lines emitted on the current thread
#[derive(Clone, Default)]
pub(crate) struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Install as the thread default; lines are captured while the guard lives
    pub fn install(&self) -> DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        let raw = self.buffer.lock().unwrap().clone();
        String::from_utf8_lossy(&raw).lines().map(str::to_string).collect()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
