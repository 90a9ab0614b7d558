#![allow(dead_code)]

//! A `wiremock` server driven from blocking tests, plus product fixtures.

use serde_json::Value;
use std::net::TcpListener;
use tokio::runtime::Runtime;
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// A mock product API. The server runs on its own thread, so the blocking client under test
/// can call it directly; the runtime only drives setup and inspection.
pub struct StubServer {
    server: MockServer,
    runtime: Runtime,
}

impl StubServer {
    pub fn start() -> Self {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    /// Serves the same JSON answer for every request.
    pub fn always(status: u16, body: Value) -> Self {
        let server = Self::start();
        server.mount(Mock::given(any()).respond_with(json_response(status, body)));
        server
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    /// API root, with the `/api` prefix the real backend uses.
    pub fn url(&self) -> String {
        format!("{}/api", self.server.uri())
    }

    pub fn requests(&self) -> Vec<Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    pub fn request_lines(&self) -> Vec<String> {
        self.requests().iter().map(RequestExt::line).collect()
    }
}

pub trait RequestExt {
    /// `"GET /api/products/search?q=lamp"`: method, path and raw query as sent.
    fn line(&self) -> String;
    fn json(&self) -> Value;
}

impl RequestExt for Request {
    fn line(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{} {}?{}", self.method, self.url.path(), query),
            None => format!("{} {}", self.method, self.url.path()),
        }
    }

    fn json(&self) -> Value {
        self.body_json().unwrap()
    }
}

pub fn json_response(status: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}

/// A URL nothing is listening on.
pub fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/api", port)
}

pub fn product_json(id: u64, name: &str, price: f64, quantity: i64, category: &str) -> Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "description": format!("{} description", name),
        "price": price,
        "quantity": quantity,
        "category": category,
        "createdAt": "2024-01-15T10:30:00",
        "updatedAt": "2024-01-15T10:30:00"
    })
}

pub fn ok(data: Value) -> Value {
    serde_json::json!({ "success": true, "data": data })
}
