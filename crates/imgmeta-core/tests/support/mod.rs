//! Canned-response HTTP server for exercising the provider clients.
//!
//! Every request is recorded and answered with the next queued response;
//! the last one repeats.

#![allow(dead_code)]

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Clone)]
struct MockState {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    responses: Arc<Vec<(StatusCode, String)>>,
    next: Arc<AtomicUsize>,
    delay: Duration,
}

pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockServer {
    /// Serve `responses` (status, body) in order.
    pub async fn respond(responses: Vec<(u16, &str)>) -> Self {
        Self::respond_after(Duration::ZERO, responses).await
    }

    /// Like `respond`, but wait `delay` before answering each request.
    pub async fn respond_after(delay: Duration, responses: Vec<(u16, &str)>) -> Self {
        assert!(!responses.is_empty());
        let responses = responses
            .into_iter()
            .map(|(s, b)| (StatusCode::from_u16(s).unwrap(), b.to_string()))
            .collect();

        let state = MockState {
            requests: Arc::new(Mutex::new(Vec::new())),
            responses: Arc::new(responses),
            next: Arc::new(AtomicUsize::new(0)),
            delay,
        };
        let requests = state.requests.clone();
        let app = Router::new().fallback(answer).with_state(state);

        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn answer(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    state.requests.lock().unwrap().push(CapturedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        headers,
        body,
    });

    let idx = state
        .next
        .fetch_add(1, Ordering::SeqCst)
        .min(state.responses.len() - 1);
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }

    let (status, body) = state.responses[idx].clone();
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

/// A URL on a port nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/describe")
}
