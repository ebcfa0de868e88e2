//! Test doubles for exercising clients without a network or a custodian.
//!
//! [`StubServer`] is an axum router that records every request and answers
//! with the next canned response. [`LocalKeyService`] stands in for a custodial
//! signing service using an in-process key.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use base64::Engine;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::signing::{CustodialSigningService, LocalSigner};
use crate::{Error, Result};

/// Custodial signing service holding one in-process key.
///
/// Like real custodians it reports `v` as a bare recovery id (0/1).
pub struct LocalKeyService {
    key: LocalSigner,
    signed: Mutex<Vec<B256>>,
}

impl LocalKeyService {
    pub fn new(key: LocalSigner) -> Self {
        Self {
            key,
            signed: Mutex::new(Vec::new()),
        }
    }

    /// Digests signed so far, in order.
    pub fn signed_digests(&self) -> Vec<B256> {
        self.signed.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl CustodialSigningService for LocalKeyService {
    async fn sign_payload(&self, account: Address, payload_b64: &str) -> Result<String> {
        if account != self.key.address() {
            return Err(Error::remote(format!("no key held for {}", account)));
        }
        let payload = base64::engine::general_purpose::STANDARD
            .decode(payload_b64)
            .map_err(|e| Error::remote(format!("payload is not base64: {}", e)))?;
        if payload.len() != 32 {
            return Err(Error::remote(format!(
                "payload must be 32 bytes, got {}",
                payload.len()
            )));
        }
        let digest = B256::from_slice(&payload);
        let signature = self.key.sign_digest(digest).await?;
        self.signed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(digest);
        let bare = signature.with_v(signature.v().saturating_sub(27));
        Ok(hex::encode(bare.as_bytes()))
    }
}

/// A request as received by [`StubServer`].
#[derive(Debug, Clone, Default)]
pub struct RecordedRequest {
    pub method: String,
    /// Path including any query string.
    pub path: String,
    /// Header names are lowercased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Default)]
struct StubState {
    responses: Arc<Mutex<VecDeque<(u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct StubServer {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handle: JoinHandle<()>,
}

impl StubServer {
    /// Serve `responses` (status, JSON body) in order, one per request.
    /// Requests past the last response get a 500.
    pub async fn start(responses: Vec<(u16, String)>) -> std::io::Result<Self> {
        let state = StubState {
            responses: Arc::new(Mutex::new(responses.into())),
            ..StubState::default()
        };
        let requests = Arc::clone(&state.requests);
        let router = Router::new().fallback(respond).with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Ok(Self {
            base_url,
            requests,
            handle,
        })
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn respond(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = RecordedRequest {
        method: method.to_string(),
        path: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string()),
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).to_string(),
                )
            })
            .collect(),
        body: String::from_utf8_lossy(&body).to_string(),
    };
    state
        .requests
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .push(request);

    let next = state
        .responses
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .pop_front();
    let (status, body) = next.unwrap_or_else(|| (500, r#"{"error":"no response queued"}"#.to_string()));
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(CONTENT_TYPE, "application/json")], body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_server_records_and_replies_in_order() {
        let server = StubServer::start(vec![
            (200, r#"{"n":1}"#.to_string()),
            (404, r#"{"error":"missing"}"#.to_string()),
        ])
        .await
        .unwrap();
        let http = reqwest::Client::new();

        let first = http
            .post(format!("{}/order?kind=limit", server.url()))
            .header("POLY_API_KEY", "key")
            .body(r#"{"a":1}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(first.status().as_u16(), 200);
        assert_eq!(first.text().await.unwrap(), r#"{"n":1}"#);

        let second = http.get(format!("{}/time", server.url())).send().await.unwrap();
        assert_eq!(second.status().as_u16(), 404);

        let third = http.get(format!("{}/time", server.url())).send().await.unwrap();
        assert_eq!(third.status().as_u16(), 500);

        let requests = server.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].path, "/order?kind=limit");
        assert_eq!(requests[0].header("poly_api_key"), Some("key"));
        assert_eq!(requests[0].body, r#"{"a":1}"#);
        assert_eq!(requests[1].method, "GET");
        assert_eq!(requests[1].path, "/time");
    }
}
