use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::DEFAULT_USER_AGENT;

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Mark the process-wide transport state as ready.
///
/// Idempotent. Called lazily by client construction; host applications may
/// call it explicitly at startup.
pub fn init() {
    if !INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::info!(user_agent = DEFAULT_USER_AGENT, "push transport initialized");
    }
}

/// Release the process-wide transport state. Safe to call more than once.
pub fn shutdown() {
    if INITIALIZED.swap(false, Ordering::SeqCst) {
        tracing::info!("push transport shut down");
    }
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::SeqCst)
}

/// Options applied when the underlying HTTP client is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransportOptions {
    pub connect_timeout_ms: u64,
    pub total_timeout_ms: u64,
    pub verify_tls: bool,
    pub user_agent: String,
}

impl Default for TransportOptions {
    fn default() -> Self {
        TransportOptions {
            connect_timeout_ms: 5_000,
            total_timeout_ms: 10_000,
            verify_tls: true,
            user_agent: DEFAULT_USER_AGENT.into(),
        }
    }
}

/// Raw HTTP response as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("build http client: {0}")]
    Build(String),
    #[error("{0}")]
    Request(String),
}

/// Trait abstracting the HTTPS exchange for testing.
pub trait Transport: Send {
    /// POST `body` as `application/json` and capture the full response.
    fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, TransportError>;

    /// Rebuild the underlying client with new options.
    fn reconfigure(&mut self, options: &TransportOptions) -> Result<(), TransportError>;
}

/// Blocking `reqwest` transport.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    pub fn new(options: &TransportOptions) -> Result<Self, TransportError> {
        Ok(Self {
            client: build_client(options)?,
        })
    }
}

fn build_client(options: &TransportOptions) -> Result<reqwest::blocking::Client, TransportError> {
    reqwest::blocking::Client::builder()
        .connect_timeout(Duration::from_millis(options.connect_timeout_ms))
        .timeout(Duration::from_millis(options.total_timeout_ms))
        .user_agent(options.user_agent.as_str())
        // With rustls this also skips hostname verification.
        .danger_accept_invalid_certs(!options.verify_tls)
        .build()
        .map_err(|e| TransportError::Build(e.to_string()))
}

impl Transport for ReqwestTransport {
    fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }

    fn reconfigure(&mut self, options: &TransportOptions) -> Result<(), TransportError> {
        self.client = build_client(options)?;
        Ok(())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every request and answers with a canned response.
    pub struct MockTransport {
        pub requests: Arc<Mutex<Vec<(String, String)>>>,
        pub options: Arc<Mutex<Vec<TransportOptions>>>,
        pub reply: Result<HttpResponse, String>,
    }

    impl MockTransport {
        pub fn new(status: u16, body: &str) -> Self {
            Self {
                requests: Arc::new(Mutex::new(Vec::new())),
                options: Arc::new(Mutex::new(Vec::new())),
                reply: Ok(HttpResponse {
                    status,
                    body: body.into(),
                }),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.into()),
                ..Self::new(0, "")
            }
        }
    }

    impl Transport for MockTransport {
        fn post_json(&self, url: &str, body: String) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push((url.into(), body));
            self.reply.clone().map_err(TransportError::Request)
        }

        fn reconfigure(&mut self, options: &TransportOptions) -> Result<(), TransportError> {
            self.options.lock().unwrap().push(options.clone());
            Ok(())
        }
    }
}
