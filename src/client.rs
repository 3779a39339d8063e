use crate::loader::ClientConfig;
use crate::payload::{build_payload, normalize_url};
use crate::transport::{self, ReqwestTransport, Transport, TransportError, TransportOptions};
use crate::types::*;

/// Blocking client for a Bark-style push relay.
///
/// Holds the target device keys and the relay base URL. Every send performs
/// exactly one HTTPS POST to `<server>push` and reports the outcome as a
/// [`PushError`]; nothing is retried. The client is not internally
/// synchronized, so share it across threads behind a lock.
pub struct PushClient {
    device_keys: Vec<String>,
    server: String,
    options: TransportOptions,
    transport: Box<dyn Transport>,
    last_error: Option<String>,
    last_error_kind: ErrorKind,
    last_status: Option<u16>,
}

impl std::fmt::Debug for PushClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushClient")
            .field("device_keys", &self.device_keys.len())
            .field("server", &self.server)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl PushClient {
    /// Create a client for one or more device keys.
    ///
    /// `server` defaults to [`DEFAULT_SERVER`]; bare hosts get an `https://`
    /// scheme. Fails with [`PushError::ConfigInitFailed`] if the HTTP client
    /// cannot be built.
    pub fn new<K, S>(keys: K, server: Option<&str>) -> Result<Self, PushError>
    where
        K: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_options(keys, server, TransportOptions::default())
    }

    /// Create a client with explicit transport options.
    pub fn with_options<K, S>(
        keys: K,
        server: Option<&str>,
        options: TransportOptions,
    ) -> Result<Self, PushError>
    where
        K: IntoIterator<Item = S>,
        S: Into<String>,
    {
        transport::init();
        let transport = ReqwestTransport::new(&options)
            .map_err(|e| PushError::ConfigInitFailed(e.to_string()))?;
        Ok(Self::build(keys, server, options, Box::new(transport)))
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport<K, S>(
        keys: K,
        server: Option<&str>,
        transport: Box<dyn Transport>,
    ) -> Self
    where
        K: IntoIterator<Item = S>,
        S: Into<String>,
    {
        transport::init();
        Self::build(keys, server, TransportOptions::default(), transport)
    }

    /// Create a client from a loaded configuration record.
    pub fn from_config(config: ClientConfig) -> Result<Self, PushError> {
        Self::with_options(config.device_keys, Some(config.server.as_str()), config.transport)
    }

    fn build<K, S>(
        keys: K,
        server: Option<&str>,
        options: TransportOptions,
        transport: Box<dyn Transport>,
    ) -> Self
    where
        K: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let device_keys = keys
            .into_iter()
            .map(|k: S| -> String { k.into() })
            .filter(|k| !k.is_empty())
            .collect();

        PushClient {
            device_keys,
            server: normalize_server(server.unwrap_or(DEFAULT_SERVER)),
            options,
            transport,
            last_error: None,
            last_error_kind: ErrorKind::Success,
            last_status: None,
        }
    }

    // ── Configuration ──

    /// Append a device key. Empty keys are ignored.
    pub fn add_device_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !key.is_empty() {
            self.device_keys.push(key);
        }
    }

    pub fn clear_device_keys(&mut self) {
        self.device_keys.clear();
    }

    pub fn device_keys(&self) -> &[String] {
        &self.device_keys
    }

    /// Normalized server base, always ending in `/`.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Full URL pushes are posted to.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.server, PUSH_ENDPOINT)
    }

    pub fn transport_options(&self) -> &TransportOptions {
        &self.options
    }

    /// Turn off TLS certificate and hostname verification.
    ///
    /// Only for self-hosted relays with self-signed certificates.
    pub fn disable_ssl_verification(&mut self) -> Result<(), PushError> {
        let options = TransportOptions {
            verify_tls: false,
            ..self.options.clone()
        };
        self.transport
            .reconfigure(&options)
            .map_err(|e| PushError::ConfigInitFailed(e.to_string()))?;
        tracing::warn!(server = %self.server, "TLS verification disabled");
        self.options = options;
        Ok(())
    }

    // ── Diagnostics ──

    /// Detail of the most recent failed send, if the last send failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn last_error_kind(&self) -> ErrorKind {
        self.last_error_kind
    }

    /// HTTP status observed by the most recent send, if the server answered.
    pub fn last_status_code(&self) -> Option<u16> {
        self.last_status
    }

    // ── Sending ──

    /// Send a push with arbitrary parameters.
    ///
    /// A `url` parameter is normalized before sending.
    pub fn send(&mut self, title: &str, message: &str, params: &Params) -> Result<PushResponse, PushError> {
        self.last_error = None;
        self.last_error_kind = ErrorKind::Success;
        self.last_status = None;

        let result = self.dispatch(title, message, params);
        if let Err(e) = &result {
            self.last_error = Some(e.to_string());
            self.last_error_kind = e.kind();
        }
        result
    }

    fn dispatch(&mut self, title: &str, message: &str, params: &Params) -> Result<PushResponse, PushError> {
        if self.device_keys.is_empty() {
            return Err(PushError::NoDevicesSpecified);
        }

        let endpoint = self.endpoint();

        let normalized;
        let params = match params.get(PARAM_URL) {
            Some(url) => {
                let mut p = params.clone();
                p.insert(PARAM_URL.into(), normalize_url(url));
                normalized = p;
                &normalized
            }
            None => params,
        };

        let body = build_payload(&self.device_keys, title, message, params)?;

        tracing::debug!(
            endpoint = %endpoint,
            devices = self.device_keys.len(),
            payload_len = body.len(),
            "sending push"
        );

        let response = self.transport.post_json(&endpoint, body).map_err(|e| {
            let detail = match e {
                TransportError::Build(m) | TransportError::Request(m) => m,
            };
            tracing::warn!(endpoint = %endpoint, error = %detail, "push request failed");
            PushError::Network(detail)
        })?;

        self.last_status = Some(response.status);

        if response.status != 200 {
            tracing::warn!(status = response.status, body = %response.body, "push rejected");
            return Err(PushError::Http {
                status: response.status,
                body: response.body,
            });
        }

        if response.body.is_empty() {
            tracing::warn!(status = response.status, "push returned empty body");
            return Err(PushError::EmptyResponse);
        }

        tracing::info!(status = response.status, devices = self.device_keys.len(), "push sent");
        Ok(PushResponse {
            status: response.status,
            body: response.body,
        })
    }

    /// Send with the common optional fields; see [`PushOptions`].
    pub fn send_advanced(
        &mut self,
        title: &str,
        message: &str,
        options: &PushOptions,
    ) -> Result<PushResponse, PushError> {
        self.send(title, message, &options.to_params())
    }

    /// Send with auto-copy enabled.
    pub fn send_copy(&mut self, title: &str, message: &str) -> Result<PushResponse, PushError> {
        self.send_advanced(title, message, &PushOptions::new().auto_copy("1"))
    }

    /// Push a bare link; the normalized URL is used as both body and target.
    pub fn send_link(&mut self, url: &str) -> Result<PushResponse, PushError> {
        let url = normalize_url(url);
        self.send_advanced(OPEN_LINK_TITLE, &url, &PushOptions::new().url(url.as_str()))
    }

    /// Send a push that opens `url` when tapped.
    pub fn send_url(&mut self, title: &str, message: &str, url: &str) -> Result<PushResponse, PushError> {
        self.send_advanced(title, message, &PushOptions::new().url(url))
    }

    /// Send a critical alert, which plays sound even in silent mode.
    pub fn send_critical(&mut self, title: &str, message: &str) -> Result<PushResponse, PushError> {
        self.send_advanced(title, message, &PushOptions::new().level("critical"))
    }

    /// Send a push that rings repeatedly like an incoming call.
    pub fn send_call(&mut self, title: &str, message: &str) -> Result<PushResponse, PushError> {
        let mut params = Params::new();
        params.insert(PARAM_CALL.into(), "1".into());
        params.insert(PARAM_ARCHIVE.into(), "1".into());
        self.send(title, message, &params)
    }

    pub fn send_silence(&mut self, title: &str, message: &str) -> Result<PushResponse, PushError> {
        self.send_advanced(title, message, &PushOptions::new().sound("silence"))
    }
}

fn normalize_server(raw: &str) -> String {
    let mut server = normalize_url(raw.trim());
    if server.is_empty() {
        server = DEFAULT_SERVER.into();
    }
    if !server.ends_with('/') {
        server.push('/');
    }
    server
}
