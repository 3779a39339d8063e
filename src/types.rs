use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Public relay used when no server is configured.
pub const DEFAULT_SERVER: &str = "https://api.day.app/";

/// Path appended to the server base for multi-device pushes.
pub const PUSH_ENDPOINT: &str = "push";

/// User agent sent with every request unless overridden.
pub const DEFAULT_USER_AGENT: &str = concat!("barkpush/", env!("CARGO_PKG_VERSION"));

/// Title used by [`PushClient::send_link`](crate::PushClient::send_link).
pub const OPEN_LINK_TITLE: &str = "Open Link";

// ── Parameter keys understood by the relay ──

pub const PARAM_URL: &str = "url";
pub const PARAM_SOUND: &str = "sound";
pub const PARAM_GROUP: &str = "group";
pub const PARAM_LEVEL: &str = "level";
pub const PARAM_ICON: &str = "icon";
pub const PARAM_ARCHIVE: &str = "archive";
pub const PARAM_AUTO_COPY: &str = "autoCopy";
pub const PARAM_CALL: &str = "call";

/// Optional push parameters. Keys are emitted verbatim, values are
/// classified as boolean, number or string when the payload is built.
pub type Params = BTreeMap<String, String>;

// ── Results ──

/// Successful exchange with the relay: HTTP 200 and a non-empty body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushResponse {
    pub status: u16,
    pub body: String,
}

impl PushResponse {
    /// Parse the relay's JSON acknowledgement, if the body is one.
    pub fn reply(&self) -> Option<BarkReply> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Acknowledgement body returned by Bark relays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarkReply {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// Outcome classification of a push attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Success,
    ConfigInitFailed,
    NoDevicesSpecified,
    InvalidUrl,
    NetworkError,
    HttpError,
    EmptyResponse,
    /// Configuration file could not be read or parsed.
    Config,
}

/// Error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("transport initialization failed: {0}")]
    ConfigInitFailed(String),
    #[error("no device keys specified")]
    NoDevicesSpecified,
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("server returned an empty response")]
    EmptyResponse,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PushError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PushError::ConfigInitFailed(_) => ErrorKind::ConfigInitFailed,
            PushError::NoDevicesSpecified => ErrorKind::NoDevicesSpecified,
            PushError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            PushError::Network(_) => ErrorKind::NetworkError,
            PushError::Http { .. } => ErrorKind::HttpError,
            PushError::EmptyResponse => ErrorKind::EmptyResponse,
            PushError::Io(_) | PushError::Json(_) => ErrorKind::Config,
        }
    }

    /// HTTP status carried by the error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            PushError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ── Advanced push options ──

/// Optional fields for [`PushClient::send_advanced`](crate::PushClient::send_advanced).
///
/// Empty strings are treated as unset. `archive` and `auto_copy` are always
/// sent and default to `"1"` and `"0"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOptions {
    pub url: Option<String>,
    pub sound: Option<String>,
    pub group: Option<String>,
    pub level: Option<String>,
    pub icon: Option<String>,
    pub archive: String,
    pub auto_copy: String,
}

impl Default for PushOptions {
    fn default() -> Self {
        PushOptions {
            url: None,
            sound: None,
            group: None,
            level: None,
            icon: None,
            archive: "1".into(),
            auto_copy: "0".into(),
        }
    }
}

impl PushOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn archive(mut self, archive: impl Into<String>) -> Self {
        self.archive = archive.into();
        self
    }

    pub fn auto_copy(mut self, auto_copy: impl Into<String>) -> Self {
        self.auto_copy = auto_copy.into();
        self
    }

    /// Flatten into a parameter map, skipping unset or empty fields.
    /// The `url` value is normalized.
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();

        let optional = [
            (PARAM_URL, &self.url),
            (PARAM_SOUND, &self.sound),
            (PARAM_GROUP, &self.group),
            (PARAM_LEVEL, &self.level),
            (PARAM_ICON, &self.icon),
        ];
        for (key, value) in optional {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                let v = if key == PARAM_URL {
                    crate::payload::normalize_url(v)
                } else {
                    v.to_string()
                };
                params.insert(key.into(), v);
            }
        }

        params.insert(PARAM_ARCHIVE.into(), self.archive.clone());
        params.insert(PARAM_AUTO_COPY.into(), self.auto_copy.clone());
        params
    }
}
