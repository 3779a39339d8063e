//! `barkpush` — A blocking client for Bark-style push notification relays.
//!
//! Builds a JSON push payload from a title, a body and optional delivery
//! parameters, and POSTs it to `<server>/push` for one or more device keys.
//! Each send is a single request/response exchange; outcomes are reported
//! as a typed [`PushError`].
//!
//! # Quick start
//!
//! ```rust,no_run
//! use barkpush::{Params, PushClient, PushOptions};
//!
//! # fn example() -> Result<(), barkpush::PushError> {
//! let mut client = PushClient::new(["your-device-key"], None)?;
//!
//! client.send("Hello", "World", &Params::new())?;
//! client.send_critical("Alert", "Disk full")?;
//! client.send_advanced(
//!     "Deploy",
//!     "v1.2.0 is live",
//!     &PushOptions::new().url("example.com/releases").group("deploys"),
//! )?;
//!
//! if let Err(e) = client.send_silence("Nightly", "backup done") {
//!     eprintln!("{:?} (status {:?})", e.kind(), client.last_status_code());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod loader;
pub mod payload;
pub mod transport;
pub mod types;

// Re-export the most commonly used items at the crate root.
pub use client::PushClient;
pub use loader::{load_config, parse_config, ClientConfig};
pub use payload::{build_payload, escape_json, normalize_url};
pub use transport::{Transport, TransportOptions};
pub use types::{
    BarkReply, ErrorKind, Params, PushError, PushOptions, PushResponse, DEFAULT_SERVER,
    DEFAULT_USER_AGENT, OPEN_LINK_TITLE,
};
