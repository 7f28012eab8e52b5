//! MesFactures Connect - client side of the remote backend.
//!
//! This crate provides the HTTP pieces the offline layer plugs into its
//! seams: the [`HttpTransmitter`] that replays the sync queue, the
//! [`HttpReachabilityProbe`] feeding the connectivity monitor, and the
//! [`ApiClient`] for authentication, invoices and goals.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mesfactures_connect::{ApiClient, HttpTransmitter};
//!
//! let api = ApiClient::new("http://localhost:5000/api")?;
//! let login = api.login("marie@example.com", "secret").await?;
//! let transmitter = HttpTransmitter::new(api).with_token(Some(login.token));
//! ```

mod client;
mod error;
mod probe;
mod transmitter;
mod types;

pub use client::{ApiClient, DEFAULT_TIMEOUT_SECS};
pub use error::{ConnectError, Result};
pub use probe::{HttpReachabilityProbe, DEFAULT_PROBE_TIMEOUT_SECS};
pub use transmitter::{route_for, HttpTransmitter};
pub use types::*;
