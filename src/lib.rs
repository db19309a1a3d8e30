//! cors-relay: CORS forwarding proxy for a single upstream
//!
//! A small HTTP shim that relays every request to one fixed upstream
//! origin and returns the response with permissive CORS headers, so
//! browser clients can reach an API that does not serve CORS itself.
//!
//! # Features
//!
//! - Transparent method/header/body passthrough to one upstream base URL
//! - Local CORS preflight (`OPTIONS`) answers, no upstream round-trip
//! - Streaming bodies in both directions, no buffering
//! - Static landing page on `/` and `/index.html`
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! listen_addr = "0.0.0.0:3210"
//! log_requests = true
//!
//! [upstream]
//! base_url = "https://api.example.com"
//! ```

pub mod config;
pub mod error;
pub mod proxy;

pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use proxy::RelayServer;
