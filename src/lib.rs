// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 eid-ra-client developers

//! # eid-ra-client
//!
//! Client for an e-ID certificate enrollment registration authority.
//!
//! The registration authority drives certificate issuance as a multi-step
//! remote process: start a process, authenticate the applicant (via the
//! government e-ID card and a locally running agent), validate an e-mail
//! address, upload certificate signing requests, and download the signed
//! certificates. Each step is one HTTPS call against a fixed API; the steps
//! are tied together by an opaque server-assigned process id.
//!
//! ## Features
//!
//! - **Pinned trust anchor**: the authority runs under its own root CA; a
//!   bundled PEM store is applied to every TLS handshake instead of the
//!   platform default.
//! - **e-ID handshake**: the card authentication is delegated to a local
//!   agent on `127.0.0.1:24727`; the auth key comes back as a query
//!   parameter in the target of a 303 redirect.
//! - **Typed failures**: every error surfaces as one [`RaError`] kind, so
//!   callers can tell an out-of-order step (HTTP 409) from a connectivity
//!   problem without string matching.
//!
//! ## Quick start
//!
//! ```no_run
//! use eid_ra_client::{bundled_trust_anchor, CertType, RaClient, RaClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RaClientConfig::builder()
//!         .trust_pinned(bundled_trust_anchor()?)
//!         .build();
//!     let mut client = RaClient::new(config)?;
//!
//!     let process = client.start_process().await?;
//!     println!("started process {}", eid_ra_client::hex_hash(&process.id));
//!
//!     client.select_auth_method("eid").await?;
//!     client.authenticate_eid().await?;
//!
//!     client.submit_email("applicant@example.org").await?;
//!     // ... validate the mailed code, upload CSRs, download certificates
//!     let cert = client.download_certificate(CertType::Sign).await?;
//!     println!("got {} certificate bytes", cert.len());
//!
//!     client.finalize_process().await?;
//!     Ok(())
//! }
//! ```
//!
//! A failed call never changes the held process state (finalization clears
//! it only after its own call succeeds), and no call is retried: the caller
//! decides whether to re-run a step.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod handshake;
pub mod redirect;
pub mod tls;
pub mod transport;
pub mod types;

// Re-export main types at crate root for convenience
pub use client::RaClient;
pub use config::{RaClientConfig, RaClientConfigBuilder, TrustAnchors};
pub use error::{RaError, Result};
pub use tls::{bundled_trust_anchor, load_trust_anchor, TrustAnchor};
pub use types::{hex_hash, AuthSession, CertType, Process};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent string for HTTP requests.
pub const USER_AGENT: &str = concat!("eid-ra-client/", env!("CARGO_PKG_VERSION"));
