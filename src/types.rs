// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 eid-ra-client developers

//! Data model and reply-parsing utilities.
//!
//! The server answers every call with a single-line JSON object whose
//! payload sits under a top-level `Data` or `Result` wrapper. The helpers
//! here pull one named field out of that wrapper and refuse to silently
//! default when it is absent or of the wrong type.

use sha2::{Digest, Sha256};

use crate::error::{RaError, Result};

/// One enrollment process on the server side.
///
/// The id is opaque and server-assigned; it is immutable once assigned and
/// reset to empty by finalization. The empty string denotes "no active
/// process".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Process {
    /// Server-assigned opaque identifier.
    pub id: String,

    /// Status last reported by the server, if it has been queried.
    pub status: Option<String>,
}

impl Process {
    /// Create a process handle for a freshly assigned id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: None,
        }
    }
}

/// A completed e-ID authentication exchange.
///
/// Transient: created by initiating an e-ID session, consumed by confirming
/// it, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Session identifier handed out by the server.
    pub eid_session: String,

    /// Authentication key extracted from the local agent's redirect.
    pub auth_key: String,
}

/// Certificate type within one enrollment process.
///
/// The server tracks one request and one issued certificate per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertType {
    /// Signature certificate.
    Sign,
    /// Authentication certificate.
    Auth,
    /// Encryption certificate.
    Encr,
}

impl CertType {
    /// Wire name of this certificate type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sign => "sign",
            Self::Auth => "auth",
            Self::Encr => "encr",
        }
    }
}

impl std::fmt::Display for CertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CertType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sign" => Ok(Self::Sign),
            "auth" => Ok(Self::Auth),
            "encr" => Ok(Self::Encr),
            other => Err(format!(
                "unknown certificate type '{other}' (expected sign, auth, or encr)"
            )),
        }
    }
}

/// Service endpoint paths.
pub mod endpoints {
    /// Service status endpoint.
    pub const SERVICE_STATUS: &str = "/status/";

    /// Process lifecycle endpoint.
    pub const PROCESS: &str = "/process/";

    /// Authentication method selection endpoint.
    pub const AUTH: &str = "/auth/";

    /// e-ID session lifecycle endpoint.
    pub const AUTH_EID: &str = "/auth/eid/";

    /// E-mail submission and validation endpoint.
    pub const EMAIL: &str = "/email/";

    /// Personal data endpoint.
    pub const USERS: &str = "/users/";

    /// CSR upload and certificate download endpoint.
    pub const CERTIFICATES: &str = "/certificates/";
}

/// Extract a string field from the top-level `Data` wrapper of a reply.
pub(crate) fn extract_data_field(reply: &str, field: &str) -> Result<String> {
    extract_field(reply, "Data", field)
}

/// Extract a string field from the top-level `Result` wrapper of a reply.
pub(crate) fn extract_result_field(reply: &str, field: &str) -> Result<String> {
    extract_field(reply, "Result", field)
}

fn extract_field(reply: &str, wrapper: &str, field: &str) -> Result<String> {
    let value: serde_json::Value = serde_json::from_str(reply)
        .map_err(|e| RaError::malformed_response(format!("invalid JSON reply: {e}")))?;

    value
        .get(wrapper)
        .and_then(|w| w.get(field))
        .and_then(|f| f.as_str())
        .map(str::to_owned)
        .ok_or_else(|| {
            RaError::malformed_response(format!("reply is missing string field {wrapper}.{field}"))
        })
}

/// SHA-256 of a string, rendered as 64 lowercase hex digits.
///
/// The service uses the same fingerprint format for display purposes; the
/// hash is never transmitted.
pub fn hex_hash(s: &str) -> String {
    let digest = Sha256::digest(s.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
