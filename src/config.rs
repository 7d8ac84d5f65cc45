// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 eid-ra-client developers

//! Configuration types for the enrollment client.
//!
//! This module provides the configuration structure and builder for setting
//! up a client: registration authority URL, local e-ID agent URL, trust
//! anchors, and timeout.

use std::time::Duration;

use url::Url;

use crate::tls::TrustAnchor;

/// Default registration authority base URL.
pub const DEFAULT_SERVER_URL: &str = "https://ra.volksverschluesselung.de";

/// Default local e-ID agent endpoint (TR-03124 eID-Client on loopback).
pub const DEFAULT_EID_AGENT_URL: &str = "http://127.0.0.1:24727/eID-Client";

/// Configuration for an enrollment client.
#[derive(Debug, Clone)]
pub struct RaClientConfig {
    /// Registration authority base URL.
    pub server_url: Url,

    /// Local e-ID agent endpoint. The agent speaks plain HTTP on loopback;
    /// this is the one hop that is not HTTPS.
    pub eid_agent_url: Url,

    /// Trust anchor configuration for server certificate verification.
    pub trust_anchors: TrustAnchors,

    /// Request timeout duration.
    pub timeout: Duration,

    /// Allow the secure transport to issue plain-HTTP requests.
    ///
    /// **WARNING**: for tests against a local mock server only.
    pub allow_plain_http: bool,
}

impl Default for RaClientConfig {
    fn default() -> Self {
        Self {
            server_url: Url::parse(DEFAULT_SERVER_URL).expect("valid default URL"),
            eid_agent_url: Url::parse(DEFAULT_EID_AGENT_URL).expect("valid default URL"),
            trust_anchors: TrustAnchors::WebPki,
            timeout: Duration::from_secs(30),
            allow_plain_http: false,
        }
    }
}

impl RaClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> RaClientConfigBuilder {
        RaClientConfigBuilder::new()
    }

    /// Build the full URL for a service endpoint path.
    pub fn endpoint_url(&self, path: &str) -> Url {
        let mut url = self.server_url.clone();
        url.set_path(path);
        url
    }
}

/// Builder for [`RaClientConfig`].
#[derive(Debug, Default)]
pub struct RaClientConfigBuilder {
    server_url: Option<Url>,
    eid_agent_url: Option<Url>,
    trust_anchors: Option<TrustAnchors>,
    timeout: Option<Duration>,
    allow_plain_http: bool,
}

impl RaClientConfigBuilder {
    /// Create a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the registration authority base URL.
    pub fn server_url(mut self, url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        self.server_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Set the local e-ID agent endpoint URL.
    pub fn eid_agent_url(mut self, url: impl AsRef<str>) -> Result<Self, url::ParseError> {
        self.eid_agent_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Verify the server against the platform's built-in root store.
    pub fn trust_webpki_roots(mut self) -> Self {
        self.trust_anchors = Some(TrustAnchors::WebPki);
        self
    }

    /// Pin server verification to the given trust anchor, replacing the
    /// platform default entirely.
    pub fn trust_pinned(mut self, anchor: TrustAnchor) -> Self {
        self.trust_anchors = Some(TrustAnchors::Pinned(anchor));
        self
    }

    /// Accept any server certificate (insecure, for testing only).
    pub fn trust_any_insecure(mut self) -> Self {
        self.trust_anchors = Some(TrustAnchors::InsecureAcceptAny);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Allow plain-HTTP targets on the secure transport (testing only).
    pub fn allow_plain_http(mut self) -> Self {
        self.allow_plain_http = true;
        self
    }

    /// Build the configuration. Unset fields fall back to the defaults.
    pub fn build(self) -> RaClientConfig {
        let defaults = RaClientConfig::default();
        RaClientConfig {
            server_url: self.server_url.unwrap_or(defaults.server_url),
            eid_agent_url: self.eid_agent_url.unwrap_or(defaults.eid_agent_url),
            trust_anchors: self.trust_anchors.unwrap_or(defaults.trust_anchors),
            timeout: self.timeout.unwrap_or(defaults.timeout),
            allow_plain_http: self.allow_plain_http,
        }
    }
}

/// Trust anchor configuration for server certificate verification.
#[derive(Clone)]
pub enum TrustAnchors {
    /// Use the built-in web PKI root store.
    WebPki,

    /// Pin a loaded trust anchor; the platform store is not consulted.
    Pinned(TrustAnchor),

    /// Accept any server certificate (insecure, for testing only).
    ///
    /// **WARNING**: this disables all server certificate verification.
    InsecureAcceptAny,
}

impl std::fmt::Debug for TrustAnchors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WebPki => write!(f, "WebPki"),
            Self::Pinned(anchor) => write!(f, "Pinned({} certs)", anchor.len()),
            Self::InsecureAcceptAny => write!(f, "InsecureAcceptAny"),
        }
    }
}
