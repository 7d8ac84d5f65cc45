//! Trust anchor loading and HTTPS client construction.
//!
//! The registration authority runs under its own root CA rather than a web
//! PKI one, so the client ships a pinned PEM bundle and applies it to every
//! TLS handshake. Loading happens once at startup; the resulting
//! [`TrustAnchor`] is immutable and shared read-only by all requests.

use rustls::pki_types::CertificateDer;
use sha2::{Digest, Sha256};

use crate::config::{RaClientConfig, TrustAnchors};
use crate::error::{RaError, Result};

/// PEM bundle with the registration authority's root certificate,
/// compiled into the binary.
const BUNDLED_ROOT_CA: &[u8] = include_bytes!("../resources/ra-root-ca.pem");

/// SHA-256 of the bundled PEM, checked on load to catch a corrupted
/// resource. Not a security boundary; TLS handshake verification is.
const BUNDLED_ROOT_CA_DIGEST: &str =
    "a05f325c21a31c9c3a5d8500bd8be27faca1ebd5ffb1d6ed18cfa6edd3aa4b7d";

/// An immutable set of trusted certificate authorities.
#[derive(Debug, Clone)]
pub struct TrustAnchor {
    certs: Vec<CertificateDer<'static>>,
}

impl TrustAnchor {
    /// Number of trusted certificates in this anchor.
    pub fn len(&self) -> usize {
        self.certs.len()
    }

    /// Returns true if the anchor holds no certificates.
    ///
    /// `load_trust_anchor` never produces an empty anchor; this exists for
    /// completeness of the container API.
    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    /// Convert the anchor into root certificates for the HTTP client.
    pub(crate) fn root_certificates(&self) -> Result<Vec<reqwest::Certificate>> {
        self.certs
            .iter()
            .map(|cert| {
                reqwest::Certificate::from_der(cert.as_ref())
                    .map_err(|e| RaError::trust_store(format!("unusable CA certificate: {e}")))
            })
            .collect()
    }
}

/// Load a trust anchor from a PEM certificate bundle.
///
/// `integrity` is an optional expected SHA-256 hex digest of the bundle
/// bytes; when given, a mismatch fails the load. Omitting it skips
/// integrity verification of the store itself (not of TLS handshakes).
///
/// # Errors
///
/// Returns [`RaError::TrustStore`] if the bundle is malformed, fails the
/// integrity check, or contains zero certificates.
pub fn load_trust_anchor(pem: &[u8], integrity: Option<&str>) -> Result<TrustAnchor> {
    if let Some(expected) = integrity {
        let digest = Sha256::digest(pem);
        let actual: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(RaError::trust_store(
                "trust store integrity check failed (digest mismatch)",
            ));
        }
    }

    let mut reader = std::io::BufReader::new(pem);
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| RaError::trust_store(format!("failed to parse trust store: {e}")))?;

    if certs.is_empty() {
        return Err(RaError::trust_store("trust store contains no certificates"));
    }

    Ok(TrustAnchor { certs })
}

/// Load the trust anchor bundled with this crate.
pub fn bundled_trust_anchor() -> Result<TrustAnchor> {
    load_trust_anchor(BUNDLED_ROOT_CA, Some(BUNDLED_ROOT_CA_DIGEST))
}

/// Build a reqwest Client with the appropriate TLS configuration.
pub(crate) fn build_http_client(config: &RaClientConfig) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(crate::USER_AGENT)
        .timeout(config.timeout)
        .use_rustls_tls()
        .min_tls_version(reqwest::tls::Version::TLS_1_2);

    match &config.trust_anchors {
        TrustAnchors::WebPki => {
            builder = builder.tls_built_in_root_certs(true);
        }
        TrustAnchors::Pinned(anchor) => {
            builder = builder.tls_built_in_root_certs(false);
            for cert in anchor.root_certificates()? {
                builder = builder.add_root_certificate(cert);
            }
        }
        TrustAnchors::InsecureAcceptAny => {
            builder = builder
                .tls_built_in_root_certs(false)
                .danger_accept_invalid_certs(true);
        }
    }

    builder
        .build()
        .map_err(|e| RaError::transport(format!("failed to build HTTP client: {e}")))
}
