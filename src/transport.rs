//! Secure transport: one HTTPS request/response cycle per call.
//!
//! The server speaks a plain request/reply protocol: query parameters in
//! the URL, single-line JSON bodies in the replies, and one hand-encoded
//! `multipart/form-data` part for binary uploads. HTTP 409 is a distinct
//! signal (the operation does not fit the current server-side process
//! state) and is surfaced as its own error kind.

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use url::Url;

use crate::config::RaClientConfig;
use crate::error::{RaError, Result};
use crate::tls::build_http_client;

// One upload per request and a trusted binary payload domain make a fixed
// boundary token safe; the token matches the server's external contract.
const MULTIPART_BOUNDARY: &str = "---boundary6dfb03cc-5d1a-4700-a0f1-203dbdb9f2ea---";

/// HTTPS transport with an optional pinned trust anchor.
///
/// Cheap to share: all state is the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpsTransport {
    http: reqwest::Client,
    require_https: bool,
}

impl HttpsTransport {
    /// Build a transport from the client configuration.
    ///
    /// The configured trust anchors are applied to every TLS handshake for
    /// the lifetime of the transport.
    pub fn new(config: &RaClientConfig) -> Result<Self> {
        Ok(Self {
            http: build_http_client(config)?,
            require_https: !config.allow_plain_http,
        })
    }

    /// Issue a request and return the reply body as a single line of text.
    pub async fn request(&self, method: Method, url: Url) -> Result<String> {
        self.request_inner(method, url, None).await
    }

    /// Issue a request carrying one binary payload as a multipart body.
    ///
    /// The payload is sent as a single `multipart/form-data` part named and
    /// filed under `field_name`, with content type `application/octet-stream`.
    pub async fn request_with_upload(
        &self,
        method: Method,
        url: Url,
        field_name: &str,
        payload: &[u8],
    ) -> Result<String> {
        self.request_inner(method, url, Some((field_name, payload)))
            .await
    }

    async fn request_inner(
        &self,
        method: Method,
        url: Url,
        upload: Option<(&str, &[u8])>,
    ) -> Result<String> {
        if self.require_https && url.scheme() != "https" {
            return Err(RaError::transport(format!(
                "URL did not lead to an https connection: {url}"
            )));
        }

        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, url.clone());
        if let Some((field_name, payload)) = upload {
            let body = encode_multipart(field_name, payload);
            request = request
                .header(
                    CONTENT_TYPE,
                    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
                )
                .header(CONTENT_LENGTH, body.len())
                .body(body);
        }

        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Err(RaError::Conflict);
        }
        if !status.is_success() {
            return Err(RaError::transport(format!("HTTP {status} from {url}")));
        }

        // The server replies single-line JSON; line terminators are
        // stripped and lines concatenated without separators.
        let text = response.text().await?;
        Ok(text.lines().collect())
    }
}

/// Encode a single binary payload as a `multipart/form-data` body.
///
/// Layout: boundary line, disposition header, content-type header, blank
/// line, raw payload bytes, CRLF, closing boundary line. The payload is
/// inserted verbatim, no transcoding.
pub(crate) fn encode_multipart(field_name: &str, payload: &[u8]) -> Vec<u8> {
    let head = format!(
        "--{MULTIPART_BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{field_name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    );
    let tail = format!("\r\n--{MULTIPART_BOUNDARY}--\r\n");

    let mut body = Vec::with_capacity(head.len() + payload.len() + tail.len());
    body.extend_from_slice(head.as_bytes());
    body.extend_from_slice(payload);
    body.extend_from_slice(tail.as_bytes());
    body
}
