//! Plain redirect resolver.
//!
//! Issues one HTTP request with redirect following disabled and returns the
//! `Location` header value. Used only for the local loopback e-ID handshake,
//! which is the single hop in this system that is not HTTPS.

use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::{RaError, Result};

/// Resolver that reads a redirect's target instead of following it.
#[derive(Debug, Clone)]
pub struct RedirectResolver {
    http: reqwest::Client,
}

impl RedirectResolver {
    /// Build a resolver with the given request timeout.
    pub fn new(timeout: std::time::Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(crate::USER_AGENT)
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|e| RaError::transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    /// Issue a request and return the target of its 303 redirect.
    ///
    /// No body is read.
    ///
    /// # Errors
    ///
    /// [`RaError::Transport`] if the target is unreachable,
    /// [`RaError::UnexpectedResponse`] if the status is not exactly 303,
    /// [`RaError::MissingRedirect`] if the `Location` header is absent.
    pub async fn request_redirect_target(&self, method: Method, url: Url) -> Result<String> {
        tracing::debug!("{} {} (redirects disabled)", method, url);

        let response = self.http.request(method, url).send().await?;

        let status = response.status();
        if status != StatusCode::SEE_OTHER {
            return Err(RaError::unexpected_response(status.as_u16()));
        }

        response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or(RaError::MissingRedirect)
    }
}
