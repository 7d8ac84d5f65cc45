//! Enrollment client implementation.
//!
//! This module provides the main [`RaClient`] struct, which sequences the
//! remote enrollment steps against the registration authority. Each method
//! issues exactly one network call and waits for the complete reply; the
//! only state carried between calls is the held process id.
//!
//! Step ordering is enforced by the server, not here: a step issued out of
//! order comes back as HTTP 409 and surfaces as [`RaError::Conflict`].

use base64::prelude::*;
use reqwest::Method;
use url::Url;

use crate::config::RaClientConfig;
use crate::error::{RaError, Result};
use crate::handshake::{agent_url, extract_auth_key, token_url};
use crate::redirect::RedirectResolver;
use crate::transport::HttpsTransport;
use crate::types::{
    endpoints, extract_data_field, extract_result_field, hex_hash, AuthSession, CertType, Process,
};

/// Multipart field name for certificate signing request uploads.
const CSR_FIELD_NAME: &str = "certification_request";

/// Client for the registration authority's enrollment workflow.
///
/// Holds the current process id across calls. The id lifecycle is
/// empty -> assigned (by [`start_process`](Self::start_process) or
/// [`set_process_id`](Self::set_process_id)) -> cleared (by
/// [`finalize_process`](Self::finalize_process)).
///
/// # Example
///
/// ```no_run
/// use eid_ra_client::{RaClient, RaClientConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut client = RaClient::new(RaClientConfig::default())?;
///
/// client.start_process().await?;
/// println!("process fingerprint: {}", client.process_id_hash());
///
/// client.select_auth_method("eid").await?;
/// let session = client.authenticate_eid().await?;
/// println!("authenticated session {}", session.eid_session);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RaClient {
    config: RaClientConfig,
    transport: HttpsTransport,
    resolver: RedirectResolver,
    process_id: String,
}

impl RaClient {
    /// Create a new client with the given configuration.
    ///
    /// The configured trust anchors are applied to the TLS context once
    /// here and reused for every subsequent request.
    pub fn new(config: RaClientConfig) -> Result<Self> {
        let transport = HttpsTransport::new(&config)?;
        let resolver = RedirectResolver::new(config.timeout)?;
        Ok(Self {
            config,
            transport,
            resolver,
            process_id: String::new(),
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &RaClientConfig {
        &self.config
    }

    /// The currently held process id; empty when no process is active.
    pub fn process_id(&self) -> &str {
        &self.process_id
    }

    /// Restore a process id saved from an earlier run.
    pub fn set_process_id(&mut self, process_id: impl Into<String>) {
        self.process_id = process_id.into();
    }

    /// SHA-256 fingerprint of the held process id as 64 lowercase hex
    /// digits. Display only, never transmitted.
    pub fn process_id_hash(&self) -> String {
        hex_hash(&self.process_id)
    }

    // =========================================================================
    // Process lifecycle
    // =========================================================================

    /// Get the status of the registration authority service itself.
    ///
    /// Returns the raw reply text.
    pub async fn service_status(&self) -> Result<String> {
        let url = self.config.endpoint_url(endpoints::SERVICE_STATUS);
        self.transport.request(Method::GET, url).await
    }

    /// Start a new enrollment process.
    ///
    /// The server assigns an opaque process id, which becomes the held id.
    /// Save it (see [`process_id`](Self::process_id)) to resume the process
    /// in a later run.
    pub async fn start_process(&mut self) -> Result<Process> {
        let url = self.config.endpoint_url(endpoints::PROCESS);
        let reply = self.transport.request(Method::POST, url).await?;

        let id = extract_data_field(&reply, "ProcessId")?;
        self.process_id = id.clone();
        Ok(Process::new(id))
    }

    /// Get the server-reported status of the current process.
    pub async fn process_status(&self) -> Result<String> {
        let url = self.process_url(endpoints::PROCESS)?;
        let reply = self.transport.request(Method::GET, url).await?;
        extract_result_field(&reply, "ProcessStatus")
    }

    /// End the current process and clear the held process id.
    ///
    /// The id is cleared only after the server call succeeds.
    pub async fn finalize_process(&mut self) -> Result<()> {
        let mut url = self.process_url(endpoints::PROCESS)?;
        url.query_pairs_mut().append_pair("success", "true");

        self.transport.request(Method::DELETE, url).await?;
        self.process_id.clear();
        Ok(())
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Select an authentication method for the current process.
    ///
    /// The method string is chosen by the caller (e.g. `eid`, `postid`) and
    /// passed through without local validation; the server decides what it
    /// accepts.
    pub async fn select_auth_method(&self, method: &str) -> Result<()> {
        let mut url = self.process_url(endpoints::AUTH)?;
        url.query_pairs_mut().append_pair("auth_type", method);

        self.transport.request(Method::POST, url).await?;
        Ok(())
    }

    /// Initialize an e-ID session for the current process.
    ///
    /// Returns the session id to hand to
    /// [`perform_eid_handshake`](Self::perform_eid_handshake).
    pub async fn init_eid_session(&self) -> Result<String> {
        let url = self.process_url(endpoints::AUTH_EID)?;
        let reply = self.transport.request(Method::POST, url).await?;
        extract_data_field(&reply, "EIdSession")
    }

    /// Perform the e-ID authentication through the local agent.
    ///
    /// The agent must be running and listening on the configured loopback
    /// endpoint. It fetches the token URL on the client's behalf, runs the
    /// card authentication, and answers with a 303 redirect whose target
    /// carries the auth key.
    pub async fn perform_eid_handshake(&self, eid_session: &str) -> Result<String> {
        let token = token_url(&self.config, eid_session);
        let url = agent_url(&self.config, &token);

        let target = self
            .resolver
            .request_redirect_target(Method::GET, url)
            .await
            .map_err(|err| match err {
                RaError::Transport(msg) => RaError::handshake(format!(
                    "could not connect to the local e-ID agent: {msg}"
                )),
                other => other,
            })?;

        extract_auth_key(&target)
    }

    /// Confirm an e-ID session with the auth key from the handshake.
    ///
    /// Returns the raw reply text.
    pub async fn confirm_eid_session(&self, eid_session: &str, auth_key: &str) -> Result<String> {
        let mut url = self.config.endpoint_url(endpoints::AUTH_EID);
        url.query_pairs_mut()
            .append_pair("eid_session", eid_session)
            .append_pair("eid_authkey", auth_key)
            .append_pair("success", "true");

        self.transport.request(Method::PUT, url).await
    }

    /// Run the complete e-ID authentication: initialize a session, perform
    /// the local handshake, and confirm the session.
    pub async fn authenticate_eid(&self) -> Result<AuthSession> {
        let eid_session = self.init_eid_session().await?;
        let auth_key = self.perform_eid_handshake(&eid_session).await?;
        self.confirm_eid_session(&eid_session, &auth_key).await?;

        Ok(AuthSession {
            eid_session,
            auth_key,
        })
    }

    // =========================================================================
    // E-mail validation and personal data
    // =========================================================================

    /// Submit the e-mail address for the current process.
    pub async fn submit_email(&self, address: &str) -> Result<()> {
        let mut url = self.process_url(endpoints::EMAIL)?;
        url.query_pairs_mut()
            .append_pair("email_addr", address)
            .append_pair("force_flag", "false");

        self.transport.request(Method::POST, url).await?;
        Ok(())
    }

    /// Validate the e-mail address with the code the server mailed out.
    pub async fn validate_email(&self, code: &str) -> Result<()> {
        let mut url = self.process_url(endpoints::EMAIL)?;
        url.query_pairs_mut().append_pair("validation_code", code);

        self.transport.request(Method::PUT, url).await?;
        Ok(())
    }

    /// Fetch the personal data that will go into the certificates.
    ///
    /// Returns the raw reply text; callers decide how to present it.
    pub async fn fetch_personal_data(&self) -> Result<String> {
        let url = self.process_url(endpoints::USERS)?;
        self.transport.request(Method::GET, url).await
    }

    // =========================================================================
    // Certificates
    // =========================================================================

    /// Upload a certificate signing request for one certificate type.
    ///
    /// The CSR bytes are submitted verbatim as a multipart upload; the
    /// server tracks which types have been submitted.
    pub async fn upload_csr(&self, cert_type: CertType, csr: &[u8]) -> Result<()> {
        let mut url = self.process_url(endpoints::CERTIFICATES)?;
        url.query_pairs_mut()
            .append_pair("cert_type", cert_type.as_str());

        self.transport
            .request_with_upload(Method::POST, url, CSR_FIELD_NAME, csr)
            .await?;
        Ok(())
    }

    /// Tell the server that all certificate signing requests are uploaded.
    pub async fn finish_csr_uploads(&self) -> Result<()> {
        let mut url = self.process_url(endpoints::CERTIFICATES)?;
        url.query_pairs_mut().append_pair("publish", "false");

        self.transport.request(Method::PUT, url).await?;
        Ok(())
    }

    /// Download a signed certificate.
    ///
    /// Returns the DER bytes; the certificate is opaque to this client
    /// beyond the base64 decoding.
    pub async fn download_certificate(&self, cert_type: CertType) -> Result<Vec<u8>> {
        let mut url = self.process_url(endpoints::CERTIFICATES)?;
        url.query_pairs_mut()
            .append_pair("cert_type", cert_type.as_str());

        let reply = self.transport.request(Method::GET, url).await?;
        let cert_base64 = extract_data_field(&reply, "CertificateData")?;

        BASE64_STANDARD.decode(cert_base64).map_err(|e| {
            RaError::malformed_response(format!("CertificateData is not valid base64: {e}"))
        })
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Build a process-scoped endpoint URL.
    ///
    /// Fails fast with [`RaError::NoActiveProcess`] before any network call
    /// when no process id is held.
    fn process_url(&self, path: &str) -> Result<Url> {
        if self.process_id.is_empty() {
            return Err(RaError::NoActiveProcess);
        }

        let mut url = self.config.endpoint_url(path);
        url.query_pairs_mut()
            .append_pair("process_id", &self.process_id);
        Ok(url)
    }
}
