// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 eid-ra-client developers

//! Local e-ID agent handshake helpers.
//!
//! The e-ID agent listens on loopback and, when handed a token URL, drives
//! the card authentication and answers with a 303 redirect whose target
//! embeds the authentication key as an `auth_key` query parameter.
//!
//! The counterpart's reply format is an external contract: the key is the
//! first `auth_key=` occurrence in the raw redirect target, terminated by
//! `&` or end-of-string. The target is deliberately not parsed as a URL.

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

use crate::config::RaClientConfig;
use crate::error::{RaError, Result};
use crate::types::endpoints;

static AUTH_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"auth_key=([^&]+)").expect("valid pattern"));

/// Build the token URL the agent fetches on the client's behalf.
pub(crate) fn token_url(config: &RaClientConfig, eid_session: &str) -> Url {
    let mut url = config.endpoint_url(endpoints::AUTH_EID);
    url.query_pairs_mut().append_pair("eid_session", eid_session);
    url
}

/// Build the loopback agent URL embedding the re-encoded token URL.
pub(crate) fn agent_url(config: &RaClientConfig, token_url: &Url) -> Url {
    let mut url = config.eid_agent_url.clone();
    url.query_pairs_mut()
        .append_pair("tcTokenURL", token_url.as_str());
    url
}

/// Extract the percent-decoded auth key from a redirect target.
///
/// # Errors
///
/// [`RaError::Handshake`] if no `auth_key` parameter is present or the
/// decoded value is not valid UTF-8.
pub fn extract_auth_key(redirect_target: &str) -> Result<String> {
    let matched = AUTH_KEY
        .captures(redirect_target)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| RaError::handshake("auth_key not found in redirection target"))?;

    percent_decode_str(matched.as_str())
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| RaError::handshake("auth_key is not valid UTF-8 after decoding"))
}
