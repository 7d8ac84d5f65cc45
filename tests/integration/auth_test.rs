// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 eid-ra-client developers

//! Integration tests for authentication selection and the e-ID handshake

use crate::integration::{MockRaServer, PATH_AUTH, PATH_AUTH_EID};
use eid_ra_client::RaError;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_select_auth_method_passes_method_through() {
    let mock = MockRaServer::start().await;

    Mock::given(method("POST"))
        .and(path(PATH_AUTH))
        .and(query_param("process_id", "abc-123"))
        .and(query_param("auth_type", "eid"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(mock.inner())
        .await;

    let client = mock.client_with_process("abc-123");
    client.select_auth_method("eid").await.expect("select failed");
}

#[tokio::test]
async fn test_init_eid_session_extraction() {
    let mock = MockRaServer::start().await;
    mock.mock_eid_init("session-42").await;

    let client = mock.client_with_process("abc-123");
    let session = client.init_eid_session().await.expect("init failed");

    assert_eq!(session, "session-42");
}

#[tokio::test]
async fn test_handshake_extracts_auth_key() {
    let mock = MockRaServer::start().await;
    mock.mock_agent_redirect(
        "https://ra.example/auth/eid/?eid_session=S&auth_key=ABC123&other=x",
    )
    .await;

    let client = mock.client_with_process("abc-123");
    let key = client
        .perform_eid_handshake("S")
        .await
        .expect("handshake failed");

    assert_eq!(key, "ABC123");

    // The agent must have been handed the re-encoded token URL.
    let requests = mock.inner().received_requests().await.unwrap();
    let agent_request = requests
        .iter()
        .find(|r| r.url.path() == "/eID-Client")
        .expect("agent request");
    let (_, token_url) = agent_request
        .url
        .query_pairs()
        .find(|(k, _)| k == "tcTokenURL")
        .expect("tcTokenURL parameter");
    assert!(token_url.contains("/auth/eid/?eid_session=S"));
}

#[tokio::test]
async fn test_handshake_decodes_auth_key() {
    let mock = MockRaServer::start().await;
    mock.mock_agent_redirect("https://ra.example/?auth_key=ABC%2B123&x=y")
        .await;

    let client = mock.client_with_process("abc-123");
    let key = client.perform_eid_handshake("S").await.unwrap();

    assert_eq!(key, "ABC+123");
}

#[tokio::test]
async fn test_handshake_missing_location() {
    let mock = MockRaServer::start().await;
    mock.mock_agent_status(303).await;

    let client = mock.client_with_process("abc-123");
    let err = client.perform_eid_handshake("S").await.unwrap_err();

    assert!(matches!(err, RaError::MissingRedirect));
}

#[tokio::test]
async fn test_handshake_wrong_status() {
    let mock = MockRaServer::start().await;
    mock.mock_agent_status(200).await;

    let client = mock.client_with_process("abc-123");
    let err = client.perform_eid_handshake("S").await.unwrap_err();

    assert!(matches!(err, RaError::UnexpectedResponse { status: 200 }));
}

#[tokio::test]
async fn test_handshake_agent_unreachable() {
    let mock = MockRaServer::start().await;

    // Point the agent URL at a port nothing listens on.
    let config = eid_ra_client::RaClientConfig::builder()
        .server_url(mock.url())
        .unwrap()
        .eid_agent_url("http://127.0.0.1:9/eID-Client")
        .unwrap()
        .allow_plain_http()
        .build();
    let mut client = eid_ra_client::RaClient::new(config).unwrap();
    client.set_process_id("abc-123");

    let err = client.perform_eid_handshake("S").await.unwrap_err();
    assert!(matches!(err, RaError::Handshake(_)));
}

#[tokio::test]
async fn test_handshake_without_auth_key_in_target() {
    let mock = MockRaServer::start().await;
    mock.mock_agent_redirect("https://ra.example/?eid_session=S").await;

    let client = mock.client_with_process("abc-123");
    let err = client.perform_eid_handshake("S").await.unwrap_err();

    assert!(matches!(err, RaError::Handshake(_)));
}

#[tokio::test]
async fn test_confirm_eid_session_parameters() {
    let mock = MockRaServer::start().await;

    Mock::given(method("PUT"))
        .and(path(PATH_AUTH_EID))
        .and(query_param("eid_session", "session-42"))
        .and(query_param("eid_authkey", "ABC123"))
        .and(query_param("success", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(mock.inner())
        .await;

    let client = mock.client_with_process("abc-123");
    client
        .confirm_eid_session("session-42", "ABC123")
        .await
        .expect("confirm failed");
}

#[tokio::test]
async fn test_authenticate_eid_full_flow() {
    let mock = MockRaServer::start().await;
    mock.mock_eid_init("session-42").await;
    mock.mock_agent_redirect("https://ra.example/?auth_key=KEY9").await;
    mock.mock_ok("PUT", PATH_AUTH_EID).await;

    let client = mock.client_with_process("abc-123");
    let session = client.authenticate_eid().await.expect("flow failed");

    assert_eq!(session.eid_session, "session-42");
    assert_eq!(session.auth_key, "KEY9");
}
