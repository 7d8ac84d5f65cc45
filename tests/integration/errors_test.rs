// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 eid-ra-client developers

//! Integration tests for error surfacing

use crate::integration::{MockRaServer, PATH_AUTH, PATH_EMAIL, PATH_PROCESS};
use eid_ra_client::{RaClient, RaClientConfig, RaError};

#[tokio::test]
async fn test_conflict_is_its_own_kind() {
    let mock = MockRaServer::start().await;
    mock.mock_status("POST", PATH_EMAIL, 409).await;

    let client = mock.client_with_process("abc-123");
    let err = client.submit_email("a@example.org").await.unwrap_err();

    assert!(err.is_conflict());
    assert!(matches!(err, RaError::Conflict));
}

#[tokio::test]
async fn test_conflict_on_any_endpoint() {
    let mock = MockRaServer::start().await;
    mock.mock_status("POST", PATH_AUTH, 409).await;

    let client = mock.client_with_process("abc-123");
    let err = client.select_auth_method("eid").await.unwrap_err();

    assert!(matches!(err, RaError::Conflict));
}

#[tokio::test]
async fn test_server_error_is_transport() {
    let mock = MockRaServer::start().await;
    mock.mock_status("GET", PATH_PROCESS, 500).await;

    let client = mock.client_with_process("abc-123");
    let err = client.process_status().await.unwrap_err();

    assert!(matches!(err, RaError::Transport(_)));
    assert!(!err.is_conflict());
}

#[tokio::test]
async fn test_not_found_is_transport() {
    let mock = MockRaServer::start().await;
    // No mounts: wiremock answers 404.

    let client = mock.client_with_process("abc-123");
    let err = client.process_status().await.unwrap_err();

    assert!(matches!(err, RaError::Transport(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_transport() {
    let config = RaClientConfig::builder()
        .server_url("http://127.0.0.1:9")
        .unwrap()
        .allow_plain_http()
        .build();
    let mut client = RaClient::new(config).unwrap();
    client.set_process_id("abc-123");

    let err = client.process_status().await.unwrap_err();
    assert!(matches!(err, RaError::Transport(_)));
}

#[tokio::test]
async fn test_failed_step_leaves_state_untouched() {
    let mock = MockRaServer::start().await;
    mock.mock_status("POST", PATH_EMAIL, 409).await;

    let client = mock.client_with_process("abc-123");
    let _ = client.submit_email("a@example.org").await.unwrap_err();

    assert_eq!(client.process_id(), "abc-123");
}
