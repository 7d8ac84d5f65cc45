// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 eid-ra-client developers

//! Integration tests for CSR upload and certificate download

use base64::prelude::*;

use crate::integration::{MockRaServer, PATH_CERTIFICATES};
use eid_ra_client::{CertType, RaError};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_upload_csr_multipart_body() {
    let mock = MockRaServer::start().await;

    Mock::given(method("POST"))
        .and(path(PATH_CERTIFICATES))
        .and(query_param("process_id", "abc-123"))
        .and(query_param("cert_type", "sign"))
        .and(body_string_contains(
            "Content-Disposition: form-data; name=\"certification_request\"; filename=\"certification_request\"",
        ))
        .and(body_string_contains("Content-Type: application/octet-stream"))
        .and(body_string_contains("test-csr-payload"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(mock.inner())
        .await;

    let client = mock.client_with_process("abc-123");
    client
        .upload_csr(CertType::Sign, b"test-csr-payload")
        .await
        .expect("upload failed");

    // Content-Length must equal the exact encoded byte count.
    let requests = mock.inner().received_requests().await.unwrap();
    let upload = &requests[0];
    let content_length: usize = upload
        .headers
        .get("content-length")
        .expect("Content-Length header")
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(content_length, upload.body.len());

    let content_type = upload
        .headers
        .get("content-type")
        .expect("Content-Type header")
        .to_str()
        .unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
}

#[tokio::test]
async fn test_finish_csr_uploads_parameters() {
    let mock = MockRaServer::start().await;

    Mock::given(method("PUT"))
        .and(path(PATH_CERTIFICATES))
        .and(query_param("process_id", "abc-123"))
        .and(query_param("publish", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(mock.inner())
        .await;

    let client = mock.client_with_process("abc-123");
    client.finish_csr_uploads().await.expect("finish failed");
}

#[tokio::test]
async fn test_download_certificate_decodes_base64() {
    let mock = MockRaServer::start().await;
    let der: &[u8] = &[0x30, 0x82, 0x01, 0x0a, 0xff, 0x00];
    mock.mock_certificate(&BASE64_STANDARD.encode(der)).await;

    let client = mock.client_with_process("abc-123");
    let cert = client
        .download_certificate(CertType::Encr)
        .await
        .expect("download failed");

    assert_eq!(cert, der);
}

#[tokio::test]
async fn test_download_certificate_requests_type() {
    let mock = MockRaServer::start().await;

    Mock::given(method("GET"))
        .and(path(PATH_CERTIFICATES))
        .and(query_param("cert_type", "auth"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"{{"Data":{{"CertificateData":"{}"}}}}"#,
            BASE64_STANDARD.encode(b"cert")
        )))
        .mount(mock.inner())
        .await;

    let client = mock.client_with_process("abc-123");
    let cert = client.download_certificate(CertType::Auth).await.unwrap();
    assert_eq!(cert, b"cert");
}

#[tokio::test]
async fn test_download_certificate_missing_field() {
    let mock = MockRaServer::start().await;
    mock.mock_raw_body("GET", PATH_CERTIFICATES, r#"{"Data":{}}"#).await;

    let client = mock.client_with_process("abc-123");
    let err = client.download_certificate(CertType::Sign).await.unwrap_err();

    assert!(matches!(err, RaError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_download_certificate_invalid_base64() {
    let mock = MockRaServer::start().await;
    mock.mock_raw_body(
        "GET",
        PATH_CERTIFICATES,
        r#"{"Data":{"CertificateData":"not!!valid!!base64"}}"#,
    )
    .await;

    let client = mock.client_with_process("abc-123");
    let err = client.download_certificate(CertType::Sign).await.unwrap_err();

    assert!(matches!(err, RaError::MalformedResponse(_)));
}
