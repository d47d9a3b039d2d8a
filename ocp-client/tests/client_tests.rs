//! Integration tests for ocp-client.
//!
//! These tests verify the client API surface without requiring a running server.

use ocp_client::{Client, ClientError};
use ocp_core::{OcpError, ProviderConfig, Region};
use std::time::Duration;

fn config(endpoint: &str) -> ProviderConfig {
    ProviderConfig::builder()
        .token("test-token")
        .endpoint(endpoint)
        .build()
        .unwrap()
}

#[test]
fn test_client_construction() {
    assert!(Client::new(&config("http://localhost:8080")).is_ok());
    assert!(Client::new(&config("https://api.example.com/backend/api")).is_ok());

    let regional = ProviderConfig::builder()
        .token("test-token")
        .region(Region::Pl)
        .request_timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    assert!(Client::new(&regional).is_ok());
}

#[test]
fn test_client_invalid_url() {
    let result = Client::new(&config("localhost:8080"));

    match result {
        Err(ClientError::InvalidUrl(msg)) => {
            assert!(msg.contains("http://"));
        }
        _ => panic!("Expected InvalidUrl error"),
    }
}

#[test]
fn test_error_display() {
    let error = ClientError::InvalidUrl("test error".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Invalid URL"));
    assert!(display.contains("test error"));
}

#[test]
fn test_api_error_display() {
    let error = ClientError::Api {
        status: 409,
        message: "cluster name already taken".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("409"));
    assert!(display.contains("cluster name already taken"));
    assert!(!error.is_not_found());
}

#[test]
fn test_error_converts_into_core_error() {
    let error: OcpError = ClientError::InvalidResponse("truncated".to_string()).into();
    assert!(matches!(error, OcpError::MalformedResponse(msg) if msg == "truncated"));
}
