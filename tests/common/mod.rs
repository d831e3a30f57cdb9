//! Common test utilities and fixtures.
//!
//! This module provides shared constants, helper functions, and test fixtures
//! to reduce duplication across the test suite.

#![cfg(feature = "server")]
#![allow(dead_code)]

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use serde_json::Value;
use tempfile::TempDir;
use jsonkv::server::{API_KEY_HEADER, AppState, AuthConfig, Config, StorageConfig, router};

/// API key the test server is configured with.
pub const TEST_API_KEY: &str = "test-secret";

// =============================================================================
// Test Application
// =============================================================================

/// Test application wrapper that manages a temporary database.
pub struct TestApp {
    pub server: TestServer,
    temp_dir: TempDir, // Keep alive for test duration
}

impl TestApp {
    /// Create a new test application with a fresh temporary database.
    pub fn new() -> anyhow::Result<Self> {
        Self::with_api_key(Some(TEST_API_KEY))
    }

    /// Create a test application with a specific (or no) API key.
    pub fn with_api_key(api_key: Option<&str>) -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let config = Config {
            storage: StorageConfig {
                path: temp_dir.path().join("db"),
                temp_dir: Some(temp_dir.path().join("tmp")),
            },
            auth: AuthConfig {
                api_key: api_key.map(String::from),
            },
            ..Config::default()
        };
        let state = AppState::from_config(&config)?;
        let server = TestServer::new(router(state))?;
        Ok(Self { server, temp_dir })
    }

    /// Number of files left in the temp file directory.
    pub fn temp_file_count(&self) -> anyhow::Result<usize> {
        Ok(std::fs::read_dir(self.temp_dir.path().join("tmp"))?.count())
    }

    pub fn get(&self, path: &str) -> TestRequest {
        with_key(self.server.get(path))
    }

    pub fn post(&self, path: &str) -> TestRequest {
        with_key(self.server.post(path))
    }

    pub fn delete(&self, path: &str) -> TestRequest {
        with_key(self.server.delete(path))
    }

    /// Set a value through the API.
    pub async fn set_value(&self, key: &str, value: Value) -> anyhow::Result<()> {
        self.post("/set")
            .json(&serde_json::json!({ "key": key, "value": value }))
            .await
            .assert_status_ok();
        Ok(())
    }

    /// Set multiple values through the API.
    pub async fn set_values(&self, values: &[(&str, Value)]) -> anyhow::Result<()> {
        for (key, value) in values {
            self.set_value(key, value.clone()).await?;
        }
        Ok(())
    }

    /// Fetch the key listing through the API.
    pub async fn keys(&self) -> Vec<String> {
        let response = self.get("/keys").await;
        response.assert_status_ok();
        response.json()
    }

    /// Fetch a value through the API, or `None` on 404.
    pub async fn value(&self, key: &str) -> Option<Value> {
        let response = self.get(&format!("/get/{}", urlencoding::encode(key))).await;
        if response.status_code() == StatusCode::NOT_FOUND {
            return None;
        }
        response.assert_status_ok();
        let body: Value = response.json();
        Some(body["value"].clone())
    }
}

/// Attach the test API key to a request.
pub fn with_key(request: TestRequest) -> TestRequest {
    request.add_header(
        HeaderName::from_static(API_KEY_HEADER),
        HeaderValue::from_static(TEST_API_KEY),
    )
}

/// Attach an arbitrary API key to a request.
pub fn with_wrong_key(request: TestRequest) -> TestRequest {
    request.add_header(
        HeaderName::from_static(API_KEY_HEADER),
        HeaderValue::from_static("not-the-key"),
    )
}

// =============================================================================
// Assertion Helpers
// =============================================================================

/// Assert that a JSON error body carries the expected message.
pub fn assert_error_message(body: &Value, expected: &str) {
    assert_eq!(
        body["error"].as_str(),
        Some(expected),
        "unexpected error body: {}",
        body
    );
}
