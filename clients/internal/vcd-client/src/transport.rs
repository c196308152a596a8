// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! HTTP transport
//!
//! Everything above this module speaks in locators and JSON payloads. The
//! [`Transport`] trait is the seam tests use to substitute canned responses.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use vcd_api::{ACCEPT_JSON, SESSION_HEADER};

use crate::error::{Error, Result};
use crate::reference::Locator;

/// Raw request/response exchange with the director
///
/// Non-2xx responses surface as [`Error::Transport`] carrying the status.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, locator: &Locator) -> Result<Bytes>;

    async fn put(&self, locator: &Locator, payload: Bytes) -> Result<Bytes>;

    async fn post(&self, locator: &Locator, payload: Bytes) -> Result<Bytes>;

    async fn delete(&self, locator: &Locator) -> Result<Bytes>;
}

/// [`Transport`] over reqwest
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(session_token: Option<&SecretString>, timeout: Duration) -> Result<Self> {
        // reqwest is built with rustls-no-provider; a second install is a no-op
        let _ = rustls::crypto::ring::default_provider().install_default();

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        if let Some(token) = session_token {
            let mut value = HeaderValue::from_str(token.expose_secret())
                .map_err(|e| Error::Config(format!("invalid session token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static(SESSION_HEADER), value);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("vcd-client/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an already configured reqwest client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn send(&self, method: Method, locator: &Locator, payload: Option<Bytes>) -> Result<Bytes> {
        let mut request = self.client.request(method.clone(), locator.as_url().clone());
        if let Some(body) = payload {
            request = request.header(CONTENT_TYPE, "application/json").body(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::debug!(%method, locator = %locator, error = %e, "request failed");
            Error::transport(locator, e.status().map(|s| s.as_u16()), e.to_string())
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(locator, Some(status.as_u16()), e.to_string()))?;

        tracing::debug!(%method, locator = %locator, status = status.as_u16(), "response");

        if !status.is_success() {
            return Err(Error::transport(
                locator,
                Some(status.as_u16()),
                error_message(&body, status),
            ));
        }

        Ok(body)
    }
}

/// Best description of a failed response: the `message` field of a JSON
/// error body, else the raw body, else the canonical reason
fn error_message(body: &[u8], status: reqwest::StatusCode) -> String {
    let message = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));
    if let Some(message) = message {
        return message;
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        text.chars().take(512).collect()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, locator: &Locator) -> Result<Bytes> {
        self.send(Method::GET, locator, None).await
    }

    async fn put(&self, locator: &Locator, payload: Bytes) -> Result<Bytes> {
        self.send(Method::PUT, locator, Some(payload)).await
    }

    async fn post(&self, locator: &Locator, payload: Bytes) -> Result<Bytes> {
        self.send(Method::POST, locator, Some(payload)).await
    }

    async fn delete(&self, locator: &Locator) -> Result<Bytes> {
        self.send(Method::DELETE, locator, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_error_message_prefers_json_message() {
        let body = br#"{"message":"No access to entity","majorErrorCode":403}"#;
        assert_eq!(
            error_message(body, StatusCode::FORBIDDEN),
            "No access to entity"
        );
    }

    #[test]
    fn test_error_message_falls_back_to_text_then_reason() {
        assert_eq!(
            error_message(b"upstream exploded\n", StatusCode::BAD_GATEWAY),
            "upstream exploded"
        );
        assert_eq!(
            error_message(b"", StatusCode::SERVICE_UNAVAILABLE),
            "Service Unavailable"
        );
    }
}
