// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Error types for vcd-client

use std::time::Duration;

use thiserror::Error;
use vcd_api::{EntityKind, InvalidReference, TaskError, TaskStatus};

/// Result alias used throughout the client
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to vCloud Director
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP failure. Retryable by the caller when
    /// [`Error::is_retryable`] says so.
    #[error("transport error on {locator}{}: {message}", http_status_suffix(.status))]
    Transport {
        locator: String,
        status: Option<u16>,
        message: String,
    },

    /// Payload did not match the expected shape. Not retryable.
    #[error("malformed {what} response from {locator}: {message}")]
    MalformedResponse {
        what: &'static str,
        locator: String,
        message: String,
    },

    /// Addressed entity does not exist
    #[error("{kind} not found at {locator}")]
    NotFound { kind: EntityKind, locator: String },

    /// Addressed metadata key does not exist
    #[error("metadata key '{key}' not found on {locator}")]
    KeyNotFound { locator: String, key: String },

    /// Locator is under neither the user nor the admin prefix
    #[error("locator {locator} does not belong to a known scope")]
    InvalidScope { locator: String },

    /// Operation is admin-only and the session runs in user scope
    #[error("{operation} requires admin scope but the session is in user scope")]
    AdminScopeRequired { operation: &'static str },

    /// Task wait exceeded its budget. The task may still complete later.
    #[error("timed out after {elapsed:?} waiting for task {locator} (last status: {last_status})")]
    TaskTimeout {
        locator: String,
        last_status: TaskStatus,
        elapsed: Duration,
    },

    /// Task reached error, canceled, or aborted
    #[error("task {locator} ({operation}) ended {status}: {detail}")]
    TaskFailed {
        locator: String,
        operation: String,
        status: TaskStatus,
        detail: TaskError,
    },

    /// Entity exists but is of a different kind than requested
    #[error("expected {expected} at {locator} but found {actual}")]
    UnexpectedKind {
        expected: EntityKind,
        actual: EntityKind,
        locator: String,
    },

    /// Operation is not available for this kind of entity
    #[error("{operation} is not supported for {kind} entities")]
    UnsupportedKind {
        kind: EntityKind,
        operation: &'static str,
    },

    #[error(transparent)]
    InvalidReference(#[from] InvalidReference),

    /// Request payload could not be serialized
    #[error("failed to encode request payload: {0}")]
    Encode(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

fn http_status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl Error {
    pub(crate) fn transport(
        locator: impl ToString,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Error::Transport {
            locator: locator.to_string(),
            status,
            message: message.into(),
        }
    }

    /// HTTP status of a transport failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Transport { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::KeyNotFound { .. })
            || self.status() == Some(404)
    }

    /// Connection failures, 5xx, and 429 are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport { status: None, .. } => true,
            Error::Transport {
                status: Some(code), ..
            } => *code >= 500 || *code == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(None, true ; "connection failure")]
    #[test_case(Some(503), true ; "service unavailable")]
    #[test_case(Some(429), true ; "rate limited")]
    #[test_case(Some(404), false ; "not found")]
    #[test_case(Some(400), false ; "bad request")]
    fn test_transport_retryable(status: Option<u16>, retryable: bool) {
        let err = Error::transport("https://vcd.example.com/api/task/1", status, "boom");
        assert_eq!(err.is_retryable(), retryable);
    }

    #[test]
    fn test_malformed_is_not_retryable() {
        let err = Error::MalformedResponse {
            what: "task",
            locator: "https://vcd.example.com/api/task/1".to_string(),
            message: "missing field `status`".to_string(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_transport_display_includes_status() {
        let err = Error::transport("https://vcd.example.com/api/org", Some(502), "bad gateway");
        assert_eq!(
            err.to_string(),
            "transport error on https://vcd.example.com/api/org (HTTP 502): bad gateway"
        );
    }

    #[test]
    fn test_unexpected_kind_reports_both_sides() {
        let err = Error::UnexpectedKind {
            expected: EntityKind::Organization,
            actual: EntityKind::Catalog,
            locator: "https://vcd.example.com/api/catalog/1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("expected organization"));
        assert!(msg.contains("found catalog"));
    }
}
