// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Asynchronous task types

use super::common::{EntityKind, Reference};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a server-side task
///
/// `queued -> (preRunning) -> running -> {success | error | canceled | aborted}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    Queued,
    PreRunning,
    Running,
    Success,
    Error,
    #[serde(alias = "cancelled")]
    Canceled,
    Aborted,
}

impl TaskStatus {
    /// No transition leaves a terminal state
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskStatus::Success | TaskStatus::Error | TaskStatus::Canceled | TaskStatus::Aborted
        )
    }

    /// Terminal states that carry error detail
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            TaskStatus::Error | TaskStatus::Canceled | TaskStatus::Aborted
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Queued => "queued",
            TaskStatus::PreRunning => "preRunning",
            TaskStatus::Running => "running",
            TaskStatus::Success => "success",
            TaskStatus::Error => "error",
            TaskStatus::Canceled => "canceled",
            TaskStatus::Aborted => "aborted",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error detail attached to a failed task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskError {
    /// Human-readable message
    pub message: String,
    /// HTTP-like major code (e.g. 400, 500)
    pub major_error_code: u16,
    /// Symbolic minor code (e.g. "DUPLICATE_NAME")
    pub minor_error_code: String,
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} {})",
            self.message, self.major_error_code, self.minor_error_code
        )
    }
}

/// Handle for an in-flight asynchronous mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Locator used to poll the task
    pub href: String,
    /// Task URN
    pub id: String,
    /// Always the task media type
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Task name (usually "task")
    #[serde(default)]
    pub name: String,
    /// Human-readable description of the operation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Symbolic operation name (e.g. "metadataUpdate")
    pub operation_name: String,
    /// Current state
    pub status: TaskStatus,
    /// Entity the task operates on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Reference>,
    /// Present when the task ended in error, cancellation, or abort
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskError>,
    /// When the task was accepted
    pub start_time: DateTime<Utc>,
    /// When the task reached a terminal state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_terminal_states() {
        let terminal: Vec<_> = [
            TaskStatus::Queued,
            TaskStatus::PreRunning,
            TaskStatus::Running,
            TaskStatus::Success,
            TaskStatus::Error,
            TaskStatus::Canceled,
            TaskStatus::Aborted,
        ]
        .into_iter()
        .filter(|s| s.is_terminal())
        .collect();

        assert_eq!(
            terminal,
            vec![
                TaskStatus::Success,
                TaskStatus::Error,
                TaskStatus::Canceled,
                TaskStatus::Aborted
            ]
        );
        assert!(!TaskStatus::Success.is_failure());
    }

    #[test]
    fn test_status_wire_names() {
        let s: TaskStatus = serde_json::from_str("\"preRunning\"").unwrap();
        assert_eq!(s, TaskStatus::PreRunning);
        let s: TaskStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(s, TaskStatus::Canceled);
        assert_eq!(serde_json::to_string(&TaskStatus::Canceled).unwrap(), "\"canceled\"");
    }

    #[test]
    fn test_task_deserializes_camel_case() {
        let json = serde_json::json!({
            "href": "https://vcd.example.com/api/task/0b1c2d3e-4f50-4617-8293-a4b5c6d7e8f9",
            "id": "urn:vcloud:task:0b1c2d3e-4f50-4617-8293-a4b5c6d7e8f9",
            "type": "application/vnd.vmware.vcloud.task+json",
            "name": "task",
            "operationName": "metadataUpdate",
            "status": "error",
            "error": {
                "message": "boom",
                "majorErrorCode": 500,
                "minorErrorCode": "INTERNAL_SERVER_ERROR"
            },
            "startTime": "2026-01-01T00:00:00Z"
        });
        let task: Task = serde_json::from_value(json).unwrap();
        assert_eq!(task.status, TaskStatus::Error);
        assert_eq!(task.error.unwrap().major_error_code, 500);
        assert!(task.end_time.is_none());
    }
}
