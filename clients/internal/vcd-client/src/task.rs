// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Task monitoring
//!
//! Every mutation returns a [`Task`]. A [`TaskHandle`] tracks the last
//! observed state of one task; [`TaskMonitor`] polls it until it reaches a
//! terminal state or the [`WaitPolicy`] budget runs out. A timeout says
//! nothing about the server side, so the same handle can be awaited again.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep, timeout};
use vcd_api::{EntityKind, Task, TaskError, TaskStatus};

use crate::codec;
use crate::error::{Error, Result};
use crate::reference::Locator;
use crate::transport::Transport;

/// Default delay between polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default overall wait budget
pub const DEFAULT_TASK_TIMEOUT: Duration = Duration::from_secs(600);

/// Default number of consecutive transient poll failures tolerated
pub const DEFAULT_MAX_POLL_FAILURES: u32 = 3;

/// Polls are never issued closer together than this
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long and how often to poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
    pub max_poll_failures: u32,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TASK_TIMEOUT,
            max_poll_failures: DEFAULT_MAX_POLL_FAILURES,
        }
    }
}

impl WaitPolicy {
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            timeout,
            max_poll_failures: DEFAULT_MAX_POLL_FAILURES,
        }
    }

    pub fn with_max_poll_failures(mut self, max_poll_failures: u32) -> Self {
        self.max_poll_failures = max_poll_failures;
        self
    }
}

/// Check the status/error pairing of a task payload
///
/// A failed task without error detail gets a synthesized one. A task that
/// has not failed but carries error detail is rejected.
pub(crate) fn check_task(mut task: Task, locator: &Locator) -> Result<Task> {
    if task.kind != EntityKind::Task {
        return Err(Error::UnexpectedKind {
            expected: EntityKind::Task,
            actual: task.kind,
            locator: locator.to_string(),
        });
    }

    match (task.status.is_failure(), task.error.is_some()) {
        (true, false) => {
            tracing::warn!(
                task = %task.href,
                status = %task.status,
                "task failed without error detail"
            );
            task.error = Some(TaskError {
                message: format!("task ended {} without error detail", task.status),
                major_error_code: 500,
                minor_error_code: "UNKNOWN".to_string(),
            });
            Ok(task)
        }
        (false, true) => Err(Error::MalformedResponse {
            what: "task",
            locator: locator.to_string(),
            message: format!("task in state {} carries error detail", task.status),
        }),
        _ => Ok(task),
    }
}

/// Last observed state of one task
#[derive(Debug, Clone)]
pub struct TaskHandle {
    locator: Locator,
    task: Task,
}

impl TaskHandle {
    /// Handle for a task payload returned by a mutation
    pub fn from_task(task: Task) -> Result<Self> {
        let locator = Locator::parse(&task.href)?;
        let task = check_task(task, &locator)?;
        Ok(Self { locator, task })
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn status(&self) -> TaskStatus {
        self.task.status
    }

    pub fn is_terminal(&self) -> bool {
        self.task.status.is_terminal()
    }

    /// Record a fresh observation; a terminal state is never replaced
    fn observe(&mut self, task: Task) {
        if self.is_terminal() {
            if task.status != self.task.status {
                tracing::warn!(
                    task = %self.locator,
                    recorded = %self.task.status,
                    observed = %task.status,
                    "ignoring state change after terminal state"
                );
            }
            return;
        }
        if task.status != self.task.status {
            tracing::debug!(
                task = %self.locator,
                from = %self.task.status,
                to = %task.status,
                "task state changed"
            );
        }
        self.task = task;
    }
}

/// Final state of a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalOutcome {
    task: Task,
}

impl TerminalOutcome {
    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn into_task(self) -> Task {
        self.task
    }

    pub fn status(&self) -> TaskStatus {
        self.task.status
    }

    pub fn is_success(&self) -> bool {
        self.task.status == TaskStatus::Success
    }

    pub fn error_detail(&self) -> Option<&TaskError> {
        self.task.error.as_ref()
    }

    /// The task on success, [`Error::TaskFailed`] otherwise
    pub fn into_result(self) -> Result<Task> {
        if self.is_success() {
            return Ok(self.task);
        }
        let detail = self.task.error.clone().unwrap_or_else(|| TaskError {
            message: format!("task ended {}", self.task.status),
            major_error_code: 500,
            minor_error_code: "UNKNOWN".to_string(),
        });
        Err(Error::TaskFailed {
            locator: self.task.href.clone(),
            operation: self.task.operation_name.clone(),
            status: self.task.status,
            detail,
        })
    }
}

/// Polls tasks to completion
#[derive(Clone)]
pub struct TaskMonitor {
    transport: Arc<dyn Transport>,
    policy: WaitPolicy,
}

impl TaskMonitor {
    pub fn new(transport: Arc<dyn Transport>, policy: WaitPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &WaitPolicy {
        &self.policy
    }

    /// Current state of the task at `locator`
    pub async fn fetch(&self, locator: &Locator) -> Result<Task> {
        let payload = self.transport.get(locator).await.map_err(|e| {
            if e.status() == Some(404) {
                Error::NotFound {
                    kind: EntityKind::Task,
                    locator: locator.to_string(),
                }
            } else {
                e
            }
        })?;
        let task: Task = codec::decode(&payload, locator, "task")?;
        check_task(task, locator)
    }

    /// Refresh a handle once; terminal handles are not polled
    pub async fn poll(&self, handle: &mut TaskHandle) -> Result<TaskStatus> {
        if !handle.is_terminal() {
            let task = self.fetch(&handle.locator).await?;
            handle.observe(task);
        }
        Ok(handle.status())
    }

    /// Wait with the monitor's policy
    pub async fn await_terminal(&self, handle: &mut TaskHandle) -> Result<TerminalOutcome> {
        let policy = self.policy;
        self.await_terminal_with(handle, &policy).await
    }

    /// Wait for a terminal state, succeeding or not
    pub async fn await_terminal_with(
        &self,
        handle: &mut TaskHandle,
        policy: &WaitPolicy,
    ) -> Result<TerminalOutcome> {
        let start = Instant::now();
        let mut failures = 0u32;

        loop {
            if handle.is_terminal() {
                tracing::info!(
                    task = %handle.locator,
                    operation = %handle.task.operation_name,
                    status = %handle.status(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "task finished"
                );
                return Ok(TerminalOutcome {
                    task: handle.task.clone(),
                });
            }

            // A hung poll must not outlast the wait budget
            let remaining = policy.timeout.saturating_sub(start.elapsed());
            let polled = match timeout(remaining, self.fetch(&handle.locator)).await {
                Ok(polled) => polled,
                Err(_) => return Err(timed_out(handle, start.elapsed())),
            };

            match polled {
                Ok(task) => {
                    failures = 0;
                    handle.observe(task);
                    if handle.is_terminal() {
                        continue;
                    }
                }
                Err(e) if e.is_retryable() => {
                    failures += 1;
                    if failures > policy.max_poll_failures {
                        tracing::warn!(
                            task = %handle.locator,
                            failures,
                            error = %e,
                            "giving up on task after repeated poll failures"
                        );
                        return Err(e);
                    }
                    tracing::warn!(
                        task = %handle.locator,
                        attempt = failures,
                        error = %e,
                        "task poll failed, retrying"
                    );
                }
                Err(e) => return Err(e),
            }

            let elapsed = start.elapsed();
            if elapsed >= policy.timeout {
                return Err(timed_out(handle, elapsed));
            }

            let delay = policy
                .poll_interval
                .max(MIN_POLL_INTERVAL)
                .min(policy.timeout - elapsed);
            sleep(delay).await;
        }
    }

    /// Wait and turn a failed terminal state into [`Error::TaskFailed`]
    pub async fn await_success(&self, handle: &mut TaskHandle) -> Result<Task> {
        self.await_terminal(handle).await?.into_result()
    }
}

fn timed_out(handle: &TaskHandle, elapsed: Duration) -> Error {
    Error::TaskTimeout {
        locator: handle.locator.to_string(),
        last_status: handle.status(),
        elapsed,
    }
}
