// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright 2026 Edgecast Cloud LLC.

//! Client configuration
//!
//! | Variable | Default |
//! |---|---|
//! | `VCD_URL` | required |
//! | `VCD_ADMIN_URL` | `<VCD_URL>/admin/` |
//! | `VCD_SESSION_TOKEN` | none |
//! | `VCD_SCOPE` | `user` |
//! | `VCD_HTTP_TIMEOUT_SECS` | 30 |
//! | `VCD_TASK_POLL_INTERVAL_MS` | 2000 |
//! | `VCD_TASK_TIMEOUT_SECS` | 600 |
//! | `VCD_TASK_MAX_POLL_FAILURES` | 3 |

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::{Error, Result};
use crate::reference::Locator;
use crate::scope::{PrivilegeContext, Scope};
use crate::task::WaitPolicy;

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct ClientConfig {
    /// Base of the user view, e.g. `https://vcd.example.com/api/`
    pub api_url: Locator,
    /// Base of the admin view; derived from `api_url` when unset
    pub admin_url: Option<Locator>,
    pub session_token: Option<SecretString>,
    pub scope: Scope,
    pub http_timeout: Duration,
    pub wait_policy: WaitPolicy,
}

impl ClientConfig {
    pub fn new(api_url: &str) -> Result<Self> {
        Ok(Self {
            api_url: Locator::parse(api_url)?,
            admin_url: None,
            session_token: None,
            scope: Scope::User,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            wait_policy: WaitPolicy::default(),
        })
    }

    pub fn with_admin_url(mut self, admin_url: &str) -> Result<Self> {
        self.admin_url = Some(Locator::parse(admin_url)?);
        Ok(self)
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(SecretString::from(token.into()));
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_wait_policy(mut self, wait_policy: WaitPolicy) -> Self {
        self.wait_policy = wait_policy;
        self
    }

    /// Configuration from `VCD_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_url = var("VCD_URL")
            .ok_or_else(|| Error::Config("VCD_URL environment variable is required".to_string()))?;
        let mut config = Self::new(&api_url)?;

        if let Some(admin_url) = var("VCD_ADMIN_URL") {
            config = config.with_admin_url(&admin_url)?;
        }
        if let Some(token) = var("VCD_SESSION_TOKEN") {
            config = config.with_session_token(token);
        }
        if let Some(scope) = var("VCD_SCOPE") {
            config.scope = scope.parse()?;
        }
        if let Some(secs) = parse_var::<u64>(&var, "VCD_HTTP_TIMEOUT_SECS")? {
            config.http_timeout = Duration::from_secs(secs);
        }

        let mut policy = WaitPolicy::default();
        if let Some(ms) = parse_var::<u64>(&var, "VCD_TASK_POLL_INTERVAL_MS")? {
            policy = WaitPolicy::new(Duration::from_millis(ms), policy.timeout);
        }
        if let Some(secs) = parse_var::<u64>(&var, "VCD_TASK_TIMEOUT_SECS")? {
            policy.timeout = Duration::from_secs(secs);
        }
        if let Some(max) = parse_var::<u32>(&var, "VCD_TASK_MAX_POLL_FAILURES")? {
            policy.max_poll_failures = max;
        }
        config.wait_policy = policy;

        Ok(config)
    }

    pub fn privilege_context(&self) -> Result<PrivilegeContext> {
        match &self.admin_url {
            Some(admin_url) => {
                PrivilegeContext::new(self.api_url.clone(), admin_url.clone(), self.scope)
            }
            None => Ok(PrivilegeContext::from_api_base(
                self.api_url.clone(),
                self.scope,
            )),
        }
    }
}

fn parse_var<T>(var: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| Error::Config(format!("invalid {} '{}': {}", name, raw, e)))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[("VCD_URL", "https://vcd.example.com/api")]))
            .unwrap();
        assert_eq!(config.scope, Scope::User);
        assert_eq!(config.http_timeout, DEFAULT_HTTP_TIMEOUT);
        assert_eq!(config.wait_policy, WaitPolicy::default());
        assert!(config.session_token.is_none());

        let context = config.privilege_context().unwrap();
        assert_eq!(
            context.admin_base().as_str(),
            "https://vcd.example.com/api/admin/"
        );
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("VCD_URL", "https://vcd.example.com/api/"),
            ("VCD_ADMIN_URL", "https://vcd.example.com/api/admin"),
            ("VCD_SESSION_TOKEN", "abc123"),
            ("VCD_SCOPE", "admin"),
            ("VCD_TASK_POLL_INTERVAL_MS", "250"),
            ("VCD_TASK_TIMEOUT_SECS", "60"),
            ("VCD_TASK_MAX_POLL_FAILURES", "5"),
        ]))
        .unwrap();

        assert_eq!(config.scope, Scope::Admin);
        assert!(config.session_token.is_some());
        assert_eq!(config.wait_policy.poll_interval, Duration::from_millis(250));
        assert_eq!(config.wait_policy.timeout, Duration::from_secs(60));
        assert_eq!(config.wait_policy.max_poll_failures, 5);
    }

    #[test]
    fn test_missing_url_is_config_error() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_bad_number_is_config_error() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("VCD_URL", "https://vcd.example.com/api/"),
            ("VCD_TASK_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("VCD_TASK_TIMEOUT_SECS"));
    }
}
