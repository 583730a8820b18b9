/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Process environment shim so configuration read from environment variables can be tested
//! without mutating the real, process-global environment.

use std::collections::HashMap;
use std::env::VarError;
use std::fmt;
use std::sync::Arc;

/// Environment variable source: either the real process environment or a fixed map.
///
/// Cloning is cheap; a fake environment lives behind an `Arc`.
#[derive(Clone)]
pub struct Env(Arc<Source>);

enum Source {
    Process,
    Fixed(HashMap<String, String>),
}

impl Default for Env {
    fn default() -> Self {
        Self::real()
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_ref() {
            Source::Process => f.write_str("Env::real()"),
            Source::Fixed(vars) => f.debug_tuple("Env::from_slice").field(&vars.len()).finish(),
        }
    }
}

impl Env {
    /// Delegates to [`std::env::var`].
    pub fn real() -> Self {
        Self(Arc::new(Source::Process))
    }

    /// A fake environment holding exactly `vars`.
    ///
    /// ```rust
    /// use aws_client_runtime_api::os_shim_internal::Env;
    /// let env = Env::from_slice(&[("AWS_RETRY_MODE", "standard")]);
    /// assert_eq!(env.get("AWS_RETRY_MODE").unwrap(), "standard");
    /// ```
    pub fn from_slice(vars: &[(&str, &str)]) -> Self {
        Self(Arc::new(Source::Fixed(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )))
    }

    /// Reads variable `key`.
    pub fn get(&self, key: &str) -> Result<String, VarError> {
        match self.0.as_ref() {
            Source::Process => std::env::var(key),
            Source::Fixed(vars) => vars.get(key).cloned().ok_or(VarError::NotPresent),
        }
    }
}

impl From<HashMap<String, String>> for Env {
    fn from(vars: HashMap<String, String>) -> Self {
        Self(Arc::new(Source::Fixed(vars)))
    }
}
