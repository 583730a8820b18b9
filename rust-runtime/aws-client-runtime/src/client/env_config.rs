/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Retry configuration from environment variables.

use aws_client_runtime_api::os_shim_internal::Env;
use aws_client_runtime_api::retries::{InvalidRetryMode, RetryConfig, RetryMode};

const ENV_VAR_MAX_ATTEMPTS: &str = "AWS_MAX_ATTEMPTS";
const ENV_VAR_RETRY_MODE: &str = "AWS_RETRY_MODE";

/// An environment variable holds an invalid retry setting.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RetryConfigError {
    /// `AWS_MAX_ATTEMPTS` is not an integer greater than or equal to one.
    #[error("invalid AWS_MAX_ATTEMPTS `{0}`; unset it or set it to an integer greater than or equal to one")]
    InvalidMaxAttempts(String),
    /// `AWS_RETRY_MODE` names an unsupported mode.
    #[error("invalid AWS_RETRY_MODE")]
    InvalidRetryMode(#[from] InvalidRetryMode),
}

/// Loads a [`RetryConfig`] from `AWS_RETRY_MODE` and `AWS_MAX_ATTEMPTS`.
///
/// When neither variable is set there is nothing to load. Invalid values are reported as
/// errors rather than silently ignored.
#[derive(Debug, Default)]
pub struct EnvironmentVariableRetryConfigProvider {
    env: Env,
}

impl EnvironmentVariableRetryConfigProvider {
    /// Creates a provider reading the process environment.
    pub fn new() -> Self {
        Self { env: Env::real() }
    }

    /// Creates a provider reading from `env`. Used by tests to fake the environment.
    #[doc(hidden)]
    pub fn new_with_env(env: Env) -> Self {
        Self { env }
    }

    /// Builds a `RetryConfig` from the environment, or `None` if neither variable is set.
    pub fn retry_config(&self) -> Result<Option<RetryConfig>, RetryConfigError> {
        let max_attempts = self.env.get(ENV_VAR_MAX_ATTEMPTS).ok();
        let retry_mode = self.env.get(ENV_VAR_RETRY_MODE).ok();
        if max_attempts.is_none() && retry_mode.is_none() {
            return Ok(None);
        }

        let mut retry_config = RetryConfig::legacy();
        if let Some(retry_mode) = retry_mode {
            retry_config = retry_config.with_retry_mode(retry_mode.parse::<RetryMode>()?);
        }
        if let Some(max_attempts) = max_attempts {
            match max_attempts.trim().parse::<u32>() {
                Ok(parsed) if parsed > 0 => {
                    retry_config = retry_config.with_max_attempts(parsed);
                }
                _ => return Err(RetryConfigError::InvalidMaxAttempts(max_attempts)),
            }
        }
        Ok(Some(retry_config))
    }
}
