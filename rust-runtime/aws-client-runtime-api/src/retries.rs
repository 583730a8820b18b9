/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Retry strategy seam and retry configuration.

use crate::error::ServiceError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

const LEGACY_MAX_ATTEMPTS: u32 = 11;
const LEGACY_INITIAL_BACKOFF: Duration = Duration::from_millis(25);
const STANDARD_MAX_ATTEMPTS: u32 = 3;
const STANDARD_INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(20);

/// Retry bookkeeping local to one invocation.
///
/// The executor creates one per invocation and threads it through every call to the strategy so
/// that a strategy shared by many concurrent invocations can still account per invocation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RetryState {
    quota_consumed: usize,
}

impl RetryState {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `cost` retry quota tokens were acquired for this invocation.
    pub fn record_quota_acquired(&mut self, cost: usize) {
        self.quota_consumed += cost;
    }

    /// Total quota tokens acquired by this invocation so far.
    pub fn quota_consumed(&self) -> usize {
        self.quota_consumed
    }
}

/// Decides whether, and after how long, a failed attempt is retried.
pub trait RetryStrategy: Send + Sync + fmt::Debug {
    /// Returns `true` if another attempt should be made after `error`.
    ///
    /// `attempted_retries` is the number of retries already made in this invocation, so it is
    /// zero after the first attempt fails.
    fn should_retry(
        &self,
        error: &ServiceError,
        attempted_retries: u32,
        state: &mut RetryState,
    ) -> bool;

    /// How long to wait before the next attempt.
    fn calculate_delay(&self, error: &ServiceError, attempted_retries: u32) -> Duration;

    /// Maximum number of attempts, including the first one.
    fn max_attempts(&self) -> u32;

    /// Called once when an invocation succeeds.
    fn on_success(&self, _state: &RetryState) {}

    /// Tokens left in the retry quota, for strategies that have one.
    fn retry_quota(&self) -> Option<usize> {
        None
    }
}

/// A cheaply clonable, shareable [`RetryStrategy`].
#[derive(Clone, Debug)]
pub struct SharedRetryStrategy(Arc<dyn RetryStrategy>);

impl SharedRetryStrategy {
    /// Wraps a strategy.
    pub fn new(strategy: impl RetryStrategy + 'static) -> Self {
        Self(Arc::new(strategy))
    }
}

impl RetryStrategy for SharedRetryStrategy {
    fn should_retry(
        &self,
        error: &ServiceError,
        attempted_retries: u32,
        state: &mut RetryState,
    ) -> bool {
        self.0.should_retry(error, attempted_retries, state)
    }

    fn calculate_delay(&self, error: &ServiceError, attempted_retries: u32) -> Duration {
        self.0.calculate_delay(error, attempted_retries)
    }

    fn max_attempts(&self) -> u32 {
        self.0.max_attempts()
    }

    fn on_success(&self, state: &RetryState) {
        self.0.on_success(state)
    }

    fn retry_quota(&self) -> Option<usize> {
        self.0.retry_quota()
    }
}

/// Which retry strategy a client uses.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RetryMode {
    /// Exponential backoff only, no retry quota.
    #[default]
    Legacy,
    /// Exponential backoff gated by a client-wide retry quota.
    Standard,
}

/// A string could not be parsed as a [`RetryMode`].
#[derive(Debug, thiserror::Error)]
#[error("`{mode}` is not a valid retry mode; expected `legacy` or `standard`")]
pub struct InvalidRetryMode {
    mode: String,
}

impl FromStr for RetryMode {
    type Err = InvalidRetryMode;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        let string = string.trim();
        if string.eq_ignore_ascii_case("legacy") {
            Ok(RetryMode::Legacy)
        } else if string.eq_ignore_ascii_case("standard") {
            Ok(RetryMode::Standard)
        } else {
            Err(InvalidRetryMode {
                mode: string.to_owned(),
            })
        }
    }
}

/// Retry behavior of a client.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    mode: RetryMode,
    max_attempts: Option<u32>,
    initial_backoff: Option<Duration>,
    max_backoff: Duration,
    use_static_exponential_base: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::legacy()
    }
}

impl RetryConfig {
    /// Exponential backoff without a retry quota: 11 attempts, 25ms initial backoff.
    pub fn legacy() -> Self {
        Self {
            mode: RetryMode::Legacy,
            max_attempts: None,
            initial_backoff: None,
            max_backoff: MAX_BACKOFF,
            use_static_exponential_base: false,
        }
    }

    /// Exponential backoff with a retry quota: 3 attempts, 1s initial backoff.
    pub fn standard() -> Self {
        Self {
            mode: RetryMode::Standard,
            ..Self::legacy()
        }
    }

    /// Changes the retry mode. Mode-specific defaults follow the new mode unless overridden.
    pub fn with_retry_mode(mut self, mode: RetryMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the maximum number of attempts, including the first one.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Sets the delay scale of the first retry.
    pub fn with_initial_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = Some(initial_backoff);
        self
    }

    /// Sets the upper bound of any single backoff.
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// Replaces the random jitter factor with `1.0`. For deterministic tests.
    pub fn with_use_static_exponential_base(mut self, use_static: bool) -> Self {
        self.use_static_exponential_base = use_static;
        self
    }

    /// The retry mode.
    pub fn mode(&self) -> RetryMode {
        self.mode
    }

    /// Maximum attempts, including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.unwrap_or(match self.mode {
            RetryMode::Legacy => LEGACY_MAX_ATTEMPTS,
            RetryMode::Standard => STANDARD_MAX_ATTEMPTS,
        })
    }

    /// Delay scale of the first retry.
    pub fn initial_backoff(&self) -> Duration {
        self.initial_backoff.unwrap_or(match self.mode {
            RetryMode::Legacy => LEGACY_INITIAL_BACKOFF,
            RetryMode::Standard => STANDARD_INITIAL_BACKOFF,
        })
    }

    /// Upper bound of any single backoff.
    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    /// Whether jitter is disabled.
    pub fn use_static_exponential_base(&self) -> bool {
        self.use_static_exponential_base
    }
}
