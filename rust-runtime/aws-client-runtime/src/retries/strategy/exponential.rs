/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_client_runtime_api::error::ServiceError;
use aws_client_runtime_api::retries::{RetryConfig, RetryState, RetryStrategy};
use std::time::Duration;
use tracing::debug;

/// Retries every retryable error with jittered exponential backoff, up to a maximum number of
/// attempts.
#[derive(Clone, Debug)]
pub struct ExponentialBackoffStrategy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    base: fn() -> f64,
}

impl Default for ExponentialBackoffStrategy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::legacy())
    }
}

impl ExponentialBackoffStrategy {
    /// A strategy with the legacy defaults: 11 attempts, 25ms initial backoff, 20s max backoff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a strategy from the attempt and backoff settings of `config`.
    ///
    /// A `max_attempts` of zero is treated as one.
    pub fn from_config(config: &RetryConfig) -> Self {
        let strategy = Self {
            max_attempts: config.max_attempts().max(1),
            initial_backoff: config.initial_backoff(),
            max_backoff: config.max_backoff(),
            // by default, use a random base for exponential backoff
            base: fastrand::f64,
        };
        if config.use_static_exponential_base() {
            strategy.with_static_base(|| 1_f64)
        } else {
            strategy
        }
    }

    /// For deterministic tests, use a static base instead of a random one for exponential backoff.
    pub fn with_static_base(mut self, base: fn() -> f64) -> Self {
        self.base = base;
        self
    }
}

impl RetryStrategy for ExponentialBackoffStrategy {
    fn should_retry(
        &self,
        error: &ServiceError,
        attempted_retries: u32,
        _state: &mut RetryState,
    ) -> bool {
        if !error.is_retryable() {
            debug!(kind = %error.kind(), "not retrying a non-retryable error");
            return false;
        }
        if attempted_retries.saturating_add(1) >= self.max_attempts {
            debug!(max_attempts = self.max_attempts, "not retrying; attempts exhausted");
            return false;
        }
        true
    }

    fn calculate_delay(&self, _error: &ServiceError, attempted_retries: u32) -> Duration {
        let exponent = i32::try_from(attempted_retries).unwrap_or(i32::MAX);
        let backoff = (self.base)() * self.initial_backoff.as_secs_f64() * 2_f64.powi(exponent);
        Duration::try_from_secs_f64(backoff)
            .map(|backoff| backoff.min(self.max_backoff))
            .unwrap_or(self.max_backoff)
    }

    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::ExponentialBackoffStrategy;
    use aws_client_runtime_api::error::{ErrorKind, ServiceError};
    use aws_client_runtime_api::retries::{RetryConfig, RetryState, RetryStrategy};
    use std::time::Duration;

    fn server_error() -> ServiceError {
        ServiceError::new(ErrorKind::Server, "internal failure")
    }

    #[test]
    fn legacy_defaults() {
        let strategy = ExponentialBackoffStrategy::new();
        assert_eq!(11, strategy.max_attempts());
        let mut state = RetryState::new();
        assert!(strategy.should_retry(&server_error(), 9, &mut state));
        assert!(!strategy.should_retry(&server_error(), 10, &mut state));
    }

    #[test]
    fn non_retryable_errors_are_never_retried() {
        let strategy = ExponentialBackoffStrategy::new();
        let error = ServiceError::new(ErrorKind::Client, "bad request");
        assert!(!strategy.should_retry(&error, 0, &mut RetryState::new()));
    }

    #[test]
    fn backoff_timing() {
        let config = RetryConfig::standard().with_max_attempts(5);
        let strategy = ExponentialBackoffStrategy::from_config(&config).with_static_base(|| 1_f64);
        let delays: Vec<_> = (0..4)
            .map(|n| strategy.calculate_delay(&server_error(), n))
            .collect();
        assert_eq!(
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8)
            ],
            delays
        );
    }

    #[test]
    fn max_backoff_time() {
        let config = RetryConfig::standard()
            .with_max_attempts(100)
            .with_max_backoff(Duration::from_secs(3));
        let strategy = ExponentialBackoffStrategy::from_config(&config).with_static_base(|| 1_f64);
        assert_eq!(
            Duration::from_secs(3),
            strategy.calculate_delay(&server_error(), 2)
        );
        assert_eq!(
            Duration::from_secs(3),
            strategy.calculate_delay(&server_error(), 4000)
        );
    }

    #[test]
    fn jitter_stays_below_the_exponential_ceiling() {
        let strategy = ExponentialBackoffStrategy::new();
        for n in 0..6 {
            let delay = strategy.calculate_delay(&server_error(), n);
            assert!(delay <= Duration::from_millis(25) * 2_u32.pow(n));
        }
    }

    #[test]
    fn zero_max_attempts_means_one_attempt() {
        let config = RetryConfig::legacy().with_max_attempts(0);
        let strategy = ExponentialBackoffStrategy::from_config(&config);
        assert_eq!(1, strategy.max_attempts());
        assert!(!strategy.should_retry(&server_error(), 0, &mut RetryState::new()));
    }
}
