/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use crate::retries::quota::RetryQuotaContainer;
use crate::retries::strategy::ExponentialBackoffStrategy;
use aws_client_runtime_api::error::ServiceError;
use aws_client_runtime_api::retries::{RetryConfig, RetryState, RetryStrategy};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Exponential backoff gated by a client-wide [`RetryQuotaContainer`].
///
/// Every retry must acquire quota first. The quota an invocation consumed is handed back when
/// that invocation eventually succeeds.
#[derive(Clone, Debug)]
pub struct StandardRetryStrategy {
    backoff: ExponentialBackoffStrategy,
    quota: Arc<RetryQuotaContainer>,
}

impl Default for StandardRetryStrategy {
    fn default() -> Self {
        Self::new(&RetryConfig::standard())
    }
}

impl StandardRetryStrategy {
    /// A strategy with its own full quota container.
    pub fn new(config: &RetryConfig) -> Self {
        Self::with_quota(config, Arc::new(RetryQuotaContainer::new()))
    }

    /// A strategy drawing from an existing quota container.
    pub fn with_quota(config: &RetryConfig, quota: Arc<RetryQuotaContainer>) -> Self {
        Self {
            backoff: ExponentialBackoffStrategy::from_config(config),
            quota,
        }
    }

    /// For deterministic tests, use a static base instead of a random one for exponential backoff.
    pub fn with_static_base(mut self, base: fn() -> f64) -> Self {
        self.backoff = self.backoff.with_static_base(base);
        self
    }

    /// The quota container this strategy draws from.
    pub fn quota(&self) -> &Arc<RetryQuotaContainer> {
        &self.quota
    }
}

impl RetryStrategy for StandardRetryStrategy {
    fn should_retry(
        &self,
        error: &ServiceError,
        attempted_retries: u32,
        state: &mut RetryState,
    ) -> bool {
        if !self.backoff.should_retry(error, attempted_retries, state) {
            return false;
        }
        match self.quota.acquire_retry_quota_for(error) {
            Some(cost) => {
                state.record_quota_acquired(cost);
                debug!(cost, available = self.quota.retry_quota(), "acquired retry quota");
                true
            }
            None => {
                debug!(
                    available = self.quota.retry_quota(),
                    "not retrying; retry quota exhausted"
                );
                false
            }
        }
    }

    fn calculate_delay(&self, error: &ServiceError, attempted_retries: u32) -> Duration {
        self.backoff.calculate_delay(error, attempted_retries)
    }

    fn max_attempts(&self) -> u32 {
        self.backoff.max_attempts()
    }

    fn on_success(&self, state: &RetryState) {
        match state.quota_consumed() {
            0 => self.quota.release_no_retry_increment(),
            consumed => self.quota.release_retry_quota(consumed),
        }
    }

    fn retry_quota(&self) -> Option<usize> {
        Some(self.quota.retry_quota())
    }
}
