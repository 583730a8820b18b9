/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Retry strategies.

mod exponential;
mod standard;

pub use exponential::ExponentialBackoffStrategy;
pub use standard::StandardRetryStrategy;

use crate::retries::quota::RetryQuotaContainer;
use aws_client_runtime_api::retries::{RetryConfig, RetryMode, SharedRetryStrategy};
use std::sync::Arc;

/// Builds the strategy `config` selects. Standard-mode strategies draw from `quota`.
pub fn strategy_for(config: &RetryConfig, quota: Arc<RetryQuotaContainer>) -> SharedRetryStrategy {
    match config.mode() {
        RetryMode::Standard => {
            SharedRetryStrategy::new(StandardRetryStrategy::with_quota(config, quota))
        }
        _ => SharedRetryStrategy::new(ExponentialBackoffStrategy::from_config(config)),
    }
}
