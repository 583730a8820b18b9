/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Client-wide retry quota.

use aws_client_runtime_api::error::{ErrorKind, ServiceError};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

const DEFAULT_CAPACITY: usize = 500;
const DEFAULT_RETRY_COST: usize = 5;
const DEFAULT_TIMEOUT_RETRY_COST: usize = DEFAULT_RETRY_COST * 2;
const DEFAULT_NO_RETRY_INCREMENT: usize = 1;

/// A bounded pool of retry tokens shared by every invocation of a client.
///
/// Each retry must first acquire tokens; once the pool runs dry, failures that would have been
/// retried become terminal instead. This caps the extra load a client can put on a struggling
/// service. The token count always stays within `[0, capacity]`.
#[derive(Debug)]
pub struct RetryQuotaContainer {
    available: AtomicUsize,
    capacity: usize,
    retry_cost: usize,
    timeout_retry_cost: usize,
    no_retry_increment: usize,
}

impl Default for RetryQuotaContainer {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl RetryQuotaContainer {
    /// A full container with the default capacity of 500 tokens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder for a `RetryQuotaContainer`.
    pub fn builder() -> RetryQuotaContainerBuilder {
        RetryQuotaContainerBuilder::default()
    }

    /// Takes `cost` tokens if at least that many are available.
    ///
    /// Returns `false`, leaving the quota untouched, otherwise.
    pub fn acquire_retry_quota(&self, cost: usize) -> bool {
        self.available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |available| {
                available.checked_sub(cost)
            })
            .is_ok()
    }

    /// Takes the tokens a retry of `error` costs. Returns the cost if it was acquired.
    pub fn acquire_retry_quota_for(&self, error: &ServiceError) -> Option<usize> {
        let cost = self.cost_of(error.kind());
        self.acquire_retry_quota(cost).then_some(cost)
    }

    /// Returns `cost` tokens to the pool, never filling it beyond capacity.
    pub fn release_retry_quota(&self, cost: usize) {
        let capacity = self.capacity;
        let previous = self
            .available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |available| {
                Some(available.saturating_add(cost).min(capacity))
            })
            // the closure never returns `None`
            .unwrap_or_else(|available| available);
        trace!(
            released = cost,
            available = (previous + cost).min(capacity),
            "released retry quota"
        );
    }

    /// Returns the tokens credited for a success that needed no retry.
    pub fn release_no_retry_increment(&self) {
        self.release_retry_quota(self.no_retry_increment);
    }

    /// Tokens currently available.
    pub fn retry_quota(&self) -> usize {
        self.available.load(Ordering::Acquire)
    }

    /// Maximum number of tokens.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tokens a retry of an error of `kind` costs. Timeouts cost double.
    pub fn cost_of(&self, kind: ErrorKind) -> usize {
        match kind {
            ErrorKind::RequestTimeout => self.timeout_retry_cost,
            _ => self.retry_cost,
        }
    }
}

/// Builder for [`RetryQuotaContainer`].
#[derive(Clone, Debug, Default)]
pub struct RetryQuotaContainerBuilder {
    capacity: Option<usize>,
    initial_quota: Option<usize>,
    retry_cost: Option<usize>,
    timeout_retry_cost: Option<usize>,
    no_retry_increment: Option<usize>,
}

impl RetryQuotaContainerBuilder {
    /// Sets the maximum number of tokens. Defaults to 500.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Starts the container with fewer tokens than its capacity.
    pub fn initial_quota(mut self, initial_quota: usize) -> Self {
        self.initial_quota = Some(initial_quota);
        self
    }

    /// Sets the cost of retrying a non-timeout error. Defaults to 5.
    pub fn retry_cost(mut self, retry_cost: usize) -> Self {
        self.retry_cost = Some(retry_cost);
        self
    }

    /// Sets the cost of retrying a timeout. Defaults to 10.
    pub fn timeout_retry_cost(mut self, timeout_retry_cost: usize) -> Self {
        self.timeout_retry_cost = Some(timeout_retry_cost);
        self
    }

    /// Sets the tokens credited when an invocation succeeds on its first attempt. Defaults to 1.
    pub fn no_retry_increment(mut self, no_retry_increment: usize) -> Self {
        self.no_retry_increment = Some(no_retry_increment);
        self
    }

    /// Builds the container.
    pub fn build(self) -> RetryQuotaContainer {
        let capacity = self.capacity.unwrap_or(DEFAULT_CAPACITY);
        RetryQuotaContainer {
            available: AtomicUsize::new(self.initial_quota.unwrap_or(capacity).min(capacity)),
            capacity,
            retry_cost: self.retry_cost.unwrap_or(DEFAULT_RETRY_COST),
            timeout_retry_cost: self
                .timeout_retry_cost
                .unwrap_or(DEFAULT_TIMEOUT_RETRY_COST),
            no_retry_increment: self
                .no_retry_increment
                .unwrap_or(DEFAULT_NO_RETRY_INCREMENT),
        }
    }
}
