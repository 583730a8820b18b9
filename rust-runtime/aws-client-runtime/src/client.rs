/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The client: owns the state shared by every invocation and runs the retry loop.

pub mod config;
pub mod env_config;
pub mod http_request;
pub mod invocation_id;
mod orchestrator;
pub mod request_info;

use crate::client::config::{ClientConfig, ConfigError};
use crate::client::invocation_id::{InvocationIdGenerator, SharedInvocationIdGenerator};
use crate::clock_skew::ClockSkew;
use crate::retries::quota::RetryQuotaContainer;
use crate::retries::strategy::strategy_for;
use aws_client_runtime_api::request::{Outcome, ServiceRequest};
use aws_client_runtime_api::retries::{RetryStrategy, SharedRetryStrategy};
use aws_client_runtime_api::signer::{NoAuthSigner, SharedSigner, Signer};
use aws_client_runtime_api::time::{SharedSleep, SharedTimeSource, Sleep, TimeSource};
use aws_client_runtime_api::transport::{SharedTransport, Transport};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Executes [`ServiceRequest`]s: builds, signs and sends them, and retries failures.
///
/// A client is cheap to clone, and clones share the retry quota and clock skew estimate. It can
/// be used from many threads at once; each call to [`make_request`](Client::make_request) blocks
/// the calling thread until the invocation finishes.
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: ClientConfig,
    transport: SharedTransport,
    signer: SharedSigner,
    retry_strategy: SharedRetryStrategy,
    time_source: SharedTimeSource,
    sleep: SharedSleep,
    invocation_id_generator: SharedInvocationIdGenerator,
    clock_skew: ClockSkew,
    last_attempted_retries: AtomicU32,
}

impl Client {
    /// Creates a builder for a client using `config`.
    pub fn builder(config: ClientConfig) -> Builder {
        Builder::new(config)
    }

    /// Sends `request`, retrying as the retry strategy allows, and returns the final outcome.
    ///
    /// Only the outcome of the last attempt is returned. Earlier failures are counted in
    /// [`request_attempted_retries`](Client::request_attempted_retries).
    pub fn make_request(&self, request: &ServiceRequest) -> Outcome {
        let mut attempted_retries = 0;
        let outcome = orchestrator::invoke(&self.inner, request, &mut attempted_retries);
        self.inner
            .last_attempted_retries
            .store(attempted_retries, Ordering::Release);
        outcome
    }

    /// Retries made by the most recently completed invocation.
    pub fn request_attempted_retries(&self) -> u32 {
        self.inner.last_attempted_retries.load(Ordering::Acquire)
    }

    /// Tokens left in the retry quota, if the retry strategy has one.
    pub fn retry_quota(&self) -> Option<usize> {
        self.inner.retry_strategy.retry_quota()
    }

    /// Offset currently applied to the local clock when signing.
    pub fn clock_skew(&self) -> chrono::Duration {
        self.inner.clock_skew.current_offset()
    }

    /// The client's configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }
}

/// Builder for [`Client`].
#[derive(Debug)]
pub struct Builder {
    config: ClientConfig,
    transport: Option<SharedTransport>,
    signer: Option<SharedSigner>,
    retry_strategy: Option<SharedRetryStrategy>,
    retry_quota: Option<Arc<RetryQuotaContainer>>,
    time_source: Option<SharedTimeSource>,
    sleep: Option<SharedSleep>,
    invocation_id_generator: Option<SharedInvocationIdGenerator>,
}

impl Builder {
    fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            signer: None,
            retry_strategy: None,
            retry_quota: None,
            time_source: None,
            sleep: None,
            invocation_id_generator: None,
        }
    }

    /// Sets the transport requests are sent with. Required.
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(SharedTransport::new(transport));
        self
    }

    /// Sets the signer. Defaults to [`NoAuthSigner`].
    pub fn signer(mut self, signer: impl Signer + 'static) -> Self {
        self.signer = Some(SharedSigner::new(signer));
        self
    }

    /// Replaces the strategy the retry configuration would select.
    pub fn retry_strategy(mut self, retry_strategy: impl RetryStrategy + 'static) -> Self {
        self.retry_strategy = Some(SharedRetryStrategy::new(retry_strategy));
        self
    }

    /// Shares a retry quota with other clients. Only used in standard retry mode.
    pub fn retry_quota(mut self, quota: Arc<RetryQuotaContainer>) -> Self {
        self.retry_quota = Some(quota);
        self
    }

    /// Sets the clock. Defaults to the system clock.
    pub fn time_source(mut self, time_source: impl TimeSource + 'static) -> Self {
        self.time_source = Some(SharedTimeSource::new(time_source));
        self
    }

    /// Sets how the client waits between attempts. Defaults to blocking the thread.
    pub fn sleep_impl(mut self, sleep: impl Sleep + 'static) -> Self {
        self.sleep = Some(SharedSleep::new(sleep));
        self
    }

    /// Sets the source of invocation ids. Defaults to random UUIDs.
    pub fn invocation_id_generator(
        mut self,
        generator: impl InvocationIdGenerator + 'static,
    ) -> Self {
        self.invocation_id_generator = Some(SharedInvocationIdGenerator::new(generator));
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<Client, ConfigError> {
        let transport = self.transport.ok_or(ConfigError::MissingTransport)?;
        let retry_strategy = match self.retry_strategy {
            Some(retry_strategy) => retry_strategy,
            None => strategy_for(
                self.config.retry_config(),
                self.retry_quota.unwrap_or_default(),
            ),
        };
        let clock_skew = ClockSkew::new(self.config.clock_skew_threshold());
        Ok(Client {
            inner: Arc::new(Inner {
                transport,
                signer: self
                    .signer
                    .unwrap_or_else(|| SharedSigner::new(NoAuthSigner::new())),
                retry_strategy,
                time_source: self.time_source.unwrap_or_default(),
                sleep: self.sleep.unwrap_or_default(),
                invocation_id_generator: self.invocation_id_generator.unwrap_or_default(),
                clock_skew,
                last_attempted_retries: AtomicU32::new(0),
                config: self.config,
            }),
        })
    }
}
