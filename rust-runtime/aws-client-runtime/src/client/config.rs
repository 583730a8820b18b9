/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Client configuration.

use crate::clock_skew::DEFAULT_CLOCK_SKEW_THRESHOLD;
use aws_client_runtime_api::retries::RetryConfig;
use http::uri::{InvalidUri, Scheme};
use http::Uri;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(3000);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(1000);

/// The user agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("aws-client-runtime/", env!("CARGO_PKG_VERSION"));

/// A client could not be configured.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// No endpoint was set.
    #[error("an endpoint is required")]
    MissingEndpoint,
    /// The endpoint is not a URI.
    #[error("invalid endpoint `{endpoint}`")]
    InvalidEndpoint {
        /// The rejected endpoint.
        endpoint: String,
        /// Why it was rejected.
        #[source]
        source: InvalidUri,
    },
    /// The endpoint lacks a scheme or host, or uses a scheme other than `http` / `https`.
    #[error("endpoint `{0}` must be an absolute `http` or `https` URI")]
    UnsupportedEndpoint(String),
    /// `max_attempts` was set to zero.
    #[error("max attempts must be at least one")]
    ZeroMaxAttempts,
    /// No transport was set on the client builder.
    #[error("a transport is required")]
    MissingTransport,
}

/// Configuration of a [`Client`](crate::client::Client).
#[derive(Clone, Debug)]
pub struct ClientConfig {
    endpoint: Uri,
    user_agent: String,
    request_timeout: Duration,
    connect_timeout: Duration,
    clock_skew_adjustment: bool,
    clock_skew_threshold: Duration,
    retry_config: RetryConfig,
}

impl ClientConfig {
    /// Creates a builder.
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Scheme, authority and base path every request is sent to.
    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    /// Value of the `user-agent` header.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// How long an attempt may take. Used to compute the `ttl` sent with retries.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Connect timeout, for transports that honor it.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Whether clock skew is detected and corrected.
    pub fn clock_skew_adjustment(&self) -> bool {
        self.clock_skew_adjustment
    }

    /// Discrepancy at which the local clock is considered skewed.
    pub fn clock_skew_threshold(&self) -> Duration {
        self.clock_skew_threshold
    }

    /// Retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }
}

/// Builder for [`ClientConfig`].
#[derive(Clone, Debug, Default)]
pub struct Builder {
    endpoint: Option<String>,
    user_agent: Option<String>,
    request_timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    clock_skew_adjustment: Option<bool>,
    clock_skew_threshold: Option<Duration>,
    retry_config: Option<RetryConfig>,
}

impl Builder {
    /// Sets the endpoint, e.g. `https://service.us-east-1.amazonaws.com`.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.set_endpoint(Some(endpoint.into()));
        self
    }

    /// Sets the endpoint.
    pub fn set_endpoint(&mut self, endpoint: Option<String>) -> &mut Self {
        self.endpoint = endpoint;
        self
    }

    /// Sets the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.set_user_agent(Some(user_agent.into()));
        self
    }

    /// Sets the user agent.
    pub fn set_user_agent(&mut self, user_agent: Option<String>) -> &mut Self {
        self.user_agent = user_agent;
        self
    }

    /// Sets the request timeout. Defaults to 3 seconds.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.set_request_timeout(Some(timeout));
        self
    }

    /// Sets the request timeout.
    pub fn set_request_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the connect timeout. Defaults to 1 second.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.set_connect_timeout(Some(timeout));
        self
    }

    /// Sets the connect timeout.
    pub fn set_connect_timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.connect_timeout = timeout;
        self
    }

    /// Enables or disables clock skew correction. Enabled by default.
    pub fn clock_skew_adjustment(mut self, enabled: bool) -> Self {
        self.set_clock_skew_adjustment(Some(enabled));
        self
    }

    /// Enables or disables clock skew correction.
    pub fn set_clock_skew_adjustment(&mut self, enabled: Option<bool>) -> &mut Self {
        self.clock_skew_adjustment = enabled;
        self
    }

    /// Sets the discrepancy at which the clock is considered skewed. Defaults to 4 minutes.
    pub fn clock_skew_threshold(mut self, threshold: Duration) -> Self {
        self.set_clock_skew_threshold(Some(threshold));
        self
    }

    /// Sets the clock skew threshold.
    pub fn set_clock_skew_threshold(&mut self, threshold: Option<Duration>) -> &mut Self {
        self.clock_skew_threshold = threshold;
        self
    }

    /// Sets the retry configuration. Defaults to [`RetryConfig::legacy`].
    pub fn retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.set_retry_config(Some(retry_config));
        self
    }

    /// Sets the retry configuration.
    pub fn set_retry_config(&mut self, retry_config: Option<RetryConfig>) -> &mut Self {
        self.retry_config = retry_config;
        self
    }

    /// Validates the settings and builds the configuration.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let endpoint = self.endpoint.ok_or(ConfigError::MissingEndpoint)?;
        let uri = endpoint
            .parse::<Uri>()
            .map_err(|source| ConfigError::InvalidEndpoint {
                endpoint: endpoint.clone(),
                source,
            })?;
        let supported = uri.host().is_some()
            && matches!(uri.scheme(), Some(s) if *s == Scheme::HTTP || *s == Scheme::HTTPS);
        if !supported {
            return Err(ConfigError::UnsupportedEndpoint(endpoint));
        }
        let retry_config = self.retry_config.unwrap_or_default();
        if retry_config.max_attempts() == 0 {
            return Err(ConfigError::ZeroMaxAttempts);
        }
        Ok(ClientConfig {
            endpoint: uri,
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned()),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            clock_skew_adjustment: self.clock_skew_adjustment.unwrap_or(true),
            clock_skew_threshold: self
                .clock_skew_threshold
                .unwrap_or(DEFAULT_CLOCK_SKEW_THRESHOLD),
            retry_config,
        })
    }
}
