/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Request-execution core for AWS clients.
//!
//! A [`Client`](client::Client) takes a [`ServiceRequest`](aws_client_runtime_api::request::ServiceRequest),
//! turns it into a transport request, signs it, sends it and classifies the result. Failed
//! attempts are retried according to a [`RetryStrategy`](aws_client_runtime_api::retries::RetryStrategy):
//! either plain exponential backoff, or backoff gated by a client-wide
//! [retry quota](retries::quota::RetryQuotaContainer). Authentication failures caused by a
//! skewed local clock are detected and corrected, see [`clock_skew`].
//!
//! ```rust
//! use aws_client_runtime::client::config::ClientConfig;
//! use aws_client_runtime::client::Client;
//! use aws_client_runtime::test_util::ReplayingTransport;
//! use aws_client_runtime_api::request::ServiceRequest;
//!
//! let transport = ReplayingTransport::from_responses(vec![
//!     ReplayingTransport::response(500, "try again"),
//!     ReplayingTransport::response(200, "done"),
//! ]);
//! let config = ClientConfig::builder()
//!     .endpoint("https://example.amazonaws.com")
//!     .build()
//!     .unwrap();
//! let client = Client::builder(config)
//!     .transport(transport)
//!     .build()
//!     .unwrap();
//! let response = client
//!     .make_request(&ServiceRequest::builder("ListThings").build())
//!     .unwrap();
//! assert_eq!(response.body().bytes(), b"done");
//! assert_eq!(client.request_attempted_retries(), 1);
//! ```

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

pub mod client;
pub mod clock_skew;
pub mod retries;

#[cfg(feature = "test-util")]
pub mod test_util;
