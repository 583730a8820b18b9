/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Traits and data types shared by the AWS client request-execution core.
//!
//! This crate holds the seams of the core: the [`Transport`](transport::Transport) that moves
//! bytes, the [`Signer`](signer::Signer) that authenticates a request, the
//! [`RetryStrategy`](retries::RetryStrategy) that decides whether to try again, and the
//! [`TimeSource`](time::TimeSource) / [`Sleep`](time::Sleep) pair that makes time testable.
//! The implementations that tie them together live in `aws-client-runtime`.

#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

pub mod body;
pub mod date_time;
pub mod error;
pub mod http;
pub mod os_shim_internal;
pub mod request;
pub mod retries;
pub mod signer;
pub mod time;
pub mod transport;

/// A boxed error that is `Send` and `Sync`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
