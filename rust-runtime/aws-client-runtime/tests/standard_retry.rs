/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_client_runtime::client::config::ClientConfig;
use aws_client_runtime::client::Client;
use aws_client_runtime::retries::quota::RetryQuotaContainer;
use aws_client_runtime::test_util::{InstantSleep, ReplayingTransport};
use aws_client_runtime_api::error::ErrorKind;
use aws_client_runtime_api::http::HttpResponse;
use aws_client_runtime_api::request::ServiceRequest;
use aws_client_runtime_api::retries::RetryConfig;
use aws_client_runtime_api::transport::ConnectorError;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn config() -> ClientConfig {
    ClientConfig::builder()
        .endpoint("https://example.amazonaws.com")
        .retry_config(RetryConfig::standard().with_use_static_exponential_base(true))
        .build()
        .unwrap()
}

type Event = Result<HttpResponse, ConnectorError>;

fn ok() -> Event {
    Ok(ReplayingTransport::response(200, ""))
}

fn connection_error() -> Event {
    Err(ConnectorError::io("connection refused"))
}

fn timeout() -> Event {
    Err(ConnectorError::timeout("read timed out"))
}

fn request() -> ServiceRequest {
    ServiceRequest::builder("ListThings").build()
}

#[test]
fn standard_retry_strategy_accounts_quota_per_invocation() {
    let quota = Arc::new(RetryQuotaContainer::new());
    let transport = ReplayingTransport::default();
    let sleep = InstantSleep::new();
    let client = Client::builder(config())
        .transport(transport.clone())
        .retry_quota(quota.clone())
        .sleep_impl(sleep.clone())
        .build()
        .unwrap();

    // 1. success on the first attempt; the increment is clamped to capacity
    transport.push(ok());
    assert!(client.make_request(&request()).is_ok());
    assert_eq!(0, client.request_attempted_retries());
    assert_eq!(Some(500), client.retry_quota());

    // 2. max attempts reached: 5 tokens for the connection error, 10 for the timeout, and none
    // for the final attempt
    transport.push(connection_error());
    transport.push(timeout());
    transport.push(connection_error());
    let error = client.make_request(&request()).unwrap_err();
    assert_eq!(
        ErrorKind::NetworkConnection,
        error.as_service_error().unwrap().kind()
    );
    assert_eq!(2, client.request_attempted_retries());
    assert_eq!(Some(485), client.retry_quota());
    assert_eq!(
        vec![Duration::from_secs(1), Duration::from_secs(2)],
        sleep.logs()
    );

    // 3. the retries eventually succeed and everything they took is refunded
    transport.push(connection_error());
    transport.push(timeout());
    transport.push(ok());
    assert!(client.make_request(&request()).is_ok());
    assert_eq!(2, client.request_attempted_retries());
    assert_eq!(Some(485), client.retry_quota());

    // 4. the quota runs dry after a single retry
    assert!(quota.acquire_retry_quota(478));
    transport.push(connection_error());
    transport.push(connection_error());
    assert!(client.make_request(&request()).is_err());
    assert_eq!(1, client.request_attempted_retries());
    assert_eq!(Some(2), client.retry_quota());

    // 5. no retries at all
    transport.push(connection_error());
    assert!(client.make_request(&request()).is_err());
    assert_eq!(0, client.request_attempted_retries());
    assert_eq!(Some(2), client.retry_quota());

    // 6. a first-attempt success earns one token back
    transport.push(ok());
    assert!(client.make_request(&request()).is_ok());
    assert_eq!(0, client.request_attempted_retries());
    assert_eq!(Some(3), client.retry_quota());

    assert_eq!(0, transport.remaining());
}

#[test]
fn non_retryable_errors_end_the_invocation_without_taking_quota() {
    let transport = ReplayingTransport::from_responses(vec![
        ReplayingTransport::response(404, "no such thing"),
        ReplayingTransport::response(200, "never sent"),
    ]);
    let client = Client::builder(config())
        .transport(transport.clone())
        .sleep_impl(InstantSleep::new())
        .build()
        .unwrap();

    let error = client.make_request(&request()).unwrap_err();
    assert_eq!("no such thing", error.as_service_error().unwrap().message());
    assert_eq!(0, client.request_attempted_retries());
    assert_eq!(Some(500), client.retry_quota());
    assert_eq!(1, transport.remaining());
}

#[test]
fn throttling_is_retried() {
    let transport = ReplayingTransport::from_responses(vec![
        ReplayingTransport::response_with_headers(
            400,
            "",
            &[("x-amzn-errortype", "ThrottlingException")],
        ),
        ReplayingTransport::response(429, ""),
        ReplayingTransport::response(200, ""),
    ]);
    let client = Client::builder(config())
        .transport(transport)
        .sleep_impl(InstantSleep::new())
        .build()
        .unwrap();

    assert!(client.make_request(&request()).is_ok());
    assert_eq!(2, client.request_attempted_retries());
    assert_eq!(Some(500), client.retry_quota());
}

#[test]
fn clients_can_share_a_quota() {
    let quota = Arc::new(RetryQuotaContainer::new());
    let transport =
        ReplayingTransport::new(vec![connection_error(), ok(), connection_error(), ok()]);
    let build = || {
        Client::builder(config())
            .transport(transport.clone())
            .retry_quota(quota.clone())
            .sleep_impl(InstantSleep::new())
            .build()
            .unwrap()
    };
    let (a, b) = (build(), build());

    quota.acquire_retry_quota(490);
    assert!(a.make_request(&request()).is_ok());
    assert_eq!(Some(10), b.retry_quota());
    assert!(b.make_request(&request()).is_ok());
    assert_eq!(Some(10), a.retry_quota());
}

#[test]
fn concurrent_invocations_keep_quota_in_bounds() {
    let transport = ReplayingTransport::default();
    for _ in 0..50 {
        transport.push(Ok(ReplayingTransport::response(500, "")));
    }
    let client = Client::builder(config())
        .transport(transport.clone())
        .sleep_impl(InstantSleep::new())
        .build()
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let client = client.clone();
            std::thread::spawn(move || {
                for _ in 0..4 {
                    let _ = client.make_request(&request());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // 32 invocations of 3 failed attempts each; every retry took 5 tokens and nothing was refunded
    assert_eq!(96, transport.requests().len());
    assert_eq!(Some(500 - 64 * 5), client.retry_quota());
}

fn retryable_failure(index: usize) -> Event {
    match index {
        0 => connection_error(),
        1 => timeout(),
        2 => Ok(ReplayingTransport::response(500, "")),
        3 => Ok(ReplayingTransport::response(503, "")),
        _ => Ok(ReplayingTransport::response(429, "")),
    }
}

fn run_until_success(
    retry_config: RetryConfig,
    failures: &[usize],
) -> (Client, ReplayingTransport) {
    let transport = ReplayingTransport::new(
        failures
            .iter()
            .map(|&index| retryable_failure(index))
            .chain(std::iter::once(ok()))
            .collect(),
    );
    let config = ClientConfig::builder()
        .endpoint("https://example.amazonaws.com")
        .retry_config(retry_config.with_use_static_exponential_base(true))
        .build()
        .unwrap();
    let client = Client::builder(config)
        .transport(transport.clone())
        .sleep_impl(InstantSleep::new())
        .build()
        .unwrap();
    assert!(client.make_request(&request()).is_ok());
    (client, transport)
}

proptest! {
    #[test]
    fn standard_retries_count_every_failure_before_success(
        failures in prop::collection::vec(0..5usize, 0..6)
    ) {
        let (client, transport) =
            run_until_success(RetryConfig::standard().with_max_attempts(6), &failures);
        prop_assert_eq!(failures.len() as u32, client.request_attempted_retries());
        prop_assert_eq!(failures.len() + 1, transport.requests().len());
        prop_assert_eq!(Some(500), client.retry_quota());
    }

    #[test]
    fn legacy_retries_count_every_failure_before_success(
        failures in prop::collection::vec(0..5usize, 0..11)
    ) {
        let (client, transport) = run_until_success(RetryConfig::legacy(), &failures);
        prop_assert_eq!(failures.len() as u32, client.request_attempted_retries());
        prop_assert_eq!(failures.len() + 1, transport.requests().len());
        prop_assert_eq!(0, transport.remaining());
    }
}
