/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_client_runtime::client::config::ClientConfig;
use aws_client_runtime::client::request_info::RequestInfo;
use aws_client_runtime::client::Client;
use aws_client_runtime::test_util::{
    InstantSleep, InvocationId, InvocationIdGeneratorForTests, ManualTimeSource,
    ReplayingTransport, TimestampSigner,
};
use aws_client_runtime_api::date_time::{format, Format};
use aws_client_runtime_api::http::HttpRequest;
use aws_client_runtime_api::request::ServiceRequest;
use aws_client_runtime_api::retries::RetryConfig;
use aws_client_runtime_api::transport::ConnectorError;
use pretty_assertions::assert_eq;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const HOUR: Duration = Duration::from_secs(3600);

// 2019-06-01T00:00:00Z
fn start() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_559_347_200)
}

fn http_date(time: SystemTime) -> String {
    format(time, Format::HttpDate)
}

fn request_info(request: &HttpRequest) -> RequestInfo {
    request.headers()["amz-sdk-request"]
        .to_str()
        .unwrap()
        .parse()
        .unwrap()
}

fn invocation_id(request: &HttpRequest) -> &str {
    request.headers()["amz-sdk-invocation-id"].to_str().unwrap()
}

fn request() -> ServiceRequest {
    ServiceRequest::builder("GetThing")
        .path_and_query("/things/1")
        .build()
}

#[test]
fn retry_headers_follow_the_service_clock() {
    let server_time_1 = start() + HOUR;
    let server_time_2 = start() + 2 * HOUR;
    let server_time_3 = start() + 3 * HOUR;
    let transport = ReplayingTransport::from_responses(vec![
        ReplayingTransport::response_with_headers(500, "", &[("date", &http_date(server_time_1))]),
        ReplayingTransport::response_with_headers(500, "", &[("date", &http_date(server_time_2))]),
        ReplayingTransport::response_with_headers(200, "", &[("date", &http_date(server_time_3))]),
    ]);
    let config = ClientConfig::builder()
        .endpoint("https://example.amazonaws.com")
        .request_timeout(Duration::from_secs(30))
        .retry_config(RetryConfig::legacy().with_use_static_exponential_base(true))
        .build()
        .unwrap();
    let client = Client::builder(config)
        .transport(transport.clone())
        .signer(TimestampSigner::new())
        .time_source(ManualTimeSource::new(start()))
        .sleep_impl(InstantSleep::new())
        .invocation_id_generator(InvocationIdGeneratorForTests::new(vec![
            InvocationId::new_from_str("367dc4d4-ae64-49a8-a1b3-d40226de0f95"),
        ]))
        .build()
        .unwrap();

    client.make_request(&request()).expect("third attempt succeeds");
    assert_eq!(2, client.request_attempted_retries());

    let requests = transport.requests();
    assert_eq!(3, requests.len());

    let first = request_info(&requests[0]);
    assert_eq!(1, first.attempt());
    assert_eq!(None, first.max_attempts());
    assert_eq!(None, first.ttl());
    assert_eq!("attempt=1", requests[0].headers()["amz-sdk-request"]);

    let second = request_info(&requests[1]);
    assert_eq!(2, second.attempt());
    assert_eq!(Some(11), second.max_attempts());
    assert_eq!(Some(server_time_1 + Duration::from_secs(30)), second.ttl());

    let third = request_info(&requests[2]);
    assert_eq!(3, third.attempt());
    assert_eq!(Some(11), third.max_attempts());
    assert_eq!(Some(server_time_2 + Duration::from_secs(30)), third.ttl());

    for request in requests.iter() {
        assert_eq!("367dc4d4-ae64-49a8-a1b3-d40226de0f95", invocation_id(request));
        // server errors are not attributed to clock skew, so the signing clock is untouched
        assert_eq!(
            format(start(), Format::Iso8601Basic),
            request.headers()["x-amz-date"].to_str().unwrap()
        );
    }
}

#[test]
fn ttl_uses_the_local_clock_without_a_service_date() {
    let transport = ReplayingTransport::new(vec![
        Err(ConnectorError::io("connection reset")),
        Ok(ReplayingTransport::response(200, "")),
    ]);
    let config = ClientConfig::builder()
        .endpoint("http://localhost:8080")
        .build()
        .unwrap();
    let client = Client::builder(config)
        .transport(transport.clone())
        .time_source(ManualTimeSource::new(start()))
        .sleep_impl(InstantSleep::new())
        .build()
        .unwrap();

    client.make_request(&request()).unwrap();
    let retry = request_info(&transport.requests()[1]);
    // the default request timeout is three seconds
    assert_eq!(Some(start() + Duration::from_secs(3)), retry.ttl());
    assert_eq!(
        format!(
            "ttl={}; attempt=2; max=11",
            format(start() + Duration::from_secs(3), Format::Iso8601Basic)
        ),
        transport.requests()[1].headers()["amz-sdk-request"]
    );
}

#[test]
fn max_is_constant_and_matches_the_retry_config() {
    let transport = ReplayingTransport::from_responses(vec![
        ReplayingTransport::response(503, "busy"),
        ReplayingTransport::response(503, "busy"),
        ReplayingTransport::response(503, "still busy"),
    ]);
    let config = ClientConfig::builder()
        .endpoint("https://example.amazonaws.com")
        .retry_config(RetryConfig::standard())
        .build()
        .unwrap();
    let client = Client::builder(config)
        .transport(transport.clone())
        .sleep_impl(InstantSleep::new())
        .build()
        .unwrap();

    let error = client.make_request(&request()).unwrap_err();
    assert_eq!(Some(http::StatusCode::SERVICE_UNAVAILABLE), error.status());
    assert_eq!("still busy", error.as_service_error().unwrap().message());
    assert_eq!(2, client.request_attempted_retries());

    let infos: Vec<_> = transport.requests().iter().map(request_info).collect();
    assert_eq!(vec![1, 2, 3], infos.iter().map(|i| i.attempt()).collect::<Vec<_>>());
    assert_eq!(
        vec![None, Some(3), Some(3)],
        infos.iter().map(|i| i.max_attempts()).collect::<Vec<_>>()
    );
}

#[test]
fn each_invocation_gets_its_own_id() {
    let transport = ReplayingTransport::from_responses(vec![
        ReplayingTransport::response(500, ""),
        ReplayingTransport::response(200, ""),
        ReplayingTransport::response(200, ""),
    ]);
    let config = ClientConfig::builder()
        .endpoint("https://example.amazonaws.com")
        .build()
        .unwrap();
    let client = Client::builder(config)
        .transport(transport.clone())
        .sleep_impl(InstantSleep::new())
        .build()
        .unwrap();

    client.make_request(&request()).unwrap();
    assert_eq!(1, client.request_attempted_retries());
    client.make_request(&request()).unwrap();
    assert_eq!(0, client.request_attempted_retries());

    let requests = transport.requests();
    assert_eq!(invocation_id(&requests[0]), invocation_id(&requests[1]));
    assert_ne!(invocation_id(&requests[1]), invocation_id(&requests[2]));
    assert_eq!("attempt=1", requests[2].headers()["amz-sdk-request"]);
}

#[test]
fn oversized_request_timeout_drops_the_ttl_instead_of_failing() {
    let transport = ReplayingTransport::from_responses(vec![
        ReplayingTransport::response(500, ""),
        ReplayingTransport::response(200, ""),
    ]);
    let config = ClientConfig::builder()
        .endpoint("https://example.amazonaws.com")
        .request_timeout(Duration::MAX)
        .build()
        .unwrap();
    let client = Client::builder(config)
        .transport(transport.clone())
        .time_source(ManualTimeSource::new(start()))
        .sleep_impl(InstantSleep::new())
        .build()
        .unwrap();

    client.make_request(&request()).expect("the retry succeeds");
    assert_eq!(1, client.request_attempted_retries());
    let requests = transport.requests();
    assert_eq!("attempt=2; max=11", requests[1].headers()["amz-sdk-request"]);
    assert_eq!(None, request_info(&requests[1]).ttl());
}
