/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use super::Inner;
use crate::client::http_request::build_http_request;
use crate::client::invocation_id::{InvocationId, InvocationIdGenerator, AMZ_SDK_INVOCATION_ID};
use crate::client::request_info::{RequestInfo, AMZ_SDK_REQUEST};
use crate::clock_skew::{apply_offset, server_time, ClockSkew};
use crate::retries::classifiers::{classify_connector_error, classify_response};
use aws_client_runtime_api::error::{SdkError, ServiceError};
use aws_client_runtime_api::http::{clone_request, HttpRequest};
use aws_client_runtime_api::request::{Outcome, ServiceRequest, ServiceResponse};
use aws_client_runtime_api::retries::{RetryState, RetryStrategy};
use aws_client_runtime_api::signer::Signer;
use aws_client_runtime_api::time::{Sleep, TimeSource};
use aws_client_runtime_api::transport::Transport;
use chrono::{DateTime, Utc};
use std::time::{Duration, SystemTime};
use tracing::{debug, debug_span};

/// Runs one invocation to completion. `attempted_retries` is kept up to date even when the
/// invocation fails.
pub(super) fn invoke(
    client: &Inner,
    request: &ServiceRequest,
    attempted_retries: &mut u32,
) -> Outcome {
    let invocation_id = client
        .invocation_id_generator
        .generate()
        .map_err(SdkError::construction_failure)?;
    let span = debug_span!(
        "invoke",
        operation = request.operation_name(),
        invocation_id = %invocation_id
    );
    let _entered = span.enter();

    let base_request = build_http_request(&client.config, request)?;
    let max_attempts = client.retry_strategy.max_attempts();
    let mut retry_state = RetryState::new();
    let mut skew_corrected = false;
    // service time relative to ours, as last reported by a failed attempt of this invocation
    let mut service_offset = None;
    loop {
        let attempt = *attempted_retries + 1;
        let span = debug_span!("attempt", attempt);
        let _entered = span.enter();

        let signing_time = corrected_now(client);
        let request = prepare_attempt(
            client,
            &base_request,
            &invocation_id,
            attempt,
            max_attempts,
            signing_time,
            service_offset,
        )?;
        let mut error = match make_an_attempt(client, request) {
            Ok(response) => {
                client.retry_strategy.on_success(&retry_state);
                debug!(attempt, "invocation succeeded");
                return Ok(response);
            }
            Err(error) => error,
        };

        let now = client.time_source.now();
        if let Some(service_time) = server_time(error.headers()) {
            service_offset = Some(ClockSkew::estimate_skew(service_time, now));
        }
        let skew_adjusted = client.config.clock_skew_adjustment()
            && client.clock_skew.adjust(&error, signing_time, now);
        let retry_for_skew = skew_adjusted && !skew_corrected;
        if retry_for_skew {
            skew_corrected = true;
            error.set_retryable(true);
        }

        if !client
            .retry_strategy
            .should_retry(&error, *attempted_retries, &mut retry_state)
        {
            debug!(
                kind = %error.kind(),
                status = ?error.status(),
                "attempt failed; not retrying"
            );
            return Err(SdkError::ServiceError(error));
        }
        let delay = if retry_for_skew {
            Duration::ZERO
        } else {
            client
                .retry_strategy
                .calculate_delay(&error, *attempted_retries)
        };
        debug!(kind = %error.kind(), ?delay, "attempt failed; retrying");
        client.sleep.sleep(delay);
        *attempted_retries += 1;
    }
}

fn corrected_now(client: &Inner) -> SystemTime {
    let now = client.time_source.now();
    if client.config.clock_skew_adjustment() {
        client.clock_skew.corrected(now)
    } else {
        now
    }
}

fn prepare_attempt(
    client: &Inner,
    base_request: &HttpRequest,
    invocation_id: &InvocationId,
    attempt: u32,
    max_attempts: u32,
    signing_time: SystemTime,
    service_offset: Option<chrono::Duration>,
) -> Result<HttpRequest, SdkError> {
    let mut request = clone_request(base_request);
    let request_info = if attempt == 1 {
        RequestInfo::first_attempt()
    } else {
        let service_now = match service_offset {
            Some(offset) => apply_offset(client.time_source.now(), offset),
            None => signing_time,
        };
        let ttl = attempt_ttl(service_now, client.config.request_timeout());
        if ttl.is_none() {
            debug!(
                request_timeout = ?client.config.request_timeout(),
                "request timeout does not fit in a ttl; sending the retry without one"
            );
        }
        RequestInfo::retry(attempt, max_attempts, ttl)
    };
    let headers = request.headers_mut();
    headers.insert(
        AMZ_SDK_INVOCATION_ID,
        invocation_id.as_header_value().clone(),
    );
    headers.insert(
        AMZ_SDK_REQUEST,
        request_info.to_header_value().ok_or_else(|| {
            SdkError::construction_failure(format!("`{request_info}` is not a valid header"))
        })?,
    );
    client
        .signer
        .sign(&mut request, signing_time)
        .map_err(SdkError::construction_failure)?;
    Ok(request)
}

/// `service_now + request_timeout`, or `None` when the result is not a representable timestamp.
fn attempt_ttl(service_now: SystemTime, request_timeout: Duration) -> Option<SystemTime> {
    let request_timeout = chrono::Duration::from_std(request_timeout).ok()?;
    DateTime::<Utc>::from(service_now)
        .checked_add_signed(request_timeout)
        .map(SystemTime::from)
}

fn make_an_attempt(client: &Inner, request: HttpRequest) -> Result<ServiceResponse, ServiceError> {
    match client.transport.send(request) {
        Ok(response) => classify_response(response),
        Err(error) => Err(classify_connector_error(&error)),
    }
}

#[cfg(test)]
mod tests {
    use super::attempt_ttl;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn ttl_adds_the_request_timeout() {
        let now = UNIX_EPOCH + Duration::from_secs(1_559_347_200);
        assert_eq!(
            Some(now + Duration::from_secs(3)),
            attempt_ttl(now, Duration::from_secs(3))
        );
    }

    #[test]
    fn oversized_timeouts_have_no_ttl() {
        let now = UNIX_EPOCH + Duration::from_secs(1_559_347_200);
        assert_eq!(None, attempt_ttl(now, Duration::MAX));
        assert_eq!(None, attempt_ttl(now, Duration::from_secs(u64::MAX / 1000)));
    }
}
