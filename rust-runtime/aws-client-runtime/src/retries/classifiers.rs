/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Turns transport failures and HTTP error responses into [`ServiceError`]s.
//!
//! In order of priority, an HTTP error response is classified by:
//! 1. its error code, read from the `x-amzn-errortype` header
//! 2. its status code

use aws_client_runtime_api::error::{ErrorKind, ServiceError};
use aws_client_runtime_api::http::{header_str, HttpResponse};
use aws_client_runtime_api::request::ServiceResponse;
use aws_client_runtime_api::transport::{ConnectorError, ConnectorErrorKind};
use http::StatusCode;
use std::error::Error as StdError;
use std::fmt::Write;
use tracing::debug;

const ERROR_TYPE_HEADER: &str = "x-amzn-errortype";

const CLOCK_SKEW_ERRORS: &[&str] = &[
    "RequestTimeTooSkewed",
    "RequestExpired",
    "InvalidSignatureException",
    "SignatureDoesNotMatch",
    "AuthFailure",
    "RequestInTheFuture",
];
const THROTTLING_ERRORS: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "ThrottledException",
    "RequestThrottledException",
    "TooManyRequestsException",
    "ProvisionedThroughputExceededException",
    "TransactionInProgressException",
    "RequestLimitExceeded",
    "BandwidthLimitExceeded",
    "LimitExceededException",
    "RequestThrottled",
    "SlowDown",
    "PriorRequestNotComplete",
    "EC2ThrottledException",
];
const TRANSIENT_ERRORS: &[&str] = &["RequestTimeout", "RequestTimeoutException"];
const AUTH_STATUS_CODES: [u16; 3] = [400, 401, 403];

/// Returns `true` if `code` is an error code services use for clock or signature problems.
pub fn is_clock_skew_error(code: &str) -> bool {
    CLOCK_SKEW_ERRORS.contains(&code)
}

/// Returns `true` if `code` is an error code services use to ask clients to slow down.
pub fn is_throttling_error(code: &str) -> bool {
    THROTTLING_ERRORS.contains(&code)
}

/// Reads the error code of a response, dropping anything after the first `:`.
pub fn error_code(response: &HttpResponse) -> Option<&str> {
    header_str(response.headers(), ERROR_TYPE_HEADER)
        .map(|code| code.split(':').next().unwrap_or(code).trim())
        .filter(|code| !code.is_empty())
}

/// Classifies a response. 2xx responses are successes, everything else a [`ServiceError`].
pub fn classify_response(response: HttpResponse) -> Result<ServiceResponse, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(ServiceResponse::from(response));
    }
    let code = error_code(&response).map(str::to_owned);
    let kind = error_kind(status, code.as_deref());
    let (parts, body) = response.into_parts();
    let message = match std::str::from_utf8(body.bytes()) {
        Ok(text) if !text.trim().is_empty() => text.to_owned(),
        _ => status
            .canonical_reason()
            .map(str::to_owned)
            .unwrap_or_else(|| status.as_str().to_owned()),
    };
    debug!(status = status.as_u16(), code = ?code, %kind, "classified error response");
    let mut error = ServiceError::new(kind, message)
        .with_status(status)
        .with_headers(parts.headers);
    if let Some(code) = code {
        error = error.with_code(code);
    }
    Err(error)
}

/// Classifies a transport failure. Timeouts are [`ErrorKind::RequestTimeout`], everything else
/// [`ErrorKind::NetworkConnection`]. Both are retryable.
pub fn classify_connector_error(error: &ConnectorError) -> ServiceError {
    let kind = match error.kind() {
        ConnectorErrorKind::Timeout => ErrorKind::RequestTimeout,
        _ => ErrorKind::NetworkConnection,
    };
    debug!(%kind, error = %error, "classified connector error");
    ServiceError::new(kind, error_chain(error))
}

fn error_kind(status: StatusCode, code: Option<&str>) -> ErrorKind {
    if let Some(code) = code {
        if is_clock_skew_error(code) {
            return ErrorKind::AuthSignature;
        }
        if is_throttling_error(code) {
            return ErrorKind::Throttling;
        }
    }
    let transient = code.map_or(false, |code| TRANSIENT_ERRORS.contains(&code));
    match status.as_u16() {
        429 => ErrorKind::Throttling,
        408 => ErrorKind::RequestTimeout,
        _ if transient => ErrorKind::RequestTimeout,
        status if code.is_none() && AUTH_STATUS_CODES.contains(&status) => ErrorKind::AuthSignature,
        500.. => ErrorKind::Server,
        _ => ErrorKind::Client,
    }
}

fn error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        // writing to a `String` cannot fail
        let _ = write!(message, ": {cause}");
        source = cause.source();
    }
    message
}
