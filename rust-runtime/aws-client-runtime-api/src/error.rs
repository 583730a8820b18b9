/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Errors surfaced by the request-execution core.

use crate::BoxError;
use http::{HeaderMap, StatusCode};
use std::fmt;

/// Classification of a failed attempt.
///
/// The kind decides whether a failure is retryable by default and how much retry quota a retry
/// of it costs.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// The transport could not deliver the request or read a response (connect failure, reset
    /// connection, DNS failure, ...).
    NetworkConnection,
    /// The attempt timed out, either in the transport or with an HTTP 408.
    RequestTimeout,
    /// The service asked the client to slow down.
    Throttling,
    /// The service rejected the request's authentication. Possibly caused by clock skew.
    AuthSignature,
    /// Any other 4xx response.
    Client,
    /// A 5xx response.
    Server,
}

impl ErrorKind {
    /// Whether errors of this kind are retried when nothing more specific is known.
    ///
    /// [`ErrorKind::AuthSignature`] is not: it only becomes retryable once a clock skew
    /// correction explains it.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::NetworkConnection
                | ErrorKind::RequestTimeout
                | ErrorKind::Throttling
                | ErrorKind::Server
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NetworkConnection => write!(f, "network connection error"),
            ErrorKind::RequestTimeout => write!(f, "request timeout"),
            ErrorKind::Throttling => write!(f, "throttling error"),
            ErrorKind::AuthSignature => write!(f, "authentication/signature error"),
            ErrorKind::Client => write!(f, "client error"),
            ErrorKind::Server => write!(f, "server error"),
        }
    }
}

/// A classified failure of a single attempt, and the terminal error of an invocation.
#[derive(Clone, Debug)]
pub struct ServiceError {
    kind: ErrorKind,
    status: Option<StatusCode>,
    retryable: bool,
    message: String,
    code: Option<String>,
    headers: HeaderMap,
}

impl ServiceError {
    /// Creates an error of the given kind. Retryability defaults to [`ErrorKind::is_retryable`].
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            retryable: kind.is_retryable(),
            message: message.into(),
            code: None,
            headers: HeaderMap::new(),
        }
    }

    /// Sets the HTTP status of the response that produced this error.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the service error code, e.g. `RequestTimeTooSkewed`.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the headers of the response that produced this error.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Overrides whether this error is retryable.
    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = retryable;
        self
    }

    /// Overrides whether this error is retryable.
    pub fn set_retryable(&mut self, retryable: bool) {
        self.retryable = retryable;
    }

    /// The error's kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status, absent when no response was received.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Whether a retry strategy may retry this error.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }

    /// Human readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Service error code, if the response carried one.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Headers of the failed response. Empty when no response was received.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status.as_u16())?;
        }
        if let Some(code) = &self.code {
            write!(f, " {code}")?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}

/// The error returned from an invocation.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// The request could not be built or signed. Never retried.
    #[error("failed to construct request")]
    ConstructionFailure(#[source] BoxError),
    /// The last attempt failed and no further attempt was allowed.
    #[error(transparent)]
    ServiceError(ServiceError),
}

impl SdkError {
    /// Creates a [`SdkError::ConstructionFailure`].
    pub fn construction_failure(source: impl Into<BoxError>) -> Self {
        SdkError::ConstructionFailure(source.into())
    }

    /// The terminal service error, if the request was sent at least once.
    pub fn as_service_error(&self) -> Option<&ServiceError> {
        match self {
            SdkError::ServiceError(err) => Some(err),
            SdkError::ConstructionFailure(_) => None,
        }
    }

    /// Converts into the terminal service error, if any.
    pub fn into_service_error(self) -> Option<ServiceError> {
        match self {
            SdkError::ServiceError(err) => Some(err),
            SdkError::ConstructionFailure(_) => None,
        }
    }

    /// HTTP status of the terminal error, if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        self.as_service_error().and_then(ServiceError::status)
    }
}

impl From<ServiceError> for SdkError {
    fn from(err: ServiceError) -> Self {
        SdkError::ServiceError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, SdkError, ServiceError};
    use http::StatusCode;

    #[test]
    fn retryable_defaults_follow_kind() {
        assert!(ServiceError::new(ErrorKind::NetworkConnection, "").is_retryable());
        assert!(ServiceError::new(ErrorKind::Server, "").is_retryable());
        assert!(!ServiceError::new(ErrorKind::AuthSignature, "").is_retryable());
        assert!(!ServiceError::new(ErrorKind::Client, "").is_retryable());
    }

    #[test]
    fn display_includes_status_code_and_message() {
        let err = ServiceError::new(ErrorKind::AuthSignature, "Signature expired")
            .with_status(StatusCode::FORBIDDEN)
            .with_code("RequestExpired");
        assert_eq!(
            "authentication/signature error (HTTP 403) RequestExpired: Signature expired",
            err.to_string()
        );
    }

    #[test]
    fn sdk_error_exposes_terminal_status() {
        let err: SdkError = ServiceError::new(ErrorKind::Server, "boom")
            .with_status(StatusCode::SERVICE_UNAVAILABLE)
            .into();
        assert_eq!(Some(StatusCode::SERVICE_UNAVAILABLE), err.status());
        assert_eq!(None, SdkError::construction_failure("bad uri").status());
    }
}
