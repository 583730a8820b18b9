/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The `amz-sdk-request` header, which tells the service which attempt it is looking at.

use aws_client_runtime_api::date_time::{self, DateTimeParseError, Format};
use http::{HeaderName, HeaderValue};
use std::fmt;
use std::str::FromStr;
use std::time::SystemTime;

#[allow(clippy::declare_interior_mutable_const)] // never mutated
pub(crate) const AMZ_SDK_REQUEST: HeaderName = HeaderName::from_static("amz-sdk-request");

/// Contents of the `amz-sdk-request` header.
///
/// The first attempt only carries its attempt number, e.g. `attempt=1`. Retries also carry the
/// maximum number of attempts and the time after which the client gives up on the attempt, e.g.
/// `ttl=20190601T000030Z; attempt=2; max=3`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestInfo {
    attempt: u32,
    max_attempts: Option<u32>,
    ttl: Option<SystemTime>,
}

impl RequestInfo {
    /// Header contents for the first attempt.
    pub fn first_attempt() -> Self {
        Self {
            attempt: 1,
            max_attempts: None,
            ttl: None,
        }
    }

    /// Header contents for a retry.
    ///
    /// `ttl` is left out of the header when it is `None`, e.g. when the expiry cannot be
    /// represented as a timestamp.
    pub fn retry(attempt: u32, max_attempts: u32, ttl: Option<SystemTime>) -> Self {
        Self {
            attempt,
            max_attempts: Some(max_attempts),
            ttl,
        }
    }

    /// 1-based attempt number.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Maximum attempts for the invocation, sent from the second attempt on.
    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Expiry of the attempt, sent from the second attempt on. Truncated to whole seconds.
    pub fn ttl(&self) -> Option<SystemTime> {
        self.ttl
    }

    pub(crate) fn to_header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.to_string()).ok()
    }
}

impl fmt::Display for RequestInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ttl) = self.ttl {
            write!(f, "ttl={}; ", date_time::format(ttl, Format::Iso8601Basic))?;
        }
        write!(f, "attempt={}", self.attempt)?;
        if let Some(max_attempts) = self.max_attempts {
            write!(f, "; max={}", max_attempts)?;
        }
        Ok(())
    }
}

/// An `amz-sdk-request` header could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum RequestInfoParseError {
    /// A field other than `attempt`, `max` or `ttl`, or a field without `=`.
    #[error("unexpected field `{0}` in request info")]
    UnexpectedField(String),
    /// The `attempt` field is missing.
    #[error("request info is missing the attempt number")]
    MissingAttempt,
    /// `attempt` or `max` is not a number.
    #[error("`{0}` is not a valid attempt count")]
    InvalidCount(String),
    /// `ttl` is not a timestamp.
    #[error(transparent)]
    InvalidTtl(#[from] DateTimeParseError),
}

impl FromStr for RequestInfo {
    type Err = RequestInfoParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut attempt = None;
        let mut max_attempts = None;
        let mut ttl = None;
        for field in value.split(';').map(str::trim).filter(|f| !f.is_empty()) {
            let (key, val) = field
                .split_once('=')
                .ok_or_else(|| RequestInfoParseError::UnexpectedField(field.to_owned()))?;
            let count = || {
                val.parse::<u32>()
                    .map_err(|_| RequestInfoParseError::InvalidCount(val.to_owned()))
            };
            match key {
                "attempt" => attempt = Some(count()?),
                "max" => max_attempts = Some(count()?),
                "ttl" => ttl = Some(date_time::parse(val, Format::Iso8601Basic)?),
                _ => return Err(RequestInfoParseError::UnexpectedField(field.to_owned())),
            }
        }
        Ok(Self {
            attempt: attempt.ok_or(RequestInfoParseError::MissingAttempt)?,
            max_attempts,
            ttl,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RequestInfo;
    use pretty_assertions::assert_eq;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn first_attempt_reveals_nothing_else() {
        assert_eq!("attempt=1", RequestInfo::first_attempt().to_string());
    }

    #[test]
    fn retries_carry_ttl_and_max() {
        let ttl = UNIX_EPOCH + Duration::from_secs(1_559_347_211);
        let info = RequestInfo::retry(2, 4, Some(ttl));
        assert_eq!("ttl=20190601T000011Z; attempt=2; max=4", info.to_string());
        assert_eq!(info, info.to_string().parse().unwrap());
    }

    #[test]
    fn retries_without_a_ttl_still_carry_max() {
        let info = RequestInfo::retry(2, 11, None);
        assert_eq!("attempt=2; max=11", info.to_string());
        assert_eq!(info, info.to_string().parse().unwrap());
    }

    #[test]
    fn fields_parse_in_any_order() {
        let info: RequestInfo = "attempt=3; max=11; ttl=20190601T000000Z".parse().unwrap();
        assert_eq!(3, info.attempt());
        assert_eq!(Some(11), info.max_attempts());
        assert_eq!(
            Some(UNIX_EPOCH + Duration::from_secs(1_559_347_200)),
            info.ttl()
        );
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert!("max=3".parse::<RequestInfo>().is_err());
        assert!("attempt=one".parse::<RequestInfo>().is_err());
        assert!("attempt=1; retries=2".parse::<RequestInfo>().is_err());
        assert!("attempt=2; ttl=tomorrow".parse::<RequestInfo>().is_err());
    }
}
