/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Estimation and correction of the difference between the local clock and the service's.

use aws_client_runtime_api::date_time::{self, Format};
use aws_client_runtime_api::error::{ErrorKind, ServiceError};
use aws_client_runtime_api::http::header_str;
use chrono::{DateTime, Utc};
use http::HeaderMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// Discrepancy below which the local clock is considered in sync with the service.
pub const DEFAULT_CLOCK_SKEW_THRESHOLD: Duration = Duration::from_secs(4 * 60);

/// Offset between the local clock and the service's clock, shared by all invocations of a client.
///
/// The offset starts at zero. It is overwritten, never accumulated, each time an authentication
/// failure is explained by the service's clock disagreeing with the signing time.
#[derive(Debug)]
pub struct ClockSkew {
    offset_millis: AtomicI64,
    threshold: Duration,
}

impl Default for ClockSkew {
    fn default() -> Self {
        Self::new(DEFAULT_CLOCK_SKEW_THRESHOLD)
    }
}

impl ClockSkew {
    /// Creates an estimator that treats discrepancies of at least `threshold` as skew.
    pub fn new(threshold: Duration) -> Self {
        Self {
            offset_millis: AtomicI64::new(0),
            threshold,
        }
    }

    /// `server_time - local_time`, negative when the local clock is ahead.
    pub fn estimate_skew(server_time: SystemTime, local_time: SystemTime) -> chrono::Duration {
        DateTime::<Utc>::from(server_time) - DateTime::<Utc>::from(local_time)
    }

    /// The offset added to the local clock when signing requests.
    pub fn current_offset(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.offset_millis.load(Ordering::Acquire))
    }

    /// Replaces the current offset.
    pub fn apply(&self, offset: chrono::Duration) {
        self.offset_millis
            .store(offset.num_milliseconds(), Ordering::Release);
    }

    /// The discrepancy at which the clock is considered skewed.
    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// `local_time` corrected by the current offset.
    pub fn corrected(&self, local_time: SystemTime) -> SystemTime {
        apply_offset(local_time, self.current_offset())
    }

    /// Examines a failed attempt for clock skew and records a new offset if it finds any.
    ///
    /// Only [`ErrorKind::AuthSignature`] errors carrying a server timestamp are examined. The
    /// attempt is considered skewed when the server time differs from `signing_time` by at least
    /// the threshold; the offset then becomes `server_time - now`. Returns `true` if the offset
    /// was updated.
    pub fn adjust(&self, error: &ServiceError, signing_time: SystemTime, now: SystemTime) -> bool {
        if error.kind() != ErrorKind::AuthSignature {
            return false;
        }
        let server_time = match server_time(error.headers()) {
            Some(server_time) => server_time,
            None => return false,
        };
        let discrepancy = Self::estimate_skew(server_time, signing_time);
        let skewed = u128::from(discrepancy.num_milliseconds().unsigned_abs())
            >= self.threshold.as_millis();
        if !skewed {
            debug!(discrepancy_ms = discrepancy.num_milliseconds(), "clock is in sync with the service");
            return false;
        }
        let offset = Self::estimate_skew(server_time, now);
        self.apply(offset);
        warn!(
            offset_ms = offset.num_milliseconds(),
            server_time = %date_time::format(server_time, Format::Iso8601Basic),
            "clock skew detected; adjusting signing time"
        );
        true
    }
}

/// Shifts `time` by a signed `offset`. Offsets that would overflow leave `time` unchanged.
pub fn apply_offset(time: SystemTime, offset: chrono::Duration) -> SystemTime {
    DateTime::<Utc>::from(time)
        .checked_add_signed(offset)
        .map(SystemTime::from)
        .unwrap_or(time)
}

/// Reads the service's time from the `date` header, falling back to `x-amz-date` when `date` is
/// absent or unreadable.
pub fn server_time(headers: &HeaderMap) -> Option<SystemTime> {
    [("date", Format::HttpDate), ("x-amz-date", Format::Iso8601Basic)]
        .into_iter()
        .filter_map(|(name, format)| Some((name, format, header_str(headers, name)?)))
        .find_map(|(name, format, value)| match date_time::parse(value, format) {
            Ok(time) => Some(time),
            Err(err) => {
                warn!(header = name, "failed to read the service's time from the response: {}", err);
                None
            }
        })
}
