/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Test doubles for the collaborators of a [`Client`](crate::client::Client).

use aws_client_runtime_api::body::SdkBody;
use aws_client_runtime_api::date_time::{self, Format};
use aws_client_runtime_api::http::{clone_request, HttpRequest, HttpResponse};
use aws_client_runtime_api::signer::Signer;
use aws_client_runtime_api::time::{Sleep, TimeSource};
use aws_client_runtime_api::transport::{ConnectorError, Transport};
use aws_client_runtime_api::BoxError;
use http::{HeaderName, HeaderValue};
use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

pub use crate::client::invocation_id::{InvocationId, InvocationIdGeneratorForTests};

type ReplayEvent = Result<HttpResponse, ConnectorError>;

/// A transport that replays a preloaded series of responses and connector errors.
///
/// Every request it is given is recorded for later examination. Once the events run out,
/// further requests fail with a connector error. Clones share their events and recordings.
///
/// ```rust
/// use aws_client_runtime::test_util::ReplayingTransport;
/// let transport = ReplayingTransport::new(vec![Ok(ReplayingTransport::response(200, "ok"))]);
/// assert_eq!(transport.requests().len(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ReplayingTransport {
    events: Arc<Mutex<VecDeque<ReplayEvent>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ReplayingTransport {
    /// Creates a transport that replays `events` in order.
    pub fn new(events: Vec<ReplayEvent>) -> Self {
        Self {
            events: Arc::new(Mutex::new(events.into())),
            requests: Default::default(),
        }
    }

    /// Creates a transport that replays `responses` in order.
    pub fn from_responses(responses: Vec<HttpResponse>) -> Self {
        Self::new(responses.into_iter().map(Ok).collect())
    }

    /// Shorthand for a response with the given status and body.
    pub fn response(status: u16, body: &'static str) -> HttpResponse {
        http::Response::builder()
            .status(status)
            .body(SdkBody::from(body))
            .expect("valid status code")
    }

    /// Shorthand for a response with the given status, body and headers.
    pub fn response_with_headers(
        status: u16,
        body: &'static str,
        headers: &[(&'static str, &str)],
    ) -> HttpResponse {
        let mut response = Self::response(status, body);
        for (name, value) in headers {
            response.headers_mut().insert(
                HeaderName::from_static(*name),
                HeaderValue::from_str(value).expect("valid header value"),
            );
        }
        response
    }

    /// Requests received so far.
    pub fn requests(&self) -> impl Deref<Target = Vec<HttpRequest>> + '_ {
        self.requests.lock().unwrap()
    }

    /// Number of events not yet replayed.
    pub fn remaining(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Queues more events after the ones already loaded.
    pub fn push(&self, event: ReplayEvent) {
        self.events.lock().unwrap().push_back(event);
    }
}

impl Transport for ReplayingTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ConnectorError> {
        self.requests.lock().unwrap().push(clone_request(&request));
        self.events
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ConnectorError::other("no more events to replay")))
    }
}

/// A [`Sleep`] that returns immediately and records how long it was asked to sleep.
#[derive(Clone, Debug, Default)]
pub struct InstantSleep {
    log: Arc<Mutex<Vec<Duration>>>,
}

impl InstantSleep {
    /// Creates a new `InstantSleep`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every requested sleep, in order.
    pub fn logs(&self) -> Vec<Duration> {
        self.log.lock().unwrap().clone()
    }

    /// Sum of every requested sleep.
    pub fn total_duration(&self) -> Duration {
        self.log.lock().unwrap().iter().sum()
    }
}

impl Sleep for InstantSleep {
    fn sleep(&self, duration: Duration) {
        self.log.lock().unwrap().push(duration);
    }
}

/// A [`TimeSource`] that only moves when told to.
#[derive(Clone, Debug)]
pub struct ManualTimeSource {
    now: Arc<Mutex<SystemTime>>,
}

impl ManualTimeSource {
    /// Creates a time source stopped at `start`.
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Jumps to `time`.
    pub fn set_time(&self, time: SystemTime) {
        *self.now.lock().unwrap() = time;
    }

    /// Moves the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        *self.now.lock().unwrap() += duration;
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap()
    }
}

/// A [`Signer`] that stamps requests with their signing time in `x-amz-date`.
///
/// Stands in for a real signer in tests that check which time a request was signed with.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct TimestampSigner;

impl TimestampSigner {
    /// Creates a new `TimestampSigner`.
    pub fn new() -> Self {
        Self
    }
}

impl Signer for TimestampSigner {
    fn sign(&self, request: &mut HttpRequest, signing_time: SystemTime) -> Result<(), BoxError> {
        let stamp = date_time::format(signing_time, Format::Iso8601Basic);
        request
            .headers_mut()
            .insert(HeaderName::from_static("x-amz-date"), stamp.parse()?);
        Ok(())
    }
}
