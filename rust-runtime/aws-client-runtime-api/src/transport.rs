/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The transport seam: sends one transport request and returns its response.

use crate::http::{HttpRequest, HttpResponse};
use crate::BoxError;
use std::fmt;
use std::sync::Arc;

/// Sends a transport request synchronously.
///
/// Connect and read timeouts are the transport's responsibility; a timeout must be reported as
/// [`ConnectorError::timeout`] so it is classified and priced as one.
pub trait Transport: Send + Sync + fmt::Debug {
    /// Sends `request`, returning the response or a connection-level failure.
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ConnectorError>;
}

/// A shareable [`Transport`].
#[derive(Clone, Debug)]
pub struct SharedTransport(Arc<dyn Transport>);

impl SharedTransport {
    /// Wraps a transport.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self(Arc::new(transport))
    }
}

impl Transport for SharedTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ConnectorError> {
        self.0.send(request)
    }
}

/// What went wrong in the transport.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConnectorErrorKind {
    /// The connect or read timed out.
    Timeout,
    /// An I/O error, e.g. a refused or reset connection.
    Io,
    /// Anything else.
    Other,
}

/// No response was received for a request.
#[derive(Debug, thiserror::Error)]
#[error("{kind:?} error while dispatching request")]
pub struct ConnectorError {
    kind: ConnectorErrorKind,
    #[source]
    source: BoxError,
}

impl ConnectorError {
    /// A timeout.
    pub fn timeout(source: impl Into<BoxError>) -> Self {
        Self::new(ConnectorErrorKind::Timeout, source)
    }

    /// An I/O failure.
    pub fn io(source: impl Into<BoxError>) -> Self {
        Self::new(ConnectorErrorKind::Io, source)
    }

    /// Any other dispatch failure.
    pub fn other(source: impl Into<BoxError>) -> Self {
        Self::new(ConnectorErrorKind::Other, source)
    }

    fn new(kind: ConnectorErrorKind, source: impl Into<BoxError>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    /// The kind of failure.
    pub fn kind(&self) -> ConnectorErrorKind {
        self.kind
    }

    /// `true` if this was a timeout.
    pub fn is_timeout(&self) -> bool {
        self.kind == ConnectorErrorKind::Timeout
    }
}
