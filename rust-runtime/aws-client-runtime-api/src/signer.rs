/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The signing seam.

use crate::http::HttpRequest;
use crate::BoxError;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// Adds authentication headers to a transport request.
///
/// Signing is repeated for every attempt because `signing_time` moves forward and may be
/// corrected for clock skew between attempts.
pub trait Signer: Send + Sync + fmt::Debug {
    /// Signs `request` in place as of `signing_time`.
    fn sign(&self, request: &mut HttpRequest, signing_time: SystemTime) -> Result<(), BoxError>;
}

/// A shareable [`Signer`].
#[derive(Clone, Debug)]
pub struct SharedSigner(Arc<dyn Signer>);

impl SharedSigner {
    /// Wraps a signer.
    pub fn new(signer: impl Signer + 'static) -> Self {
        Self(Arc::new(signer))
    }
}

impl Signer for SharedSigner {
    fn sign(&self, request: &mut HttpRequest, signing_time: SystemTime) -> Result<(), BoxError> {
        self.0.sign(request, signing_time)
    }
}

/// Leaves requests unsigned. Used for anonymous requests.
#[non_exhaustive]
#[derive(Debug, Default)]
pub struct NoAuthSigner;

impl NoAuthSigner {
    /// Creates a new `NoAuthSigner`.
    pub fn new() -> Self {
        NoAuthSigner
    }
}

impl Signer for NoAuthSigner {
    fn sign(&self, _request: &mut HttpRequest, _signing_time: SystemTime) -> Result<(), BoxError> {
        Ok(())
    }
}
