/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The `amz-sdk-invocation-id` header, which ties every attempt of an invocation together.

use aws_client_runtime_api::BoxError;
use http::header::InvalidHeaderValue;
use http::{HeaderName, HeaderValue};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

#[cfg(feature = "test-util")]
use std::sync::Mutex;

#[allow(clippy::declare_interior_mutable_const)] // never mutated
pub(crate) const AMZ_SDK_INVOCATION_ID: HeaderName =
    HeaderName::from_static("amz-sdk-invocation-id");

/// Produces a fresh [`InvocationId`] for each invocation.
pub trait InvocationIdGenerator: fmt::Debug + Send + Sync {
    /// Returns a new id, or an error explaining why none could be produced.
    fn generate(&self) -> Result<InvocationId, BoxError>;
}

/// Generates random version 4 UUIDs.
#[derive(Debug, Default)]
#[non_exhaustive]
pub struct RandomInvocationIdGenerator;

impl RandomInvocationIdGenerator {
    /// Creates a new `RandomInvocationIdGenerator`.
    pub fn new() -> Self {
        Self
    }
}

impl InvocationIdGenerator for RandomInvocationIdGenerator {
    fn generate(&self) -> Result<InvocationId, BoxError> {
        InvocationId::random().map_err(Into::into)
    }
}

/// A shareable [`InvocationIdGenerator`]. Defaults to [`RandomInvocationIdGenerator`].
#[derive(Clone, Debug)]
pub struct SharedInvocationIdGenerator(Arc<dyn InvocationIdGenerator>);

impl SharedInvocationIdGenerator {
    /// Wraps a generator.
    pub fn new(generator: impl InvocationIdGenerator + 'static) -> Self {
        Self(Arc::new(generator))
    }
}

impl Default for SharedInvocationIdGenerator {
    fn default() -> Self {
        Self::new(RandomInvocationIdGenerator::new())
    }
}

impl InvocationIdGenerator for SharedInvocationIdGenerator {
    fn generate(&self) -> Result<InvocationId, BoxError> {
        self.0.generate()
    }
}

/// Hands out ids from a fixed list, in order. Fails once the list is used up.
#[cfg(feature = "test-util")]
#[derive(Debug)]
pub struct InvocationIdGeneratorForTests {
    remaining: Mutex<Vec<InvocationId>>,
}

#[cfg(feature = "test-util")]
impl InvocationIdGeneratorForTests {
    /// Creates a generator that returns `ids` front to back.
    pub fn new(mut ids: Vec<InvocationId>) -> Self {
        // ids are popped off the end
        ids.reverse();
        Self {
            remaining: Mutex::new(ids),
        }
    }
}

#[cfg(feature = "test-util")]
impl InvocationIdGenerator for InvocationIdGeneratorForTests {
    fn generate(&self) -> Result<InvocationId, BoxError> {
        self.remaining
            .lock()
            .map_err(|_| "invocation id list poisoned")?
            .pop()
            .ok_or_else(|| "ran out of pre-generated invocation ids".into())
    }
}

/// An id that stays the same across all attempts of one invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvocationId(HeaderValue);

impl InvocationId {
    /// A new random id.
    pub fn random() -> Result<Self, InvalidHeaderValue> {
        let id = Uuid::new_v4().hyphenated().to_string();
        HeaderValue::try_from(id).map(Self)
    }

    /// An id with a fixed value.
    #[cfg(feature = "test-util")]
    pub fn new_from_str(id: &'static str) -> Self {
        Self(HeaderValue::from_static(id))
    }

    /// The id as a header value.
    pub fn as_header_value(&self) -> &HeaderValue {
        &self.0
    }
}

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.to_str().unwrap_or_default())
    }
}
