/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Request and response bodies.

use bytes::Bytes;
use std::fmt;

/// An in-memory HTTP body.
///
/// Bodies are backed by [`Bytes`], so cloning one for a retry attempt is a reference count bump
/// rather than a copy of the payload.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SdkBody {
    inner: Bytes,
}

impl SdkBody {
    /// An empty body.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The body's bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.inner
    }

    /// Length of the body in bytes.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// `true` if the body has no bytes.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Consumes the body, returning its bytes.
    pub fn into_bytes(self) -> Bytes {
        self.inner
    }
}

impl fmt::Debug for SdkBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.inner) {
            Ok(text) => f.debug_tuple("SdkBody").field(&text).finish(),
            Err(_) => write!(f, "SdkBody({} bytes)", self.inner.len()),
        }
    }
}

impl From<Bytes> for SdkBody {
    fn from(inner: Bytes) -> Self {
        Self { inner }
    }
}

impl From<Vec<u8>> for SdkBody {
    fn from(data: Vec<u8>) -> Self {
        Self::from(Bytes::from(data))
    }
}

impl From<String> for SdkBody {
    fn from(s: String) -> Self {
        Self::from(Bytes::from(s))
    }
}

impl From<&'static str> for SdkBody {
    fn from(s: &'static str) -> Self {
        Self::from(Bytes::from_static(s.as_bytes()))
    }
}

impl From<&'static [u8]> for SdkBody {
    fn from(data: &'static [u8]) -> Self {
        Self::from(Bytes::from_static(data))
    }
}

#[cfg(test)]
mod tests {
    use super::SdkBody;

    #[test]
    fn debug_prints_text_bodies() {
        assert_eq!(r#"SdkBody("hello")"#, format!("{:?}", SdkBody::from("hello")));
        assert_eq!(
            "SdkBody(2 bytes)",
            format!("{:?}", SdkBody::from(vec![0xff_u8, 0xfe]))
        );
    }

    #[test]
    fn clones_share_bytes() {
        let body = SdkBody::from("request body");
        let cloned = body.clone();
        assert_eq!(body.bytes().as_ptr(), cloned.bytes().as_ptr());
        assert_eq!(12, cloned.len());
        assert!(SdkBody::empty().is_empty());
    }
}
