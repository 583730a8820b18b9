/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Transport-level request and response types.

use crate::body::SdkBody;
use http::HeaderMap;

/// A transport request, built fresh for every attempt.
pub type HttpRequest = http::Request<SdkBody>;

/// A transport response.
pub type HttpResponse = http::Response<SdkBody>;

/// Returns the value of header `name` if it is present and valid UTF-8.
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Copies a request so it can be sent again. Extensions are not carried over.
pub fn clone_request(request: &HttpRequest) -> HttpRequest {
    let mut cloned = http::Request::new(request.body().clone());
    *cloned.method_mut() = request.method().clone();
    *cloned.uri_mut() = request.uri().clone();
    *cloned.version_mut() = request.version();
    *cloned.headers_mut() = request.headers().clone();
    cloned
}
