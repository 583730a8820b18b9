/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! The logical request handed to the executor and the response it hands back.

use crate::body::SdkBody;
use crate::error::SdkError;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};
use std::borrow::Cow;

/// Result of an invocation.
pub type Outcome = Result<ServiceResponse, SdkError>;

/// A serialized service request, ready to be executed.
///
/// Model serializers produce this; the executor turns it into a transport request for each
/// attempt. Only the header map is touched by the executor.
#[derive(Clone, Debug)]
pub struct ServiceRequest {
    operation_name: Cow<'static, str>,
    method: Method,
    path_and_query: String,
    headers: HeaderMap,
    body: Option<SdkBody>,
    compute_content_md5: bool,
}

impl ServiceRequest {
    /// Creates a builder for a request to the given operation.
    pub fn builder(operation_name: impl Into<Cow<'static, str>>) -> ServiceRequestBuilder {
        ServiceRequestBuilder {
            operation_name: operation_name.into(),
            method: Method::GET,
            path_and_query: "/".into(),
            headers: HeaderMap::new(),
            body: None,
            compute_content_md5: false,
        }
    }

    /// Name of the operation, used in logs.
    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path and query, relative to the client's endpoint.
    pub fn path_and_query(&self) -> &str {
        &self.path_and_query
    }

    /// Headers supplied by the serializer.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The request body, if any.
    pub fn body(&self) -> Option<&SdkBody> {
        self.body.as_ref()
    }

    /// Whether a `content-md5` header should be computed over the body.
    pub fn compute_content_md5(&self) -> bool {
        self.compute_content_md5
    }
}

/// Builder for [`ServiceRequest`].
#[derive(Debug)]
pub struct ServiceRequestBuilder {
    operation_name: Cow<'static, str>,
    method: Method,
    path_and_query: String,
    headers: HeaderMap,
    body: Option<SdkBody>,
    compute_content_md5: bool,
}

impl ServiceRequestBuilder {
    /// Sets the HTTP method. Defaults to `GET`.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the path and query, e.g. `/bucket/key?versionId=3`. Defaults to `/`.
    pub fn path_and_query(mut self, path_and_query: impl Into<String>) -> Self {
        self.path_and_query = path_and_query.into();
        self
    }

    /// Sets a header, replacing any earlier value for the same name.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replaces all headers.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<SdkBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Requests a `content-md5` header computed over the body.
    pub fn compute_content_md5(mut self, compute: bool) -> Self {
        self.compute_content_md5 = compute;
        self
    }

    /// Builds the request.
    pub fn build(self) -> ServiceRequest {
        ServiceRequest {
            operation_name: self.operation_name,
            method: self.method,
            path_and_query: self.path_and_query,
            headers: self.headers,
            body: self.body,
            compute_content_md5: self.compute_content_md5,
        }
    }
}

/// A successful response.
#[derive(Clone, Debug)]
pub struct ServiceResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: SdkBody,
}

impl ServiceResponse {
    /// Creates a response.
    pub fn new(status: StatusCode, headers: HeaderMap, body: SdkBody) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Response body.
    pub fn body(&self) -> &SdkBody {
        &self.body
    }

    /// Consumes the response, returning its body.
    pub fn into_body(self) -> SdkBody {
        self.body
    }
}

impl From<http::Response<SdkBody>> for ServiceResponse {
    fn from(response: http::Response<SdkBody>) -> Self {
        let (parts, body) = response.into_parts();
        Self::new(parts.status, parts.headers, body)
    }
}
