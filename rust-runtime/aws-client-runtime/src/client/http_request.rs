/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Turns a [`ServiceRequest`] into the transport request every attempt starts from.

use crate::client::config::ClientConfig;
use aws_client_runtime_api::body::SdkBody;
use aws_client_runtime_api::error::SdkError;
use aws_client_runtime_api::http::HttpRequest;
use aws_client_runtime_api::request::ServiceRequest;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, HOST, USER_AGENT};
use http::uri::{PathAndQuery, Scheme};
use http::{HeaderName, HeaderValue, Uri};
use md5::{Digest, Md5};

#[allow(clippy::declare_interior_mutable_const)] // never mutated
const CONTENT_MD5: HeaderName = HeaderName::from_static("content-md5");

/// Builds the base transport request for `request`.
///
/// Per-attempt headers (invocation id, request info, signature) are added later, on a copy.
pub fn build_http_request(
    config: &ClientConfig,
    request: &ServiceRequest,
) -> Result<HttpRequest, SdkError> {
    let uri = request_uri(config.endpoint(), request.path_and_query())?;
    let host = host_header_value(&uri)
        .ok_or_else(|| SdkError::construction_failure(format!("`{uri}` has no host")))?;

    let mut headers = request.headers().clone();
    headers.insert(
        HOST,
        HeaderValue::from_str(&host).map_err(SdkError::construction_failure)?,
    );
    if !headers.contains_key(USER_AGENT) {
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(config.user_agent()).map_err(SdkError::construction_failure)?,
        );
    }

    let body = match request.body() {
        Some(body) => {
            if !headers.contains_key(CONTENT_LENGTH) {
                headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
            }
            if request.compute_content_md5() {
                headers.insert(CONTENT_MD5, content_md5(body)?);
            }
            body.clone()
        }
        None => {
            headers.remove(CONTENT_TYPE);
            headers.remove(CONTENT_LENGTH);
            SdkBody::empty()
        }
    };

    let mut http_request = http::Request::new(body);
    *http_request.method_mut() = request.method().clone();
    *http_request.uri_mut() = uri;
    *http_request.headers_mut() = headers;
    Ok(http_request)
}

/// The `host` header for `uri`: its host, followed by the port unless the port is the scheme's
/// default.
///
/// ```rust
/// use aws_client_runtime::client::http_request::host_header_value;
/// let uri = "https://example.amazonaws.com:8443/".parse().unwrap();
/// assert_eq!(host_header_value(&uri).as_deref(), Some("example.amazonaws.com:8443"));
/// ```
pub fn host_header_value(uri: &Uri) -> Option<String> {
    let host = uri.host()?;
    let default_port = match uri.scheme() {
        Some(scheme) if *scheme == Scheme::HTTPS => Some(443),
        Some(scheme) if *scheme == Scheme::HTTP => Some(80),
        _ => None,
    };
    Some(match uri.port_u16() {
        Some(port) if Some(port) != default_port => format!("{host}:{port}"),
        _ => host.to_owned(),
    })
}

fn request_uri(endpoint: &Uri, path_and_query: &str) -> Result<Uri, SdkError> {
    let base_path = endpoint.path().trim_end_matches('/');
    let path_and_query = match path_and_query {
        "" => format!("{base_path}/"),
        p if p.starts_with('/') => format!("{base_path}{p}"),
        // a bare query string, e.g. `?Action=List`
        p if p.starts_with('?') => format!("{base_path}/{p}"),
        p => format!("{base_path}/{p}"),
    };
    let path_and_query =
        PathAndQuery::try_from(path_and_query).map_err(SdkError::construction_failure)?;
    let mut parts = endpoint.clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    Uri::from_parts(parts).map_err(SdkError::construction_failure)
}

fn content_md5(body: &SdkBody) -> Result<HeaderValue, SdkError> {
    let checksum = Md5::digest(body.bytes());
    HeaderValue::from_str(&base64_simd::STANDARD.encode_to_string(checksum))
        .map_err(SdkError::construction_failure)
}
