use async_trait::async_trait;
use hyper::body::Bytes;
use hyper::header::{HeaderName, HeaderValue, IF_MATCH};
use hyper::{HeaderMap, Method, StatusCode};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::IoTHubError;
use crate::precondition::IfMatch;
use crate::response::{RawResponse, Response};

/// A request addressed relative to the hub endpoint
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP verb
    pub method: Method,
    /// Path relative to the hub root, without the leading `/`
    pub path: String,
    /// Extra headers; authorization and content negotiation are added by the transport
    pub headers: HeaderMap,
    /// Serialized JSON body
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Request without a body
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        HttpRequest {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Attach a JSON body
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> crate::Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// Set a header, replacing any previous value
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach an `If-Match` precondition when one is given
    ///
    /// Fails when the ETag cannot be sent as a header value.
    pub fn if_match(self, if_match: Option<&IfMatch>) -> crate::Result<Self> {
        Ok(match if_match {
            Some(condition) => {
                let value = condition.header_value().map_err(hyper::http::Error::from)?;
                self.header(IF_MATCH, value)
            }
            None => self,
        })
    }
}

/// A completed exchange with the hub, whatever its status
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status returned by the hub
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw response body
    pub body: Bytes,
}

impl HttpResponse {
    pub(crate) fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Status and headers without the body
    pub fn raw(&self) -> RawResponse {
        RawResponse::new(self.status, self.headers.clone())
    }
}

/// Sends requests to the hub
///
/// Implementations own endpoint resolution, authorization and timeouts. Errors
/// returned here are transport failures; a response with any status is `Ok`.
#[async_trait]
pub trait Transport: std::fmt::Debug + Send + Sync {
    ///
    async fn send(&self, request: HttpRequest) -> crate::Result<HttpResponse>;
}

// Device and module ids may contain characters such as `#`, `?` or `%`
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode an id for use as one path segment
pub(crate) fn path_segment(id: &str) -> String {
    utf8_percent_encode(id, PATH_SEGMENT).to_string()
}

/// Fail unless `response` carries one of the `accepted` statuses
pub(crate) fn check_status(
    response: HttpResponse,
    accepted: &[StatusCode],
) -> crate::Result<HttpResponse> {
    if accepted.contains(&response.status) {
        return Ok(response);
    }

    let body = response.body_text();
    debug!("Rejected response {}: {}", response.status, body);

    if response.status == StatusCode::PRECONDITION_FAILED {
        Err(IoTHubError::PreconditionFailed { body })
    } else {
        Err(IoTHubError::Api {
            status: response.status,
            body,
        })
    }
}

/// Send `request` and deserialize the JSON body of an accepted response
pub(crate) async fn send_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    request: HttpRequest,
    accepted: &[StatusCode],
) -> crate::Result<Response<T>> {
    let response = check_status(transport.send(request).await?, accepted)?;
    let value = serde_json::from_slice(&response.body)?;
    Ok(Response::new(value, response.raw()))
}

/// Send `request`, ignoring any response body
pub(crate) async fn send_empty(
    transport: &dyn Transport,
    request: HttpRequest,
    accepted: &[StatusCode],
) -> crate::Result<RawResponse> {
    let response = check_status(transport.send(request).await?, accepted)?;
    Ok(response.raw())
}
