use hyper::{HeaderMap, StatusCode};

use crate::pager::ContinuationToken;

/// Response header carrying the query continuation token
pub const CONTINUATION_TOKEN_HEADER: &str = "x-ms-continuation";

/// Status and headers of a completed response
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: StatusCode,
    headers: HeaderMap,
}

impl RawResponse {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap) -> Self {
        RawResponse { status, headers }
    }

    /// HTTP status of the response
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// All response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Continuation token for the next page of a query, if the hub issued one
    ///
    /// A missing, empty or non-ASCII header all mean the sequence is complete.
    pub fn continuation_token(&self) -> Option<ContinuationToken> {
        self.headers
            .get(CONTINUATION_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(ContinuationToken::from_header)
    }
}

/// A deserialized value along with the response that carried it
#[derive(Debug, Clone)]
pub struct Response<T> {
    value: T,
    raw: RawResponse,
}

impl<T> Response<T> {
    pub(crate) fn new(value: T, raw: RawResponse) -> Self {
        Response { value, raw }
    }

    /// Borrow the deserialized value
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Take the deserialized value
    pub fn into_value(self) -> T {
        self.value
    }

    /// Status and headers of the response
    pub fn raw(&self) -> &RawResponse {
        &self.raw
    }

    /// Split into value and response metadata
    pub fn into_parts(self) -> (T, RawResponse) {
        (self.value, self.raw)
    }
}
