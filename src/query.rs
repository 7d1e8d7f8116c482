//! Registry queries
//!
//! Queries are executed with `POST /devices/query`. The hub returns at most
//! one page per call and an `x-ms-continuation` header while more results are
//! available; [`query_pager`] turns that exchange into a [`Pageable`].

use futures::FutureExt;
use hyper::header::{HeaderName, HeaderValue};
use hyper::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::models::QuerySpecification;
use crate::pager::{ContinuationToken, Page, Pageable};
use crate::response::CONTINUATION_TOKEN_HEADER;
use crate::transport::{check_status, HttpRequest, Transport};

/// Request header carrying the page size hint
pub const MAX_ITEM_COUNT_HEADER: &str = "x-ms-max-item-count";

const QUERY_PATH: &str = "devices/query";

/// Lazy pager over the results of `query`, deserialized as `T`
pub(crate) fn query_pager<T>(transport: Arc<dyn Transport>, query: QuerySpecification) -> Pageable<T>
where
    T: DeserializeOwned + Send + 'static,
{
    let (first_transport, first_query) = (transport.clone(), query.clone());

    Pageable::new(
        move |page_size_hint| {
            let (transport, query) = (first_transport.clone(), first_query.clone());
            async move { execute(transport.as_ref(), &query, None, page_size_hint).await }.boxed()
        },
        move |token, page_size_hint| {
            let (transport, query) = (transport.clone(), query.clone());
            async move { execute(transport.as_ref(), &query, Some(token), page_size_hint).await }
                .boxed()
        },
    )
}

/// Run one page of `query`
///
/// The query is sent again with every continuation token.
async fn execute<T: DeserializeOwned>(
    transport: &dyn Transport,
    query: &QuerySpecification,
    continuation_token: Option<ContinuationToken>,
    page_size_hint: Option<u32>,
) -> crate::Result<Page<T>> {
    let mut request = HttpRequest::new(Method::POST, QUERY_PATH).json(query)?;

    if let Some(token) = continuation_token {
        let value = HeaderValue::from_str(token.as_str()).map_err(hyper::http::Error::from)?;
        request = request.header(HeaderName::from_static(CONTINUATION_TOKEN_HEADER), value);
    }
    if let Some(size) = page_size_hint {
        request = request.header(HeaderName::from_static(MAX_ITEM_COUNT_HEADER), HeaderValue::from(size));
    }

    let response = check_status(transport.send(request).await?, &[StatusCode::OK])?;
    let items: Vec<T> = serde_json::from_slice(&response.body)?;

    trace!("Query returned {} items", items.len());

    Ok(Page::from_response(items, response.raw()))
}
