//! Continuation-token pagination
//!
//! A [`Pageable`] joins a first-page operation and a next-page operation into
//! one lazy, forward-only sequence of [`Page`]s. Each page transition issues
//! exactly one request; the sequence ends after the first page that carries no
//! continuation token. A failed fetch is yielded once and ends the sequence.
//!
//! Pages can be consumed as a [`Stream`] or, outside of an async context,
//! through [`Pageable::blocking`], which runs the fetches on a runtime of its
//! own. Dropping the pager abandons any in-flight
//! fetch; dropping only a pending `next()` keeps the fetch, and the following
//! poll resumes it.
//!
//! ```no_run
//! use futures::TryStreamExt;
//! # async fn run(client: azure_iot_hub_service::IoTHubServiceClient) -> azure_iot_hub_service::Result<()> {
//! let mut pages = client.devices().get_twins().with_page_size_hint(100);
//! while let Some(page) = pages.try_next().await? {
//!     for twin in page.items() {
//!         println!("{:?}", twin.device_id);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use futures::future::BoxFuture;
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::IoTHubError;
use crate::response::RawResponse;

/// Opaque cursor issued by the hub for the next page of a query
///
/// The value is forwarded verbatim and never interpreted.
#[derive(Clone, PartialEq, Eq)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub(crate) fn from_header(value: &str) -> Self {
        ContinuationToken(value.to_string())
    }

    /// The token exactly as issued
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // tokens can be several kilobytes of server state
        write!(f, "ContinuationToken({} bytes)", self.0.len())
    }
}

/// One page of results
#[derive(Debug, Clone)]
pub struct Page<T> {
    items: Vec<T>,
    continuation_token: Option<ContinuationToken>,
    raw: RawResponse,
}

impl<T> Page<T> {
    /// Build a page, taking the continuation token from the response
    pub(crate) fn from_response(items: Vec<T>, raw: RawResponse) -> Self {
        Page {
            items,
            continuation_token: raw.continuation_token(),
            raw,
        }
    }

    #[cfg_attr(not(feature = "management-models"), allow(dead_code))]
    pub(crate) fn with_token(
        items: Vec<T>,
        continuation_token: Option<ContinuationToken>,
        raw: RawResponse,
    ) -> Self {
        Page {
            items,
            continuation_token,
            raw,
        }
    }

    /// Items in server order
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Take the items
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Token for the following page, `None` on the final page
    pub fn continuation_token(&self) -> Option<&ContinuationToken> {
        self.continuation_token.as_ref()
    }

    /// Whether this is the final page
    pub fn is_last(&self) -> bool {
        self.continuation_token.is_none()
    }

    /// Response that produced this page
    pub fn raw(&self) -> &RawResponse {
        &self.raw
    }
}

type PageFuture<T> = BoxFuture<'static, crate::Result<Page<T>>>;
type FirstPageFn<T> = Box<dyn FnMut(Option<u32>) -> PageFuture<T> + Send>;
type NextPageFn<T> = Box<dyn FnMut(ContinuationToken, Option<u32>) -> PageFuture<T> + Send>;

#[derive(Debug)]
enum PagerState {
    Start,
    Paging(ContinuationToken),
    Done,
}

/// Lazy sequence of pages over a continuation-token query
pub struct Pageable<T> {
    first_page: FirstPageFn<T>,
    next_page: NextPageFn<T>,
    page_size_hint: Option<u32>,
    state: PagerState,
    in_flight: Option<PageFuture<T>>,
}

impl<T> Pageable<T> {
    pub(crate) fn new<F, N>(first_page: F, next_page: N) -> Self
    where
        F: FnMut(Option<u32>) -> PageFuture<T> + Send + 'static,
        N: FnMut(ContinuationToken, Option<u32>) -> PageFuture<T> + Send + 'static,
    {
        Pageable {
            first_page: Box::new(first_page),
            next_page: Box::new(next_page),
            page_size_hint: None,
            state: PagerState::Start,
            in_flight: None,
        }
    }

    /// Ask the hub for pages of about `size` items
    ///
    /// The hint is advisory; pages may be shorter or longer.
    pub fn with_page_size_hint(mut self, size: u32) -> Self {
        self.page_size_hint = Some(size);
        self
    }

    /// Whether the final page has been yielded or a fetch failed
    pub fn is_done(&self) -> bool {
        matches!(self.state, PagerState::Done) && self.in_flight.is_none()
    }
}

impl<T: Send + 'static> Pageable<T> {
    /// Flatten into a stream of individual items
    pub fn into_items(self) -> impl Stream<Item = crate::Result<T>> + Send {
        self.map_ok(|page| stream::iter(page.into_items().into_iter().map(Ok)))
            .try_flatten()
    }

    /// Drive the pager synchronously
    ///
    /// The iterator owns a single-threaded runtime that performs the requests.
    /// Must not be called from within an async context.
    pub fn blocking(self) -> crate::Result<BlockingPages<T>> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(IoTHubError::Runtime)?;

        Ok(BlockingPages {
            pages: self,
            runtime,
        })
    }
}

impl<T> Stream for Pageable<T> {
    type Item = crate::Result<Page<T>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.in_flight.is_none() {
            let fetch = match std::mem::replace(&mut this.state, PagerState::Done) {
                PagerState::Start => {
                    trace!("Fetching first page");
                    (this.first_page)(this.page_size_hint)
                }
                PagerState::Paging(token) => {
                    trace!("Fetching next page with {:?}", token);
                    (this.next_page)(token, this.page_size_hint)
                }
                PagerState::Done => return Poll::Ready(None),
            };
            this.in_flight = Some(fetch);
        }

        let result = match this.in_flight.as_mut() {
            Some(fetch) => futures::ready!(fetch.as_mut().poll(cx)),
            None => return Poll::Ready(None),
        };
        this.in_flight = None;

        match result {
            Ok(page) => {
                this.state = match &page.continuation_token {
                    Some(token) => PagerState::Paging(token.clone()),
                    None => PagerState::Done,
                };
                Poll::Ready(Some(Ok(page)))
            }
            Err(err) => {
                debug!("Page fetch failed, ending sequence: {}", err);
                Poll::Ready(Some(Err(err)))
            }
        }
    }
}

impl<T> fmt::Debug for Pageable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pageable")
            .field("state", &self.state)
            .field("page_size_hint", &self.page_size_hint)
            .field("in_flight", &self.in_flight.is_some())
            .finish()
    }
}

/// Blocking iterator over the pages of a [`Pageable`]
#[derive(Debug)]
pub struct BlockingPages<T> {
    pages: Pageable<T>,
    runtime: tokio::runtime::Runtime,
}

impl<T> Iterator for BlockingPages<T> {
    type Item = crate::Result<Page<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        let pages = &mut self.pages;
        self.runtime.block_on(pages.next())
    }
}
