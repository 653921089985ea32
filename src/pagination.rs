//! Link-header pagination for Evergreen API responses.
//!
//! Evergreen list endpoints return an array of records per response and
//! advertise the following page through a `Link: <url>; rel="next"` header.
//! [`paginate`] turns that protocol into a single lazy stream of decoded
//! items, downloading page N+1 in the background while the caller consumes
//! page N.

use std::vec;

use futures::stream::{self, Stream};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::task::JoinHandle;
use url::Url;

use crate::client::EvgClient;
use crate::error::{EvgError, Result};

/// Page-size hint applied when a caller supplies no query parameters.
pub const DEFAULT_LIMIT: u32 = 100;

/// Query parameters re-sent unchanged with every page request. The server's
/// next-page locator already carries the pagination cursor, so the client
/// never rewrites these itself.
pub type QueryParams = Vec<(String, String)>;

/// One decoded page: raw records plus the locator of the following page.
#[derive(Debug)]
struct RawPage {
    records: Vec<Value>,
    next: Option<Url>,
}

/// Extract the `rel="next"` target from a response's `Link` headers.
///
/// Absence of the relation after a non-empty page means the resource is
/// exhausted.
fn parse_next_link(headers: &HeaderMap) -> Option<Url> {
    for value in headers.get_all(reqwest::header::LINK) {
        let Ok(value) = value.to_str() else {
            continue;
        };
        for link in value.split(',') {
            let mut pieces = link.split(';');
            let Some(target) = pieces.next().map(str::trim) else {
                continue;
            };
            if !(target.starts_with('<') && target.ends_with('>')) {
                continue;
            }
            let is_next = pieces.any(|param| {
                param
                    .trim()
                    .strip_prefix("rel=")
                    .map(|rel| rel.trim_matches('"') == "next")
                    .unwrap_or(false)
            });
            if is_next {
                return Url::parse(&target[1..target.len() - 1]).ok();
            }
        }
    }
    None
}

/// Fetch and decode a single page.
async fn fetch_page(client: EvgClient, url: Url, params: QueryParams) -> Result<RawPage> {
    let response = client.get_url(url, &params).await?;
    // The link header must be read before the body consumes the response.
    let next = parse_next_link(response.headers());
    let body = response.text().await.map_err(EvgError::Http)?;
    let records: Vec<Value> = serde_json::from_str(&body)?;
    tracing::debug!(records = records.len(), has_next = next.is_some(), "fetched page");
    Ok(RawPage { records, next })
}

/// The one-slot lookahead: either the initial URL waiting for its first
/// request, or a page download already running in the background.
enum NextFetch {
    Start(Url),
    InFlight(JoinHandle<Result<RawPage>>),
}

struct PageCursor<F> {
    client: EvgClient,
    params: QueryParams,
    items: vec::IntoIter<Value>,
    pending: Option<NextFetch>,
    transform: F,
}

/// Produce a lazy stream of decoded items from a link-paginated endpoint.
///
/// Pages are fetched only as the stream is polled; nothing is requested
/// before the first poll, and at most one page download is in flight at any
/// time. While the caller consumes a page's records, the following page is
/// already downloading in a background task, so network latency overlaps
/// with item processing.
///
/// Items are yielded in exact server order: page order, then in-page record
/// order. An empty page ends the stream immediately, even when it carries a
/// `next` link. A non-2xx response or a `transform` failure ends the stream
/// with an error at exactly that position; items yielded before the failure
/// remain valid. Dropping the stream abandons any in-flight prefetch.
///
/// When `params` is `None`, a `limit` hint of [`DEFAULT_LIMIT`] is sent with
/// every request.
pub fn paginate<T, F>(
    client: &EvgClient,
    url: Url,
    params: Option<QueryParams>,
    transform: F,
) -> impl Stream<Item = Result<T>> + Send + Unpin
where
    T: Send + 'static,
    F: FnMut(Value) -> Result<T> + Send + 'static,
{
    let params = params
        .unwrap_or_else(|| vec![("limit".to_string(), DEFAULT_LIMIT.to_string())]);
    let cursor = PageCursor {
        client: client.clone(),
        params,
        items: Vec::new().into_iter(),
        pending: Some(NextFetch::Start(url)),
        transform,
    };

    // Boxed so callers can drive the stream with `next`/`try_next` without
    // pinning it themselves.
    Box::pin(stream::try_unfold(cursor, |mut cursor| async move {
        loop {
            if let Some(record) = cursor.items.next() {
                let item = (cursor.transform)(record)?;
                return Ok(Some((item, cursor)));
            }

            let Some(next) = cursor.pending.take() else {
                return Ok(None);
            };
            let page = match next {
                NextFetch::Start(url) => {
                    fetch_page(cursor.client.clone(), url, cursor.params.clone()).await?
                }
                NextFetch::InFlight(handle) => handle.await??,
            };

            // A page with no records is the end of the resource, even if the
            // server still advertised a next link.
            if page.records.is_empty() {
                return Ok(None);
            }

            if let Some(next_url) = page.next {
                // Start the next download now; it runs while the caller
                // consumes the records below.
                let client = cursor.client.clone();
                let params = cursor.params.clone();
                cursor.pending = Some(NextFetch::InFlight(tokio::spawn(fetch_page(
                    client, next_url, params,
                ))));
            }

            cursor.items = page.records.into_iter();
        }
    }))
}

impl EvgClient {
    /// Stream a paginated endpoint, decoding each record with `transform`.
    ///
    /// See [`paginate`] for the full contract.
    pub fn paginate<T, F>(
        &self,
        url: Url,
        params: Option<QueryParams>,
        transform: F,
    ) -> impl Stream<Item = Result<T>> + Send + Unpin
    where
        T: Send + 'static,
        F: FnMut(Value) -> Result<T> + Send + 'static,
    {
        paginate(self, url, params, transform)
    }

    /// Stream a paginated endpoint, decoding each record into `T` via serde.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use evgapi::{EvgClient, Task};
    /// use futures::TryStreamExt;
    ///
    /// # async fn example() -> evgapi::Result<()> {
    /// let client = EvgClient::from_env()?;
    /// let url = client.url_v2("builds/abc123/tasks")?;
    /// let tasks: Vec<Task> = client.paginate_as(url, None).try_collect().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn paginate_as<T>(
        &self,
        url: Url,
        params: Option<QueryParams>,
    ) -> impl Stream<Item = Result<T>> + Send + Unpin
    where
        T: DeserializeOwned + Send + 'static,
    {
        paginate(self, url, params, |record| {
            Ok(serde_json::from_value(record)?)
        })
    }
}
