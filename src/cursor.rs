//! Lazy, paginated iteration over a list endpoint.

use std::collections::VecDeque;

use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{TelerivetClient, TelerivetError};
use crate::domain::{HttpMethod, Query, ResourceKind};
use crate::entity::Entity;

#[derive(Debug)]
/// A server-side result set, fetched one page at a time.
///
/// Construction performs no I/O. The first call to [`Cursor::next`] fetches
/// the first page; later pages are fetched when the buffered page runs out.
/// At most one page is buffered. Items come back in server order, each as a
/// hydrated [`Entity`].
///
/// Iteration ends when a page comes back empty, when the server reports no
/// further pages, or when the configured limit is reached. After that `next`
/// returns `Ok(None)` without touching the network. A cursor cannot be
/// rewound; build a new one with the same path and query to iterate again.
///
/// If a page request fails, the error is returned and the cursor position is
/// unchanged: the next call requests the same page again.
pub struct Cursor<'c> {
    client: &'c TelerivetClient,
    kind: ResourceKind,
    path: String,
    query: Query,
    limit: Option<usize>,
    offset: usize,
    page_buffer: VecDeque<Map<String, Value>>,
    next_marker: Option<String>,
    received: usize,
    consumed: usize,
    pages_fetched: usize,
    has_more: bool,
    exhausted: bool,
}

impl<'c> Cursor<'c> {
    pub(crate) fn new(
        client: &'c TelerivetClient,
        kind: ResourceKind,
        path: String,
        query: Query,
    ) -> Self {
        Self {
            client,
            kind,
            path,
            query,
            limit: None,
            offset: 0,
            page_buffer: VecDeque::new(),
            next_marker: None,
            received: 0,
            consumed: 0,
            pages_fetched: 0,
            has_more: true,
            exhausted: false,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Number of items yielded so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Number of successful page requests.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Yield at most `limit` items in total. Only allowed before the first page is fetched.
    pub fn limit(&mut self, limit: usize) -> Result<&mut Self, TelerivetError> {
        self.ensure_not_started()?;
        self.limit = Some(limit);
        Ok(self)
    }

    /// Skip the first `offset` matches on the server.
    ///
    /// Only allowed before the first page is fetched.
    pub fn offset(&mut self, offset: usize) -> Result<&mut Self, TelerivetError> {
        self.ensure_not_started()?;
        self.offset = offset;
        Ok(self)
    }

    /// Ask the server for the number of matches of the query.
    ///
    /// Ignores `limit` and `offset` and leaves the iteration state untouched.
    pub async fn count(&self) -> Result<u64, TelerivetError> {
        let params = crate::transport::encode_count_params(&self.query);
        let value = self
            .client
            .request(HttpMethod::Get, &self.path, Some(&params))
            .await?;
        crate::transport::decode_count(value)
            .map_err(|err| TelerivetError::protocol(HttpMethod::Get, &self.path, err))
    }

    /// Next item, fetching a page when the buffer is empty.
    pub async fn next(&mut self) -> Result<Option<Entity<'c>>, TelerivetError> {
        if self.limit_reached() {
            self.finish();
            return Ok(None);
        }
        if self.page_buffer.is_empty() {
            if self.exhausted || !self.has_more {
                self.finish();
                return Ok(None);
            }
            self.fetch_page().await?;
            if self.page_buffer.is_empty() {
                self.finish();
                return Ok(None);
            }
        }

        let Some(record) = self.page_buffer.pop_front() else {
            return Ok(None);
        };
        self.consumed += 1;
        Entity::new(self.client, self.kind, record, true).map(Some)
    }

    /// Drain the remaining items (up to the limit) into a vector.
    ///
    /// Time and memory are O(number of matching items); use this only for
    /// result sets known to be small, or together with [`Cursor::limit`].
    pub async fn all(&mut self) -> Result<Vec<Entity<'c>>, TelerivetError> {
        let mut out = Vec::new();
        while let Some(entity) = self.next().await? {
            out.push(entity);
        }
        Ok(out)
    }

    fn ensure_not_started(&self) -> Result<(), TelerivetError> {
        if self.pages_fetched > 0 {
            return Err(TelerivetError::CursorStarted {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.consumed >= limit)
    }

    fn finish(&mut self) {
        self.exhausted = true;
        self.page_buffer.clear();
    }

    async fn fetch_page(&mut self) -> Result<(), TelerivetError> {
        let page_size = match self.limit {
            Some(limit) => limit
                .saturating_sub(self.consumed)
                .min(self.query.effective_page_size()),
            None => self.query.effective_page_size(),
        };
        let offset = match self.next_marker {
            Some(_) => None,
            None => Some(self.offset + self.received),
        };
        let params = crate::transport::encode_page_params(
            &self.query,
            page_size,
            offset,
            self.next_marker.as_deref(),
        );

        let value = self
            .client
            .request(HttpMethod::Get, &self.path, Some(&params))
            .await?;
        let page = crate::transport::decode_page(value)
            .map_err(|err| TelerivetError::protocol(HttpMethod::Get, &self.path, err))?;

        self.pages_fetched += 1;
        self.received += page.data.len();
        self.has_more = page.has_more();
        debug!(
            kind = self.kind.name(),
            path = %self.path,
            page = self.pages_fetched,
            items = page.data.len(),
            has_more = self.has_more,
            "fetched page"
        );
        self.next_marker = page.next_marker;
        self.page_buffer.extend(page.data);
        Ok(())
    }
}
