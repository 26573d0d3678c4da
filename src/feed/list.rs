//! Page-by-page fetch coordinator for a single list.
//!
//! A [`PaginatedList`] owns the item array of one logical list together with
//! its [`PageCursor`]. Fetching is split into [`PaginatedList::request_next_page`],
//! which hands out at most one [`PageRequest`] at a time, and
//! [`PaginatedList::complete_page`], which applies the server's answer. The
//! async [`PaginatedList::fetch_items`] driver runs both around a gateway call.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::api::{Endpoint, FeedError, FeedGateway, Item, ItemId};
use crate::telemetry::{NoopTelemetrySink, StopReason, TelemetryEvent, TelemetrySink};

use super::pagination::PageCursor;
use super::store::ListKey;

/// Token for one outstanding page request.
#[derive(Debug, Clone)]
pub struct PageRequest {
    endpoint: Endpoint,
    page_number: u32,
    generation: u64,
    issued_at: Instant,
}

impl PageRequest {
    /// Returns the endpoint to call.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the page number to request.
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }
}

/// What a completed page request did to the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page was appended.
    Appended(usize),
    /// The page was empty; pagination stopped.
    Exhausted,
    /// The request failed; pagination stopped.
    Failed(FeedError),
    /// The list was reset while the request was in flight; nothing changed.
    Stale,
}

/// Returns how many skeleton rows fill a `viewport_height` tall viewport.
///
/// Always at least one.
#[must_use]
pub fn skeleton_count(viewport_height: u32, skeleton_height: u32) -> usize {
    if skeleton_height == 0 {
        return 1;
    }
    let rows = viewport_height.div_ceil(skeleton_height).max(1);
    usize::try_from(rows).unwrap_or(1)
}

/// Item array plus pagination state for one list.
pub struct PaginatedList {
    key: ListKey,
    endpoint: Option<Endpoint>,
    items: Vec<Item>,
    cursor: PageCursor,
    in_flight: bool,
    initial_loading: bool,
    generation: u64,
    telemetry: Arc<dyn TelemetrySink>,
}

impl fmt::Debug for PaginatedList {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("PaginatedList")
            .field("key", &self.key)
            .field("endpoint", &self.endpoint)
            .field("items", &self.items.len())
            .field("cursor", &self.cursor)
            .field("in_flight", &self.in_flight)
            .field("initial_loading", &self.initial_loading)
            .finish_non_exhaustive()
    }
}

impl PaginatedList {
    /// Creates an empty list. A list without an endpoint never fetches.
    #[must_use]
    pub fn new(key: ListKey, endpoint: Option<Endpoint>) -> Self {
        Self {
            key,
            endpoint,
            items: Vec::new(),
            cursor: PageCursor::new(),
            in_flight: false,
            initial_loading: false,
            generation: 0,
            telemetry: Arc::new(NoopTelemetrySink),
        }
    }

    /// Routes telemetry events to `sink`.
    #[must_use]
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = sink;
        self
    }

    /// Returns the list key.
    #[must_use]
    pub const fn key(&self) -> &ListKey {
        &self.key
    }

    /// Returns the items loaded so far.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Returns the pagination cursor.
    #[must_use]
    pub const fn cursor(&self) -> PageCursor {
        self.cursor
    }

    /// Returns true while more pages may exist.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.cursor.has_more()
    }

    /// Returns true while a page request is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Returns true while the very first page is loading into an empty list.
    #[must_use]
    pub const fn is_initial_loading(&self) -> bool {
        self.initial_loading
    }

    /// Performs the automatic first load when the list is mounted.
    ///
    /// Only an empty list that may have more pages fetches; a list restored
    /// with items keeps them.
    pub fn mount(&mut self) -> Option<PageRequest> {
        if !self.items.is_empty() || !self.cursor.has_more() {
            return None;
        }
        let request = self.request_next_page()?;
        self.initial_loading = true;
        Some(request)
    }

    /// Hands out the next page request.
    ///
    /// Returns `None` while a request is already in flight, after the list is
    /// exhausted, or when no endpoint is set.
    pub fn request_next_page(&mut self) -> Option<PageRequest> {
        if self.in_flight || !self.cursor.has_more() {
            return None;
        }
        let endpoint = self.endpoint.clone()?;

        self.in_flight = true;
        let page_number = self.cursor.page_number();
        tracing::debug!("list {} requesting page {page_number}", self.key);
        Some(PageRequest {
            endpoint,
            page_number,
            generation: self.generation,
            issued_at: Instant::now(),
        })
    }

    /// Applies the outcome of `request`.
    ///
    /// Success appends the page and advances the cursor; an empty page or any
    /// failure stops pagination without touching items already loaded.
    pub fn complete_page(
        &mut self,
        request: PageRequest,
        outcome: Result<Vec<Item>, FeedError>,
    ) -> PageOutcome {
        if request.generation != self.generation {
            tracing::debug!("list {} ignoring page from before a reset", self.key);
            return PageOutcome::Stale;
        }

        self.in_flight = false;
        self.initial_loading = false;

        match outcome {
            Ok(page) if page.is_empty() => {
                self.cursor.exhaust();
                self.record_stop(request.page_number, StopReason::Exhausted);
                PageOutcome::Exhausted
            }
            Ok(page) => {
                let count = page.len();
                self.items.extend(page);
                self.cursor.advance();
                let latency_ms =
                    u64::try_from(request.issued_at.elapsed().as_millis()).unwrap_or(u64::MAX);
                self.telemetry.record(TelemetryEvent::PageLoaded {
                    list: self.key.to_string(),
                    page_number: request.page_number,
                    item_count: count,
                    latency_ms,
                });
                PageOutcome::Appended(count)
            }
            Err(error) => {
                tracing::warn!(
                    "list {} page {} failed: {error}",
                    self.key,
                    request.page_number
                );
                self.cursor.exhaust();
                self.record_stop(request.page_number, StopReason::Failed);
                PageOutcome::Failed(error)
            }
        }
    }

    /// Requests, fetches and applies the next page.
    ///
    /// Returns `None` when no request was allowed.
    pub async fn fetch_items(&mut self, gateway: &dyn FeedGateway) -> Option<PageOutcome> {
        let request = self.request_next_page()?;
        let outcome = gateway
            .fetch_page(request.endpoint(), request.page_number())
            .await;
        Some(self.complete_page(request, outcome))
    }

    /// Replaces the item with the same ID. Returns false if it is absent.
    pub fn update_item(&mut self, item: Item) -> bool {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => {
                *existing = item;
                true
            }
            None => false,
        }
    }

    /// Applies `change` to the item with `id`. Returns false if it is absent.
    pub fn modify_item(&mut self, id: &ItemId, change: impl FnOnce(&mut Item)) -> bool {
        match self.items.iter_mut().find(|existing| existing.id() == id) {
            Some(existing) => {
                change(existing);
                true
            }
            None => false,
        }
    }

    /// Returns the item with `id`.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Returns the index of the item with `id`.
    #[must_use]
    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Removes the item with `id`, returning its former index and value.
    pub fn remove_item(&mut self, id: &ItemId) -> Option<(usize, Item)> {
        let index = self.position(id)?;
        Some((index, self.items.remove(index)))
    }

    /// Inserts `item` at `index`, clamped to the list length.
    pub fn insert_item(&mut self, index: usize, item: Item) {
        let clamped = index.min(self.items.len());
        self.items.insert(clamped, item);
    }

    /// Replaces all items, keeping the cursor. Used to restore snapshots.
    pub fn restore_items(&mut self, items: Vec<Item>) {
        self.items = items;
    }

    /// Clears the list and starts over from page 0.
    ///
    /// Requests still in flight are ignored when they complete.
    pub fn reset(&mut self, endpoint: Option<Endpoint>) {
        self.generation = self.generation.saturating_add(1);
        self.endpoint = endpoint;
        self.items.clear();
        self.cursor.reset();
        self.in_flight = false;
        self.initial_loading = false;
    }

    fn record_stop(&self, page_number: u32, reason: StopReason) {
        self.telemetry.record(TelemetryEvent::PaginationStopped {
            list: self.key.to_string(),
            page_number,
            reason,
        });
    }
}
