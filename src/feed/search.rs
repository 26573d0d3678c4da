//! Search-as-you-type with cancellation of superseded requests.
//!
//! Results live in a [`PaginatedList`] keyed by [`ListKey::Search`], so later
//! pages load the same way as any feed. Each keystroke starts a fresh list
//! and aborts the request before it, so a slow answer for an older query can
//! never land in the results for a newer one.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api::{Endpoint, FeedError, FeedGateway, Item, ItemKind};
use crate::telemetry::{NoopTelemetrySink, TelemetrySink};

use super::list::{PageOutcome, PageRequest, PaginatedList};
use super::store::ListKey;

/// What one search page did to the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    /// Generation the page belongs to.
    pub generation: u64,
    /// Query that produced it.
    pub query: String,
    /// Page number that was applied.
    pub page_number: u32,
    /// Effect on the result list.
    pub outcome: PageOutcome,
}

struct Delivery {
    generation: u64,
    outcome: Result<Vec<Item>, FeedError>,
}

/// Issues search requests, keeping at most one in flight.
pub struct SearchCoordinator {
    gateway: Arc<dyn FeedGateway>,
    kind: ItemKind,
    generation: u64,
    results: PaginatedList,
    pending: Option<PageRequest>,
    in_flight: Option<JoinHandle<()>>,
    sender: mpsc::UnboundedSender<Delivery>,
    receiver: mpsc::UnboundedReceiver<Delivery>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl SearchCoordinator {
    /// Creates a coordinator searching for items of `kind`.
    #[must_use]
    pub fn new(gateway: Arc<dyn FeedGateway>, kind: ItemKind) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            gateway,
            kind,
            generation: 0,
            results: Self::blank_list(),
            pending: None,
            in_flight: None,
            sender,
            receiver,
            telemetry: Arc::new(NoopTelemetrySink),
        }
    }

    /// Routes telemetry events of the result lists to `sink`.
    #[must_use]
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.results = Self::blank_list().with_telemetry(Arc::clone(&sink));
        self.telemetry = sink;
        self
    }

    /// Returns the current generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Results for the current query.
    #[must_use]
    pub const fn results(&self) -> &PaginatedList {
        &self.results
    }

    /// Current query, empty when nothing is searched.
    #[must_use]
    pub fn query(&self) -> &str {
        match self.results.key() {
            ListKey::Search(query) => query.as_str(),
            _ => "",
        }
    }

    /// Returns true while a request for the current query is running.
    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Starts searching for `query`, aborting any earlier request.
    ///
    /// The previous results are discarded. A blank query only clears. Must
    /// be called from within a Tokio runtime. Returns the new generation.
    pub fn search(&mut self, query: &str) -> u64 {
        self.abort();
        self.generation = self.generation.saturating_add(1);

        let trimmed = query.trim();
        if trimmed.is_empty() {
            self.results = Self::blank_list().with_telemetry(Arc::clone(&self.telemetry));
            return self.generation;
        }

        self.results = PaginatedList::new(
            ListKey::Search(trimmed.to_owned()),
            Some(Endpoint::search(self.kind, trimmed)),
        )
        .with_telemetry(Arc::clone(&self.telemetry));
        self.spawn_next_page();
        self.generation
    }

    /// Requests the next page of the current results.
    ///
    /// Returns false while a page is in flight, once the results are
    /// exhausted, or when nothing is searched. Must be called from within a
    /// Tokio runtime.
    pub fn load_more(&mut self) -> bool {
        self.spawn_next_page()
    }

    /// Aborts the in-flight request and clears the results.
    pub fn cancel(&mut self) {
        self.search("");
    }

    /// Returns true when a delivery for `generation` is still wanted.
    #[must_use]
    pub const fn accept(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Waits for the next page of the current generation and applies it to
    /// the results, discarding anything older.
    pub async fn next_results(&mut self) -> Option<SearchResults> {
        loop {
            let delivery = self.receiver.recv().await?;
            if !self.accept(delivery.generation) {
                tracing::debug!("discarding stale search page (generation {})", delivery.generation);
                continue;
            }
            let Some(request) = self.pending.take() else {
                continue;
            };
            let page_number = request.page_number();
            if let Err(error) = &delivery.outcome {
                tracing::warn!("search for '{}' failed: {error}", self.query());
            }
            let outcome = self.results.complete_page(request, delivery.outcome);
            return Some(SearchResults {
                generation: delivery.generation,
                query: self.query().to_owned(),
                page_number,
                outcome,
            });
        }
    }

    fn spawn_next_page(&mut self) -> bool {
        let Some(request) = self.results.request_next_page() else {
            return false;
        };
        let generation = self.generation;
        let endpoint = request.endpoint().clone();
        let page_number = request.page_number();
        let gateway = Arc::clone(&self.gateway);
        let sender = self.sender.clone();
        self.pending = Some(request);

        self.in_flight = Some(tokio::spawn(async move {
            let outcome = gateway.fetch_page(&endpoint, page_number).await;
            if sender.send(Delivery { generation, outcome }).is_err() {
                tracing::trace!("search coordinator dropped before results arrived");
            }
        }));
        true
    }

    fn abort(&mut self) {
        self.pending = None;
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }

    fn blank_list() -> PaginatedList {
        PaginatedList::new(ListKey::Search(String::new()), None)
    }
}

impl Drop for SearchCoordinator {
    fn drop(&mut self) {
        self.abort();
    }
}
