//! Feed mode: pages a feed in through a list view and prints its window.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use blogify::telemetry::TelemetrySink;
use blogify::{BlogifyConfig, FeedError, FeedGateway, ListView, OverlayScope, PaginatedList};

use super::output::write_feed;

/// Loads the configured feed and writes its first window to `writer`.
///
/// # Errors
///
/// Returns configuration errors and output failures. Page failures stop
/// pagination and are logged instead.
pub async fn run<W: Write>(
    config: &BlogifyConfig,
    gateway: &dyn FeedGateway,
    telemetry: Arc<dyn TelemetrySink>,
    writer: &mut W,
) -> Result<(), FeedError> {
    let selection = config.feed_selection()?;
    let key = selection.list_key();
    let mut list =
        PaginatedList::new(key.clone(), Some(selection.endpoint())).with_telemetry(telemetry);
    let mut view = ListView::new(key.to_string(), config.list_view_options(false));

    load_pages(&mut list, &mut view, gateway, config.pages).await;

    let overlay = OverlayScope::new();
    view.scroll_to(0, &overlay, Instant::now());
    let frame = view.frame_for(&list, &overlay);
    write_feed(writer, &list, &frame)
}

/// Loads up to `pages` pages, the way a reader scrolling to the end would.
pub async fn load_pages(
    list: &mut PaginatedList,
    view: &mut ListView,
    gateway: &dyn FeedGateway,
    pages: u32,
) -> u32 {
    let overlay = OverlayScope::new();
    let mut loaded = 0;

    let first = list.mount();
    view.sync_list(list, Instant::now());
    view.frame_for(list, &overlay);
    if let Some(request) = first {
        let outcome = gateway
            .fetch_page(request.endpoint(), request.page_number())
            .await;
        list.complete_page(request, outcome);
        loaded += 1;
    }
    view.sync_list(list, Instant::now());

    while loaded < pages {
        view.scroll_to(u32::MAX, &overlay, Instant::now());
        if !view.frame_for(list, &overlay).fetch_next {
            break;
        }
        if list.fetch_items(gateway).await.is_none() {
            break;
        }
        loaded += 1;
        view.sync_list(list, Instant::now());
    }
    tracing::debug!("loaded {loaded} page(s) of {}", list.key());
    loaded
}
