//! Thread mode: loads a post, its root comments and their first replies.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use blogify::telemetry::TelemetrySink;
use blogify::{
    BlogifyConfig, FeedError, FeedGateway, Item, ItemId, ListView, OverlayScope, PostDetailPage,
    RenderRow,
};

use super::output::write_thread;

/// Loads the configured post thread and writes its first window.
///
/// # Errors
///
/// Returns the error from loading the post, configuration errors, and
/// output failures.
pub async fn run<W: Write>(
    config: &BlogifyConfig,
    gateway: &dyn FeedGateway,
    telemetry: Arc<dyn TelemetrySink>,
    writer: &mut W,
) -> Result<(), FeedError> {
    let post_id = config.require_post_id()?;
    let mut page = PostDetailPage::new(post_id.clone(), config.reply_max_length)
        .with_telemetry(telemetry);
    page.load_post(gateway).await?;

    for _ in 0..config.pages {
        if page.load_comments(gateway).await.is_none() {
            break;
        }
    }

    for root in roots_with_replies(&page) {
        if let Err(error) = page.expand_replies(gateway, &root).await {
            tracing::warn!("could not expand {root}: {error}");
        }
    }

    let mut view = ListView::new(format!("post:{post_id}"), config.list_view_options(false));
    let rows = page.rows();
    view.sync_rows(rows.iter().map(RenderRow::key), 0, Instant::now());
    let frame = view.frame(&OverlayScope::new(), false, false);
    write_thread(writer, &page, &rows, &frame)
}

fn roots_with_replies(page: &PostDetailPage) -> Vec<ItemId> {
    page.comments()
        .items()
        .iter()
        .filter_map(Item::as_comment)
        .filter(|comment| comment.replies > 0)
        .map(|comment| comment.id.clone())
        .collect()
}
