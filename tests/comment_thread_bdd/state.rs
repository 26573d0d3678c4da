//! Scenario state for the comment thread BDD tests.

use std::sync::Arc;

use blogify::telemetry::test_support::RecordingTelemetrySink;
use blogify::{FeedError, HttpGateway, PostDetailPage};
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

use super::mock_api::{MockApi, ensure_mock_api};

/// State shared across steps in a comment thread scenario.
#[derive(ScenarioState, Default)]
pub(crate) struct ThreadState {
    pub(crate) api: Slot<MockApi>,
    pub(crate) gateway: Slot<HttpGateway>,
    /// Post detail page under test.
    pub(crate) page: Slot<PostDetailPage>,
    pub(crate) telemetry: Slot<Arc<RecordingTelemetrySink>>,
    /// Whether the last deletion stood.
    pub(crate) deletion_stood: Slot<bool>,
}

impl ThreadState {
    /// Returns the render row keys of the page, in order.
    pub(crate) fn row_keys(&self) -> Option<Vec<String>> {
        self.page.with_ref(|page| {
            page.rows()
                .iter()
                .map(|row| row.key().as_str().to_owned())
                .collect()
        })
    }
}

/// Returns the mock API of this scenario, starting it on first use.
pub(crate) fn mock_api(thread_state: &ThreadState) -> Result<MockApi, FeedError> {
    ensure_mock_api(&thread_state.api)
}
