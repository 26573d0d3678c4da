//! Scenario state for the feed pagination BDD tests.

use blogify::virtualizer::OverlayGuard;
use blogify::{FeedError, HttpGateway, ListView, OverlayScope, PaginatedList, SnapshotStore};
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

use super::mock_api::{MockApi, ensure_mock_api};

/// State shared across steps in a feed pagination scenario.
#[derive(ScenarioState, Default)]
pub(crate) struct FeedState {
    pub(crate) api: Slot<MockApi>,
    pub(crate) gateway: Slot<HttpGateway>,
    pub(crate) list: Slot<PaginatedList>,
    pub(crate) view: Slot<ListView>,
    pub(crate) overlay: Slot<OverlayScope>,
    /// Held while an overlay covers the feed.
    pub(crate) guard: Slot<OverlayGuard>,
    pub(crate) snapshots: Slot<SnapshotStore>,
    /// How many frames asked for the next page.
    pub(crate) signals: Slot<usize>,
}

/// Returns the mock API of this scenario, starting it on first use.
pub(crate) fn mock_api(feed_state: &FeedState) -> Result<MockApi, FeedError> {
    ensure_mock_api(&feed_state.api)
}
