//! Support modules for the feed pagination BDD tests.

#[path = "../support/api.rs"]
pub(crate) mod api;
#[path = "../support/mock_api.rs"]
pub(crate) mod mock_api;
pub(crate) mod state;

pub(crate) use state::{FeedState, mock_api};
