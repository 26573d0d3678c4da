//! Paginated lists and the application-level store that owns them.
//!
//! - [`pagination`]: the page cursor
//! - [`list`]: the per-list fetch coordinator
//! - [`store`]: list registry and cross-list fan-out of mutations
//! - [`search`]: search-as-you-type over a paginated result list

pub mod list;
pub mod pagination;
pub mod search;
pub mod store;

pub use list::{PageOutcome, PageRequest, PaginatedList, skeleton_count};
pub use pagination::PageCursor;
pub use search::{SearchCoordinator, SearchResults};
pub use store::{FeedStore, LikeToggle, ListKey, PostDeletion};
