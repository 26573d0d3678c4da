//! Blogify feed and thread core.
//!
//! The library keeps long social feeds and comment threads responsive: it
//! pages items in from the Blogify API, windows them through a virtualizer
//! that survives overlays and remounts, and reconciles threaded replies,
//! reply composers and optimistic mutations for a post's comments.
//!
//! Everything is plain state plus async drivers over gateway traits, so a
//! host UI can draw whatever [`virtualizer::ListFrame`] or
//! [`thread::RenderRow`] sequence it is handed.

pub mod api;
pub mod config;
pub mod feed;
pub mod telemetry;
pub mod thread;
pub mod virtualizer;

pub use api::{
    Endpoint, FeedError, FeedGateway, GatewaySettings, HttpGateway, Item, ItemId, MutationGateway,
};
pub use config::{BlogifyConfig, FeedSelection, OperationMode};
pub use feed::{FeedStore, ListKey, PaginatedList, SearchCoordinator};
pub use thread::{CommentTree, PostDetailPage, RenderRow};
pub use virtualizer::{ListView, OverlayScope, SnapshotStore};
