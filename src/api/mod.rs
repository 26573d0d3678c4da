//! Network boundary of the Blogify client.
//!
//! This module defines the feed item models, the paginated list routes, the
//! gateway traits consumed by the feed and thread state machines, and the
//! `reqwest` gateway that talks to the real API. Errors are mapped into
//! [`FeedError`] so callers never see transport internals.

pub mod endpoint;
pub mod error;
pub mod gateway;
pub mod models;

pub use endpoint::Endpoint;
pub use error::FeedError;
pub use gateway::{
    FeedGateway, GatewaySettings, HttpGateway, LikeTarget, MutationGateway, NewReply,
};
pub use models::{Author, Comment, Item, ItemId, ItemKind, LikeState, Post, ReplyTarget, User};

#[cfg(test)]
pub use gateway::{MockFeedGateway, MockMutationGateway};
