//! Gateways for talking to the Blogify HTTP API.
//!
//! The trait-based design keeps the feed, search and thread state machines
//! independent of the transport: tests drive them with `mockall` mocks while
//! [`HttpGateway`] issues real requests through `reqwest`.

mod client;
mod error_mapping;

pub use client::{GatewaySettings, HttpGateway};

use async_trait::async_trait;

use crate::api::endpoint::Endpoint;
use crate::api::error::FeedError;
use crate::api::models::{Comment, Item, ItemId, Post};

/// Identifies what a like toggle applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeTarget {
    /// A post.
    Post(ItemId),
    /// A comment or reply.
    Comment(ItemId),
}

impl LikeTarget {
    /// Returns the identifier of the liked item.
    #[must_use]
    pub const fn id(&self) -> &ItemId {
        match self {
            Self::Post(id) | Self::Comment(id) => id,
        }
    }
}

/// Payload for creating a reply under a top-level comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReply {
    /// Top-level comment the reply is filed under.
    pub root_id: ItemId,
    /// Comment being answered (the root itself or one of its replies).
    pub replies_to: ItemId,
    /// Reply text.
    pub body: String,
}

/// Gateway that loads pages of list items.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedGateway: Send + Sync {
    /// Fetch page `page_number` (0-based) of `endpoint`.
    ///
    /// An empty vector signals that the list is exhausted.
    async fn fetch_page(
        &self,
        endpoint: &Endpoint,
        page_number: u32,
    ) -> Result<Vec<Item>, FeedError>;

    /// Fetch a single post.
    async fn fetch_post(&self, id: &ItemId) -> Result<Post, FeedError>;
}

/// Gateway for item mutations.
///
/// Callers apply changes optimistically before calling these and roll back
/// when they fail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MutationGateway: Send + Sync {
    /// Like (`liked = true`) or unlike the target.
    async fn set_like(&self, target: &LikeTarget, liked: bool) -> Result<(), FeedError>;

    /// Create a top-level comment on a post.
    async fn create_comment(&self, post_id: &ItemId, body: &str) -> Result<Comment, FeedError>;

    /// Create a reply to a comment.
    async fn create_reply(&self, reply: &NewReply) -> Result<Comment, FeedError>;

    /// Delete a top-level comment and its replies.
    async fn delete_comment(&self, id: &ItemId) -> Result<(), FeedError>;

    /// Delete a single reply.
    async fn delete_reply(&self, id: &ItemId) -> Result<(), FeedError>;

    /// Delete a post.
    async fn delete_post(&self, id: &ItemId) -> Result<(), FeedError>;
}
