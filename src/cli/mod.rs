//! CLI operation mode handlers.
//!
//! - [`feed`]: page through a feed
//! - [`thread`]: load a post with its comment thread
//!
//! Output formatting lives in [`output`].

pub mod feed;
pub mod output;
pub mod thread;
