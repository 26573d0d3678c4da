//! Fixture builders for feed items, shared by unit and behavioural tests.

use super::{Author, Comment, Item, ItemId, LikeState, Post, ReplyTarget, User};

/// Returns an author whose ID, username and name derive from `username`.
#[must_use]
pub fn author(username: &str) -> Author {
    Author {
        id: ItemId::new(format!("user-{username}")),
        username: username.to_owned(),
        name: username.to_owned(),
        verified: false,
    }
}

/// Builds a post with the given ID and counters.
#[must_use]
pub fn post(id: &str, likes: u64, comments: u64) -> Post {
    Post {
        id: ItemId::new(id),
        author: author("alice"),
        body: format!("Post {id}"),
        like: LikeState {
            liked: false,
            likes,
        },
        comments,
        ..Post::default()
    }
}

/// Builds a top-level comment announcing `replies` replies.
#[must_use]
pub fn root_comment(id: &str, replies: u64) -> Comment {
    Comment {
        id: ItemId::new(id),
        post_id: Some(ItemId::new("post-1")),
        author: author("bob"),
        body: format!("Comment {id}"),
        replies,
        ..Comment::default()
    }
}

/// Builds a reply under `root_id` answering `replies_to`.
#[must_use]
pub fn reply(id: &str, root_id: &str, replies_to: &str) -> Comment {
    Comment {
        id: ItemId::new(id),
        post_id: Some(ItemId::new("post-1")),
        author: author("carol"),
        body: format!("Reply {id}"),
        replies_to: Some(ReplyTarget {
            id: ItemId::new(replies_to),
            username: Some("bob".to_owned()),
        }),
        root_id: Some(ItemId::new(root_id)),
        ..Comment::default()
    }
}

/// Builds a user with the given ID.
#[must_use]
pub fn user(id: &str) -> User {
    User {
        id: ItemId::new(id),
        username: id.to_owned(),
        name: id.to_owned(),
        ..User::default()
    }
}

/// Builds `count` posts with sequential IDs starting at `first`.
#[must_use]
pub fn posts(first: usize, count: usize) -> Vec<Item> {
    (first..first.saturating_add(count))
        .map(|index| Item::Post(post(&format!("post-{index}"), 0, 0)))
        .collect()
}

/// Builds replies `<root>-r<n>` for each `n` in `numbers`.
#[must_use]
pub fn replies(root_id: &str, numbers: &[usize]) -> Vec<Item> {
    numbers
        .iter()
        .map(|number| Item::Comment(reply(&format!("{root_id}-r{number}"), root_id, root_id)))
        .collect()
}
