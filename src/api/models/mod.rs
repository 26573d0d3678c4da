//! Data models for feed items returned by the Blogify API.
//!
//! Types prefixed with `Api` are internal deserialisation targets that
//! convert into the public domain types. Every list endpoint yields one item
//! kind; [`Item`] is the union rendered by feed and thread views.

use std::borrow::Borrow;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Server-assigned identifier for posts, comments and users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wraps a raw identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Author reference embedded in posts and comments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Author {
    /// Author user ID.
    pub id: ItemId,
    /// Handle shown with an `@` prefix.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Whether the account carries a verified badge.
    pub verified: bool,
}

/// Like state of a post or comment as seen by the current session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LikeState {
    /// Whether the current user has liked the item.
    pub liked: bool,
    /// Total like count.
    pub likes: u64,
}

impl LikeState {
    /// Returns the state after the current user toggles their like.
    #[must_use]
    pub const fn toggled(self) -> Self {
        if self.liked {
            Self {
                liked: false,
                likes: self.likes.saturating_sub(1),
            }
        } else {
            Self {
                liked: true,
                likes: self.likes.saturating_add(1),
            }
        }
    }
}

/// A feed post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Post {
    /// Post identifier.
    pub id: ItemId,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Post author.
    pub author: Author,
    /// Post text.
    pub body: String,
    /// Like state.
    pub like: LikeState,
    /// Number of top-level comments and replies on the post.
    pub comments: u64,
}

/// The comment or user a reply answers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyTarget {
    /// ID of the comment being replied to.
    pub id: ItemId,
    /// Username of that comment's author, when supplied.
    pub username: Option<String>,
}

/// A comment on a post, either top-level or a reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    /// Comment identifier.
    pub id: ItemId,
    /// Post the comment belongs to, when supplied.
    pub post_id: Option<ItemId>,
    /// Creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Comment author.
    pub author: Author,
    /// Comment text.
    pub body: String,
    /// Like state.
    pub like: LikeState,
    /// Reply count. Only maintained for top-level comments.
    pub replies: u64,
    /// The comment this one replies to.
    pub replies_to: Option<ReplyTarget>,
    /// Top-level ancestor; absent for top-level comments.
    pub root_id: Option<ItemId>,
}

impl Comment {
    /// Returns true for top-level comments.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.root_id.is_none()
    }

    /// Returns the top-level comment this comment belongs under.
    #[must_use]
    pub fn thread_root(&self) -> &ItemId {
        self.root_id.as_ref().unwrap_or(&self.id)
    }
}

/// A user listed in search results or follower lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct User {
    /// User identifier.
    pub id: ItemId,
    /// Handle.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Verified badge.
    pub verified: bool,
    /// Account creation timestamp.
    pub created_at: Option<DateTime<Utc>>,
    /// Follower count.
    pub followers: u64,
    /// Whether the current session follows this user.
    pub following: bool,
}

/// Item kinds yielded by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Posts.
    Post,
    /// Comments or replies.
    Comment,
    /// Users.
    User,
}

/// One entry of a paginated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// A post.
    Post(Post),
    /// A comment or reply.
    Comment(Comment),
    /// A user.
    User(User),
}

impl Item {
    /// Returns the item identifier.
    #[must_use]
    pub const fn id(&self) -> &ItemId {
        match self {
            Self::Post(post) => &post.id,
            Self::Comment(comment) => &comment.id,
            Self::User(user) => &user.id,
        }
    }

    /// Returns the item kind.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        match self {
            Self::Post(_) => ItemKind::Post,
            Self::Comment(_) => ItemKind::Comment,
            Self::User(_) => ItemKind::User,
        }
    }

    /// Returns the like state for likeable items.
    #[must_use]
    pub const fn like_state(&self) -> Option<LikeState> {
        match self {
            Self::Post(post) => Some(post.like),
            Self::Comment(comment) => Some(comment.like),
            Self::User(_) => None,
        }
    }

    /// Overwrites the like state. Returns false for users.
    pub const fn set_like_state(&mut self, like: LikeState) -> bool {
        match self {
            Self::Post(post) => {
                post.like = like;
                true
            }
            Self::Comment(comment) => {
                comment.like = like;
                true
            }
            Self::User(_) => false,
        }
    }

    /// Returns the comment when this item is one.
    #[must_use]
    pub const fn as_comment(&self) -> Option<&Comment> {
        match self {
            Self::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    /// Mutable variant of [`Item::as_comment`].
    pub const fn as_comment_mut(&mut self) -> Option<&mut Comment> {
        match self {
            Self::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    /// Returns the post when this item is one.
    #[must_use]
    pub const fn as_post(&self) -> Option<&Post> {
        match self {
            Self::Post(post) => Some(post),
            _ => None,
        }
    }
}

impl From<Post> for Item {
    fn from(value: Post) -> Self {
        Self::Post(value)
    }
}

impl From<Comment> for Item {
    fn from(value: Comment) -> Self {
        Self::Comment(value)
    }
}

impl From<User> for Item {
    fn from(value: User) -> Self {
        Self::User(value)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiAuthor {
    pub(crate) id: ItemId,
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) verified: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiPost {
    pub(crate) id: ItemId,
    #[serde(default)]
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) author: ApiAuthor,
    #[serde(default)]
    pub(crate) body: Option<String>,
    #[serde(default)]
    pub(crate) liked: bool,
    #[serde(default)]
    pub(crate) likes: u64,
    #[serde(default)]
    pub(crate) comments: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiReplyTarget {
    pub(crate) id: ItemId,
    #[serde(default)]
    pub(crate) username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiComment {
    pub(crate) id: ItemId,
    #[serde(default)]
    pub(crate) post_id: Option<ItemId>,
    #[serde(default)]
    pub(crate) created_at: Option<DateTime<Utc>>,
    pub(crate) author: ApiAuthor,
    #[serde(default)]
    pub(crate) body: Option<String>,
    #[serde(default)]
    pub(crate) liked: bool,
    #[serde(default)]
    pub(crate) likes: u64,
    #[serde(default)]
    pub(crate) replies: u64,
    #[serde(default)]
    pub(crate) replies_to: Option<ApiReplyTarget>,
    #[serde(default)]
    pub(crate) root_id: Option<ItemId>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiUser {
    pub(crate) id: ItemId,
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) verified: bool,
    #[serde(default)]
    pub(crate) created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub(crate) followers: u64,
    #[serde(default)]
    pub(crate) following: bool,
}

impl From<ApiAuthor> for Author {
    fn from(value: ApiAuthor) -> Self {
        let name = value.name.unwrap_or_else(|| value.username.clone());
        Self {
            id: value.id,
            username: value.username,
            name,
            verified: value.verified,
        }
    }
}

impl From<ApiPost> for Post {
    fn from(value: ApiPost) -> Self {
        Self {
            id: value.id,
            created_at: value.created_at,
            author: value.author.into(),
            body: value.body.unwrap_or_default(),
            like: LikeState {
                liked: value.liked,
                likes: value.likes,
            },
            comments: value.comments,
        }
    }
}

impl From<ApiReplyTarget> for ReplyTarget {
    fn from(value: ApiReplyTarget) -> Self {
        Self {
            id: value.id,
            username: value.username,
        }
    }
}

impl From<ApiComment> for Comment {
    fn from(value: ApiComment) -> Self {
        Self {
            id: value.id,
            post_id: value.post_id,
            created_at: value.created_at,
            author: value.author.into(),
            body: value.body.unwrap_or_default(),
            like: LikeState {
                liked: value.liked,
                likes: value.likes,
            },
            replies: value.replies,
            replies_to: value.replies_to.map(Into::into),
            root_id: value.root_id,
        }
    }
}

impl From<ApiUser> for User {
    fn from(value: ApiUser) -> Self {
        let name = value.name.unwrap_or_else(|| value.username.clone());
        Self {
            id: value.id,
            username: value.username,
            name,
            verified: value.verified,
            created_at: value.created_at,
            followers: value.followers,
            following: value.following,
        }
    }
}
