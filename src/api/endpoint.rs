//! Paginated list routes and their resolution against the API base URL.

use url::Url;

use super::error::FeedError;
use super::models::{ItemId, ItemKind};

/// A paginated list route together with the item kind it yields.
///
/// The route is kept as path segments so IDs are percent-encoded when the
/// endpoint is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    segments: Vec<String>,
    kind: ItemKind,
    query: Option<String>,
}

impl Endpoint {
    /// Creates an endpoint for a relative path of `/`-separated segments.
    #[must_use]
    pub fn new(path: &str, kind: ItemKind) -> Self {
        Self::from_segments(path.split('/').filter(|segment| !segment.is_empty()), kind)
    }

    fn from_segments<I, S>(segments: I, kind: ItemKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            kind,
            query: None,
        }
    }

    /// Posts from everyone, newest first.
    #[must_use]
    pub fn home_feed() -> Self {
        Self::new("posts/home", ItemKind::Post)
    }

    /// Posts from followed accounts.
    #[must_use]
    pub fn following_feed() -> Self {
        Self::new("posts/following", ItemKind::Post)
    }

    /// Posts written by `user`.
    #[must_use]
    pub fn profile_feed(user: &ItemId) -> Self {
        Self::from_segments(["users", user.as_str(), "posts"], ItemKind::Post)
    }

    /// Top-level comments of a post.
    #[must_use]
    pub fn post_comments(post: &ItemId) -> Self {
        Self::from_segments(["posts", post.as_str(), "comments"], ItemKind::Comment)
    }

    /// Replies under a top-level comment.
    #[must_use]
    pub fn comment_replies(root: &ItemId) -> Self {
        Self::from_segments(["comments", root.as_str(), "replies"], ItemKind::Comment)
    }

    /// Dashboard ranking of the most liked posts.
    #[must_use]
    pub fn top_posts() -> Self {
        Self::new("dashboard/top-posts", ItemKind::Post)
    }

    /// Full-text search over posts or users.
    #[must_use]
    pub fn search(kind: ItemKind, query: &str) -> Self {
        let collection = match kind {
            ItemKind::User => "users",
            ItemKind::Post | ItemKind::Comment => "posts",
        };
        Self {
            query: Some(query.to_owned()),
            ..Self::from_segments(["search", collection], kind)
        }
    }

    /// Returns the relative path, unencoded.
    #[must_use]
    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    /// Returns the item kind returned by this endpoint.
    #[must_use]
    pub const fn kind(&self) -> ItemKind {
        self.kind
    }

    /// Returns the search query, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Resolves this endpoint against the API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidUrl`] when the path cannot be joined.
    pub fn resolve(&self, base: &Url) -> Result<Url, FeedError> {
        let mut url = join_segments(base, &self.segments)?;
        if let Some(query) = self.query.as_deref() {
            url.query_pairs_mut().append_pair("q", query);
        }
        Ok(url)
    }
}

/// Appends percent-encoded `segments` to the path of `base`.
///
/// # Errors
///
/// Returns [`FeedError::InvalidUrl`] when `base` cannot carry a path.
pub fn join_segments<I, S>(base: &Url, segments: I) -> Result<Url, FeedError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|()| FeedError::InvalidUrl(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
