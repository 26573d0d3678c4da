//! Post detail page: the post, its root comments and their reply tree.
//!
//! The page owns every cache for one post view. Dropping it discards them,
//! so two views of different posts never share state.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, warn};

use super::projection::{RenderRow, project};
use super::tree::{
    CommentTree, DetachedReply, DetachedRoot, ReplyOutcome, ReplyPageRequest, ThreadError,
};
use crate::api::{
    Comment, Endpoint, FeedError, FeedGateway, Item, ItemId, LikeState, LikeTarget,
    MutationGateway, Post,
};
use crate::feed::{ListKey, PageOutcome, PageRequest, PaginatedList};
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

/// A transient user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Message text.
    pub message: String,
}

/// What an optimistic deletion removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionKind {
    /// A root comment and its replies.
    Root,
    /// A single reply.
    Reply,
}

/// What a deletion took out of the page.
#[derive(Debug, Clone)]
enum Removed {
    Root {
        index: usize,
        item: Item,
        replies: DetachedRoot,
        counted: bool,
    },
    Reply {
        reply: DetachedReply,
        counted: bool,
    },
}

/// An optimistic deletion awaiting the server's answer.
#[derive(Debug, Clone)]
pub struct PendingDeletion {
    id: ItemId,
    removed: Removed,
}

impl PendingDeletion {
    /// Deleted comment.
    #[must_use]
    pub const fn id(&self) -> &ItemId {
        &self.id
    }

    /// Whether a root or a reply was deleted.
    #[must_use]
    pub const fn kind(&self) -> DeletionKind {
        match self.removed {
            Removed::Root { .. } => DeletionKind::Root,
            Removed::Reply { .. } => DeletionKind::Reply,
        }
    }
}

/// State of one post detail view.
pub struct PostDetailPage {
    post_id: ItemId,
    post: Option<Post>,
    comments: PaginatedList,
    tree: CommentTree,
    notices: VecDeque<Notice>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl std::fmt::Debug for PostDetailPage {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("PostDetailPage")
            .field("post_id", &self.post_id)
            .field("post", &self.post)
            .field("comments", &self.comments)
            .field("tree", &self.tree)
            .field("notices", &self.notices)
            .finish_non_exhaustive()
    }
}

impl PostDetailPage {
    /// Creates the page for `post_id`.
    #[must_use]
    pub fn new(post_id: ItemId, reply_max_length: usize) -> Self {
        let comments = PaginatedList::new(
            ListKey::Comments(post_id.clone()),
            Some(Endpoint::post_comments(&post_id)),
        );
        Self {
            post_id,
            post: None,
            comments,
            tree: CommentTree::new(reply_max_length),
            notices: VecDeque::new(),
            telemetry: Arc::new(NoopTelemetrySink),
        }
    }

    /// Routes telemetry from the page and its comment list to `sink`.
    #[must_use]
    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.comments = self.comments.with_telemetry(Arc::clone(&sink));
        self.telemetry = sink;
        self
    }

    /// Post shown by this page.
    #[must_use]
    pub const fn post_id(&self) -> &ItemId {
        &self.post_id
    }

    /// The post, once loaded.
    #[must_use]
    pub const fn post(&self) -> Option<&Post> {
        self.post.as_ref()
    }

    /// Root comment list.
    #[must_use]
    pub const fn comments(&self) -> &PaginatedList {
        &self.comments
    }

    /// Mutable root comment list, for pagination.
    pub const fn comments_mut(&mut self) -> &mut PaginatedList {
        &mut self.comments
    }

    /// Reply tree.
    #[must_use]
    pub const fn tree(&self) -> &CommentTree {
        &self.tree
    }

    /// Rows to render.
    #[must_use]
    pub fn rows(&self) -> Vec<RenderRow<'_>> {
        project(self.comments.items(), &self.tree)
    }

    /// Pending notices, oldest first.
    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    /// Removes and returns all pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Stores the post.
    pub fn set_post(&mut self, post: Post) {
        self.post = Some(post);
    }

    /// Loads the post.
    ///
    /// # Errors
    ///
    /// Returns the gateway error; the page keeps any post it already had.
    pub async fn load_post(&mut self, gateway: &dyn FeedGateway) -> Result<(), FeedError> {
        let post = gateway.fetch_post(&self.post_id).await?;
        self.set_post(post);
        Ok(())
    }

    /// Starts the first comment page, as on mount.
    pub fn mount(&mut self) -> Option<PageRequest> {
        self.comments.mount()
    }

    /// Fetches the next page of root comments.
    pub async fn load_comments(&mut self, gateway: &dyn FeedGateway) -> Option<PageOutcome> {
        self.comments.fetch_items(gateway).await
    }

    /// Finds a loaded root comment.
    #[must_use]
    pub fn root(&self, id: &ItemId) -> Option<&Comment> {
        self.comments.get(id).and_then(Item::as_comment)
    }

    /// Finds a loaded root or reply.
    #[must_use]
    pub fn comment(&self, id: &ItemId) -> Option<&Comment> {
        self.root(id).or_else(|| self.tree.reply(id))
    }

    /// Expands the replies of `root_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadError::UnknownComment`] when the root is not loaded.
    pub fn begin_expand(&mut self, root_id: &ItemId) -> Result<Option<ReplyPageRequest>, ThreadError> {
        let root = self.known_root(root_id)?;
        Ok(self.tree.expand(&root))
    }

    /// Expands or collapses the replies of `root_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadError::UnknownComment`] when the root is not loaded.
    pub fn toggle_replies(&mut self, root_id: &ItemId) -> Result<Option<ReplyPageRequest>, ThreadError> {
        let root = self.known_root(root_id)?;
        Ok(self.tree.toggle(&root))
    }

    /// Requests the next reply page of `root_id`.
    pub fn begin_load_more(&mut self, root_id: &ItemId) -> Option<ReplyPageRequest> {
        self.tree.load_more(root_id)
    }

    /// Applies a reply page.
    pub fn complete_replies(
        &mut self,
        request: &ReplyPageRequest,
        outcome: Result<Vec<Item>, FeedError>,
    ) -> ReplyOutcome {
        self.tree.apply_replies(request, outcome)
    }

    /// Expands `root_id` and loads its first reply page.
    ///
    /// Returns `None` when nothing was fetched.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadError::UnknownComment`] when the root is not loaded.
    pub async fn expand_replies(
        &mut self,
        gateway: &dyn FeedGateway,
        root_id: &ItemId,
    ) -> Result<Option<ReplyOutcome>, ThreadError> {
        let Some(request) = self.begin_expand(root_id)? else {
            return Ok(None);
        };
        Ok(Some(self.fetch_replies(gateway, &request).await))
    }

    /// Loads the next reply page of `root_id` (the `view-more` action).
    pub async fn load_more_replies(
        &mut self,
        gateway: &dyn FeedGateway,
        root_id: &ItemId,
    ) -> Option<ReplyOutcome> {
        let request = self.begin_load_more(root_id)?;
        Some(self.fetch_replies(gateway, &request).await)
    }

    /// Hides the replies of `root_id`.
    pub fn collapse(&mut self, root_id: &ItemId) -> bool {
        self.tree.collapse(root_id)
    }

    /// Opens a reply composer under `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadError::UnknownComment`] when `target` is not loaded.
    pub fn open_composer(&mut self, target: &ItemId) -> Result<bool, ThreadError> {
        let comment = self
            .comment(target)
            .cloned()
            .ok_or_else(|| ThreadError::UnknownComment { id: target.clone() })?;
        Ok(self.tree.open_composer(&comment))
    }

    /// Replaces a composer's draft text.
    ///
    /// # Errors
    ///
    /// See [`CommentTree::set_draft`].
    pub fn set_draft(&mut self, target: &ItemId, text: &str) -> Result<(), ThreadError> {
        self.tree.set_draft(target, text)
    }

    /// Closes a composer and discards its draft.
    pub fn cancel_composer(&mut self, target: &ItemId) -> bool {
        self.tree.cancel_composer(target)
    }

    /// Sends the reply drafted under `target`.
    ///
    /// On success the reply replaces the composer and the root's reply
    /// counter goes up. On failure the composer keeps its draft and a notice
    /// is queued.
    ///
    /// # Errors
    ///
    /// Returns the draft validation or gateway error.
    pub async fn submit_reply(
        &mut self,
        gateway: &dyn MutationGateway,
        target: &ItemId,
    ) -> Result<Comment, ThreadError> {
        let new_reply = self.tree.begin_submit(target)?;
        let outcome = gateway.create_reply(&new_reply).await;
        if let Err(error) = &outcome {
            warn!("reply to {target} failed: {error}");
            self.push_notice(format!("Could not send your reply: {error}"));
        }

        let root_replies = self
            .root(&new_reply.root_id)
            .map_or(0, |root| root.replies);
        let reply = self.tree.complete_submit(target, root_replies, outcome)?;
        self.comments.modify_item(&new_reply.root_id, |item| {
            if let Some(root) = item.as_comment_mut() {
                root.replies = root.replies.saturating_add(1);
            }
        });
        Ok(reply)
    }

    /// Creates a root comment and shows it first.
    ///
    /// # Errors
    ///
    /// Returns the gateway error after queueing a notice.
    pub async fn create_comment(
        &mut self,
        gateway: &dyn MutationGateway,
        body: &str,
    ) -> Result<Comment, FeedError> {
        match gateway.create_comment(&self.post_id, body).await {
            Ok(comment) => {
                self.comments.insert_item(0, Item::Comment(comment.clone()));
                if let Some(post) = &mut self.post {
                    post.comments = post.comments.saturating_add(1);
                }
                Ok(comment)
            }
            Err(error) => {
                warn!("comment on {} failed: {error}", self.post_id);
                self.push_notice(format!("Could not post your comment: {error}"));
                Err(error)
            }
        }
    }

    /// Removes a comment optimistically.
    ///
    /// A root takes its replies and composers with it and the post's comment
    /// counter drops. A reply drops its root's reply counter. Returns `None`
    /// when the comment is not loaded.
    pub fn begin_delete(&mut self, id: &ItemId) -> Option<PendingDeletion> {
        let Some((index, item)) = self.comments.remove_item(id) else {
            return self.begin_reply_delete(id);
        };
        let replies = self.tree.detach_root(id);
        let counted = self.post.as_mut().is_some_and(|post| {
            post.comments = post.comments.saturating_sub(1);
            true
        });
        Some(PendingDeletion {
            id: id.clone(),
            removed: Removed::Root {
                index,
                item,
                replies,
                counted,
            },
        })
    }

    fn begin_reply_delete(&mut self, id: &ItemId) -> Option<PendingDeletion> {
        let reply = self.tree.detach_reply(id)?;
        let counted = self.adjust_reply_count(reply.root_id(), |count| count.saturating_sub(1));
        Some(PendingDeletion {
            id: id.clone(),
            removed: Removed::Reply { reply, counted },
        })
    }

    /// Applies the server's answer to a deletion.
    ///
    /// A rejection puts back what [`begin_delete`](Self::begin_delete) took
    /// out and queues a notice. Pages and other changes that landed in the
    /// meantime stay. Returns true when the deletion stood.
    pub fn complete_delete(&mut self, pending: PendingDeletion, outcome: Result<(), FeedError>) -> bool {
        let Err(error) = outcome else {
            debug!("deleted comment {}", pending.id);
            return true;
        };
        let operation = match pending.kind() {
            DeletionKind::Root => "delete_comment",
            DeletionKind::Reply => "delete_reply",
        };
        warn!("{operation} {} failed, rolling back: {error}", pending.id);
        match pending.removed {
            Removed::Root {
                index,
                item,
                replies,
                counted,
            } => {
                if self.comments.position(&pending.id).is_none() {
                    self.comments.insert_item(index, item);
                }
                self.tree.reattach_root(replies);
                if let (true, Some(post)) = (counted, self.post.as_mut()) {
                    post.comments = post.comments.saturating_add(1);
                }
            }
            Removed::Reply { reply, counted } => {
                if counted {
                    self.adjust_reply_count(reply.root_id(), |count| count.saturating_add(1));
                }
                self.tree.reattach_reply(reply);
            }
        }
        self.telemetry.record(TelemetryEvent::MutationRolledBack {
            operation: operation.to_owned(),
            item_id: pending.id.to_string(),
        });
        self.push_notice(format!("Could not delete the comment: {error}"));
        false
    }

    /// Deletes a comment, rolling back if the server refuses.
    ///
    /// Returns `None` when the comment is not loaded.
    pub async fn delete_comment(
        &mut self,
        gateway: &dyn MutationGateway,
        id: &ItemId,
    ) -> Option<bool> {
        let pending = self.begin_delete(id)?;
        let outcome = match pending.kind() {
            DeletionKind::Root => gateway.delete_comment(id).await,
            DeletionKind::Reply => gateway.delete_reply(id).await,
        };
        Some(self.complete_delete(pending, outcome))
    }

    /// Toggles the like on a root or reply, rolling back on failure.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadError::UnknownComment`] when the comment is not loaded,
    /// or the gateway error after rollback.
    pub async fn toggle_like(
        &mut self,
        gateway: &dyn MutationGateway,
        id: &ItemId,
    ) -> Result<LikeState, ThreadError> {
        let previous = self
            .comment(id)
            .map(|comment| comment.like)
            .ok_or_else(|| ThreadError::UnknownComment { id: id.clone() })?;
        let next = previous.toggled();
        self.set_comment_like(id, next);

        let target = LikeTarget::Comment(id.clone());
        if let Err(error) = gateway.set_like(&target, next.liked).await {
            warn!("like on {id} failed, rolling back: {error}");
            self.set_comment_like(id, previous);
            self.telemetry.record(TelemetryEvent::MutationRolledBack {
                operation: "toggle_like".to_owned(),
                item_id: id.to_string(),
            });
            self.push_notice(format!("Could not update the like: {error}"));
            return Err(error.into());
        }
        Ok(next)
    }

    async fn fetch_replies(
        &mut self,
        gateway: &dyn FeedGateway,
        request: &ReplyPageRequest,
    ) -> ReplyOutcome {
        let outcome = gateway
            .fetch_page(&request.endpoint(), request.page_number())
            .await;
        self.tree.apply_replies(request, outcome)
    }

    fn known_root(&self, root_id: &ItemId) -> Result<Comment, ThreadError> {
        self.root(root_id)
            .cloned()
            .ok_or_else(|| ThreadError::UnknownComment {
                id: root_id.clone(),
            })
    }

    fn set_comment_like(&mut self, id: &ItemId, like: LikeState) {
        let updated = self.comments.modify_item(id, |item| {
            item.set_like_state(like);
        });
        if updated {
            return;
        }
        if let Some(reply) = self.tree.reply_mut(id) {
            reply.like = like;
        }
    }

    fn adjust_reply_count(&mut self, root_id: &ItemId, adjust: impl FnOnce(u64) -> u64) -> bool {
        self.comments.modify_item(root_id, |item| {
            if let Some(root) = item.as_comment_mut() {
                root.replies = adjust(root.replies);
            }
        })
    }

    fn push_notice(&mut self, message: String) {
        self.notices.push_back(Notice { message });
    }
}
