//! Explicit two-level comment tree: roots, their reply branches and the
//! reply composers open against them.
//!
//! Root comments themselves live in the page's paginated comment list; the
//! tree only tracks what hangs underneath them. Every fetch goes through a
//! [`ReplyPageRequest`] carrying the branch generation so that a page which
//! lands after its branch was collapsed is dropped.

use std::collections::HashMap;

use thiserror::Error;

use super::branch::{BranchState, ReplyBranch};
use super::draft::{ReplyDraft, ReplyDraftError};
use crate::api::{Comment, Endpoint, FeedError, Item, ItemId, NewReply};

/// Token for one outstanding reply page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyPageRequest {
    root_id: ItemId,
    page_number: u32,
    generation: u64,
}

impl ReplyPageRequest {
    /// Root comment whose replies are requested.
    #[must_use]
    pub const fn root_id(&self) -> &ItemId {
        &self.root_id
    }

    /// Reply page number (0-based).
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Endpoint serving this root's replies.
    #[must_use]
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::comment_replies(&self.root_id)
    }
}

/// What applying a reply page did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// This many new replies were added.
    Appended(usize),
    /// The page was empty; the branch is exhausted.
    Exhausted,
    /// The fetch failed. A first expansion is abandoned; loaded replies stay.
    Failed(FeedError),
    /// The branch was collapsed or removed while the page was in flight.
    Stale,
}

/// Errors raised by thread operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ThreadError {
    /// The comment is not on this page.
    #[error("comment {id} is not loaded")]
    UnknownComment {
        /// Requested comment.
        id: ItemId,
    },
    /// No composer is open for the target.
    #[error("no reply composer is open for {target}")]
    NoComposer {
        /// Composer target.
        target: ItemId,
    },
    /// The reply is already being sent.
    #[error("reply to {target} is already being sent")]
    SubmitInFlight {
        /// Composer target.
        target: ItemId,
    },
    /// The draft failed validation.
    #[error(transparent)]
    Draft(#[from] ReplyDraftError),
    /// The server rejected the request.
    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// An open reply composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composer {
    root_id: ItemId,
    draft: ReplyDraft,
    submitting: bool,
}

impl Composer {
    /// Root comment the reply will be filed under.
    #[must_use]
    pub const fn root_id(&self) -> &ItemId {
        &self.root_id
    }

    /// Draft text.
    #[must_use]
    pub const fn draft(&self) -> &ReplyDraft {
        &self.draft
    }

    /// Returns true while the reply is being sent.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }
}

/// A reply taken out of its branch, kept so it can be put back.
#[derive(Debug, Clone)]
pub struct DetachedReply {
    root_id: ItemId,
    index: usize,
    reply: Comment,
    composer: Option<Composer>,
    collapsed: bool,
}

impl DetachedReply {
    /// Root the reply hung under.
    #[must_use]
    pub const fn root_id(&self) -> &ItemId {
        &self.root_id
    }
}

/// A root's branch and composers, kept so they can be put back.
#[derive(Debug, Clone)]
pub struct DetachedRoot {
    root_id: ItemId,
    branch: Option<ReplyBranch>,
    composers: Vec<(ItemId, Composer)>,
}

/// Reply branches and composers for the roots of one post.
#[derive(Debug, Clone)]
pub struct CommentTree {
    branches: HashMap<ItemId, ReplyBranch>,
    composers: HashMap<ItemId, Composer>,
    reply_max_length: usize,
    generation: u64,
}

impl CommentTree {
    /// Creates an empty tree whose drafts are limited to `reply_max_length`
    /// characters.
    #[must_use]
    pub fn new(reply_max_length: usize) -> Self {
        Self {
            branches: HashMap::new(),
            composers: HashMap::new(),
            reply_max_length,
            generation: 0,
        }
    }

    /// Branch for `root_id`.
    #[must_use]
    pub fn branch(&self, root_id: &ItemId) -> Option<&ReplyBranch> {
        self.branches.get(root_id)
    }

    /// Returns true when the root's replies are shown or loading.
    #[must_use]
    pub fn is_open(&self, root_id: &ItemId) -> bool {
        self.branches
            .get(root_id)
            .is_some_and(|branch| branch.state() != BranchState::Collapsed)
    }

    /// Composer open against `target`.
    #[must_use]
    pub fn composer(&self, target: &ItemId) -> Option<&Composer> {
        self.composers.get(target)
    }

    /// Number of open composers.
    #[must_use]
    pub fn composer_count(&self) -> usize {
        self.composers.len()
    }

    /// Finds a loaded reply.
    #[must_use]
    pub fn reply(&self, id: &ItemId) -> Option<&Comment> {
        self.branches
            .values()
            .flat_map(ReplyBranch::replies)
            .find(|reply| &reply.id == id)
    }

    /// Mutable access to a loaded reply.
    pub fn reply_mut(&mut self, id: &ItemId) -> Option<&mut Comment> {
        self.branches
            .values_mut()
            .find_map(|branch| branch.reply_mut(id))
    }

    /// Starts showing the replies of `root`.
    ///
    /// Returns the first page request, or `None` when the branch is already
    /// open or the root has no replies (the branch then opens empty).
    pub fn expand(&mut self, root: &Comment) -> Option<ReplyPageRequest> {
        if self.is_open(&root.id) {
            return None;
        }
        let generation = self.next_generation();
        if root.replies == 0 {
            self.branches.insert(
                root.id.clone(),
                ReplyBranch::new(BranchState::Expanded, 0, generation),
            );
            return None;
        }

        let mut branch = ReplyBranch::new(BranchState::Collapsed, root.replies, generation);
        branch.begin_page(BranchState::Expanding, generation);
        self.branches.insert(root.id.clone(), branch);
        Some(ReplyPageRequest {
            root_id: root.id.clone(),
            page_number: 0,
            generation,
        })
    }

    /// Expands a collapsed root or collapses an open one.
    pub fn toggle(&mut self, root: &Comment) -> Option<ReplyPageRequest> {
        if self.is_open(&root.id) {
            self.collapse(&root.id);
            return None;
        }
        self.expand(root)
    }

    /// Requests the next reply page for an expanded root.
    ///
    /// Returns `None` while a page is in flight or nothing more is expected.
    pub fn load_more(&mut self, root_id: &ItemId) -> Option<ReplyPageRequest> {
        let generation = self.next_generation();
        let branch = self.branches.get_mut(root_id)?;
        if branch.is_loading() || !branch.has_more() {
            return None;
        }
        branch.begin_page(BranchState::Expanded, generation);
        Some(ReplyPageRequest {
            root_id: root_id.clone(),
            page_number: branch.next_page(),
            generation,
        })
    }

    /// Applies a reply page.
    ///
    /// Non-comment items in the page are ignored. Replies already loaded are
    /// skipped.
    pub fn apply_replies(
        &mut self,
        request: &ReplyPageRequest,
        outcome: Result<Vec<Item>, FeedError>,
    ) -> ReplyOutcome {
        let Some(branch) = self
            .branches
            .get_mut(&request.root_id)
            .filter(|branch| branch.generation() == request.generation)
        else {
            tracing::debug!("dropping stale reply page for {}", request.root_id);
            return ReplyOutcome::Stale;
        };

        match outcome {
            Ok(page) => {
                let replies: Vec<Comment> = page
                    .into_iter()
                    .filter_map(|item| match item {
                        Item::Comment(comment) => Some(comment),
                        Item::Post(_) | Item::User(_) => None,
                    })
                    .collect();
                if replies.is_empty() {
                    branch.apply_page(replies);
                    return ReplyOutcome::Exhausted;
                }
                ReplyOutcome::Appended(branch.apply_page(replies))
            }
            Err(error) => {
                tracing::warn!(
                    "reply page {} for {} failed: {error}",
                    request.page_number,
                    request.root_id
                );
                if branch.state() == BranchState::Expanding {
                    self.branches.remove(&request.root_id);
                } else {
                    branch.fail_page();
                }
                ReplyOutcome::Failed(error)
            }
        }
    }

    /// Hides the replies of `root_id` and forgets what was loaded.
    ///
    /// Composers open against the hidden replies close; a composer on the
    /// root itself stays. Returns false when nothing was open.
    pub fn collapse(&mut self, root_id: &ItemId) -> bool {
        if !self.is_open(root_id) {
            return false;
        }
        let generation = self.next_generation();
        if let Some(branch) = self.branches.get_mut(root_id) {
            branch.collapse(generation);
        }
        self.composers
            .retain(|target, composer| &composer.root_id != root_id || target == root_id);
        true
    }

    /// Opens a composer directly after `target`.
    ///
    /// Returns false when one is already open there.
    pub fn open_composer(&mut self, target: &Comment) -> bool {
        if self.composers.contains_key(&target.id) {
            return false;
        }
        self.composers.insert(
            target.id.clone(),
            Composer {
                root_id: target.thread_root().clone(),
                draft: ReplyDraft::new(target.id.clone(), self.reply_max_length),
                submitting: false,
            },
        );
        true
    }

    /// Replaces the draft text of the composer on `target`.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadError::NoComposer`] when no composer is open, or
    /// [`ThreadError::Draft`] when the text is too long.
    pub fn set_draft(&mut self, target: &ItemId, text: &str) -> Result<(), ThreadError> {
        let composer = self.composer_mut(target)?;
        composer.draft.set_text(text)?;
        Ok(())
    }

    /// Closes the composer on `target` and discards its draft.
    pub fn cancel_composer(&mut self, target: &ItemId) -> bool {
        self.composers.remove(target).is_some()
    }

    /// Validates the draft on `target` and marks it as sending.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadError::NoComposer`], [`ThreadError::SubmitInFlight`]
    /// or [`ThreadError::Draft`].
    pub fn begin_submit(&mut self, target: &ItemId) -> Result<NewReply, ThreadError> {
        let composer = self.composer_mut(target)?;
        if composer.submitting {
            return Err(ThreadError::SubmitInFlight {
                target: target.clone(),
            });
        }
        let body = composer.draft.request_send()?;
        composer.submitting = true;
        Ok(NewReply {
            root_id: composer.root_id.clone(),
            replies_to: target.clone(),
            body,
        })
    }

    /// Applies the server's answer to a submitted reply.
    ///
    /// On success the composer closes and the reply takes its place: after
    /// the answered reply, or at the end of the root's replies. `root_replies`
    /// is the root's reply count before this reply; it seeds the branch when
    /// the root was collapsed. On failure the composer stays open with its
    /// draft.
    ///
    /// # Errors
    ///
    /// Returns [`ThreadError::Feed`] with the server's error, or
    /// [`ThreadError::NoComposer`] if the composer was closed meanwhile.
    pub fn complete_submit(
        &mut self,
        target: &ItemId,
        root_replies: u64,
        outcome: Result<Comment, FeedError>,
    ) -> Result<Comment, ThreadError> {
        let composer = self.composer_mut(target)?;
        composer.submitting = false;
        let reply = outcome?;
        let root_id = composer.root_id.clone();
        self.composers.remove(target);

        let generation = self.next_generation();
        let branch = self
            .branches
            .entry(root_id)
            .or_insert_with(|| ReplyBranch::new(BranchState::Expanded, root_replies, generation));
        if branch.state() == BranchState::Collapsed {
            *branch = ReplyBranch::new(BranchState::Expanded, root_replies, generation);
        }
        if branch.insert_reply_after(target, reply.clone()) {
            branch.set_reply_total(branch.reply_total().saturating_add(1));
        }
        Ok(reply)
    }

    /// Removes a loaded reply.
    ///
    /// The branch's reply total drops by one; when it reaches zero the
    /// branch collapses. A composer on the removed reply closes.
    pub fn detach_reply(&mut self, reply_id: &ItemId) -> Option<DetachedReply> {
        let (root_id, index, reply, remaining) =
            self.branches.iter_mut().find_map(|(root, branch)| {
                let (index, reply) = branch.remove_reply(reply_id)?;
                let left = branch.reply_total().saturating_sub(1);
                branch.set_reply_total(left);
                Some((root.clone(), index, reply, left))
            })?;
        let composer = self.composers.remove(reply_id);
        let collapsed = remaining == 0 && self.collapse(&root_id);
        Some(DetachedReply {
            root_id,
            index,
            reply,
            composer,
            collapsed,
        })
    }

    /// Puts a detached reply back where it was.
    ///
    /// The reply total grows by one. A branch the detach collapsed reopens
    /// with just this reply; a branch the reader collapsed since stays
    /// closed. Nothing happens once the root itself is gone.
    pub fn reattach_reply(&mut self, detached: DetachedReply) {
        let generation = self.next_generation();
        let Some(branch) = self.branches.get_mut(&detached.root_id) else {
            return;
        };
        let total = branch.reply_total().saturating_add(1);
        match branch.state() {
            BranchState::Collapsed if detached.collapsed => {
                *branch = ReplyBranch::new(BranchState::Expanded, total, generation);
            }
            BranchState::Collapsed | BranchState::Expanding => {
                branch.set_reply_total(total);
                return;
            }
            BranchState::Expanded => branch.set_reply_total(total),
        }
        let reply_id = detached.reply.id.clone();
        let reinserted = branch.insert_reply_at(detached.index, detached.reply);
        if let (true, Some(composer)) = (reinserted, detached.composer) {
            self.composers.entry(reply_id).or_insert(composer);
        }
    }

    /// Forgets a root's branch along with every composer under it.
    pub fn detach_root(&mut self, root_id: &ItemId) -> DetachedRoot {
        let branch = self.branches.remove(root_id);
        let targets: Vec<ItemId> = self
            .composers
            .iter()
            .filter(|(target, composer)| &composer.root_id == root_id || *target == root_id)
            .map(|(target, _)| target.clone())
            .collect();
        let composers = targets
            .into_iter()
            .filter_map(|target| {
                let composer = self.composers.remove(&target)?;
                Some((target, composer))
            })
            .collect();
        DetachedRoot {
            root_id: root_id.clone(),
            branch,
            composers,
        }
    }

    /// Restores a detached root's branch and composers.
    ///
    /// A branch that was waiting for a reply page gives the request up; one
    /// that had not shown any reply yet is dropped.
    pub fn reattach_root(&mut self, detached: DetachedRoot) {
        if self.branches.contains_key(&detached.root_id) {
            return;
        }
        if let Some(mut branch) = detached.branch {
            if branch.is_loading() {
                let generation = self.next_generation();
                branch.rebase(generation);
            }
            if branch.state() != BranchState::Expanding {
                self.branches.insert(detached.root_id.clone(), branch);
            }
        }
        for (target, composer) in detached.composers {
            self.composers.entry(target).or_insert(composer);
        }
    }

    fn composer_mut(&mut self, target: &ItemId) -> Result<&mut Composer, ThreadError> {
        self.composers
            .get_mut(target)
            .ok_or_else(|| ThreadError::NoComposer {
                target: target.clone(),
            })
    }

    const fn next_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}

#[cfg(test)]
mod tests;
