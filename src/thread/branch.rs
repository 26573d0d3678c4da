//! Per-root reply state.

use std::collections::HashSet;

use crate::api::{Comment, ItemId};

/// Expansion state of a top-level comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchState {
    /// Replies hidden.
    Collapsed,
    /// First reply page in flight; replies not yet shown.
    Expanding,
    /// Replies shown, possibly partially.
    Expanded,
}

/// Replies loaded under one top-level comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyBranch {
    state: BranchState,
    replies: Vec<Comment>,
    loaded: HashSet<ItemId>,
    next_page: u32,
    reply_total: u64,
    exhausted: bool,
    in_flight: bool,
    generation: u64,
}

impl ReplyBranch {
    pub(crate) fn new(state: BranchState, reply_total: u64, generation: u64) -> Self {
        Self {
            state,
            replies: Vec::new(),
            loaded: HashSet::new(),
            next_page: 0,
            reply_total,
            exhausted: false,
            in_flight: false,
            generation,
        }
    }

    /// Expansion state.
    #[must_use]
    pub const fn state(&self) -> BranchState {
        self.state
    }

    /// Replies in display order.
    #[must_use]
    pub fn replies(&self) -> &[Comment] {
        &self.replies
    }

    /// Number of loaded replies.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.replies.len()
    }

    /// Returns true when `id` has already been loaded.
    #[must_use]
    pub fn contains(&self, id: &ItemId) -> bool {
        self.loaded.contains(id)
    }

    /// IDs loaded so far.
    #[must_use]
    pub const fn loaded_ids(&self) -> &HashSet<ItemId> {
        &self.loaded
    }

    /// Next reply page to request.
    #[must_use]
    pub const fn next_page(&self) -> u32 {
        self.next_page
    }

    /// Reply count copied from the root comment.
    #[must_use]
    pub const fn reply_total(&self) -> u64 {
        self.reply_total
    }

    /// Returns true once the server returned an empty reply page.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Returns true while a reply page is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// Returns true while `view-more` should be offered.
    #[must_use]
    pub fn has_more(&self) -> bool {
        let loaded = u64::try_from(self.replies.len()).unwrap_or(u64::MAX);
        self.state == BranchState::Expanded && !self.exhausted && loaded < self.reply_total
    }

    pub(crate) const fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn begin_page(&mut self, state: BranchState, generation: u64) {
        self.state = state;
        self.in_flight = true;
        self.generation = generation;
    }

    /// Adds a page of replies, skipping IDs already loaded.
    ///
    /// Returns the number of replies added. An empty page exhausts the
    /// branch.
    pub(crate) fn apply_page(&mut self, page: Vec<Comment>) -> usize {
        self.in_flight = false;
        self.state = BranchState::Expanded;
        if page.is_empty() {
            self.exhausted = true;
            return 0;
        }
        self.next_page = self.next_page.saturating_add(1);
        page.into_iter()
            .map(|reply| self.push_reply(reply))
            .filter(|added| *added)
            .count()
    }

    pub(crate) fn fail_page(&mut self) {
        self.in_flight = false;
    }

    /// Appends `reply` unless its ID is already loaded.
    pub(crate) fn push_reply(&mut self, reply: Comment) -> bool {
        if !self.loaded.insert(reply.id.clone()) {
            return false;
        }
        self.replies.push(reply);
        true
    }

    /// Inserts `reply` directly after the reply with `after`, or at the end.
    pub(crate) fn insert_reply_after(&mut self, after: &ItemId, reply: Comment) -> bool {
        if !self.loaded.insert(reply.id.clone()) {
            return false;
        }
        let index = self
            .replies
            .iter()
            .position(|existing| &existing.id == after)
            .map_or(self.replies.len(), |position| position.saturating_add(1));
        self.replies.insert(index, reply);
        true
    }

    /// Inserts `reply` at `index`, clamped to the loaded replies.
    pub(crate) fn insert_reply_at(&mut self, index: usize, reply: Comment) -> bool {
        if !self.loaded.insert(reply.id.clone()) {
            return false;
        }
        let clamped = index.min(self.replies.len());
        self.replies.insert(clamped, reply);
        true
    }

    /// Drops a page request this branch was waiting for.
    pub(crate) const fn rebase(&mut self, generation: u64) {
        self.in_flight = false;
        self.generation = generation;
    }

    pub(crate) fn remove_reply(&mut self, id: &ItemId) -> Option<(usize, Comment)> {
        let index = self.replies.iter().position(|reply| &reply.id == id)?;
        self.loaded.remove(id);
        Some((index, self.replies.remove(index)))
    }

    pub(crate) fn reply_mut(&mut self, id: &ItemId) -> Option<&mut Comment> {
        self.replies.iter_mut().find(|reply| &reply.id == id)
    }

    pub(crate) const fn set_reply_total(&mut self, total: u64) {
        self.reply_total = total;
    }

    pub(crate) fn collapse(&mut self, generation: u64) {
        self.state = BranchState::Collapsed;
        self.replies.clear();
        self.loaded.clear();
        self.next_page = 0;
        self.exhausted = false;
        self.in_flight = false;
        self.generation = generation;
    }
}
