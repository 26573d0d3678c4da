//! Flattens root comments and their branches into render rows.

use crate::api::{Comment, Item, ItemId};
use crate::virtualizer::RowKey;

use super::branch::BranchState;
use super::draft::ReplyDraft;
use super::tree::CommentTree;

/// One row of a comment thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderRow<'a> {
    /// A root comment or a reply.
    Item(&'a Comment),
    /// First reply page of `root_id` is loading.
    Loading {
        /// Root being expanded.
        root_id: &'a ItemId,
    },
    /// More replies of `root_id` can be loaded.
    ViewMore {
        /// Root whose replies continue.
        root_id: &'a ItemId,
        /// Replies announced but not loaded.
        remaining: u64,
        /// True while the next page is in flight.
        loading: bool,
    },
    /// A reply composer under `target`.
    ComposeReply {
        /// Comment being answered.
        target: &'a ItemId,
        /// Draft in the composer.
        draft: &'a ReplyDraft,
    },
}

impl RenderRow<'_> {
    /// Stable identity for layout caching.
    #[must_use]
    pub fn key(&self) -> RowKey {
        match self {
            Self::Item(comment) => RowKey::new(comment.id.as_str()),
            Self::Loading { root_id } => RowKey::new(format!("loading-{root_id}")),
            Self::ViewMore { root_id, .. } => RowKey::new(format!("view-more-{root_id}")),
            Self::ComposeReply { target, .. } => RowKey::new(format!("reply-{target}")),
        }
    }

    /// Nesting depth: 0 for roots and their sentinels, 1 for replies.
    #[must_use]
    pub const fn depth(&self) -> u8 {
        match self {
            Self::Item(comment) if comment.root_id.is_some() => 1,
            Self::Item(_) | Self::Loading { .. } | Self::ViewMore { .. } => 0,
            Self::ComposeReply { .. } => 1,
        }
    }
}

/// Derives the rendered sequence for `roots` from the tree.
///
/// Per root: the root, then either a loading row or its replies (each
/// followed by its own composer), then the root's composer, then a
/// `view-more` row while replies remain.
#[must_use]
pub fn project<'a>(roots: &'a [Item], tree: &'a CommentTree) -> Vec<RenderRow<'a>> {
    let mut rows = Vec::with_capacity(roots.len());
    for root in roots.iter().filter_map(Item::as_comment) {
        rows.push(RenderRow::Item(root));
        let branch = tree.branch(&root.id);

        match branch.map(super::ReplyBranch::state) {
            Some(BranchState::Expanding) => rows.push(RenderRow::Loading { root_id: &root.id }),
            Some(BranchState::Expanded) => {
                for reply in branch.map(super::ReplyBranch::replies).unwrap_or_default() {
                    rows.push(RenderRow::Item(reply));
                    push_composer(&mut rows, tree, &reply.id);
                }
            }
            Some(BranchState::Collapsed) | None => {}
        }

        push_composer(&mut rows, tree, &root.id);

        if let Some(open) = branch.filter(|b| b.has_more()) {
            let loaded = u64::try_from(open.loaded_count()).unwrap_or(u64::MAX);
            rows.push(RenderRow::ViewMore {
                root_id: &root.id,
                remaining: open.reply_total().saturating_sub(loaded),
                loading: open.is_loading(),
            });
        }
    }
    rows
}

fn push_composer<'a>(rows: &mut Vec<RenderRow<'a>>, tree: &'a CommentTree, target: &'a ItemId) {
    if let Some(composer) = tree.composer(target) {
        rows.push(RenderRow::ComposeReply {
            target,
            draft: composer.draft(),
        });
    }
}
