//! Threaded comments for a post detail view.
//!
//! Root comments paginate like any other list. Replies hang off each root in
//! a [`ReplyBranch`] held by the [`CommentTree`], which also tracks open reply
//! composers and their drafts. [`project`] derives the flat rendered rows,
//! including loading, `view-more` and composer rows, from that tree on
//! demand; nothing is spliced into the root list itself.

mod branch;
mod draft;
mod page;
mod projection;
mod tree;

pub use branch::{BranchState, ReplyBranch};
pub use draft::{DEFAULT_REPLY_MAX_LENGTH, ReplyDraft, ReplyDraftError};
pub use page::{DeletionKind, Notice, PendingDeletion, PostDetailPage};
pub use projection::{RenderRow, project};
pub use tree::{
    CommentTree, Composer, DetachedReply, DetachedRoot, ReplyOutcome, ReplyPageRequest,
    ThreadError,
};
