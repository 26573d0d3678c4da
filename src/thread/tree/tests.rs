//! Unit tests for reply branches and composers.

use rstest::{fixture, rstest};

use super::{CommentTree, ReplyOutcome, ThreadError};
use crate::api::models::test_support::{reply, replies, root_comment};
use crate::api::{Comment, FeedError, ItemId};
use crate::thread::{BranchState, ReplyDraftError};

#[fixture]
fn tree() -> CommentTree {
    CommentTree::new(50)
}

fn root(replies: u64) -> Comment {
    root_comment("c1", replies)
}

fn id(value: &str) -> ItemId {
    ItemId::new(value)
}

fn loaded_ids(tree: &CommentTree) -> Vec<String> {
    tree.branch(&id("c1"))
        .map(|branch| {
            branch
                .replies()
                .iter()
                .map(|r| r.id.as_str().to_owned())
                .collect()
        })
        .unwrap_or_default()
}

#[rstest]
fn expand_requests_page_zero_and_shows_loading(mut tree: CommentTree) {
    let request = tree.expand(&root(3)).expect("first expansion fetches");

    assert_eq!(request.page_number(), 0);
    assert_eq!(request.endpoint().path(), "comments/c1/replies");
    assert_eq!(
        tree.branch(&id("c1")).map(|b| b.state()),
        Some(BranchState::Expanding)
    );
    assert!(tree.expand(&root(3)).is_none(), "already open");
}

#[rstest]
fn root_without_replies_opens_empty(mut tree: CommentTree) {
    assert!(tree.expand(&root(0)).is_none());
    assert!(tree.is_open(&id("c1")));
    assert!(tree.branch(&id("c1")).is_some_and(|b| !b.has_more()));
}

#[rstest]
fn load_more_skips_replies_already_loaded(mut tree: CommentTree) {
    let first = tree.expand(&root(3)).expect("expand");
    tree.apply_replies(&first, Ok(replies("c1", &[1, 2])));

    let second = tree.load_more(&id("c1")).expect("more replies expected");
    assert_eq!(second.page_number(), 1);
    let outcome = tree.apply_replies(&second, Ok(replies("c1", &[1, 2, 3])));

    assert_eq!(outcome, ReplyOutcome::Appended(1));
    assert_eq!(loaded_ids(&tree), ["c1-r1", "c1-r2", "c1-r3"]);
}

#[rstest]
fn fully_loaded_branch_offers_no_more(mut tree: CommentTree) {
    let first = tree.expand(&root(3)).expect("expand");
    tree.apply_replies(&first, Ok(replies("c1", &[1, 2])));
    let second = tree.load_more(&id("c1")).expect("load more");
    tree.apply_replies(&second, Ok(replies("c1", &[3])));

    assert!(tree.branch(&id("c1")).is_some_and(|b| !b.has_more()));
    assert!(tree.load_more(&id("c1")).is_none());
}

#[rstest]
fn overlapping_load_more_collapses_to_one_request(mut tree: CommentTree) {
    let first = tree.expand(&root(5)).expect("expand");
    tree.apply_replies(&first, Ok(replies("c1", &[1])));

    assert!(tree.load_more(&id("c1")).is_some());
    assert!(tree.load_more(&id("c1")).is_none());
}

#[rstest]
fn empty_reply_page_exhausts_a_stale_count(mut tree: CommentTree) {
    let first = tree.expand(&root(4)).expect("expand");
    tree.apply_replies(&first, Ok(replies("c1", &[1])));
    let second = tree.load_more(&id("c1")).expect("load more");

    assert_eq!(tree.apply_replies(&second, Ok(Vec::new())), ReplyOutcome::Exhausted);
    assert!(tree.branch(&id("c1")).is_some_and(|b| b.is_exhausted() && !b.has_more()));
}

#[rstest]
fn failed_first_page_abandons_the_expansion(mut tree: CommentTree) {
    let first = tree.expand(&root(2)).expect("expand");

    let outcome = tree.apply_replies(
        &first,
        Err(FeedError::Network {
            message: "reset".to_owned(),
        }),
    );

    assert!(matches!(outcome, ReplyOutcome::Failed(_)));
    assert!(tree.branch(&id("c1")).is_none());
    assert!(tree.expand(&root(2)).is_some(), "can retry");
}

#[rstest]
fn failed_later_page_keeps_loaded_replies(mut tree: CommentTree) {
    let first = tree.expand(&root(4)).expect("expand");
    tree.apply_replies(&first, Ok(replies("c1", &[1, 2])));
    let second = tree.load_more(&id("c1")).expect("load more");

    tree.apply_replies(
        &second,
        Err(FeedError::Timeout {
            message: "slow".to_owned(),
        }),
    );

    assert_eq!(loaded_ids(&tree), ["c1-r1", "c1-r2"]);
    assert!(tree.load_more(&id("c1")).is_some(), "no longer in flight");
}

#[rstest]
fn collapse_clears_replies_and_loaded_ids(mut tree: CommentTree) {
    let first = tree.expand(&root(2)).expect("expand");
    tree.apply_replies(&first, Ok(replies("c1", &[1, 2])));

    assert!(tree.collapse(&id("c1")));

    let branch = tree.branch(&id("c1")).expect("entry kept");
    assert_eq!(branch.state(), BranchState::Collapsed);
    assert!(branch.replies().is_empty());
    assert!(branch.loaded_ids().is_empty());
    assert_eq!(branch.next_page(), 0);
}

#[rstest]
fn page_landing_after_collapse_is_stale(mut tree: CommentTree) {
    let first = tree.expand(&root(2)).expect("expand");
    tree.collapse(&id("c1"));

    assert_eq!(
        tree.apply_replies(&first, Ok(replies("c1", &[1]))),
        ReplyOutcome::Stale
    );
    assert!(loaded_ids(&tree).is_empty());
}

#[rstest]
fn toggle_alternates_expansion(mut tree: CommentTree) {
    assert!(tree.toggle(&root(1)).is_some());
    assert!(tree.toggle(&root(1)).is_none());
    assert!(!tree.is_open(&id("c1")));
    assert!(tree.toggle(&root(1)).is_some(), "expands again from page 0");
}

#[rstest]
fn composer_opens_once_per_target(mut tree: CommentTree) {
    assert!(tree.open_composer(&root(0)));
    assert!(!tree.open_composer(&root(0)));

    assert_eq!(tree.composer_count(), 1);
}

#[rstest]
fn collapse_closes_composers_on_hidden_replies(mut tree: CommentTree) {
    let first = tree.expand(&root(1)).expect("expand");
    tree.apply_replies(&first, Ok(replies("c1", &[1])));
    tree.open_composer(&root(1));
    tree.open_composer(&reply("c1-r1", "c1", "c1"));

    tree.collapse(&id("c1"));

    assert!(tree.composer(&id("c1")).is_some());
    assert!(tree.composer(&id("c1-r1")).is_none());
}

#[rstest]
fn cancel_discards_the_draft(mut tree: CommentTree) {
    tree.open_composer(&root(0));
    tree.set_draft(&id("c1"), "half a thought").expect("fits");

    assert!(tree.cancel_composer(&id("c1")));
    tree.open_composer(&root(0));

    assert_eq!(tree.composer(&id("c1")).map(|c| c.draft().text()), Some(""));
}

#[rstest]
fn set_draft_requires_an_open_composer(mut tree: CommentTree) {
    assert_eq!(
        tree.set_draft(&id("c1"), "hi"),
        Err(ThreadError::NoComposer { target: id("c1") })
    );
}

#[rstest]
fn begin_submit_validates_and_blocks_double_send(mut tree: CommentTree) {
    tree.open_composer(&reply("c1-r1", "c1", "c1"));
    assert_eq!(
        tree.begin_submit(&id("c1-r1")),
        Err(ThreadError::Draft(ReplyDraftError::EmptyDraft))
    );

    tree.set_draft(&id("c1-r1"), " agreed ").expect("fits");
    let new_reply = tree.begin_submit(&id("c1-r1")).expect("valid draft");

    assert_eq!(new_reply.root_id, id("c1"));
    assert_eq!(new_reply.replies_to, id("c1-r1"));
    assert_eq!(new_reply.body, "agreed");
    assert_eq!(
        tree.begin_submit(&id("c1-r1")),
        Err(ThreadError::SubmitInFlight { target: id("c1-r1") })
    );
}

#[rstest]
fn submitted_reply_takes_the_composer_position(mut tree: CommentTree) {
    let first = tree.expand(&root(2)).expect("expand");
    tree.apply_replies(&first, Ok(replies("c1", &[1, 2])));
    tree.open_composer(&reply("c1-r1", "c1", "c1"));
    tree.set_draft(&id("c1-r1"), "me too").expect("fits");
    tree.begin_submit(&id("c1-r1")).expect("valid");

    let created = tree
        .complete_submit(&id("c1-r1"), 2, Ok(reply("c1-new", "c1", "c1-r1")))
        .expect("created");

    assert_eq!(created.id, id("c1-new"));
    assert_eq!(loaded_ids(&tree), ["c1-r1", "c1-new", "c1-r2"]);
    assert_eq!(tree.branch(&id("c1")).map(|b| b.reply_total()), Some(3));
    assert!(tree.composer(&id("c1-r1")).is_none());
}

#[rstest]
fn reply_to_collapsed_root_opens_its_branch(mut tree: CommentTree) {
    tree.open_composer(&root(4));
    tree.set_draft(&id("c1"), "first!").expect("fits");
    tree.begin_submit(&id("c1")).expect("valid");

    tree.complete_submit(&id("c1"), 4, Ok(reply("c1-new", "c1", "c1")))
        .expect("created");

    let branch = tree.branch(&id("c1")).expect("branch opened");
    assert_eq!(branch.state(), BranchState::Expanded);
    assert_eq!(branch.reply_total(), 5);
    assert!(branch.has_more(), "the other four can still be loaded");
    assert_eq!(branch.next_page(), 0);
}

#[rstest]
fn failed_submit_keeps_the_draft(mut tree: CommentTree) {
    tree.open_composer(&root(0));
    tree.set_draft(&id("c1"), "retry me").expect("fits");
    tree.begin_submit(&id("c1")).expect("valid");

    let result = tree.complete_submit(
        &id("c1"),
        0,
        Err(FeedError::Api {
            status: 500,
            message: "boom".to_owned(),
        }),
    );

    assert!(matches!(result, Err(ThreadError::Feed(_))));
    let composer = tree.composer(&id("c1")).expect("still open");
    assert!(!composer.is_submitting());
    assert_eq!(composer.draft().text(), "retry me");
}

#[rstest]
fn removing_the_last_reply_collapses_the_root(mut tree: CommentTree) {
    let first = tree.expand(&root(1)).expect("expand");
    tree.apply_replies(&first, Ok(replies("c1", &[1])));

    let detached = tree.detach_reply(&id("c1-r1")).expect("reply loaded");

    assert_eq!(detached.root_id(), &id("c1"));
    assert!(!tree.is_open(&id("c1")));
    assert!(tree.detach_reply(&id("c1-r1")).is_none());
}

#[rstest]
fn reattached_reply_returns_to_its_slot(mut tree: CommentTree) {
    let first = tree.expand(&root(3)).expect("expand");
    tree.apply_replies(&first, Ok(replies("c1", &[1, 2, 3])));
    tree.open_composer(&reply("c1-r2", "c1", "c1"));

    let detached = tree.detach_reply(&id("c1-r2")).expect("reply loaded");
    assert_eq!(loaded_ids(&tree), ["c1-r1", "c1-r3"]);
    assert!(tree.composer(&id("c1-r2")).is_none());

    tree.reattach_reply(detached);

    assert_eq!(loaded_ids(&tree), ["c1-r1", "c1-r2", "c1-r3"]);
    assert!(tree.composer(&id("c1-r2")).is_some());
    assert_eq!(tree.branch(&id("c1")).map(|b| b.reply_total()), Some(3));
}

#[rstest]
fn reattached_reply_reopens_the_branch_it_collapsed(mut tree: CommentTree) {
    let first = tree.expand(&root(1)).expect("expand");
    tree.apply_replies(&first, Ok(replies("c1", &[1])));

    let detached = tree.detach_reply(&id("c1-r1")).expect("reply loaded");
    tree.reattach_reply(detached);

    assert!(tree.is_open(&id("c1")));
    assert_eq!(loaded_ids(&tree), ["c1-r1"]);
}

#[rstest]
fn reattach_keeps_a_branch_the_reader_collapsed(mut tree: CommentTree) {
    let first = tree.expand(&root(2)).expect("expand");
    tree.apply_replies(&first, Ok(replies("c1", &[1, 2])));

    let detached = tree.detach_reply(&id("c1-r1")).expect("reply loaded");
    tree.collapse(&id("c1"));
    tree.reattach_reply(detached);

    assert!(!tree.is_open(&id("c1")));
    assert_eq!(tree.branch(&id("c1")).map(|b| b.reply_total()), Some(2));
}

#[rstest]
fn detach_root_drops_branch_and_composers(mut tree: CommentTree) {
    let first = tree.expand(&root(1)).expect("expand");
    tree.apply_replies(&first, Ok(replies("c1", &[1])));
    tree.open_composer(&root(1));
    tree.open_composer(&reply("c1-r1", "c1", "c1"));

    let detached = tree.detach_root(&id("c1"));

    assert!(tree.branch(&id("c1")).is_none());
    assert_eq!(tree.composer_count(), 0);

    tree.reattach_root(detached);

    assert_eq!(loaded_ids(&tree), ["c1-r1"]);
    assert_eq!(tree.composer_count(), 2);
}

#[rstest]
fn reattached_root_gives_up_its_pending_reply_page(mut tree: CommentTree) {
    let first = tree.expand(&root(3)).expect("expand");
    tree.apply_replies(&first, Ok(replies("c1", &[1])));
    let more = tree.load_more(&id("c1")).expect("more replies expected");

    let detached = tree.detach_root(&id("c1"));
    assert_eq!(tree.apply_replies(&more, Ok(replies("c1", &[2]))), ReplyOutcome::Stale);
    tree.reattach_root(detached);

    let branch = tree.branch(&id("c1")).expect("branch restored");
    assert!(!branch.is_loading());
    assert!(tree.load_more(&id("c1")).is_some(), "paging can resume");
}
