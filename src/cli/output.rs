//! Output formatting utilities for CLI operations.

use std::io::{self, Write};

use blogify::api::{Comment, Post, User};
use blogify::thread::Notice;
use blogify::virtualizer::{ListFrame, ListSlot};
use blogify::{FeedError, Item, PaginatedList, PostDetailPage, RenderRow};

/// Writes the rows of `frame` for a feed list.
pub fn write_feed<W: Write>(
    writer: &mut W,
    list: &PaginatedList,
    frame: &ListFrame,
) -> Result<(), FeedError> {
    let more = if list.has_more() {
        ", more available"
    } else {
        ""
    };
    writeln!(
        writer,
        "Feed {}: {} item(s) loaded{more}",
        list.key(),
        list.items().len()
    )
    .map_err(|e| io_error(&e))?;

    for row in &frame.rows {
        let line = match row.slot {
            ListSlot::Create => "  [new post]".to_owned(),
            ListSlot::Item(index) => list
                .items()
                .get(index)
                .map_or_else(String::new, |item| format!("  {}", describe_item(item))),
            ListSlot::Placeholder(_) => "  ...".to_owned(),
        };
        writeln!(writer, "{line}").map_err(|e| io_error(&e))?;
    }
    Ok(())
}

/// Writes a post header followed by the thread rows inside `frame`.
pub fn write_thread<W: Write>(
    writer: &mut W,
    page: &PostDetailPage,
    rows: &[RenderRow<'_>],
    frame: &ListFrame,
) -> Result<(), FeedError> {
    if let Some(post) = page.post() {
        writeln!(writer, "{}", describe_post(post)).map_err(|e| io_error(&e))?;
    }
    writeln!(writer).map_err(|e| io_error(&e))?;

    for row in &frame.rows {
        let ListSlot::Item(index) = row.slot else {
            continue;
        };
        let Some(render_row) = rows.get(index) else {
            continue;
        };
        let indent = "  ".repeat(usize::from(render_row.depth()).saturating_add(1));
        writeln!(writer, "{indent}{}", describe_row(render_row)).map_err(|e| io_error(&e))?;
    }

    for Notice { message } in page.notices() {
        writeln!(writer, "! {message}").map_err(|e| io_error(&e))?;
    }
    Ok(())
}

fn describe_item(item: &Item) -> String {
    match item {
        Item::Post(post) => describe_post(post),
        Item::Comment(comment) => describe_comment(comment),
        Item::User(user) => describe_user(user),
    }
}

fn describe_post(post: &Post) -> String {
    format!(
        "@{}: {} ({} likes, {} comments)",
        post.author.username, post.body, post.like.likes, post.comments
    )
}

fn describe_comment(comment: &Comment) -> String {
    let replies = if comment.is_root() && comment.replies > 0 {
        format!(", {} replies", comment.replies)
    } else {
        String::new()
    };
    format!(
        "@{}: {} ({} likes{replies})",
        comment.author.username, comment.body, comment.like.likes
    )
}

fn describe_user(user: &User) -> String {
    let badge = if user.verified { " [verified]" } else { "" };
    format!("{} (@{}){badge}, {} followers", user.name, user.username, user.followers)
}

fn describe_row(row: &RenderRow<'_>) -> String {
    match row {
        RenderRow::Item(comment) => describe_comment(comment),
        RenderRow::Loading { .. } => "loading replies...".to_owned(),
        RenderRow::ViewMore { remaining, .. } => format!("view {remaining} more replies"),
        RenderRow::ComposeReply { target, draft } => {
            format!(
                "reply to {target}: {} ({} left)",
                draft.text(),
                draft.remaining_chars()
            )
        }
    }
}

/// Converts an I/O error to a [`FeedError::Io`].
pub(crate) fn io_error(error: &io::Error) -> FeedError {
    FeedError::Io {
        message: error.to_string(),
    }
}
