//! Reply composer draft text.
//!
//! A draft belongs to one composer row and enforces a maximum character
//! count measured in Unicode scalar values.

use thiserror::Error;

use crate::api::ItemId;

/// Default maximum reply length.
pub const DEFAULT_REPLY_MAX_LENGTH: usize = 280;

/// Editable reply text for the comment identified by `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyDraft {
    target: ItemId,
    text: String,
    max_length: usize,
    ready_to_send: bool,
}

impl ReplyDraft {
    /// Creates an empty draft. A zero `max_length` is treated as one.
    #[must_use]
    pub fn new(target: ItemId, max_length: usize) -> Self {
        Self {
            target,
            text: String::new(),
            max_length: max_length.max(1),
            ready_to_send: false,
        }
    }

    /// Comment this draft replies to.
    #[must_use]
    pub const fn target(&self) -> &ItemId {
        &self.target
    }

    /// Current text.
    #[must_use]
    pub const fn text(&self) -> &str {
        self.text.as_str()
    }

    /// Configured maximum character count.
    #[must_use]
    pub const fn max_length(&self) -> usize {
        self.max_length
    }

    /// Returns whether the draft passed [`request_send`](Self::request_send)
    /// and has not changed since.
    #[must_use]
    pub const fn is_ready_to_send(&self) -> bool {
        self.ready_to_send
    }

    /// Characters left before the limit.
    #[must_use]
    pub fn remaining_chars(&self) -> usize {
        self.max_length.saturating_sub(self.char_count())
    }

    /// Replaces the whole text.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyDraftError::LengthExceeded`] when `text` is longer than
    /// the limit; the draft is left unchanged.
    pub fn set_text(&mut self, text: &str) -> Result<(), ReplyDraftError> {
        self.ensure_within_limit(text.chars().count())?;
        text.clone_into(&mut self.text);
        self.ready_to_send = false;
        Ok(())
    }

    /// Validates the draft for sending and returns the trimmed body.
    ///
    /// # Errors
    ///
    /// Returns [`ReplyDraftError::EmptyDraft`] for blank drafts, or
    /// [`ReplyDraftError::LengthExceeded`] when over the limit.
    pub fn request_send(&mut self) -> Result<String, ReplyDraftError> {
        let body = self.text.trim();
        if body.is_empty() {
            return Err(ReplyDraftError::EmptyDraft);
        }

        self.ensure_within_limit(self.char_count())?;

        self.ready_to_send = true;
        Ok(body.to_owned())
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    const fn ensure_within_limit(&self, attempted: usize) -> Result<(), ReplyDraftError> {
        if attempted > self.max_length {
            return Err(ReplyDraftError::LengthExceeded {
                attempted,
                max_length: self.max_length,
            });
        }
        Ok(())
    }
}

/// Errors raised while editing or validating reply drafts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReplyDraftError {
    /// The text would exceed the character limit.
    #[error("reply length {attempted} exceeds limit {max_length}")]
    LengthExceeded {
        /// Character count after the attempted edit.
        attempted: usize,
        /// Configured maximum.
        max_length: usize,
    },
    /// Sending was requested for a blank draft.
    #[error("reply is empty")]
    EmptyDraft,
}
