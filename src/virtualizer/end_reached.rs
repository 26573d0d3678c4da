//! Edge-triggered "load the next page" signal.

/// Decides when scrolling has reached the end of the loaded items.
///
/// The signal fires once per threshold crossing: after firing it stays
/// latched for the current item count and re-arms when more items arrive or
/// the viewport leaves the end of the list. The very first crossing after
/// mount is swallowed, because the list's own initial load is already
/// running at that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndReached {
    suppress_next: bool,
    latched_at: Option<usize>,
}

impl Default for EndReached {
    fn default() -> Self {
        Self::new()
    }
}

impl EndReached {
    /// Creates a trigger that swallows its first crossing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            suppress_next: true,
            latched_at: None,
        }
    }

    /// Creates a trigger without initial suppression.
    #[must_use]
    pub const fn armed() -> Self {
        Self {
            suppress_next: false,
            latched_at: None,
        }
    }

    /// Evaluates one tick.
    ///
    /// `last_visible` is the index of the last visible data item, if any.
    /// Returns true exactly when the caller should request the next page.
    pub fn evaluate(
        &mut self,
        last_visible: Option<usize>,
        item_count: usize,
        loading: bool,
        has_more: bool,
    ) -> bool {
        let at_end = match (item_count, last_visible) {
            (0, _) => true,
            (_, Some(index)) => index.saturating_add(1) >= item_count,
            (_, None) => false,
        };

        if !at_end {
            self.latched_at = None;
            return false;
        }

        if self.suppress_next {
            self.suppress_next = false;
            self.latched_at = Some(item_count);
            return false;
        }

        if loading || !has_more || self.latched_at == Some(item_count) {
            return false;
        }

        self.latched_at = Some(item_count);
        true
    }
}
