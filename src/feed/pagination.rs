//! Pagination cursor for page-numbered list endpoints.
//!
//! The cursor tracks the next page to request and whether the server may
//! still have more. Exhaustion is sticky: once a page comes back empty or a
//! request fails, only an explicit [`PageCursor::reset`] re-enables loading.

/// Current position within a paginated list.
///
/// # Example
///
/// ```
/// use blogify::feed::PageCursor;
///
/// let mut cursor = PageCursor::new();
/// assert_eq!(cursor.page_number(), 0);
///
/// cursor.advance();
/// assert_eq!(cursor.page_number(), 1);
///
/// cursor.exhaust();
/// assert!(!cursor.has_more());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    /// Next page to request (0-based).
    page_number: u32,
    /// Whether the server may have more pages.
    has_more: bool,
}

impl PageCursor {
    /// Creates a cursor positioned before the first page.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            page_number: 0,
            has_more: true,
        }
    }

    /// Creates a cursor at an arbitrary position, e.g. when restoring state.
    #[must_use]
    pub const fn at(page_number: u32, has_more: bool) -> Self {
        Self {
            page_number,
            has_more,
        }
    }

    /// Returns the next page number to request.
    #[must_use]
    pub const fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Returns true while further pages may exist.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Moves past a page that was loaded successfully.
    pub const fn advance(&mut self) {
        self.page_number = self.page_number.saturating_add(1);
    }

    /// Stops pagination until the cursor is reset.
    pub const fn exhaust(&mut self) {
        self.has_more = false;
    }

    /// Returns to the first page with pagination re-enabled.
    pub const fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::PageCursor;

    #[test]
    fn exhaustion_survives_advance() {
        let mut cursor = PageCursor::new();
        cursor.exhaust();
        cursor.advance();

        assert!(!cursor.has_more());
        assert_eq!(cursor.page_number(), 1);
    }

    #[test]
    fn reset_restores_first_page() {
        let mut cursor = PageCursor::at(4, false);
        cursor.reset();

        assert_eq!(cursor, PageCursor::new());
    }
}
