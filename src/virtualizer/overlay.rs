//! Overlay scope that freezes list rendering while a modal is open.

use std::cell::Cell;
use std::rc::Rc;

/// Tracks open overlays covering a list.
///
/// Clones share the same counter, so a list view and the overlays it hosts
/// can each hold one.
#[derive(Debug, Clone, Default)]
pub struct OverlayScope {
    depth: Rc<Cell<usize>>,
}

impl OverlayScope {
    /// Creates a scope with no overlays open.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an overlay. It stays open until the guard is dropped.
    pub fn open(&self) -> OverlayGuard {
        self.depth.set(self.depth.get().saturating_add(1));
        OverlayGuard {
            depth: Rc::clone(&self.depth),
        }
    }

    /// Returns true while at least one overlay is open.
    #[must_use]
    pub fn is_covered(&self) -> bool {
        self.depth.get() > 0
    }

    /// Number of overlays currently open.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth.get()
    }
}

/// Scroll lock held by an open overlay.
#[derive(Debug)]
#[must_use = "the overlay closes as soon as the guard is dropped"]
pub struct OverlayGuard {
    depth: Rc<Cell<usize>>,
}

impl Drop for OverlayGuard {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
