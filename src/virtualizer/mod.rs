//! Windowed row layout for long scrolling lists.
//!
//! [`Virtualizer`] owns the row sizes, the viewport and the scroll offset,
//! and answers which rows intersect the viewport. Unmeasured rows fall back
//! to an estimated size until the host reports their real size through
//! [`Virtualizer::measure`].

mod end_reached;
mod list_view;
mod measurements;
mod overlay;
mod snapshot;

use std::ops::RangeInclusive;

pub use end_reached::EndReached;
pub use list_view::{ListFrame, ListRow, ListSlot, ListView, ListViewOptions};
pub use measurements::{MeasurementCache, RowKey};
pub use overlay::{OverlayGuard, OverlayScope};
pub use snapshot::{
    DEFAULT_SNAPSHOT_DEBOUNCE, SnapshotDebouncer, SnapshotError, SnapshotStore,
    VirtualizerSnapshot,
};

/// Layout options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualizerOptions {
    /// Size assumed for rows that have not been measured.
    pub estimated_size: u32,
    /// Extra rows rendered on each side of the viewport.
    pub overscan: usize,
}

impl Default for VirtualizerOptions {
    fn default() -> Self {
        Self {
            estimated_size: 120,
            overscan: 3,
        }
    }
}

/// One row in the rendered window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualRow {
    /// Logical row index.
    pub index: usize,
    /// Stable row identity.
    pub key: RowKey,
    /// Offset of the row's leading edge.
    pub start: u32,
    /// Row size, measured or estimated.
    pub size: u32,
}

/// Row layout over a scrollable viewport.
#[derive(Debug, Clone)]
pub struct Virtualizer {
    options: VirtualizerOptions,
    keys: Vec<RowKey>,
    starts: Vec<u32>,
    total_size: u32,
    measurements: MeasurementCache,
    viewport: u32,
    scroll_offset: u32,
}

impl Virtualizer {
    /// Creates an empty layout.
    #[must_use]
    pub fn new(options: VirtualizerOptions, viewport: u32) -> Self {
        Self {
            options,
            keys: Vec::new(),
            starts: Vec::new(),
            total_size: 0,
            measurements: MeasurementCache::new(),
            viewport,
            scroll_offset: 0,
        }
    }

    /// Layout options in effect.
    #[must_use]
    pub const fn options(&self) -> VirtualizerOptions {
        self.options
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true when there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sum of all row sizes.
    #[must_use]
    pub const fn total_size(&self) -> u32 {
        self.total_size
    }

    /// Current scroll offset.
    #[must_use]
    pub const fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    /// Viewport size.
    #[must_use]
    pub const fn viewport(&self) -> u32 {
        self.viewport
    }

    /// Measured sizes.
    #[must_use]
    pub const fn measurements(&self) -> &MeasurementCache {
        &self.measurements
    }

    /// Replaces the measurement cache, typically from a snapshot.
    pub fn set_measurements(&mut self, measurements: MeasurementCache) {
        self.measurements = measurements;
        self.relayout();
    }

    /// Replaces the row set.
    ///
    /// Measurements are keyed by row identity, so rows that move keep their
    /// size.
    pub fn set_rows(&mut self, keys: Vec<RowKey>) {
        self.keys = keys;
        self.relayout();
    }

    /// Largest reachable scroll offset.
    #[must_use]
    pub const fn max_scroll_offset(&self) -> u32 {
        self.total_size.saturating_sub(self.viewport)
    }

    /// Scrolls to `offset`, clamped to the scrollable range.
    pub fn set_scroll_offset(&mut self, offset: u32) {
        self.scroll_offset = offset.min(self.max_scroll_offset());
    }

    /// Resizes the viewport.
    pub fn set_viewport(&mut self, viewport: u32) {
        self.viewport = viewport;
        self.clamp_scroll();
    }

    /// Records the rendered size of the row at `index`.
    ///
    /// When the row starts above the scroll offset the offset moves by the
    /// size change so the content in view does not jump. Returns false when
    /// the index is out of range or the size is unchanged.
    pub fn measure(&mut self, index: usize, size: u32) -> bool {
        let Some(key) = self.keys.get(index).cloned() else {
            return false;
        };
        let previous = self.size_of(index);
        if previous == size && self.measurements.get(&key).is_some() {
            return false;
        }
        let start = self.start_of(index).unwrap_or(0);
        self.measurements.record(key, size);
        self.relayout();

        if start < self.scroll_offset {
            let shifted = if size >= previous {
                self.scroll_offset.saturating_add(size - previous)
            } else {
                self.scroll_offset.saturating_sub(previous - size)
            };
            self.set_scroll_offset(shifted);
        }
        true
    }

    /// Offset of the row at `index`.
    #[must_use]
    pub fn start_of(&self, index: usize) -> Option<u32> {
        self.starts.get(index).copied()
    }

    /// Size of the row at `index`, measured or estimated.
    #[must_use]
    pub fn size_of(&self, index: usize) -> u32 {
        self.keys
            .get(index)
            .and_then(|key| self.measurements.get(key))
            .unwrap_or(self.options.estimated_size)
    }

    /// Rows intersecting the viewport, without overscan.
    #[must_use]
    pub fn visible_range(&self) -> Option<RangeInclusive<usize>> {
        if self.keys.is_empty() {
            return None;
        }
        let last_index = self.keys.len() - 1;
        let first = self
            .starts
            .partition_point(|start| *start <= self.scroll_offset)
            .saturating_sub(1)
            .min(last_index);
        let end = self.scroll_offset.saturating_add(self.viewport);
        let last = self
            .starts
            .partition_point(|start| *start < end)
            .saturating_sub(1)
            .clamp(first, last_index);
        Some(first..=last)
    }

    /// Rows to render: the visible range widened by the overscan.
    #[must_use]
    pub fn virtual_rows(&self) -> Vec<VirtualRow> {
        let Some(visible) = self.visible_range() else {
            return Vec::new();
        };
        let last_index = self.keys.len().saturating_sub(1);
        let first = visible.start().saturating_sub(self.options.overscan);
        let last = visible
            .end()
            .saturating_add(self.options.overscan)
            .min(last_index);

        (first..=last)
            .filter_map(|index| {
                let key = self.keys.get(index)?.clone();
                let start = self.start_of(index)?;
                Some(VirtualRow {
                    index,
                    key,
                    start,
                    size: self.size_of(index),
                })
            })
            .collect()
    }

    fn relayout(&mut self) {
        let mut offset: u32 = 0;
        let mut starts = Vec::with_capacity(self.keys.len());
        for index in 0..self.keys.len() {
            starts.push(offset);
            offset = offset.saturating_add(self.size_of(index));
        }
        self.starts = starts;
        self.total_size = offset;
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
    }
}
