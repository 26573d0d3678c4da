//! List component state bound to one logical list.

use std::time::{Duration, Instant};

use tracing::debug;

use super::{
    EndReached, OverlayScope, RowKey, SnapshotDebouncer, SnapshotStore, Virtualizer,
    VirtualizerOptions, VirtualizerSnapshot,
};
use crate::feed::{PaginatedList, skeleton_count};

const CREATE_KEY: &str = "create";

/// What a rendered row holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSlot {
    /// The always-first "create item" slot.
    Create,
    /// The data item at this index.
    Item(usize),
    /// A loading placeholder at the tail.
    Placeholder(usize),
}

/// A row positioned for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    /// Slot rendered in this row.
    pub slot: ListSlot,
    /// Stable row identity.
    pub key: RowKey,
    /// Offset of the row's leading edge.
    pub start: u32,
    /// Row size.
    pub size: u32,
}

/// Everything the host needs to draw one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFrame {
    /// Rows in the rendered window.
    pub rows: Vec<ListRow>,
    /// Total scrollable size.
    pub total_size: u32,
    /// Scroll offset to apply.
    pub scroll_offset: u32,
    /// True when the host should request the next page.
    pub fetch_next: bool,
}

/// Construction options for [`ListView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListViewOptions {
    /// Row layout options.
    pub layout: VirtualizerOptions,
    /// Initial viewport size.
    pub viewport: u32,
    /// Whether the list starts with a create slot.
    pub create_slot: bool,
    /// Quiet period before snapshots are persisted.
    pub snapshot_debounce: Duration,
}

impl Default for ListViewOptions {
    fn default() -> Self {
        Self {
            layout: VirtualizerOptions::default(),
            viewport: 800,
            create_slot: false,
            snapshot_debounce: super::DEFAULT_SNAPSHOT_DEBOUNCE,
        }
    }
}

/// A virtualized list bound to a logical list id.
#[derive(Debug)]
pub struct ListView {
    id: String,
    create_slot: bool,
    virtualizer: Virtualizer,
    end_reached: EndReached,
    item_count: usize,
    placeholder_count: usize,
    frozen: Option<ListFrame>,
    pending_restore: Option<(usize, u32)>,
    debouncer: SnapshotDebouncer,
}

impl ListView {
    /// Creates a fresh list view.
    #[must_use]
    pub fn new(id: impl Into<String>, options: ListViewOptions) -> Self {
        Self {
            id: id.into(),
            create_slot: options.create_slot,
            virtualizer: Virtualizer::new(options.layout, options.viewport),
            end_reached: EndReached::new(),
            item_count: 0,
            placeholder_count: 0,
            frozen: None,
            pending_restore: None,
            debouncer: SnapshotDebouncer::new(options.snapshot_debounce),
        }
    }

    /// Creates a list view seeded from a stored snapshot.
    ///
    /// Measurements apply at once. The scroll offset applies as soon as the
    /// list holds at least as many items as when the snapshot was taken.
    #[must_use]
    pub fn restore(id: impl Into<String>, options: ListViewOptions, store: &SnapshotStore) -> Self {
        let mut view = Self::new(id, options);
        if let Some(snapshot) = store.get(&view.id) {
            debug!(
                list = %view.id,
                count = snapshot.count,
                scroll_offset = snapshot.scroll_offset,
                "restoring list snapshot"
            );
            view.virtualizer
                .set_measurements(snapshot.measurements.clone());
            view.pending_restore = Some((snapshot.count, snapshot.scroll_offset));
        }
        view
    }

    /// Logical list id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Underlying layout.
    #[must_use]
    pub const fn virtualizer(&self) -> &Virtualizer {
        &self.virtualizer
    }

    /// Current scroll offset.
    #[must_use]
    pub const fn scroll_offset(&self) -> u32 {
        self.virtualizer.scroll_offset()
    }

    /// Returns true while an overlay has frozen the frame.
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    /// Replaces the data rows and tail placeholders.
    pub fn sync_rows<I>(&mut self, item_keys: I, placeholders: usize, now: Instant)
    where
        I: IntoIterator<Item = RowKey>,
    {
        let mut keys: Vec<RowKey> = Vec::new();
        if self.create_slot {
            keys.push(RowKey::new(CREATE_KEY));
        }
        keys.extend(item_keys);
        let item_count = keys.len() - usize::from(self.create_slot);
        keys.extend((0..placeholders).map(|index| RowKey::new(format!("placeholder-{index}"))));

        let count_changed = item_count != self.item_count;
        self.item_count = item_count;
        self.placeholder_count = placeholders;
        self.virtualizer.set_rows(keys);

        if let Some((_, offset)) = self
            .pending_restore
            .filter(|(count, _)| item_count >= *count)
        {
            self.virtualizer.set_scroll_offset(offset);
            self.pending_restore = None;
        }
        if count_changed {
            self.schedule_snapshot(now);
        }
    }

    /// Syncs rows from a paginated list.
    ///
    /// Initial loading shows enough skeletons to fill the viewport; loading a
    /// further page shows one placeholder.
    pub fn sync_list(&mut self, list: &PaginatedList, now: Instant) {
        let placeholders = if list.is_initial_loading() {
            skeleton_count(
                self.virtualizer.viewport(),
                self.virtualizer.options().estimated_size,
            )
        } else {
            usize::from(list.is_loading())
        };
        let keys = list
            .items()
            .iter()
            .map(|item| RowKey::new(item.id().as_str()));
        self.sync_rows(keys, placeholders, now);
    }

    /// Handles a scroll event.
    ///
    /// When `overlay` is covered and no frame is frozen yet, the current
    /// window is frozen before the offset moves.
    pub fn scroll_to(&mut self, offset: u32, overlay: &OverlayScope, now: Instant) {
        self.freeze_if_covered(overlay);
        self.virtualizer.set_scroll_offset(offset);
        self.schedule_snapshot(now);
    }

    /// Handles a viewport resize and re-evaluates the end condition.
    ///
    /// Returns true when the host should request the next page. While
    /// `overlay` is covered the window freezes first and nothing is signalled.
    pub fn resize(
        &mut self,
        viewport: u32,
        overlay: &OverlayScope,
        loading: bool,
        has_more: bool,
        now: Instant,
    ) -> bool {
        self.freeze_if_covered(overlay);
        self.virtualizer.set_viewport(viewport);
        self.schedule_snapshot(now);
        if self.frozen.is_some() {
            return false;
        }
        self.evaluate_end(loading, has_more)
    }

    /// Reports the rendered size of the row at logical `index`.
    pub fn measure(&mut self, index: usize, size: u32, now: Instant) {
        if self.virtualizer.measure(index, size) {
            self.schedule_snapshot(now);
        }
    }

    /// Produces the frame for this tick.
    ///
    /// While `overlay` is covered the frame captured when it opened is
    /// returned unchanged. The first frame after release puts the scroll
    /// offset back where it was before the overlay opened.
    pub fn frame(&mut self, overlay: &OverlayScope, loading: bool, has_more: bool) -> ListFrame {
        if let Some(frozen) = self.freeze_if_covered(overlay) {
            return frozen.clone();
        }

        if let Some(frozen) = self.frozen.take() {
            debug!(list = %self.id, scroll_offset = frozen.scroll_offset, "releasing list frame");
            self.virtualizer.set_scroll_offset(frozen.scroll_offset);
        }
        let fetch_next = self.evaluate_end(loading, has_more);
        self.live_frame(fetch_next)
    }

    /// Produces the frame for `list`, reading its loading flags.
    pub fn frame_for(&mut self, list: &PaginatedList, overlay: &OverlayScope) -> ListFrame {
        self.frame(overlay, list.is_loading(), list.has_more())
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> VirtualizerSnapshot {
        let scroll_offset = match (self.pending_restore, &self.frozen) {
            (Some((_, offset)), _) => offset,
            (None, Some(frozen)) => frozen.scroll_offset,
            (None, None) => self.virtualizer.scroll_offset(),
        };
        VirtualizerSnapshot {
            count: self.item_count,
            scroll_offset,
            measurements: self.virtualizer.measurements().clone(),
        }
    }

    /// Persists the pending snapshot once its quiet period has elapsed.
    ///
    /// Returns true when a snapshot was written.
    pub fn poll_persist(&mut self, store: &mut SnapshotStore, now: Instant) -> bool {
        self.debouncer.take_due(now).is_some_and(|snapshot| {
            store.save(self.id.clone(), snapshot);
            true
        })
    }

    /// Persists the current state immediately, as on unmount.
    pub fn persist_now(&mut self, store: &mut SnapshotStore) {
        self.debouncer.flush();
        store.save(self.id.clone(), self.snapshot());
    }

    /// Freezes the live window the first time `overlay` is seen covered.
    ///
    /// Returns the frozen frame while covered.
    fn freeze_if_covered(&mut self, overlay: &OverlayScope) -> Option<&ListFrame> {
        if !overlay.is_covered() {
            return None;
        }
        if self.frozen.is_none() {
            let captured = self.live_frame(false);
            debug!(list = %self.id, scroll_offset = captured.scroll_offset, "freezing list frame");
            self.frozen = Some(captured);
        }
        self.frozen.as_ref()
    }

    fn schedule_snapshot(&mut self, now: Instant) {
        if self.frozen.is_some() || self.pending_restore.is_some() {
            return;
        }
        self.debouncer.schedule(self.snapshot(), now);
    }

    fn evaluate_end(&mut self, loading: bool, has_more: bool) -> bool {
        let last_visible = self.last_visible_item();
        self.end_reached
            .evaluate(last_visible, self.item_count, loading, has_more)
    }

    fn slot_for(&self, index: usize) -> ListSlot {
        let offset = usize::from(self.create_slot);
        if index < offset {
            return ListSlot::Create;
        }
        let item_index = index - offset;
        if item_index < self.item_count {
            ListSlot::Item(item_index)
        } else {
            ListSlot::Placeholder(item_index - self.item_count)
        }
    }

    fn last_visible_item(&self) -> Option<usize> {
        let visible = self.virtualizer.visible_range()?;
        match self.slot_for(*visible.end()) {
            ListSlot::Create => None,
            ListSlot::Item(index) => Some(index),
            ListSlot::Placeholder(_) => self.item_count.checked_sub(1),
        }
    }

    fn live_frame(&self, fetch_next: bool) -> ListFrame {
        let rows = self
            .virtualizer
            .virtual_rows()
            .into_iter()
            .map(|row| ListRow {
                slot: self.slot_for(row.index),
                key: row.key,
                start: row.start,
                size: row.size,
            })
            .collect();
        ListFrame {
            rows,
            total_size: self.virtualizer.total_size(),
            scroll_offset: self.virtualizer.scroll_offset(),
            fetch_next,
        }
    }
}
