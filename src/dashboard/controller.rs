use crate::common::PendingTask;
use crate::dashboard::columns::ColumnAdapter;
use crate::dashboard::layout::{self, Layout, WidgetPlacement};
use crate::dashboard::store::LayoutStore;
use std::time::{Duration, Instant};

pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Drag,
    Resize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Interacting(Gesture),
    PendingSave,
}

/// Input from the grid surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    DragStart,
    ResizeStart,
    /// Live layout report. Ignored while a gesture is in progress.
    LayoutChange(Layout),
    DragStop(Layout),
    ResizeStop(Layout),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { storage_key: String, placements: usize },
    Skipped { storage_key: String },
}

/// Owns the live layout for one mounted grid.
///
/// Reconciles placements against the widget set, runs the drag/resize
/// lifecycle and debounces writes to the [`LayoutStore`]. Time is passed in
/// by the caller; nothing here blocks or spawns.
pub struct GridController {
    storage_key: String,
    store: LayoutStore,
    layout: Layout,
    item_ids: Vec<String>,
    synced: bool,
    state: InteractionState,
    editable: bool,
    mounted: bool,
    refit_after_gesture: bool,
    save_task: PendingTask<(String, Layout)>,
    columns: ColumnAdapter,
}

impl GridController {
    pub fn new(storage_key: impl Into<String>, store: LayoutStore) -> Self {
        Self {
            storage_key: storage_key.into(),
            store,
            layout: Vec::new(),
            item_ids: Vec::new(),
            synced: false,
            state: InteractionState::Idle,
            editable: true,
            mounted: true,
            refit_after_gesture: false,
            save_task: PendingTask::new(SAVE_DEBOUNCE),
            columns: ColumnAdapter::default(),
        }
    }

    pub fn with_column_adapter(mut self, columns: ColumnAdapter) -> Self {
        self.columns = columns;
        self
    }

    pub fn layout(&self) -> &[WidgetPlacement] {
        &self.layout
    }

    pub fn placement(&self, id: &str) -> Option<&WidgetPlacement> {
        self.layout.iter().find(|p| p.id == id)
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn columns(&self) -> u32 {
        self.columns.columns()
    }

    pub fn container_width(&self) -> Option<f32> {
        self.columns.width()
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn has_pending_save(&self) -> bool {
        self.save_task.is_pending()
    }

    /// Switch to a different storage key. A save pending for the old key is
    /// written out first; the next [`sync_items`](Self::sync_items) reloads.
    pub fn set_storage_key(&mut self, key: impl Into<String>) {
        let key = key.into();
        if key == self.storage_key {
            return;
        }
        if let Some((old_key, pending)) = self.save_task.peek().cloned() {
            self.save_task.cancel();
            self.store.save(&old_key, &pending);
        }
        self.storage_key = key;
        self.synced = false;
        self.state = InteractionState::Idle;
    }

    /// Reconcile against the live widget ids. Does nothing when the id list
    /// is unchanged since the last call. Returns whether reconciliation ran.
    ///
    /// The first sync after mount (or a key change) starts from storage;
    /// later ones start from the in-memory layout, which already carries any
    /// change still waiting for its save.
    pub fn sync_items<S: AsRef<str>>(&mut self, ids: &[S], now: Instant) -> bool {
        if !self.mounted {
            return false;
        }
        let same = self.synced
            && self.item_ids.len() == ids.len()
            && self.item_ids.iter().zip(ids).all(|(a, b)| a.as_str() == b.as_ref());
        if same {
            return false;
        }

        let base = if self.synced {
            Some(std::mem::take(&mut self.layout))
        } else {
            self.store.load(&self.storage_key)
        };
        let result = layout::reconcile(base, ids, self.columns.columns());
        let needs_save = result.differs_from_storage();
        tracing::debug!(
            key = %self.storage_key,
            added = result.added.len(),
            pruned = result.pruned.len(),
            "reconciled layout"
        );

        self.layout = result.layout;
        self.item_ids = ids.iter().map(|s| s.as_ref().to_string()).collect();
        self.synced = true;
        if needs_save && !matches!(self.state, InteractionState::Interacting(_)) {
            self.schedule_save(now);
        }
        true
    }

    /// Enable or disable drag and resize. Disabling mid-gesture abandons the
    /// gesture without committing anything.
    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
        if !editable {
            if let InteractionState::Interacting(_) = self.state {
                self.state = InteractionState::Idle;
            }
        }
    }

    /// Feed one surface event through the interaction lifecycle. Returns
    /// whether the committed layout or state changed.
    pub fn handle(&mut self, event: GridEvent, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }
        match event {
            GridEvent::DragStart => self.begin(Gesture::Drag),
            GridEvent::ResizeStart => self.begin(Gesture::Resize),
            GridEvent::LayoutChange(next) => {
                if let InteractionState::Interacting(_) = self.state {
                    return false;
                }
                self.commit(next, now);
                true
            }
            GridEvent::DragStop(next) | GridEvent::ResizeStop(next) => {
                if !self.editable {
                    return false;
                }
                self.commit(next, now);
                if self.refit_after_gesture {
                    self.refit_after_gesture = false;
                    self.refit(now);
                }
                true
            }
        }
    }

    /// Report the container width. Returns the new column count if it
    /// changed right away.
    pub fn observe_width(&mut self, width: f32, now: Instant) -> Option<u32> {
        if !self.mounted {
            return None;
        }
        let changed = self.columns.observe(width, now);
        if changed.is_some() {
            self.refit(now);
        }
        changed
    }

    /// Fire whatever deferred work is due: a coalesced column change and the
    /// debounced save.
    pub fn poll(&mut self, now: Instant) -> Option<SaveOutcome> {
        if !self.mounted {
            return None;
        }
        if self.columns.poll(now).is_some() {
            self.refit(now);
        }
        let (key, pending) = self.save_task.poll(now)?;
        if self.state == InteractionState::PendingSave {
            self.state = InteractionState::Idle;
        }
        if self.store.save(&key, &pending) {
            Some(SaveOutcome::Saved {
                storage_key: key,
                placements: pending.len(),
            })
        } else {
            Some(SaveOutcome::Skipped { storage_key: key })
        }
    }

    /// Time until the next deferred action, for scheduling a repaint.
    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        match (self.save_task.remaining(now), self.columns.remaining(now)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Cancel all deferred work and stop reacting to events.
    pub fn unmount(&mut self) {
        if self.save_task.cancel() {
            tracing::debug!(key = %self.storage_key, "pending layout save cancelled on unmount");
        }
        self.columns.detach();
        self.state = InteractionState::Idle;
        self.mounted = false;
    }

    fn begin(&mut self, gesture: Gesture) -> bool {
        if !self.editable {
            return false;
        }
        self.save_task.cancel();
        self.state = InteractionState::Interacting(gesture);
        true
    }

    fn commit(&mut self, next: Layout, now: Instant) {
        self.layout = layout::sanitize(next);
        self.schedule_save(now);
    }

    fn schedule_save(&mut self, now: Instant) {
        self.save_task
            .schedule((self.storage_key.clone(), self.layout.clone()), now);
        self.state = InteractionState::PendingSave;
    }

    fn refit(&mut self, now: Instant) {
        if let InteractionState::Interacting(_) = self.state {
            self.refit_after_gesture = true;
            return;
        }
        if let Some(fitted) = layout::fit_to_columns(&self.layout, self.columns.columns()) {
            self.handle(GridEvent::LayoutChange(fitted), now);
        }
    }
}

impl Drop for GridController {
    fn drop(&mut self) {
        if self.mounted {
            self.unmount();
        }
    }
}
