use crate::common::PendingTask;
use std::time::{Duration, Instant};

pub const MIN_COL_WIDTH: f32 = 80.0;
pub const MIN_COLUMNS: u32 = 12;
pub const MAX_COLUMNS: u32 = 100;
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(120);

/// One column per 80px of width, clamped to `12..=100`.
pub fn columns_for_width(width: f32) -> u32 {
    if !width.is_finite() || width <= 0.0 {
        return MIN_COLUMNS;
    }
    let cols = (width / MIN_COL_WIDTH).floor() as u32;
    cols.clamp(MIN_COLUMNS, MAX_COLUMNS)
}

/// Tracks the grid container width and derives the column count.
///
/// The first usable measurement is applied at once so the first frame is
/// laid out with the right column count; later measurements are coalesced.
#[derive(Debug, Clone)]
pub struct ColumnAdapter {
    width: Option<f32>,
    columns: u32,
    pending: PendingTask<f32>,
    attached: bool,
}

impl Default for ColumnAdapter {
    fn default() -> Self {
        Self::new(RESIZE_DEBOUNCE)
    }
}

impl ColumnAdapter {
    pub fn new(debounce: Duration) -> Self {
        Self {
            width: None,
            columns: MIN_COLUMNS,
            pending: PendingTask::new(debounce),
            attached: true,
        }
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Last applied container width.
    pub fn width(&self) -> Option<f32> {
        self.width
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Record a width measurement. Returns the new column count when it was
    /// applied immediately and changed.
    pub fn observe(&mut self, width: f32, now: Instant) -> Option<u32> {
        if !self.attached || !width.is_finite() || width <= 0.0 {
            return None;
        }
        if self.width.is_none() {
            return self.apply(width);
        }
        if self.width == Some(width) && !self.pending.is_pending() {
            return None;
        }
        self.pending.schedule(width, now);
        None
    }

    /// Apply a coalesced measurement once its window has passed. Returns
    /// the new column count if it changed.
    pub fn poll(&mut self, now: Instant) -> Option<u32> {
        let width = self.pending.poll(now)?;
        self.apply(width)
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending.remaining(now)
    }

    /// Stop observing; drops any pending measurement.
    pub fn detach(&mut self) {
        self.pending.cancel();
        self.attached = false;
    }

    fn apply(&mut self, width: f32) -> Option<u32> {
        self.width = Some(width);
        let columns = columns_for_width(width);
        if columns == self.columns {
            return None;
        }
        tracing::debug!(width, from = self.columns, to = columns, "grid columns changed");
        self.columns = columns;
        Some(columns)
    }
}
