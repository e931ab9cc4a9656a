use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const MARKOV_CHAINS: &str = "markov-chains";
pub const VOLATILITY_GARCH: &str = "volatility-garch";
pub const CANDLESTICK_CHART: &str = "candlestick-chart";

/// Largest column or row edge a stored placement may reach. Records beyond
/// it are treated as corrupt.
pub const MAX_GRID_EXTENT: u32 = 10_000;

fn default_min() -> u32 {
    1
}

/// Position and size of one widget on the grid, in grid cells.
///
/// Serialized with the field names used by the persisted record:
/// `{ "i", "x", "y", "w", "h", "minW", "minH" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetPlacement {
    #[serde(rename = "i")]
    pub id: String,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    #[serde(rename = "minW", default = "default_min")]
    pub min_w: u32,
    #[serde(rename = "minH", default = "default_min")]
    pub min_h: u32,
}

pub type Layout = Vec<WidgetPlacement>;

impl WidgetPlacement {
    pub fn new(id: impl Into<String>, x: u32, y: u32, size: DefaultSize) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w: size.w,
            h: size.h,
            min_w: size.min_w,
            min_h: size.min_h,
        }
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    /// Whether the placement's far edges stay within [`MAX_GRID_EXTENT`].
    pub fn within_bounds(&self) -> bool {
        self.right() <= MAX_GRID_EXTENT
            && self.bottom() <= MAX_GRID_EXTENT
            && self.min_w <= MAX_GRID_EXTENT
            && self.min_h <= MAX_GRID_EXTENT
    }

    /// Rectangle intersection; touching edges do not count.
    pub fn overlaps(&self, other: &WidgetPlacement) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Initial size for a widget, derived from its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultSize {
    pub w: u32,
    pub h: u32,
    pub min_w: u32,
    pub min_h: u32,
}

/// Default size for a new widget. The first matching id fragment wins.
pub fn default_size(id: &str, cols: u32) -> DefaultSize {
    let cols = cols.max(1);
    let size = if id.contains(MARKOV_CHAINS) {
        DefaultSize {
            w: cols,
            h: 14,
            min_w: 2,
            min_h: 3,
        }
    } else if id.contains(VOLATILITY_GARCH) || id.contains(CANDLESTICK_CHART) {
        DefaultSize {
            w: cols * 67 / 100,
            h: 10,
            min_w: 2,
            min_h: 3,
        }
    } else {
        DefaultSize {
            w: cols / 4,
            h: 3,
            min_w: 2,
            min_h: 2,
        }
    };
    DefaultSize {
        w: size.w.max(size.min_w),
        ..size
    }
}

/// Lowest occupied row boundary, `max(y + h)`, or 0 for an empty layout.
pub fn max_bottom(layout: &[WidgetPlacement]) -> u32 {
    layout.iter().map(WidgetPlacement::bottom).max().unwrap_or(0)
}

/// Whether `candidate` overlaps any placement other than itself.
pub fn collides(layout: &[WidgetPlacement], candidate: &WidgetPlacement) -> bool {
    layout
        .iter()
        .any(|p| p.id != candidate.id && p.overlaps(candidate))
}

/// Drop duplicate ids (first wins) and raise sizes to their minimums.
pub fn sanitize(layout: Layout) -> Layout {
    let mut seen = HashSet::new();
    layout
        .into_iter()
        .filter(|p| seen.insert(p.id.clone()))
        .map(|mut p| {
            p.w = p.w.max(p.min_w).max(1);
            p.h = p.h.max(p.min_h).max(1);
            p
        })
        .collect()
}

/// Placements for widgets that have none yet.
///
/// Everything is stacked from `max_bottom(existing)` down. Candlestick
/// charts are centered; other widgets take quarter-width slots that wrap
/// row by row. A new placement is pushed below any earlier new placement
/// sharing its columns, so a batch never overlaps itself.
pub fn synthesize<S: AsRef<str>>(
    existing: &[WidgetPlacement],
    new_ids: &[S],
    cols: u32,
) -> Vec<WidgetPlacement> {
    let cols = cols.max(1);
    let base_y = max_bottom(existing);
    let slot = (cols / 4).max(1);
    let mut out: Vec<WidgetPlacement> = Vec::with_capacity(new_ids.len());

    for (index, id) in new_ids.iter().enumerate() {
        let id = id.as_ref();
        let size = default_size(id, cols);
        let x = if id.contains(CANDLESTICK_CHART) {
            cols.saturating_sub(size.w) / 2
        } else {
            (index as u32 * slot) % cols
        };
        let x = x.min(cols.saturating_sub(size.w));
        let mut placement = WidgetPlacement::new(id, x, base_y, size);
        for prev in &out {
            let shares_columns = placement.x < prev.right() && prev.x < placement.right();
            if shares_columns {
                placement.y = placement.y.max(prev.bottom());
            }
        }
        out.push(placement);
    }
    out
}

/// Outcome of merging a persisted layout with the live widget set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub layout: Layout,
    pub pruned: Vec<String>,
    pub added: Vec<String>,
    pub from_storage: bool,
}

impl Reconciliation {
    /// Whether the result differs from what storage holds.
    pub fn differs_from_storage(&self) -> bool {
        !self.from_storage || !self.pruned.is_empty() || !self.added.is_empty()
    }
}

/// Merge `base` with the live widget ids.
///
/// Placements without a live widget are pruned; live widgets without a
/// placement get a synthesized one. `None` yields the default layout.
pub fn reconcile<S: AsRef<str>>(base: Option<Layout>, live_ids: &[S], cols: u32) -> Reconciliation {
    let from_storage = base.is_some();
    let live: HashSet<&str> = live_ids.iter().map(AsRef::as_ref).collect();

    let mut kept = Vec::new();
    let mut pruned = Vec::new();
    for placement in sanitize(base.unwrap_or_default()) {
        if live.contains(placement.id.as_str()) {
            kept.push(placement);
        } else {
            pruned.push(placement.id);
        }
    }

    let placed: HashSet<String> = kept.iter().map(|p| p.id.clone()).collect();
    let mut seen = HashSet::new();
    let added: Vec<String> = live_ids
        .iter()
        .map(AsRef::as_ref)
        .filter(|id| !placed.contains(*id) && seen.insert(*id))
        .map(str::to_string)
        .collect();

    if !pruned.is_empty() {
        tracing::debug!(?pruned, "pruned stale placements");
    }
    let synthesized = synthesize(&kept, &added, cols);
    kept.extend(synthesized);

    Reconciliation {
        layout: kept,
        pruned,
        added,
        from_storage,
    }
}

/// Layout used when nothing is persisted.
pub fn default_layout<S: AsRef<str>>(live_ids: &[S], cols: u32) -> Layout {
    reconcile(None, live_ids, cols).layout
}

/// Clamp placements into `cols` columns and resolve any overlap this
/// creates by moving later placements down. Returns `None` when nothing
/// had to move.
pub fn fit_to_columns(layout: &[WidgetPlacement], cols: u32) -> Option<Layout> {
    let cols = cols.max(1);
    let mut fitted: Layout = layout.to_vec();
    for p in &mut fitted {
        p.w = p.w.min(cols).max(p.min_w.min(cols)).max(1);
        p.x = p.x.min(cols - p.w);
    }
    resolve_overlaps(&mut fitted);
    (fitted.as_slice() != layout).then_some(fitted)
}

/// Move each placement below any earlier placement it overlaps.
pub fn resolve_overlaps(layout: &mut [WidgetPlacement]) {
    for i in 1..layout.len() {
        loop {
            let (earlier, rest) = layout.split_at_mut(i);
            let current = &mut rest[0];
            match earlier.iter().find(|p| p.overlaps(current)) {
                Some(blocker) => current.y = blocker.bottom(),
                None => break,
            }
        }
    }
}
