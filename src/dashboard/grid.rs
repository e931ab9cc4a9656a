use crate::dashboard::controller::{Gesture, GridController, GridEvent, SaveOutcome};
use crate::dashboard::layout::{self, Layout, WidgetPlacement};
use crate::dashboard::store::LayoutStore;
use crate::dashboard::widgets::{Widget, WidgetContext};
use eframe::egui;
use std::time::Instant;

pub const ROW_HEIGHT: f32 = 50.0;
pub const MARGIN: f32 = 16.0;
/// The grid never gets narrower than this so widgets can be placed freely;
/// the surrounding scroll area covers the overflow.
pub const MIN_GRID_WIDTH: f32 = 2000.0;
const HANDLE_SIZE: f32 = 16.0;
const EXTRA_ROWS: u32 = 4;

/// Pixel geometry of the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub origin: egui::Pos2,
    pub width: f32,
    pub cols: u32,
}

impl GridMetrics {
    pub fn new(origin: egui::Pos2, width: f32, cols: u32) -> Self {
        Self {
            origin,
            width,
            cols: cols.max(1),
        }
    }

    pub fn col_width(&self) -> f32 {
        let gaps = MARGIN * (self.cols - 1) as f32;
        ((self.width - gaps) / self.cols as f32).max(1.0)
    }

    pub fn cell_rect(&self, p: &WidgetPlacement) -> egui::Rect {
        let cw = self.col_width();
        let min = self.origin
            + egui::vec2(
                p.x as f32 * (cw + MARGIN),
                p.y as f32 * (ROW_HEIGHT + MARGIN),
            );
        let w = p.w.max(1) as f32;
        let h = p.h.max(1) as f32;
        let size = egui::vec2(
            w * cw + (w - 1.0) * MARGIN,
            h * ROW_HEIGHT + (h - 1.0) * MARGIN,
        );
        egui::Rect::from_min_size(min, size)
    }

    /// Pointer travel converted to whole grid cells.
    pub fn cells_for_delta(&self, delta: egui::Vec2) -> (i64, i64) {
        let dx = (delta.x / (self.col_width() + MARGIN)).round() as i64;
        let dy = (delta.y / (ROW_HEIGHT + MARGIN)).round() as i64;
        (dx, dy)
    }

    pub fn content_height(&self, rows: u32) -> f32 {
        rows as f32 * (ROW_HEIGHT + MARGIN)
    }
}

/// A gesture in progress on the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveGesture {
    id: String,
    kind: Gesture,
    origin: WidgetPlacement,
    last_valid: WidgetPlacement,
}

impl ActiveGesture {
    fn new(kind: Gesture, origin: &WidgetPlacement) -> Self {
        Self {
            id: origin.id.clone(),
            kind,
            origin: origin.clone(),
            last_valid: origin.clone(),
        }
    }
}

/// Placement a gesture would produce after moving `cells` from `origin`.
pub fn gesture_candidate(
    kind: Gesture,
    origin: &WidgetPlacement,
    cells: (i64, i64),
    cols: u32,
) -> WidgetPlacement {
    let cols = i64::from(cols.max(1));
    let (dx, dy) = cells;
    let mut p = origin.clone();
    match kind {
        Gesture::Drag => {
            let max_x = (cols - i64::from(p.w)).max(0);
            p.x = (i64::from(origin.x) + dx).clamp(0, max_x) as u32;
            p.y = (i64::from(origin.y) + dy).max(0) as u32;
        }
        Gesture::Resize => {
            let max_w = (cols - i64::from(p.x)).max(1);
            let min_w = i64::from(p.min_w.max(1)).min(max_w);
            p.w = (i64::from(origin.w) + dx).clamp(min_w, max_w) as u32;
            p.h = (i64::from(origin.h) + dy).max(i64::from(p.min_h.max(1))) as u32;
        }
    }
    p
}

fn with_placement(layout: &[WidgetPlacement], placement: &WidgetPlacement) -> Layout {
    layout
        .iter()
        .map(|p| {
            if p.id == placement.id {
                placement.clone()
            } else {
                p.clone()
            }
        })
        .collect()
}

/// One renderable entry handed to the grid by the dashboard.
pub struct GridItem {
    pub id: String,
    pub title: String,
    pub widget: Box<dyn Widget>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GridOutput {
    pub saved: Option<SaveOutcome>,
    pub close_requested: Option<String>,
}

/// egui surface that places widgets by their layout and turns pointer
/// gestures into [`GridEvent`]s for the controller.
pub struct DashboardGrid {
    controller: GridController,
    gesture: Option<ActiveGesture>,
    offsets: egui::Vec2,
}

impl DashboardGrid {
    pub fn new(storage_key: impl Into<String>, store: LayoutStore) -> Self {
        Self {
            controller: GridController::new(storage_key, store),
            gesture: None,
            offsets: egui::Vec2::ZERO,
        }
    }

    pub fn controller(&self) -> &GridController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut GridController {
        &mut self.controller
    }

    pub fn unmount(&mut self) {
        self.gesture = None;
        self.controller.unmount();
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        items: &mut [GridItem],
        editable: bool,
        widget_ctx: &WidgetContext<'_>,
    ) -> GridOutput {
        let now = Instant::now();
        self.controller.set_editable(editable);
        if !editable {
            self.gesture = None;
        }

        let container_width = ui.available_width();
        self.controller.observe_width(container_width, now);
        let ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
        self.controller.sync_items(&ids, now);
        let saved = self.controller.poll(now);

        let mut events = Vec::new();
        let mut close_requested = None;
        egui::ScrollArea::both()
            .id_source("dashboard-grid-scroll")
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                self.paint_items(
                    ui,
                    items,
                    editable,
                    widget_ctx,
                    container_width,
                    &mut events,
                    &mut close_requested,
                );
            });

        let now = Instant::now();
        for event in events {
            self.controller.handle(event, now);
        }
        if let Some(wait) = self.controller.next_wakeup(now) {
            ui.ctx().request_repaint_after(wait);
        }

        GridOutput {
            saved,
            close_requested,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn paint_items(
        &mut self,
        ui: &mut egui::Ui,
        items: &mut [GridItem],
        editable: bool,
        widget_ctx: &WidgetContext<'_>,
        container_width: f32,
        events: &mut Vec<GridEvent>,
        close_requested: &mut Option<String>,
    ) {
        let committed: Layout = self.controller.layout().to_vec();
        let grid_width = container_width.max(MIN_GRID_WIDTH);
        let probe = GridMetrics::new(egui::Pos2::ZERO, grid_width, self.controller.columns());
        let preview = self.gesture.as_ref().map(|g| {
            let cells = probe.cells_for_delta(self.offsets);
            gesture_candidate(g.kind, &g.origin, cells, probe.cols)
        });
        let rows = layout::max_bottom(&committed)
            .max(preview.as_ref().map_or(0, WidgetPlacement::bottom))
            + EXTRA_ROWS;
        let (rect, _) = ui.allocate_exact_size(
            egui::vec2(grid_width, probe.content_height(rows)),
            egui::Sense::hover(),
        );
        let metrics = GridMetrics::new(rect.min, grid_width, self.controller.columns());

        if let Some(gesture) = &self.gesture {
            let ghost = metrics.cell_rect(&gesture.last_valid);
            ui.painter().rect_filled(
                ghost,
                4.0,
                ui.visuals().selection.bg_fill.gamma_multiply(0.3),
            );
        }

        // The item under an active gesture is drawn last so it stays on top.
        let active_id = self.gesture.as_ref().map(|g| g.id.clone());
        let mut order: Vec<usize> = (0..items.len()).collect();
        if let Some(active) = &active_id {
            order.sort_by_key(|&i| items[i].id == *active);
        }

        for idx in order {
            let item = &mut items[idx];
            let placement = match (&preview, &active_id) {
                (Some(p), Some(active)) if *active == item.id => p.clone(),
                _ => match committed.iter().find(|p| p.id == item.id) {
                    Some(p) => p.clone(),
                    None => continue,
                },
            };
            let card_rect = metrics.cell_rect(&placement);
            let clip = card_rect.intersect(ui.clip_rect());
            ui.allocate_ui_at_rect(card_rect, |ui| {
                ui.set_clip_rect(clip);
                ui.set_min_size(card_rect.size());
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.set_min_size(ui.available_size());
                    ui.horizontal(|ui| {
                        if editable {
                            ui.add_space(HANDLE_SIZE + 2.0);
                        }
                        ui.strong(&item.title);
                        item.widget.header_ui(ui, widget_ctx);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("✕").on_hover_text("Close card").clicked() {
                                *close_requested = Some(item.id.clone());
                            }
                        });
                    });
                    ui.separator();
                    item.widget.render(ui, widget_ctx);
                });
            });

            if !editable {
                continue;
            }
            let drag_rect = egui::Rect::from_min_size(
                card_rect.min + egui::vec2(6.0, 6.0),
                egui::vec2(HANDLE_SIZE, HANDLE_SIZE),
            );
            let resize_rect = egui::Rect::from_min_size(
                card_rect.max - egui::vec2(HANDLE_SIZE, HANDLE_SIZE),
                egui::vec2(HANDLE_SIZE, HANDLE_SIZE),
            );
            let drag_id = egui::Id::new(("grid-drag", &item.id));
            let resize_id = egui::Id::new(("grid-resize", &item.id));
            let drag = ui
                .interact(drag_rect, drag_id, egui::Sense::drag())
                .on_hover_cursor(egui::CursorIcon::Grab);
            let resize = ui
                .interact(resize_rect, resize_id, egui::Sense::drag())
                .on_hover_cursor(egui::CursorIcon::ResizeNwSe);
            paint_handles(ui, drag_rect, resize_rect);

            let committed_placement = committed.iter().find(|p| p.id == item.id);
            for (response, kind) in [(drag, Gesture::Drag), (resize, Gesture::Resize)] {
                if response.drag_started() && self.gesture.is_none() {
                    if let Some(origin) = committed_placement {
                        self.gesture = Some(ActiveGesture::new(kind, origin));
                        self.offsets = egui::Vec2::ZERO;
                        events.push(match kind {
                            Gesture::Drag => GridEvent::DragStart,
                            Gesture::Resize => GridEvent::ResizeStart,
                        });
                    }
                }
                let Some(gesture) = self.gesture.as_mut() else {
                    continue;
                };
                if gesture.id != item.id || gesture.kind != kind {
                    continue;
                }
                if response.dragged() {
                    self.offsets += response.drag_delta();
                    let candidate = gesture_candidate(
                        kind,
                        &gesture.origin,
                        metrics.cells_for_delta(self.offsets),
                        metrics.cols,
                    );
                    if !layout::collides(&committed, &candidate) {
                        gesture.last_valid = candidate.clone();
                    }
                    events.push(GridEvent::LayoutChange(with_placement(&committed, &candidate)));
                }
                if response.drag_stopped() {
                    let settled = with_placement(&committed, &gesture.last_valid);
                    events.push(match kind {
                        Gesture::Drag => GridEvent::DragStop(settled),
                        Gesture::Resize => GridEvent::ResizeStop(settled),
                    });
                    self.gesture = None;
                    self.offsets = egui::Vec2::ZERO;
                }
            }
        }
    }
}

fn paint_handles(ui: &egui::Ui, drag_rect: egui::Rect, resize_rect: egui::Rect) {
    let painter = ui.painter();
    let color = ui.visuals().weak_text_color();
    painter.text(
        drag_rect.center(),
        egui::Align2::CENTER_CENTER,
        "⠿",
        egui::FontId::proportional(HANDLE_SIZE),
        color,
    );
    for i in 1..=3 {
        let inset = i as f32 * 4.0;
        painter.line_segment(
            [
                egui::pos2(resize_rect.right() - inset, resize_rect.bottom() - 2.0),
                egui::pos2(resize_rect.right() - 2.0, resize_rect.bottom() - inset),
            ],
            egui::Stroke::new(1.0, color),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement(x: u32, y: u32, w: u32, h: u32) -> WidgetPlacement {
        WidgetPlacement {
            id: "card".into(),
            x,
            y,
            w,
            h,
            min_w: 2,
            min_h: 3,
        }
    }

    #[test]
    fn cell_rect_includes_margins() {
        let metrics = GridMetrics::new(egui::Pos2::ZERO, 12.0 * 100.0 + 11.0 * MARGIN, 12);
        assert_eq!(metrics.col_width(), 100.0);
        let rect = metrics.cell_rect(&placement(1, 2, 2, 3));
        assert_eq!(rect.min, egui::pos2(100.0 + MARGIN, 2.0 * (ROW_HEIGHT + MARGIN)));
        assert_eq!(rect.width(), 200.0 + MARGIN);
        assert_eq!(rect.height(), 3.0 * ROW_HEIGHT + 2.0 * MARGIN);
    }

    #[test]
    fn drag_candidate_stays_inside_columns() {
        let origin = placement(2, 1, 8, 10);
        let moved = gesture_candidate(Gesture::Drag, &origin, (10, -5), 12);
        assert_eq!((moved.x, moved.y), (4, 0));
        assert_eq!((moved.w, moved.h), (8, 10));
    }

    #[test]
    fn resize_candidate_respects_minimums() {
        let origin = placement(2, 0, 8, 10);
        let shrunk = gesture_candidate(Gesture::Resize, &origin, (-20, -20), 12);
        assert_eq!((shrunk.w, shrunk.h), (2, 3));
        let grown = gesture_candidate(Gesture::Resize, &origin, (20, 2), 12);
        assert_eq!((grown.w, grown.h), (10, 12));
        assert_eq!((grown.x, grown.y), (2, 0));
    }

    #[test]
    fn delta_rounds_to_nearest_cell() {
        let metrics = GridMetrics::new(egui::Pos2::ZERO, 12.0 * 100.0 + 11.0 * MARGIN, 12);
        let step = 100.0 + MARGIN;
        assert_eq!(metrics.cells_for_delta(egui::vec2(step * 0.6, 0.0)), (1, 0));
        let delta = egui::vec2(-step * 1.4, (ROW_HEIGHT + MARGIN) * 2.0);
        assert_eq!(metrics.cells_for_delta(delta), (-1, 2));
    }
}
