use eframe::egui;

/// Maps series indices and values into a plot rectangle.
#[derive(Debug, Clone, Copy)]
pub struct PlotFrame {
    pub rect: egui::Rect,
    pub len: usize,
    pub min: f64,
    pub max: f64,
}

impl PlotFrame {
    pub fn new(rect: egui::Rect, len: usize, min: f64, max: f64) -> Self {
        let (min, max) = if (max - min).abs() < f64::EPSILON {
            (min - 1.0, max + 1.0)
        } else {
            (min, max)
        };
        Self { rect, len, min, max }
    }

    pub fn slot_width(&self) -> f32 {
        self.rect.width() / self.len.max(1) as f32
    }

    /// Horizontal center of the `i`th sample.
    pub fn x(&self, i: usize) -> f32 {
        self.rect.left() + self.slot_width() * (i as f32 + 0.5)
    }

    pub fn y(&self, value: f64) -> f32 {
        let t = ((value - self.min) / (self.max - self.min)) as f32;
        self.rect.bottom() - t.clamp(0.0, 1.0) * self.rect.height()
    }
}

/// Padded min/max over an iterator of values.
pub fn value_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = (max - min) * 0.05;
    (min - pad, max + pad)
}

/// Reserve the remaining space of `ui` for a chart and return its painter
/// and plot rectangle.
pub fn plot_area(ui: &mut egui::Ui) -> (egui::Painter, egui::Rect) {
    let size = egui::vec2(ui.available_width().max(1.0), ui.available_height().max(40.0));
    let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
    let painter = ui.painter_at(rect);
    (painter, rect.shrink(4.0))
}

pub fn polyline(painter: &egui::Painter, frame: &PlotFrame, values: &[f64], stroke: egui::Stroke) {
    let points: Vec<egui::Pos2> = values
        .iter()
        .enumerate()
        .map(|(i, v)| egui::pos2(frame.x(i), frame.y(*v)))
        .collect();
    if points.len() >= 2 {
        painter.add(egui::Shape::line(points, stroke));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_extremes_to_edges() {
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(100.0, 50.0));
        let frame = PlotFrame::new(rect, 10, 10.0, 20.0);
        assert_eq!(frame.y(10.0), 50.0);
        assert_eq!(frame.y(20.0), 0.0);
        assert_eq!(frame.x(0), 5.0);
    }

    #[test]
    fn flat_series_gets_a_range() {
        let rect = egui::Rect::from_min_size(egui::pos2(0.0, 0.0), egui::vec2(10.0, 10.0));
        let frame = PlotFrame::new(rect, 1, 3.0, 3.0);
        assert_eq!(frame.y(3.0), 5.0);
        assert_eq!(value_range(std::iter::empty::<f64>()), (0.0, 1.0));
    }
}
