use crate::dashboard::widgets::chart::{plot_area, value_range, PlotFrame};
use crate::dashboard::widgets::{Widget, WidgetContext};
use eframe::egui;

const UP: egui::Color32 = egui::Color32::from_rgb(38, 166, 91);
const DOWN: egui::Color32 = egui::Color32::from_rgb(214, 69, 65);

#[derive(Default)]
pub struct CandlestickWidget {
    show_volume: bool,
}

impl CandlestickWidget {
    pub fn new() -> Self {
        Self { show_volume: true }
    }
}

impl Widget for CandlestickWidget {
    fn header_ui(&mut self, ui: &mut egui::Ui, _ctx: &WidgetContext<'_>) {
        ui.checkbox(&mut self.show_volume, "Volume");
    }

    fn render(&mut self, ui: &mut egui::Ui, ctx: &WidgetContext<'_>) {
        let data = match ctx.data {
            Ok(data) => data,
            Err(err) => {
                ui.colored_label(ui.visuals().error_fg_color, err);
                return;
            }
        };
        let candles = &data.prices.candles;
        if let (Some(first), Some(last)) = (candles.first(), candles.last()) {
            let change = (last.close / first.open - 1.0) * 100.0;
            ui.label(format!(
                "{} close {:.2} ({:+.2}%)  {} to {}",
                data.prices.symbol, last.close, change, first.date, last.date
            ));
        }

        let (painter, rect) = plot_area(ui);
        let (price_rect, volume_rect) = if self.show_volume {
            let split = rect.top() + rect.height() * 0.8;
            (
                egui::Rect::from_min_max(rect.min, egui::pos2(rect.right(), split - 2.0)),
                Some(egui::Rect::from_min_max(egui::pos2(rect.left(), split), rect.max)),
            )
        } else {
            (rect, None)
        };

        let (min, max) = value_range(candles.iter().flat_map(|c| [c.low, c.high]));
        let frame = PlotFrame::new(price_rect, candles.len(), min, max);
        let body_w = (frame.slot_width() * 0.6).max(1.0);
        for (i, c) in candles.iter().enumerate() {
            let color = if c.close >= c.open { UP } else { DOWN };
            let x = frame.x(i);
            painter.line_segment(
                [egui::pos2(x, frame.y(c.high)), egui::pos2(x, frame.y(c.low))],
                egui::Stroke::new(1.0, color),
            );
            let top = frame.y(c.open.max(c.close));
            let bottom = frame.y(c.open.min(c.close)).max(top + 1.0);
            let body = egui::Rect::from_min_max(
                egui::pos2(x - body_w / 2.0, top),
                egui::pos2(x + body_w / 2.0, bottom),
            );
            painter.rect_filled(body, 0.0, color);
        }

        if let Some(volume_rect) = volume_rect {
            let peak = candles.iter().map(|c| c.volume).max().unwrap_or(1).max(1) as f64;
            let vframe = PlotFrame::new(volume_rect, candles.len(), 0.0, peak);
            for (i, c) in candles.iter().enumerate() {
                let color = if c.close >= c.open { UP } else { DOWN };
                let x = vframe.x(i);
                let bar = egui::Rect::from_min_max(
                    egui::pos2(x - body_w / 2.0, vframe.y(c.volume as f64)),
                    egui::pos2(x + body_w / 2.0, volume_rect.bottom()),
                );
                painter.rect_filled(bar, 0.0, color.gamma_multiply(0.5));
            }
        }
    }
}
