use crate::dashboard::widgets::chart::{plot_area, polyline, value_range, PlotFrame};
use crate::dashboard::widgets::{Widget, WidgetContext};
use eframe::egui;

const REGIME_COLORS: [egui::Color32; 4] = [
    egui::Color32::from_rgb(46, 160, 67),
    egui::Color32::from_rgb(201, 160, 40),
    egui::Color32::from_rgb(200, 60, 60),
    egui::Color32::from_rgb(90, 110, 200),
];

fn regime_color(state: usize) -> egui::Color32 {
    REGIME_COLORS[state % REGIME_COLORS.len()]
}

/// Closing prices over HMM regime bands, with the transition matrix.
#[derive(Default)]
pub struct MarkovChainsWidget {
    show_matrix: bool,
}

impl MarkovChainsWidget {
    pub fn new() -> Self {
        Self { show_matrix: true }
    }
}

impl Widget for MarkovChainsWidget {
    fn header_ui(&mut self, ui: &mut egui::Ui, _ctx: &WidgetContext<'_>) {
        ui.checkbox(&mut self.show_matrix, "Transitions");
    }

    fn render(&mut self, ui: &mut egui::Ui, ctx: &WidgetContext<'_>) {
        let data = match ctx.data {
            Ok(data) => data,
            Err(err) => {
                ui.colored_label(ui.visuals().error_fg_color, err);
                return;
            }
        };
        let regimes = &data.regimes;

        ui.horizontal_wrapped(|ui| {
            for (state, name) in regimes.states.iter().enumerate() {
                let share = regimes.regimes.iter().filter(|&&r| r == state).count() as f64
                    / regimes.regimes.len().max(1) as f64;
                let duration = data
                    .expected_duration(state)
                    .map(|d| format!(", ~{d:.0}d"))
                    .unwrap_or_default();
                ui.colored_label(
                    regime_color(state),
                    format!("■ {name} {:.0}%{duration}", share * 100.0),
                );
            }
        });

        if self.show_matrix {
            egui::Grid::new(ui.id().with("transition-matrix"))
                .striped(true)
                .show(ui, |ui| {
                    ui.label("from \\ to");
                    for name in &regimes.states {
                        ui.label(name);
                    }
                    ui.end_row();
                    for (from, row) in regimes.transition.iter().enumerate() {
                        ui.colored_label(
                            regime_color(from),
                            regimes.states.get(from).map(String::as_str).unwrap_or("?"),
                        );
                        for p in row {
                            ui.monospace(format!("{p:.2}"));
                        }
                        ui.end_row();
                    }
                });
        }

        let closes: Vec<f64> = data.prices.candles.iter().map(|c| c.close).collect();
        let (painter, rect) = plot_area(ui);
        let (min, max) = value_range(closes.iter().copied());
        let frame = PlotFrame::new(rect, closes.len(), min, max);
        let slot = frame.slot_width();
        for (i, state) in regimes.regimes.iter().enumerate() {
            let x = frame.x(i);
            let band = egui::Rect::from_min_max(
                egui::pos2(x - slot / 2.0, rect.top()),
                egui::pos2(x + slot / 2.0, rect.bottom()),
            );
            painter.rect_filled(band, 0.0, regime_color(*state).gamma_multiply(0.18));
        }
        polyline(
            &painter,
            &frame,
            &closes,
            egui::Stroke::new(1.5, ui.visuals().strong_text_color()),
        );
    }
}
