use crate::dashboard::widgets::chart::{plot_area, polyline, value_range, PlotFrame};
use crate::dashboard::widgets::{Widget, WidgetContext};
use eframe::egui;

const BAND: egui::Color32 = egui::Color32::from_rgb(120, 140, 220);
const RETURNS: egui::Color32 = egui::Color32::from_rgb(230, 150, 60);

/// Daily returns inside ±k·σ GARCH bands.
pub struct VolatilityGarchWidget {
    sigmas: f64,
}

impl Default for VolatilityGarchWidget {
    fn default() -> Self {
        Self { sigmas: 2.0 }
    }
}

impl VolatilityGarchWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of returns that fall outside the ±k·σ band.
    pub fn breach_ratio(returns: &[f64], sigma: &[f64], k: f64) -> f64 {
        let n = returns.len().min(sigma.len());
        if n == 0 {
            return 0.0;
        }
        let breaches = returns
            .iter()
            .zip(sigma)
            .filter(|(r, s)| r.abs() > k * **s)
            .count();
        breaches as f64 / n as f64
    }
}

impl Widget for VolatilityGarchWidget {
    fn header_ui(&mut self, ui: &mut egui::Ui, _ctx: &WidgetContext<'_>) {
        ui.add(
            egui::Slider::new(&mut self.sigmas, 1.0..=3.0)
                .step_by(0.5)
                .suffix("σ"),
        );
    }

    fn render(&mut self, ui: &mut egui::Ui, ctx: &WidgetContext<'_>) {
        let data = match ctx.data {
            Ok(data) => data,
            Err(err) => {
                ui.colored_label(ui.visuals().error_fg_color, err);
                return;
            }
        };
        let garch = &data.garch;
        let persistence = garch.alpha + garch.beta;
        let long_run = if persistence < 1.0 {
            format!("{:.2}%", (garch.omega / (1.0 - persistence)).sqrt() * 100.0)
        } else {
            "n/a".to_string()
        };
        ui.label(format!(
            "{}  α {:.2}  β {:.2}  long-run σ {}  breaches {:.0}%",
            garch.model,
            garch.alpha,
            garch.beta,
            long_run,
            Self::breach_ratio(&garch.returns, &garch.sigma, self.sigmas) * 100.0
        ));

        let upper: Vec<f64> = garch.sigma.iter().map(|s| s * self.sigmas).collect();
        let lower: Vec<f64> = upper.iter().map(|s| -s).collect();
        let (min, max) = value_range(
            garch
                .returns
                .iter()
                .chain(upper.iter())
                .chain(lower.iter())
                .copied(),
        );
        let (painter, rect) = plot_area(ui);
        let frame = PlotFrame::new(rect, garch.returns.len(), min, max);

        let slot = frame.slot_width();
        for (i, (hi, lo)) in upper.iter().zip(&lower).enumerate() {
            let x = frame.x(i);
            let band = egui::Rect::from_min_max(
                egui::pos2(x - slot / 2.0, frame.y(*hi)),
                egui::pos2(x + slot / 2.0, frame.y(*lo)),
            );
            painter.rect_filled(band, 0.0, BAND.gamma_multiply(0.2));
        }
        polyline(&painter, &frame, &upper, egui::Stroke::new(1.0, BAND));
        polyline(&painter, &frame, &lower, egui::Stroke::new(1.0, BAND));
        polyline(&painter, &frame, &garch.returns, egui::Stroke::new(1.2, RETURNS));
        let zero = frame.y(0.0);
        painter.line_segment(
            [egui::pos2(rect.left(), zero), egui::pos2(rect.right(), zero)],
            egui::Stroke::new(0.5, ui.visuals().weak_text_color()),
        );
    }
}
