use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Dashboard,
    Assets,
    MarkovChains,
    Volatility,
}

impl Route {
    pub const ALL: [Route; 4] = [
        Route::Dashboard,
        Route::Assets,
        Route::MarkovChains,
        Route::Volatility,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::Assets => "Assets",
            Route::MarkovChains => "Markov Chains",
            Route::Volatility => "Volatility",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Route::Dashboard => "Arrange market charts on a free-form grid.",
            Route::Assets => "Browse the tracked assets and their recent price history.",
            Route::MarkovChains => {
                "Hidden Markov regimes fitted to daily returns, with the estimated transition matrix."
            }
            Route::Volatility => {
                "Conditional volatility from a GARCH(1,1) model and the bands it implies."
            }
        }
    }
}

/// Static page shown for routes other than the dashboard.
pub fn info_page(ui: &mut egui::Ui, route: Route) {
    ui.vertical_centered(|ui| {
        ui.add_space(48.0);
        ui.heading(route.title());
        ui.add_space(8.0);
        ui.label(route.description());
    });
}
