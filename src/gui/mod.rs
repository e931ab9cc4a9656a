mod confirmation_modal;
pub mod pages;
pub mod theme;

pub use confirmation_modal::{ConfirmationModal, ConfirmationResult, DestructiveAction};
pub use pages::Route;
pub use theme::ThemeMode;

use crate::common::{AppEvent, EventBus, Subscription, Topic};
use crate::dashboard::data_cache::market_data;
use crate::dashboard::{Dashboard, SaveOutcome, WidgetRegistry};
use crate::settings::Settings;
use crate::storage::SharedStore;
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::time::Instant;

/// Top-level window: header, navigation, and the dashboard page.
pub struct DashboardApp {
    store: SharedStore,
    settings: Settings,
    settings_path: String,
    route: Route,
    title: String,
    theme: Option<ThemeMode>,
    visuals_dirty: bool,
    dashboard: Dashboard,
    bus: EventBus,
    header_events: Subscription,
    dashboard_events: Subscription,
    toast_events: Subscription,
    toasts: Toasts,
    confirm: ConfirmationModal,
}

impl DashboardApp {
    pub fn new(store: SharedStore, settings: Settings, settings_path: impl Into<String>) -> Self {
        let bus = EventBus::new();
        let header_events = bus.subscribe(&[Topic::RouteChanged, Topic::ThemeChanged]);
        let dashboard_events = bus.subscribe(&[Topic::RouteChanged]);
        let toast_events = bus.subscribe(&[Topic::LayoutSaved, Topic::LayoutReset]);
        let theme = theme::load_theme(&store);
        let dashboard = Dashboard::new(
            store.clone(),
            settings.dashboard_key.clone(),
            WidgetRegistry::with_defaults(),
        );
        Self {
            store,
            settings,
            settings_path: settings_path.into(),
            route: Route::Dashboard,
            title: Route::Dashboard.title().to_string(),
            theme,
            visuals_dirty: theme.is_some(),
            dashboard,
            bus,
            header_events,
            dashboard_events,
            toast_events,
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
            confirm: ConfirmationModal::default(),
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut Dashboard {
        &mut self.dashboard
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn navigate(&mut self, route: Route) {
        if self.route == route {
            return;
        }
        self.route = route;
        tracing::debug!(route = route.title(), "route changed");
        self.bus.publish(AppEvent::RouteChanged {
            title: route.title().to_string(),
        });
    }

    pub fn toggle_theme(&mut self, current_dark: bool) {
        let current = self.theme.unwrap_or(if current_dark {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        });
        let next = current.toggled();
        self.theme = Some(next);
        theme::save_theme(&self.store, next);
        self.bus.publish(AppEvent::ThemeChanged {
            dark: next.is_dark(),
        });
    }

    /// Deliver queued bus events to the header, the dashboard and the toasts.
    pub fn process_events(&mut self) {
        for event in self.header_events.drain() {
            match event {
                AppEvent::RouteChanged { title } => self.title = title,
                AppEvent::ThemeChanged { .. } => self.visuals_dirty = true,
                _ => {}
            }
        }
        for event in self.dashboard_events.drain() {
            if let AppEvent::RouteChanged { .. } = event {
                self.dashboard.editing = false;
            }
        }
        for event in self.toast_events.drain() {
            match event {
                AppEvent::LayoutSaved { .. } => self.toast("Layout saved", ToastKind::Success),
                AppEvent::LayoutReset => self.toast("Layout reset", ToastKind::Info),
                _ => {}
            }
        }
    }

    fn toast(&mut self, text: &str, kind: ToastKind) {
        if !self.settings.enable_toasts {
            return;
        }
        self.toasts.add(Toast {
            text: text.into(),
            kind,
            options: ToastOptions::default().duration_in_seconds(self.settings.toast_duration as f64),
        });
    }

    fn handle_save(&mut self, outcome: Option<SaveOutcome>) {
        match outcome {
            Some(SaveOutcome::Saved { storage_key, .. }) => {
                self.bus.publish(AppEvent::LayoutSaved { storage_key });
            }
            Some(SaveOutcome::Skipped { storage_key }) => {
                tracing::debug!(key = %storage_key, "layout was not saved");
            }
            None => {}
        }
    }

    fn header_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(&self.title);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let dark = ui.visuals().dark_mode;
                let label = if dark { "☀ Light" } else { "🌙 Dark" };
                if ui.button(label).on_hover_text("Toggle theme").clicked() {
                    self.toggle_theme(dark);
                }
            });
        });
    }

    fn nav_ui(&mut self, ui: &mut egui::Ui) {
        ui.add_space(4.0);
        for route in Route::ALL {
            if ui.selectable_label(self.route == route, route.title()).clicked() {
                self.navigate(route);
            }
        }
    }

    fn toolbar_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.toggle_value(&mut self.dashboard.editing, "✏ Edit layout");
            ui.menu_button("➕ Add card", |ui| {
                for kind in self.dashboard.registry().kinds() {
                    let label = self.dashboard.registry().label(kind);
                    if ui.button(label).clicked() {
                        self.dashboard.add_card(kind);
                        ui.close_menu();
                    }
                }
            });
            if ui.button("⟲ Reset layout").clicked() {
                self.confirm.open_for(DestructiveAction::ResetDashboard);
            }
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.visuals_dirty {
            if let Some(mode) = self.theme {
                ctx.set_visuals(mode.visuals());
            }
            self.visuals_dirty = false;
        }
        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.settings.window_size = Some((rect.width() as i32, rect.height() as i32));
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| self.header_ui(ui));
        egui::SidePanel::left("navigation")
            .resizable(false)
            .default_width(160.0)
            .show(ctx, |ui| self.nav_ui(ui));
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.route == Route::Dashboard {
                self.toolbar_ui(ui);
                ui.separator();
                let outcome = self.dashboard.ui(ui, market_data());
                self.handle_save(outcome);
            } else {
                let now = Instant::now();
                let outcome = self.dashboard.poll(now);
                self.handle_save(outcome);
                if let Some(wait) = self.dashboard.next_wakeup(now) {
                    ctx.request_repaint_after(wait);
                }
                pages::info_page(ui, self.route);
            }
        });

        if self.confirm.ui(ctx) == ConfirmationResult::Confirmed {
            if let Some(DestructiveAction::ResetDashboard) = self.confirm.pending() {
                self.dashboard.reset();
                self.bus.publish(AppEvent::LayoutReset);
            }
        }

        self.process_events();
        self.toasts.show(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.dashboard.unmount();
        if let Err(e) = self.settings.save(&self.settings_path) {
            tracing::error!("failed to save settings: {e}");
        }
    }
}
