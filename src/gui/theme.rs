use crate::storage::SharedStore;
use eframe::egui;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Dark,
    Light,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Dark => "dark",
            ThemeMode::Light => "light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "dark" => Some(ThemeMode::Dark),
            "light" => Some(ThemeMode::Light),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, ThemeMode::Dark)
    }

    pub fn visuals(self) -> egui::Visuals {
        match self {
            ThemeMode::Dark => egui::Visuals::dark(),
            ThemeMode::Light => egui::Visuals::light(),
        }
    }
}

/// Saved theme, if any. Unknown values are treated as absent.
pub fn load_theme(store: &SharedStore) -> Option<ThemeMode> {
    match store.get(THEME_KEY) {
        Ok(value) => value.as_deref().and_then(ThemeMode::parse),
        Err(e) => {
            tracing::warn!("failed to read theme: {e}");
            None
        }
    }
}

pub fn save_theme(store: &SharedStore, mode: ThemeMode) {
    if let Err(e) = store.set(THEME_KEY, mode.as_str()) {
        tracing::warn!("failed to save theme: {e}");
    }
}
