use crate::dashboard::cards::{CardDeck, CardKind};
use crate::dashboard::controller::SaveOutcome;
use crate::dashboard::data_cache::MarketData;
use crate::dashboard::grid::{DashboardGrid, GridItem};
use crate::dashboard::store::{clear_layout, LayoutStore};
use crate::dashboard::widgets::{WidgetContext, WidgetRegistry};
use crate::storage::SharedStore;
use eframe::egui;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const DEFAULT_STORAGE_KEY: &str = "dashboard:grid:main";

/// Layout keys written by earlier dashboard revisions; cleared on reset.
pub const LEGACY_LAYOUT_KEYS: [&str; 2] = ["dashboard:grid:layout", "dashboard:grid:charts"];

/// The dashboard page: the card deck, the widgets built for it, and the grid
/// that places them.
pub struct Dashboard {
    store: SharedStore,
    storage_key: String,
    registry: WidgetRegistry,
    deck: CardDeck,
    grid: DashboardGrid,
    items: Vec<GridItem>,
    pub editing: bool,
}

impl Dashboard {
    pub fn new(
        store: SharedStore,
        storage_key: impl Into<String>,
        registry: WidgetRegistry,
    ) -> Self {
        let storage_key = storage_key.into();
        let deck = CardDeck::load(store.clone(), storage_key.clone());
        let grid = DashboardGrid::new(storage_key.clone(), LayoutStore::new(store.clone()));
        let mut dashboard = Self {
            store,
            storage_key,
            registry,
            deck,
            grid,
            items: Vec::new(),
            editing: false,
        };
        dashboard.rebuild_items();
        dashboard
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn card_ids(&self) -> Vec<String> {
        self.deck.ids()
    }

    pub fn grid(&self) -> &DashboardGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut DashboardGrid {
        &mut self.grid
    }

    /// Rebuild grid items from the deck, reusing widget instances whose id
    /// is still present so their local state survives.
    fn rebuild_items(&mut self) {
        let mut reusable: HashMap<String, GridItem> = self
            .items
            .drain(..)
            .map(|item| (item.id.clone(), item))
            .collect();
        let mut items = Vec::with_capacity(self.deck.cards().len());
        for card in self.deck.cards() {
            if let Some(item) = reusable.remove(&card.id) {
                items.push(item);
            } else if let Some(widget) = self.registry.create(card.kind) {
                items.push(GridItem {
                    id: card.id.clone(),
                    title: self.registry.label(card.kind).to_string(),
                    widget,
                });
            } else {
                tracing::warn!(card = %card.id, kind = ?card.kind, "no widget registered for card");
            }
        }
        self.items = items;
    }

    /// Add a card of `kind`; the grid places it on the next frame.
    pub fn add_card(&mut self, kind: CardKind) -> String {
        let id = self.deck.add(kind, chrono::Utc::now().timestamp_millis());
        self.rebuild_items();
        id
    }

    pub fn remove_card(&mut self, id: &str) -> bool {
        let removed = self.deck.remove(id);
        if removed {
            self.rebuild_items();
        }
        removed
    }

    /// Forget every saved layout and card and start over with the defaults.
    pub fn reset(&mut self) {
        self.grid.unmount();
        for key in LEGACY_LAYOUT_KEYS {
            clear_layout(&self.store, key);
        }
        clear_layout(&self.store, &self.storage_key);
        CardDeck::clear(&self.store, &self.storage_key);
        tracing::info!(key = %self.storage_key, "dashboard layout reset");

        self.deck = CardDeck::load(self.store.clone(), self.storage_key.clone());
        self.grid = DashboardGrid::new(self.storage_key.clone(), LayoutStore::new(self.store.clone()));
        self.items.clear();
        self.rebuild_items();
        self.editing = false;
    }

    /// Run due deferred work while the grid is not being drawn.
    pub fn poll(&mut self, now: Instant) -> Option<SaveOutcome> {
        self.grid.controller_mut().poll(now)
    }

    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        self.grid.controller().next_wakeup(now)
    }

    pub fn unmount(&mut self) {
        self.grid.unmount();
    }

    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        data: Result<&MarketData, &str>,
    ) -> Option<SaveOutcome> {
        let ctx = WidgetContext {
            data,
            editable: self.editing,
        };
        let output = self.grid.show(ui, &mut self.items, self.editing, &ctx);
        if let Some(id) = output.close_requested {
            self.remove_card(&id);
        }
        output.saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::cards::cards_key;
    use crate::storage::{KeyValueStore, MemoryStore};

    #[test]
    fn add_and_remove_keep_items_in_sync() {
        let store = MemoryStore::shared();
        let mut dashboard = Dashboard::new(
            store.clone(),
            DEFAULT_STORAGE_KEY,
            WidgetRegistry::with_defaults(),
        );
        assert_eq!(dashboard.card_ids(), vec!["candlestick-chart".to_string()]);
        let id = dashboard.add_card(CardKind::MarkovChains);
        assert!(id.starts_with("markov-chains-"));
        assert_eq!(dashboard.items.len(), 2);
        assert!(dashboard.remove_card(&id));
        assert_eq!(dashboard.items.len(), 1);
        assert!(!dashboard.remove_card(&id));
    }

    #[test]
    fn reset_clears_saved_state() {
        let store = MemoryStore::shared();
        store.set("dashboard:grid:charts", "[]").unwrap();
        store.set(DEFAULT_STORAGE_KEY, "[]").unwrap();
        let mut dashboard = Dashboard::new(
            store.clone(),
            DEFAULT_STORAGE_KEY,
            WidgetRegistry::with_defaults(),
        );
        dashboard.add_card(CardKind::VolatilityGarch);
        dashboard.editing = true;
        dashboard.reset();
        assert!(!dashboard.editing);
        assert_eq!(dashboard.card_ids(), vec!["candlestick-chart".to_string()]);
        assert_eq!(store.get("dashboard:grid:charts").unwrap(), None);
        assert_eq!(store.get(DEFAULT_STORAGE_KEY).unwrap(), None);
        assert_eq!(store.get(&cards_key(DEFAULT_STORAGE_KEY)).unwrap(), None);
    }

    #[test]
    fn renders_default_card() {
        let store = MemoryStore::shared();
        let mut dashboard = Dashboard::new(
            store,
            DEFAULT_STORAGE_KEY,
            WidgetRegistry::with_defaults(),
        );
        let data = crate::dashboard::data_cache::market_data();
        egui::__run_test_ui(|ui| {
            dashboard.ui(ui, data);
        });
        let placement = dashboard
            .grid()
            .controller()
            .placement("candlestick-chart")
            .cloned()
            .unwrap();
        let cols = dashboard.grid().controller().columns();
        assert_eq!((placement.w, placement.h), (cols * 67 / 100, 10));
        assert!(dashboard.grid().controller().has_pending_save());
    }
}
