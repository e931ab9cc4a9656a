pub mod cards;
pub mod columns;
pub mod controller;
pub mod dashboard;
pub mod data_cache;
pub mod grid;
pub mod layout;
pub mod store;
pub mod widgets;

pub use cards::{Card, CardDeck, CardKind};
pub use columns::ColumnAdapter;
pub use controller::{GridController, GridEvent, InteractionState, SaveOutcome};
pub use dashboard::{Dashboard, DEFAULT_STORAGE_KEY};
pub use grid::{DashboardGrid, GridItem};
pub use layout::{Layout, WidgetPlacement};
pub use store::LayoutStore;
pub use widgets::{Widget, WidgetFactory, WidgetRegistry};
