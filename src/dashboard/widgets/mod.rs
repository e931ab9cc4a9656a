use crate::dashboard::cards::CardKind;
use crate::dashboard::data_cache::MarketData;
use eframe::egui;
use std::collections::HashMap;
use std::sync::Arc;

mod candlestick;
pub mod chart;
mod markov_chains;
mod volatility_garch;

pub use candlestick::CandlestickWidget;
pub use markov_chains::MarkovChainsWidget;
pub use volatility_garch::VolatilityGarchWidget;

/// Context shared with widgets at render time.
#[derive(Clone, Copy)]
pub struct WidgetContext<'a> {
    pub data: Result<&'a MarketData, &'a str>,
    pub editable: bool,
}

/// Widget trait implemented by all dashboard cards.
pub trait Widget: Send {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &WidgetContext<'_>);

    /// Extra controls drawn in the card header next to the title.
    fn header_ui(&mut self, _ui: &mut egui::Ui, _ctx: &WidgetContext<'_>) {}
}

/// Descriptor for building widgets of one card kind.
#[derive(Clone)]
pub struct WidgetDescriptor {
    label: &'static str,
    ctor: Arc<dyn Fn() -> Box<dyn Widget> + Send + Sync>,
}

pub type WidgetFactory = WidgetDescriptor;

impl WidgetDescriptor {
    pub fn new<T: Widget + 'static>(label: &'static str, build: fn() -> T) -> Self {
        Self {
            label,
            ctor: Arc::new(move || Box::new(build()) as Box<dyn Widget>),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn create(&self) -> Box<dyn Widget> {
        (self.ctor)()
    }
}

#[derive(Clone, Default)]
pub struct WidgetRegistry {
    map: HashMap<CardKind, WidgetDescriptor>,
}

impl WidgetRegistry {
    pub fn with_defaults() -> Self {
        let mut reg = Self::default();
        reg.register(
            CardKind::Candlestick,
            WidgetFactory::new(CardKind::Candlestick.label(), CandlestickWidget::new),
        );
        reg.register(
            CardKind::MarkovChains,
            WidgetFactory::new(CardKind::MarkovChains.label(), MarkovChainsWidget::new),
        );
        reg.register(
            CardKind::VolatilityGarch,
            WidgetFactory::new(CardKind::VolatilityGarch.label(), VolatilityGarchWidget::new),
        );
        reg
    }

    pub fn register(&mut self, kind: CardKind, desc: WidgetDescriptor) {
        self.map.insert(kind, desc);
    }

    pub fn contains(&self, kind: CardKind) -> bool {
        self.map.contains_key(&kind)
    }

    pub fn create(&self, kind: CardKind) -> Option<Box<dyn Widget>> {
        self.map.get(&kind).map(WidgetDescriptor::create)
    }

    pub fn label(&self, kind: CardKind) -> &'static str {
        self.map
            .get(&kind)
            .map(WidgetDescriptor::label)
            .unwrap_or_else(|| kind.label())
    }

    /// Registered kinds in menu order.
    pub fn kinds(&self) -> Vec<CardKind> {
        CardKind::ALL
            .into_iter()
            .filter(|k| self.map.contains_key(k))
            .collect()
    }
}
