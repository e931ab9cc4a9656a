use crate::dashboard::layout::{CANDLESTICK_CHART, MARKOV_CHAINS, VOLATILITY_GARCH};
use crate::dashboard::store::LayoutStore;
use crate::storage::SharedStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Widget types that can be placed on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    #[serde(rename = "candlestick-chart")]
    Candlestick,
    #[serde(rename = "markov-chains")]
    MarkovChains,
    #[serde(rename = "volatility-garch")]
    VolatilityGarch,
}

impl CardKind {
    pub const ALL: [CardKind; 3] = [
        CardKind::Candlestick,
        CardKind::MarkovChains,
        CardKind::VolatilityGarch,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            CardKind::Candlestick => CANDLESTICK_CHART,
            CardKind::MarkovChains => MARKOV_CHAINS,
            CardKind::VolatilityGarch => VOLATILITY_GARCH,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CardKind::Candlestick => "Candlestick chart",
            CardKind::MarkovChains => "Markov chains",
            CardKind::VolatilityGarch => "GARCH volatility levels",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.slug() == slug)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: CardKind,
}

#[derive(Deserialize)]
struct RawCard {
    id: String,
    #[serde(rename = "type")]
    kind: String,
}

pub fn cards_key(storage_key: &str) -> String {
    format!("{storage_key}:cards")
}

/// The set of cards shown on one dashboard, persisted next to its layout.
pub struct CardDeck {
    store: SharedStore,
    storage_key: String,
    cards: Vec<Card>,
}

impl CardDeck {
    pub fn default_cards() -> Vec<Card> {
        vec![Card {
            id: CardKind::Candlestick.slug().to_string(),
            kind: CardKind::Candlestick,
        }]
    }

    /// Load the deck saved for `storage_key`, or the default deck when the
    /// record is missing, unreadable, or empty.
    pub fn load(store: SharedStore, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let cards = Self::read_cards(&store, &storage_key)
            .filter(|cards| !cards.is_empty())
            .unwrap_or_else(Self::default_cards);
        Self {
            store,
            storage_key,
            cards,
        }
    }

    fn read_cards(store: &SharedStore, storage_key: &str) -> Option<Vec<Card>> {
        let raw = match store.get(&cards_key(storage_key)) {
            Ok(raw) => raw?,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read saved cards");
                return None;
            }
        };
        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(error = %err, "saved cards are not valid JSON");
                return None;
            }
        };
        let Value::Array(entries) = value else {
            return None;
        };
        let mut cards = Vec::with_capacity(entries.len());
        let mut seen = HashSet::new();
        for entry in entries {
            match serde_json::from_value::<RawCard>(entry) {
                Ok(raw) if !seen.insert(raw.id.clone()) => {
                    tracing::warn!(card = %raw.id, "dropping duplicate card id");
                }
                Ok(raw) => match CardKind::from_slug(&raw.kind) {
                    Some(kind) => cards.push(Card { id: raw.id, kind }),
                    None => tracing::warn!(card = %raw.id, kind = %raw.kind, "dropping card of unknown type"),
                },
                Err(err) => tracing::warn!(error = %err, "dropping malformed card entry"),
            }
        }
        Some(cards)
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn ids(&self) -> Vec<String> {
        self.cards.iter().map(|c| c.id.clone()).collect()
    }

    pub fn kind_of(&self, id: &str) -> Option<CardKind> {
        self.cards.iter().find(|c| c.id == id).map(|c| c.kind)
    }

    /// Append a card of `kind`. Its id is `<type>-<millis>`, with a numeric
    /// suffix when that id is already taken.
    pub fn add(&mut self, kind: CardKind, now_millis: i64) -> String {
        let base = format!("{}-{}", kind.slug(), now_millis);
        let mut id = base.clone();
        let mut n = 1;
        while self.cards.iter().any(|c| c.id == id) {
            id = format!("{base}-{n}");
            n += 1;
        }
        self.cards.push(Card {
            id: id.clone(),
            kind,
        });
        tracing::info!(card = %id, "card added");
        self.persist();
        id
    }

    /// Remove a card and its saved placement. Returns whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.cards.len();
        self.cards.retain(|c| c.id != id);
        if self.cards.len() == before {
            return false;
        }
        tracing::info!(card = %id, "card removed");
        self.persist();
        LayoutStore::new(self.store.clone()).remove_placement(&self.storage_key, id);
        true
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.cards)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.store.set(&cards_key(&self.storage_key), &json));
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to save cards");
        }
    }

    /// Forget the saved deck for `storage_key`.
    pub fn clear(store: &SharedStore, storage_key: &str) {
        if let Err(err) = store.remove(&cards_key(storage_key)) {
            tracing::warn!(error = %err, "failed to clear saved cards");
        }
    }
}
