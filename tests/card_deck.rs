use quant_dashboard::dashboard::cards::{cards_key, CardDeck, CardKind};
use quant_dashboard::dashboard::layout::WidgetPlacement;
use quant_dashboard::dashboard::store::LayoutStore;
use quant_dashboard::storage::{KeyValueStore, MemoryStore};

const KEY: &str = "dashboard:grid:main";

#[test]
fn added_cards_survive_reload() {
    let store = MemoryStore::shared();
    let mut deck = CardDeck::load(store.clone(), KEY);
    let id = deck.add(CardKind::VolatilityGarch, 1_700_000_000_000);
    assert_eq!(id, "volatility-garch-1700000000000");

    let reloaded = CardDeck::load(store, KEY);
    assert_eq!(
        reloaded.ids(),
        vec!["candlestick-chart".to_string(), id.clone()]
    );
    assert_eq!(reloaded.kind_of(&id), Some(CardKind::VolatilityGarch));
}

#[test]
fn same_millisecond_ids_stay_unique() {
    let mut deck = CardDeck::load(MemoryStore::shared(), KEY);
    let a = deck.add(CardKind::MarkovChains, 5);
    let b = deck.add(CardKind::MarkovChains, 5);
    let c = deck.add(CardKind::MarkovChains, 5);
    assert_eq!(a, "markov-chains-5");
    assert_eq!(b, "markov-chains-5-1");
    assert_eq!(c, "markov-chains-5-2");
}

#[test]
fn removing_card_prunes_saved_placement() {
    let store = MemoryStore::shared();
    let layouts = LayoutStore::new(store.clone());
    let mut deck = CardDeck::load(store.clone(), KEY);
    let id = deck.add(CardKind::MarkovChains, 42);
    let placement = |id: &str, y| WidgetPlacement {
        id: id.into(),
        x: 0,
        y,
        w: 12,
        h: 10,
        min_w: 2,
        min_h: 3,
    };
    layouts.save(KEY, &[placement("candlestick-chart", 0), placement(&id, 10)]);

    assert!(deck.remove(&id));
    let saved = layouts.load(KEY).unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, "candlestick-chart");
    assert!(!deck.remove(&id));
}

#[test]
fn unknown_card_types_are_dropped() {
    let store = MemoryStore::shared();
    store
        .set(
            &cards_key(KEY),
            r#"[{"id":"heatmap-1","type":"heatmap"},{"id":"markov-chains-1","type":"markov-chains"}]"#,
        )
        .unwrap();
    let deck = CardDeck::load(store, KEY);
    assert_eq!(deck.ids(), vec!["markov-chains-1".to_string()]);
}

#[test]
fn duplicate_card_ids_keep_first_entry() {
    let store = MemoryStore::shared();
    store
        .set(
            &cards_key(KEY),
            r#"[{"id":"dup","type":"markov-chains"},{"id":"dup","type":"volatility-garch"},{"id":"candlestick-chart","type":"candlestick-chart"}]"#,
        )
        .unwrap();
    let deck = CardDeck::load(store, KEY);
    assert_eq!(
        deck.ids(),
        vec!["dup".to_string(), "candlestick-chart".to_string()]
    );
    assert_eq!(deck.kind_of("dup"), Some(CardKind::MarkovChains));
}

#[test]
fn unusable_records_give_default_deck() {
    for raw in ["[]", "not json", r#"{"id":"x"}"#] {
        let store = MemoryStore::shared();
        store.set(&cards_key(KEY), raw).unwrap();
        let deck = CardDeck::load(store, KEY);
        assert_eq!(deck.ids(), vec!["candlestick-chart".to_string()], "record {raw:?}");
    }
}

#[test]
fn clear_forgets_saved_deck() {
    let store = MemoryStore::shared();
    let mut deck = CardDeck::load(store.clone(), KEY);
    deck.add(CardKind::Candlestick, 1);
    CardDeck::clear(&store, KEY);
    assert_eq!(store.get(&cards_key(KEY)).unwrap(), None);
    assert_eq!(CardDeck::load(store, KEY).cards().len(), 1);
}
