use quant_dashboard::dashboard::controller::{
    GridController, GridEvent, InteractionState, SaveOutcome, SAVE_DEBOUNCE,
};
use quant_dashboard::dashboard::layout::{Layout, WidgetPlacement};
use quant_dashboard::dashboard::store::LayoutStore;
use quant_dashboard::storage::{KeyValueStore, MemoryStore, SharedStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const KEY: &str = "dashboard:grid:main";

/// Memory store that counts writes.
#[derive(Default)]
struct CountingStore {
    inner: MemoryStore,
    writes: AtomicUsize,
}

impl KeyValueStore for CountingStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.inner.remove(key)
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn placement(id: &str, x: u32, y: u32, w: u32, h: u32) -> WidgetPlacement {
    WidgetPlacement {
        id: id.into(),
        x,
        y,
        w,
        h,
        min_w: 2,
        min_h: 3,
    }
}

fn candle_at(x: u32, y: u32) -> Layout {
    vec![placement("candlestick-chart", x, y, 8, 10)]
}

fn saved(store: &SharedStore) -> Option<Layout> {
    LayoutStore::new(store.clone()).load(KEY)
}

fn mounted(store: SharedStore, t0: Instant) -> GridController {
    let mut ctl = GridController::new(KEY, LayoutStore::new(store));
    ctl.observe_width(1000.0, t0);
    ctl.sync_items(&["candlestick-chart"], t0);
    ctl
}

#[test]
fn first_mount_places_centered_candlestick() {
    let t0 = Instant::now();
    let ctl = mounted(MemoryStore::shared(), t0);
    assert_eq!(ctl.columns(), 12);
    let p = ctl.placement("candlestick-chart").unwrap();
    assert_eq!((p.x, p.y, p.w, p.h, p.min_w, p.min_h), (2, 0, 8, 10, 2, 3));
    assert_eq!(ctl.state(), InteractionState::PendingSave);
}

#[test]
fn rapid_changes_coalesce_into_one_save() {
    let counting = Arc::new(CountingStore::default());
    let store: SharedStore = counting.clone();
    let t0 = Instant::now();
    let mut ctl = mounted(store.clone(), t0);

    let mut last = t0;
    for step in 0..5u32 {
        last = t0 + ms(100 * u64::from(step));
        ctl.handle(GridEvent::LayoutChange(candle_at(step, 0)), last);
    }
    assert_eq!(ctl.poll(last + SAVE_DEBOUNCE - ms(1)), None);
    assert_eq!(counting.writes.load(Ordering::SeqCst), 0);

    let outcome = ctl.poll(last + SAVE_DEBOUNCE);
    assert_eq!(
        outcome,
        Some(SaveOutcome::Saved {
            storage_key: KEY.into(),
            placements: 1,
        })
    );
    assert_eq!(counting.writes.load(Ordering::SeqCst), 1);
    assert_eq!(saved(&store), Some(candle_at(4, 0)));
    assert_eq!(ctl.state(), InteractionState::Idle);
    assert_eq!(ctl.poll(last + SAVE_DEBOUNCE * 4), None);
    assert_eq!(counting.writes.load(Ordering::SeqCst), 1);
}

#[test]
fn live_reports_during_drag_do_not_commit() {
    let store = MemoryStore::shared();
    let t0 = Instant::now();
    let mut ctl = mounted(store.clone(), t0);
    let before = ctl.layout().to_vec();

    assert!(ctl.handle(GridEvent::DragStart, t0 + ms(10)));
    assert!(!ctl.handle(GridEvent::LayoutChange(candle_at(0, 3)), t0 + ms(20)));
    assert_eq!(ctl.layout(), before.as_slice());
    assert!(!ctl.has_pending_save());

    let stop = t0 + ms(900);
    assert!(ctl.handle(GridEvent::DragStop(candle_at(4, 1)), stop));
    assert_eq!(ctl.layout(), candle_at(4, 1).as_slice());
    assert_eq!(ctl.poll(stop + ms(499)), None);
    assert!(ctl.poll(stop + SAVE_DEBOUNCE).is_some());
    assert_eq!(saved(&store), Some(candle_at(4, 1)));
}

#[test]
fn resize_stop_commits_its_payload() {
    let store = MemoryStore::shared();
    let t0 = Instant::now();
    let mut ctl = mounted(store.clone(), t0);
    ctl.handle(GridEvent::ResizeStart, t0);
    let grown = vec![placement("candlestick-chart", 2, 0, 10, 12)];
    ctl.handle(GridEvent::ResizeStop(grown.clone()), t0 + ms(50));
    ctl.poll(t0 + ms(50) + SAVE_DEBOUNCE);
    assert_eq!(saved(&store), Some(grown));
}

#[test]
fn read_only_grid_ignores_gestures() {
    let store = MemoryStore::shared();
    let t0 = Instant::now();
    let mut ctl = mounted(store, t0);
    ctl.set_editable(false);
    let before = ctl.layout().to_vec();
    assert!(!ctl.handle(GridEvent::DragStart, t0));
    assert!(!ctl.handle(GridEvent::DragStop(candle_at(0, 5)), t0));
    assert_eq!(ctl.layout(), before.as_slice());
}

#[test]
fn unmount_cancels_pending_save() {
    let store = MemoryStore::shared();
    let t0 = Instant::now();
    let mut ctl = mounted(store.clone(), t0);
    ctl.handle(GridEvent::LayoutChange(candle_at(0, 0)), t0);
    assert!(ctl.has_pending_save());
    ctl.unmount();
    assert!(!ctl.is_mounted());
    assert_eq!(ctl.poll(t0 + SAVE_DEBOUNCE * 2), None);
    assert_eq!(saved(&store), None);
}

#[test]
fn dropping_controller_does_not_write() {
    let store = MemoryStore::shared();
    let t0 = Instant::now();
    {
        let mut ctl = mounted(store.clone(), t0);
        ctl.handle(GridEvent::LayoutChange(candle_at(1, 1)), t0);
    }
    assert_eq!(saved(&store), None);
}

#[test]
fn corrupt_record_falls_back_to_default_layout() {
    let store = MemoryStore::shared();
    store.set(KEY, "{\"broken\":").unwrap();
    let t0 = Instant::now();
    let ctl = mounted(store, t0);
    assert_eq!(ctl.layout(), candle_at(2, 0).as_slice());
}

#[test]
fn matching_saved_layout_needs_no_save() {
    let store = MemoryStore::shared();
    LayoutStore::new(store.clone()).save(KEY, &candle_at(0, 4));
    let t0 = Instant::now();
    let ctl = mounted(store, t0);
    assert_eq!(ctl.layout(), candle_at(0, 4).as_slice());
    assert!(!ctl.has_pending_save());
    assert_eq!(ctl.state(), InteractionState::Idle);
}

#[test]
fn added_widget_keeps_unsaved_positions() {
    let store = MemoryStore::shared();
    let t0 = Instant::now();
    let mut ctl = mounted(store, t0);
    ctl.handle(GridEvent::LayoutChange(candle_at(0, 0)), t0 + ms(10));
    ctl.sync_items(&["candlestick-chart", "markov-chains-1"], t0 + ms(20));
    assert_eq!(ctl.placement("candlestick-chart").unwrap().x, 0);
    let markov = ctl.placement("markov-chains-1").unwrap();
    assert_eq!((markov.y, markov.w, markov.h), (10, 12, 14));
    assert!(!ctl.sync_items(&["candlestick-chart", "markov-chains-1"], t0 + ms(30)));
}

#[test]
fn removed_widget_is_pruned_and_saved() {
    let store = MemoryStore::shared();
    let t0 = Instant::now();
    let mut ctl = GridController::new(KEY, LayoutStore::new(store.clone()));
    ctl.observe_width(1000.0, t0);
    ctl.sync_items(&["candlestick-chart", "volatility-garch-1"], t0);
    ctl.sync_items(&["candlestick-chart"], t0 + ms(5));
    assert_eq!(ctl.layout().len(), 1);
    ctl.poll(t0 + ms(5) + SAVE_DEBOUNCE);
    let layout = saved(&store).unwrap();
    assert!(layout.iter().all(|p| p.id != "volatility-garch-1"));
}

#[test]
fn narrower_container_refits_after_debounce() {
    let store = MemoryStore::shared();
    let t0 = Instant::now();
    let mut ctl = GridController::new(KEY, LayoutStore::new(store));
    ctl.observe_width(2400.0, t0);
    assert_eq!(ctl.columns(), 30);
    ctl.sync_items(&["markov-chains-1"], t0);
    assert_eq!(ctl.placement("markov-chains-1").unwrap().w, 30);

    ctl.observe_width(1000.0, t0 + ms(10));
    assert_eq!(ctl.columns(), 30);
    ctl.poll(t0 + ms(10) + ms(120));
    assert_eq!(ctl.columns(), 12);
    let p = ctl.placement("markov-chains-1").unwrap();
    assert!(p.right() <= 12);
}

#[test]
fn column_change_mid_gesture_waits_for_stop() {
    let store = MemoryStore::shared();
    let t0 = Instant::now();
    let mut ctl = GridController::new(KEY, LayoutStore::new(store));
    ctl.observe_width(2400.0, t0);
    ctl.sync_items(&["markov-chains-1"], t0);
    let wide = ctl.layout().to_vec();

    ctl.handle(GridEvent::DragStart, t0 + ms(1));
    ctl.observe_width(1000.0, t0 + ms(2));
    ctl.poll(t0 + ms(200));
    assert_eq!(ctl.columns(), 12);
    assert_eq!(ctl.layout(), wide.as_slice());

    ctl.handle(GridEvent::DragStop(wide.clone()), t0 + ms(300));
    assert!(ctl.placement("markov-chains-1").unwrap().right() <= 12);
}

#[test]
fn switching_key_flushes_pending_save_to_old_key() {
    let store = MemoryStore::shared();
    let t0 = Instant::now();
    let mut ctl = mounted(store.clone(), t0);
    ctl.handle(GridEvent::LayoutChange(candle_at(3, 2)), t0);
    ctl.set_storage_key("dashboard:grid:other");
    assert_eq!(saved(&store), Some(candle_at(3, 2)));
    assert_eq!(ctl.storage_key(), "dashboard:grid:other");
    assert!(!ctl.has_pending_save());
}

#[test]
fn out_of_range_record_falls_back_to_default_layout() {
    let store = MemoryStore::shared();
    store
        .set(
            KEY,
            r#"[{"i":"a","x":0,"y":4294967295,"w":2,"h":2,"minW":2,"minH":2}]"#,
        )
        .unwrap();
    let t0 = Instant::now();
    let mut ctl = GridController::new(KEY, LayoutStore::new(store));
    ctl.observe_width(1000.0, t0);
    assert!(ctl.sync_items(&["a", "candlestick-chart"], t0));
    let a = ctl.placement("a").unwrap();
    assert_eq!(a.y, 0, "placement kept its stored row");
    let candle = ctl.placement("candlestick-chart").unwrap();
    assert!(candle.bottom() < 100);
}

#[test]
fn negative_coordinate_falls_back_to_default_layout() {
    let store = MemoryStore::shared();
    store
        .set(KEY, r#"[{"i":"candlestick-chart","x":-3,"y":0,"w":8,"h":10}]"#)
        .unwrap();
    let t0 = Instant::now();
    let ctl = mounted(store, t0);
    assert_eq!(ctl.layout(), candle_at(2, 0).as_slice());
}

#[test]
fn zero_sized_placement_is_raised_to_minimum() {
    let store = MemoryStore::shared();
    store
        .set(KEY, r#"[{"i":"candlestick-chart","x":1,"y":2,"w":0,"h":0}]"#)
        .unwrap();
    let t0 = Instant::now();
    let ctl = mounted(store, t0);
    let p = ctl.placement("candlestick-chart").unwrap();
    assert_eq!((p.x, p.y), (1, 2));
    assert!(p.w >= 1 && p.h >= 1);
}
