use crate::dashboard::layout::{Layout, WidgetPlacement};
use crate::storage::SharedStore;
use serde_json::Value;

/// Gateway between layouts and the key/value store.
///
/// Every failure is swallowed here: a read problem looks like "nothing
/// saved", a write problem like "save skipped".
#[derive(Clone)]
pub struct LayoutStore {
    store: SharedStore,
}

impl LayoutStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn backing(&self) -> &SharedStore {
        &self.store
    }

    /// Persisted layout under `key`, or `None` when missing, unreadable, not
    /// a JSON array, or containing an entry that is not a placement.
    pub fn load(&self, key: &str) -> Option<Layout> {
        match self.try_load(key) {
            Ok(layout) => layout,
            Err(err) => {
                tracing::debug!(key, error = %err, "ignoring unreadable layout");
                None
            }
        }
    }

    fn try_load(&self, key: &str) -> anyhow::Result<Option<Layout>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let value: Value = serde_json::from_str(&raw)?;
        if !value.is_array() {
            anyhow::bail!("layout record is not an array");
        }
        let layout: Vec<WidgetPlacement> = serde_json::from_value(value)?;
        if let Some(bad) = layout.iter().find(|p| !p.within_bounds()) {
            anyhow::bail!("placement {} lies outside the grid", bad.id);
        }
        Ok(Some(layout))
    }

    /// Write `layout` under `key`. Returns whether the write went through.
    pub fn save(&self, key: &str, layout: &[WidgetPlacement]) -> bool {
        let result = serde_json::to_string(layout)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.store.set(key, &json));
        match result {
            Ok(()) => {
                tracing::debug!(key, placements = layout.len(), "layout saved");
                true
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "layout save skipped");
                false
            }
        }
    }

    pub fn clear(&self, key: &str) {
        if let Err(err) = self.store.remove(key) {
            tracing::warn!(key, error = %err, "failed to clear layout");
        }
    }

    pub fn exists(&self, key: &str) -> bool {
        self.load(key).is_some()
    }

    /// Remove one widget's placement from the persisted record, if any.
    pub fn remove_placement(&self, key: &str, id: &str) {
        if let Some(mut layout) = self.load(key) {
            let before = layout.len();
            layout.retain(|p| p.id != id);
            if layout.len() != before {
                self.save(key, &layout);
            }
        }
    }
}

/// Whether a usable layout is saved under `key`.
pub fn has_saved_layout(store: &SharedStore, key: &str) -> bool {
    LayoutStore::new(store.clone()).exists(key)
}

/// Delete the layout saved under `key`.
pub fn clear_layout(store: &SharedStore, key: &str) {
    LayoutStore::new(store.clone()).clear(key)
}
