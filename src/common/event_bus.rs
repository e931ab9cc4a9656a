use std::collections::HashSet;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};

/// Named event topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    RouteChanged,
    ThemeChanged,
    LayoutSaved,
    LayoutReset,
}

/// Event payloads. Each variant belongs to exactly one [`Topic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    RouteChanged { title: String },
    ThemeChanged { dark: bool },
    LayoutSaved { storage_key: String },
    LayoutReset,
}

impl AppEvent {
    pub fn topic(&self) -> Topic {
        match self {
            AppEvent::RouteChanged { .. } => Topic::RouteChanged,
            AppEvent::ThemeChanged { .. } => Topic::ThemeChanged,
            AppEvent::LayoutSaved { .. } => Topic::LayoutSaved,
            AppEvent::LayoutReset => Topic::LayoutReset,
        }
    }
}

struct Subscriber {
    id: u64,
    topics: HashSet<Topic>,
    tx: Sender<AppEvent>,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// Typed publish/subscribe channel scoped to the application root.
///
/// Cloning the bus hands out another handle to the same channel.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

/// Receiving side of a subscription. Dropping it detaches the subscriber on
/// the next publish; [`EventBus::unsubscribe`] detaches it immediately.
pub struct Subscription {
    id: u64,
    rx: Receiver<AppEvent>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Drain every event delivered since the last call.
    pub fn drain(&self) -> Vec<AppEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(ev) => events.push(ev),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, topics: &[Topic]) -> Subscription {
        let (tx, rx) = channel();
        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        let id = inner.next_id;
        inner.next_id += 1;
        inner.subscribers.push(Subscriber {
            id,
            topics: topics.iter().copied().collect(),
            tx,
        });
        Subscription { id, rx }
    }

    pub fn unsubscribe(&self, subscription: &Subscription) {
        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        inner.subscribers.retain(|s| s.id != subscription.id);
    }

    /// Deliver `event` to every subscriber of its topic. Returns the number
    /// of subscribers reached.
    pub fn publish(&self, event: AppEvent) -> usize {
        let topic = event.topic();
        let mut inner = match self.inner.lock() {
            Ok(inner) => inner,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut delivered = 0;
        inner.subscribers.retain(|s| {
            if !s.topics.contains(&topic) {
                return true;
            }
            match s.tx.send(event.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => false,
            }
        });
        tracing::trace!(?topic, delivered, "event published");
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        match self.inner.lock() {
            Ok(inner) => inner.subscribers.len(),
            Err(poisoned) => poisoned.into_inner().subscribers.len(),
        }
    }
}
