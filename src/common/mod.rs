pub mod deferred;
pub mod event_bus;

pub use deferred::PendingTask;
pub use event_bus::{AppEvent, EventBus, Subscription, Topic};
