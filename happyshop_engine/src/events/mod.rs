mod channel;
mod event_types;

pub use channel::{Handler, ObserverHandle, ObserverRegistry};
pub use event_types::OrderMapUpdatedEvent;
