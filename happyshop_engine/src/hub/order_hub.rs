//! The order hub: the single coordinator for every order in the system.
//!
//! The hub owns the live order map, drives state transitions (delegating the file work to the
//! [`OrderFileStore`]), schedules the delayed removal of collected orders, and fans out order-map projections to
//! registered trackers and pickers. One hub instance is created at startup and shared (behind an `Arc`) with every
//! client; there is no hidden global.
//!
//! All mutations of the order map and of the observer registries happen under a single async mutex that is held
//! across each public operation, including inside the scheduled-removal callback. File operations run inside that
//! serialised region too, which is why the file store itself needs no locking. Observers are only notified after
//! both the file mutation and the map update have committed, so a projection can never disagree with the on-disk
//! layout.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use log::*;
use tokio::sync::Mutex;

use crate::{
    events::{ObserverHandle, ObserverRegistry, OrderMapUpdatedEvent},
    hub::OrderHubError,
    order_types::{CustomerTier, Order, OrderId, OrderMapProjection, OrderState, PaymentMethod, Product},
    storage::{OrderFileStore, OrderIdGenerator},
};

/// How long a collected order stays visible to trackers before it leaves the live map. Its file remains archived in
/// `collected/` forever.
pub const DEFAULT_COLLECTED_GRACE_PERIOD: Duration = Duration::from_secs(10);

#[derive(Default)]
struct HubState {
    order_map: OrderMapProjection,
    trackers: ObserverRegistry<OrderMapUpdatedEvent>,
    pickers: ObserverRegistry<OrderMapUpdatedEvent>,
}

pub struct OrderHub {
    store: OrderFileStore,
    ids: OrderIdGenerator,
    grace_period: Duration,
    state: Arc<Mutex<HubState>>,
}

impl OrderHub {
    pub fn new(store: OrderFileStore, ids: OrderIdGenerator, grace_period: Duration) -> Self {
        Self { store, ids, grace_period, state: Arc::new(Mutex::new(HubState::default())) }
    }

    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Rebuilds the live order map from the `ordered/`, `progressing/` and `ready/` directories. The `collected/`
    /// archive stays on disk but is not loaded back. Called once at startup.
    pub async fn initialize(&self) -> Result<(), OrderHubError> {
        let mut state = self.state.lock().await;
        let mut counts = Vec::with_capacity(3);
        for dir_state in [OrderState::Ordered, OrderState::Progressing, OrderState::Ready] {
            let ids = self.store.list_ids(dir_state).await?;
            counts.push(format!("{} {}", ids.len(), dir_state.dir_name()));
            for id in ids {
                state.order_map.insert(id, dir_state);
            }
        }
        info!("📦️ Order map initialised with {} orders ({})", state.order_map.len(), counts.join(", "));
        Self::notify_observers(&mut state);
        Ok(())
    }

    /// Creates a new order from the given product lines: allocates an id, timestamps it, writes its file into
    /// `ordered/`, inserts it into the live map and notifies every observer. If the file write fails, the map is
    /// untouched and nobody is notified.
    pub async fn new_order(
        &self,
        items: Vec<Product>,
        tier: CustomerTier,
        payment_method: PaymentMethod,
    ) -> Result<Order, OrderHubError> {
        if items.is_empty() {
            return Err(OrderHubError::EmptyOrder);
        }
        let id = self.ids.next_id().await;
        let order = Order::new(id, Utc::now(), items, tier, payment_method);
        let mut state = self.state.lock().await;
        self.store.create(OrderState::Ordered, id, &order.details()).await?;
        state.order_map.insert(id, OrderState::Ordered);
        debug!("📦️ Created order {id}; {} orders live", state.order_map.len());
        Self::notify_observers(&mut state);
        Ok(order)
    }

    /// Registers an order tracker. The returned handle immediately yields the current full projection, then every
    /// committed map version in order.
    pub async fn register_tracker(&self) -> ObserverHandle<OrderMapUpdatedEvent> {
        let mut state = self.state.lock().await;
        let snapshot = OrderMapUpdatedEvent::new(state.order_map.clone());
        let handle = state.trackers.subscribe(snapshot);
        debug!("📦️ Tracker registered; {} tracker(s) now listening", state.trackers.observer_count());
        handle
    }

    /// Registers a picker. Pickers only see actionable orders: `Collected` entries are filtered out of their
    /// projections.
    pub async fn register_picker(&self) -> ObserverHandle<OrderMapUpdatedEvent> {
        let mut state = self.state.lock().await;
        let snapshot = OrderMapUpdatedEvent::new(Self::picker_projection(&state.order_map));
        let handle = state.pickers.subscribe(snapshot);
        debug!("📦️ Picker registered; {} picker(s) now listening", state.pickers.observer_count());
        handle
    }

    /// Moves the order to `new_state`: updates and moves its file, updates the map, and notifies all observers.
    /// Transitioning to the state the order is already in is a silent no-op and emits no notification. Entering
    /// `Collected` schedules the order's removal from the live map after the grace period.
    pub async fn change_order_state(&self, id: OrderId, new_state: OrderState) -> Result<(), OrderHubError> {
        let mut state = self.state.lock().await;
        let current = *state.order_map.get(&id).ok_or(OrderHubError::OrderNotFound(id))?;
        if current == new_state {
            trace!("📦️ Order {id} is already {new_state}; nothing to do");
            return Ok(());
        }
        self.store.update_and_move(id, new_state, current, new_state).await?;
        state.order_map.insert(id, new_state);
        info!("📦️ Order {id} moved from {current} to {new_state}");
        Self::notify_observers(&mut state);
        drop(state);
        if new_state == OrderState::Collected {
            self.schedule_removal(id);
        }
        Ok(())
    }

    /// Returns the full text of the order's file, read from whichever state directory currently holds it.
    pub async fn order_details(&self, id: OrderId) -> Result<String, OrderHubError> {
        let state = self.state.lock().await;
        let current = *state.order_map.get(&id).ok_or(OrderHubError::OrderNotFound(id))?;
        let body = self.store.read(current, id).await?;
        Ok(body)
    }

    /// A snapshot of the live order map, outside the observer machinery.
    pub async fn order_map_snapshot(&self) -> OrderMapProjection {
        self.state.lock().await.order_map.clone()
    }

    /// Drops the order from the live map once the grace period has elapsed, then re-notifies trackers. The state is
    /// captured at schedule time: if the order has been moved out of `Collected` in the meantime, the removal is
    /// abandoned.
    fn schedule_removal(&self, id: OrderId) {
        let state = Arc::clone(&self.state);
        let grace = self.grace_period;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let mut guard = state.lock().await;
            match guard.order_map.get(&id) {
                Some(OrderState::Collected) => {
                    guard.order_map.remove(&id);
                    info!("📦️ Order {id} removed from the live map after its grace period");
                    let projection = guard.order_map.clone();
                    guard.trackers.publish(OrderMapUpdatedEvent::new(projection));
                },
                Some(other) => {
                    debug!("📦️ Order {id} went back to {other} before its removal fired; leaving it alone");
                },
                None => {},
            }
        });
    }

    fn picker_projection(order_map: &OrderMapProjection) -> OrderMapProjection {
        order_map.iter().filter(|(_, s)| **s != OrderState::Collected).map(|(k, v)| (*k, *v)).collect()
    }

    fn notify_observers(state: &mut HubState) {
        let full = state.order_map.clone();
        let for_pickers = Self::picker_projection(&full);
        state.trackers.publish(OrderMapUpdatedEvent::new(full));
        state.pickers.publish(OrderMapUpdatedEvent::new(for_pickers));
    }
}
