//! The order-tracker view: a read-only, colour-coded board of all live orders.
//!
//! The tracker registers with the hub at startup. Its dispatch loop receives every committed order-map projection in
//! order and caches the latest one; the board renders from that cache whenever the user opens it.

use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, Mutex},
};

use dialoguer::console::Style;
use happyshop_engine::{
    events::{Handler, OrderMapUpdatedEvent},
    order_types::{OrderMapProjection, OrderState},
    OrderHub,
};

pub struct TrackerBoard {
    latest: Arc<Mutex<OrderMapProjection>>,
}

impl TrackerBoard {
    /// Registers with the hub and starts the dispatch loop that keeps the board current.
    pub async fn start(hub: &OrderHub) -> Self {
        let handle = hub.register_tracker().await;
        let latest = Arc::new(Mutex::new(OrderMapProjection::new()));
        let cache = Arc::clone(&latest);
        let handler: Handler<OrderMapUpdatedEvent> = Arc::new(move |event: OrderMapUpdatedEvent| {
            let cache = Arc::clone(&cache);
            Box::pin(async move {
                let mut guard = match cache.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                *guard = event.projection;
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        tokio::spawn(handle.run_with(handler));
        Self { latest }
    }

    pub fn render(&self) -> String {
        let snapshot = match self.latest.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let mut out = String::from("📦 Order Tracker\n");
        if snapshot.is_empty() {
            out.push_str("  (no live orders)\n");
            return out;
        }
        for (id, state) in &snapshot {
            let style = state_style(*state);
            out.push_str(&format!("  Order {:<6} {}\n", id.to_string(), style.apply_to(state)));
        }
        out
    }
}

fn state_style(state: OrderState) -> Style {
    match state {
        OrderState::Ordered => Style::new().yellow(),
        OrderState::Progressing => Style::new().cyan(),
        OrderState::Ready => Style::new().green(),
        OrderState::Collected => Style::new().dim(),
    }
}
