//! The picker console: lists actionable orders, fetches order details, and drives state transitions.
//!
//! The picker never mutates its own view. Every action goes through the hub, and the listing is rendered from the
//! latest projection the hub pushed; a transition only becomes visible here once the hub has committed it and
//! notified its observers.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Select};
use happyshop_engine::{
    order_types::{OrderId, OrderMapProjection, OrderState},
    OrderHub,
};
use log::*;

pub struct PickerConsole {
    hub: Arc<OrderHub>,
    latest: Arc<Mutex<OrderMapProjection>>,
}

impl PickerConsole {
    /// Registers with the hub and starts the dispatch task that keeps the order listing current.
    pub async fn start(hub: Arc<OrderHub>) -> Self {
        let mut handle = hub.register_picker().await;
        let latest = Arc::new(Mutex::new(OrderMapProjection::new()));
        let cache = Arc::clone(&latest);
        tokio::spawn(async move {
            while let Some(event) = handle.recv().await {
                let mut guard = match cache.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                *guard = event.projection;
            }
        });
        Self { hub, latest }
    }

    pub async fn run(&self, theme: &ColorfulTheme) -> Result<()> {
        loop {
            let snapshot = match self.latest.lock() {
                Ok(guard) => guard.clone(),
                Err(poisoned) => poisoned.into_inner().clone(),
            };
            if snapshot.is_empty() {
                println!("No actionable orders right now.");
            }
            let mut labels = Vec::with_capacity(snapshot.len() + 1);
            let mut ids = Vec::with_capacity(snapshot.len());
            for (id, state) in &snapshot {
                labels.push(format!("Order {}{}  {}", id, self.tier_badge(*id).await, state));
                ids.push(*id);
            }
            labels.push("Back".to_string());
            let choice = Select::with_theme(theme).with_prompt("Pick an order").items(&labels).default(0).interact()?;
            if choice == ids.len() {
                return Ok(());
            }
            self.order_actions(theme, ids[choice]).await?;
        }
    }

    async fn order_actions(&self, theme: &ColorfulTheme, id: OrderId) -> Result<()> {
        const ACTIONS: [&str; 6] = ["Show details", "Set Ordered", "Set Progressing", "Set Ready", "Set Collected", "Back"];
        let choice = Select::with_theme(theme).with_prompt(format!("Order {id}")).items(&ACTIONS).default(0).interact()?;
        let new_state = match ACTIONS[choice] {
            "Show details" => {
                match self.hub.order_details(id).await {
                    Ok(body) => println!("{body}"),
                    Err(e) => println!("Error: {e}"),
                }
                return Ok(());
            },
            "Set Ordered" => OrderState::Ordered,
            "Set Progressing" => OrderState::Progressing,
            "Set Ready" => OrderState::Ready,
            "Set Collected" => OrderState::Collected,
            _ => return Ok(()),
        };
        if let Err(e) = self.hub.change_order_state(id, new_state).await {
            warn!("🧺️ Could not move order {id} to {new_state}: {e}");
            println!("Error: {e}");
        }
        Ok(())
    }

    /// The customer-tier badge for the order listing, read from the order's file.
    async fn tier_badge(&self, id: OrderId) -> &'static str {
        let Ok(body) = self.hub.order_details(id).await else {
            return "";
        };
        let tier = body
            .lines()
            .find_map(|line| line.strip_prefix("Customer_Tier: "))
            .unwrap_or("Standard")
            .trim();
        match tier {
            "VIP" => " [🌟 VIP]",
            "Prime" => " [⭐ Prime]",
            _ => "",
        }
    }
}
