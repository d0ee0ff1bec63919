use std::sync::Arc;

use hs_common::Money;
use log::*;
use thiserror::Error;

use crate::{
    checkout::{Receipt, Trolley, MAX_LINE_QUANTITY, MINIMUM_SPEND},
    hub::{OrderHub, OrderHubError},
    order_types::{CustomerTier, PaymentMethod, Product},
    stock::{StockDatabase, StockError},
};

/// The user's answer to the payment prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentDecision {
    Confirmed(PaymentMethod),
    Cancelled,
}

/// The seam to the payment dialog. The console front end prompts the user; tests supply canned decisions.
#[allow(async_fn_in_trait)]
pub trait PaymentTerminal {
    async fn collect_payment(&self, total: Money, tier: CustomerTier) -> PaymentDecision;
}

/// What a checkout attempt came to. Everything except `Completed` leaves the shop unchanged apart from the
/// documented trolley adjustments; the caller shows a message and lets the user carry on.
#[derive(Debug)]
pub enum CheckoutOutcome {
    Completed(Receipt),
    /// Standard tier only: the total fell strictly below the minimum. Trolley untouched.
    MinimumSpend { actual: Money, required: Money },
    /// Lines whose quantity exceeded the cap, carrying their *original* quantities so the user can be shown
    /// before/after. The offending trolley lines have been clamped to the cap; the user re-enters checkout.
    ExcessiveQuantity { offending: Vec<Product>, cap: u32 },
    /// The stock service could not satisfy these lines (`stock_quantity` holds what was available). The lines have
    /// been removed from the trolley; nothing was decremented.
    Shortage(Vec<Product>),
    /// The user backed out of the payment dialog. The reservation was released and the trolley preserved.
    PaymentCancelled,
    EmptyTrolley,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Stock service failure: {0}")]
    Stock(#[from] StockError),
    #[error("Order hub failure: {0}")]
    Hub(#[from] OrderHubError),
}

/// Drives a checkout end to end: group, validate, reserve stock, collect payment, create the order, produce the
/// receipt.
pub struct CheckoutPipeline<B: StockDatabase, T: PaymentTerminal> {
    stock: B,
    hub: Arc<OrderHub>,
    terminal: T,
}

impl<B: StockDatabase, T: PaymentTerminal> CheckoutPipeline<B, T> {
    pub fn new(stock: B, hub: Arc<OrderHub>, terminal: T) -> Self {
        Self { stock, hub, terminal }
    }

    pub async fn checkout(&self, trolley: &mut Trolley, tier: CustomerTier) -> Result<CheckoutOutcome, CheckoutError> {
        if trolley.is_empty() {
            return Ok(CheckoutOutcome::EmptyTrolley);
        }
        let grouped = trolley.grouped();

        let total: Money = grouped.iter().map(Product::line_total).sum();
        if tier == CustomerTier::Standard && total < MINIMUM_SPEND {
            info!("🛒️ Checkout rejected: {total} is below the {MINIMUM_SPEND} minimum for Standard customers");
            return Ok(CheckoutOutcome::MinimumSpend { actual: total, required: MINIMUM_SPEND });
        }

        let offending: Vec<Product> =
            grouped.iter().filter(|line| line.ordered_quantity > MAX_LINE_QUANTITY).cloned().collect();
        if !offending.is_empty() {
            for line in &offending {
                trolley.set_quantity(&line.id, MAX_LINE_QUANTITY);
            }
            info!("🛒️ Checkout rejected: {} line(s) exceeded the cap of {MAX_LINE_QUANTITY}; quantities clamped", offending.len());
            return Ok(CheckoutOutcome::ExcessiveQuantity { offending, cap: MAX_LINE_QUANTITY });
        }

        let shortages = self.stock.purchase_stocks(&grouped).await?;
        if !shortages.is_empty() {
            for short in &shortages {
                trolley.remove_item(&short.id);
            }
            info!("🛒️ Insufficient stock for {} line(s); removed from the trolley", shortages.len());
            return Ok(CheckoutOutcome::Shortage(shortages));
        }

        match self.terminal.collect_payment(total, tier).await {
            PaymentDecision::Cancelled => {
                self.stock.release_stocks(&grouped).await?;
                info!("🛒️ Payment cancelled; stock reservation released, trolley preserved");
                Ok(CheckoutOutcome::PaymentCancelled)
            },
            PaymentDecision::Confirmed(method) => {
                let order = match self.hub.new_order(grouped.clone(), tier, method).await {
                    Ok(order) => order,
                    Err(e) => {
                        if let Err(release_err) = self.stock.release_stocks(&grouped).await {
                            error!("🛒️ Could not release the reservation after a failed order creation: {release_err}");
                        }
                        return Err(e.into());
                    },
                };
                trolley.clear();
                info!("🛒️ Checkout complete: order {} for {}", order.id, order.total());
                Ok(CheckoutOutcome::Completed(Receipt::for_order(&order)))
            },
        }
    }
}
