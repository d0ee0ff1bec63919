//! End-to-end coverage of the checkout pipeline against the in-memory stock backend: the happy path, both business
//! rules with their boundary values, shortage pruning, and payment cancellation.

use std::time::Duration;

use happyshop_engine::{
    order_types::{CustomerTier, OrderState, PaymentMethod, Product, ProductId},
    CheckoutOutcome,
    CheckoutPipeline,
    MemoryStockDb,
    PaymentDecision,
    PaymentTerminal,
    StockDatabase,
    Trolley,
};
use hs_common::Money;

mod support;

use support::{cheap_item, new_hub, radio, tv};

const GRACE: Duration = Duration::from_secs(10);

/// A payment terminal that always answers the same thing.
#[derive(Clone, Copy)]
struct AutoPay(PaymentDecision);

impl PaymentTerminal for AutoPay {
    async fn collect_payment(&self, _total: Money, _tier: CustomerTier) -> PaymentDecision {
        self.0
    }
}

fn card() -> AutoPay {
    AutoPay(PaymentDecision::Confirmed(PaymentMethod::CreditCard))
}

#[tokio::test]
async fn single_product_happy_path() {
    let (_guard, store, hub) = new_hub(GRACE).await;
    let stock = MemoryStockDb::with_products([tv()]).await;
    let pipeline = CheckoutPipeline::new(stock.clone(), hub.clone(), card());

    let mut trolley = Trolley::new();
    let found = stock.search_products("0001").await.unwrap();
    trolley.add_product(&found[0]);

    let outcome = pipeline.checkout(&mut trolley, CustomerTier::Standard).await.unwrap();
    let receipt = match outcome {
        CheckoutOutcome::Completed(receipt) => receipt,
        other => panic!("expected a completed checkout, got {other:?}"),
    };
    assert!(receipt.to_string().contains("( 1) £ 269.00"));
    assert_eq!(receipt.total, Money::from_pence(26900));
    assert!(trolley.is_empty());
    // Exactly one new file in ordered/, named by the allocated id.
    let on_disk = store.list_ids(OrderState::Ordered).await.unwrap();
    assert_eq!(on_disk, vec![receipt.order_id]);
    assert_eq!(stock.stock_level(&ProductId::from("0001")).await, Some(9));
}

#[tokio::test]
async fn excessive_quantity_is_surfaced_then_clamped() {
    let (_guard, store, hub) = new_hub(GRACE).await;
    // Plenty of stock so only the cap rule can fire.
    let stock =
        MemoryStockDb::with_products([Product::new("0001", "40 inch LED HD TV", "0001.jpg", Money::from_pence(26900), 100)]).await;
    let pipeline = CheckoutPipeline::new(stock.clone(), hub.clone(), card());

    let mut trolley = Trolley::new();
    trolley.add_product(&tv().with_quantity(60));

    let outcome = pipeline.checkout(&mut trolley, CustomerTier::Standard).await.unwrap();
    match outcome {
        CheckoutOutcome::ExcessiveQuantity { offending, cap } => {
            assert_eq!(cap, 50);
            assert_eq!(offending.len(), 1);
            // The error preserves the pre-clamp quantity for before/after feedback.
            assert_eq!(offending[0].ordered_quantity, 60);
        },
        other => panic!("expected an excessive-quantity outcome, got {other:?}"),
    }
    // The trolley was clamped to the cap and nothing was persisted.
    assert_eq!(trolley.items()[0].ordered_quantity, 50);
    assert!(store.list_ids(OrderState::Ordered).await.unwrap().is_empty());
    assert_eq!(stock.stock_level(&ProductId::from("0001")).await, Some(100));

    // Re-entering checkout with the clamped trolley succeeds.
    let outcome = pipeline.checkout(&mut trolley, CustomerTier::Standard).await.unwrap();
    assert!(matches!(outcome, CheckoutOutcome::Completed(_)));
    assert_eq!(stock.stock_level(&ProductId::from("0001")).await, Some(50));
}

#[tokio::test]
async fn exactly_the_cap_is_allowed() {
    let (_guard, _store, hub) = new_hub(GRACE).await;
    let stock = MemoryStockDb::with_products([cheap_item()]).await;
    let pipeline = CheckoutPipeline::new(stock, hub, card());
    let mut trolley = Trolley::new();
    trolley.add_product(&cheap_item().with_quantity(50));
    let outcome = pipeline.checkout(&mut trolley, CustomerTier::Standard).await.unwrap();
    assert!(matches!(outcome, CheckoutOutcome::Completed(_)));
}

#[tokio::test]
async fn standard_customers_must_reach_the_minimum_spend() {
    let (_guard, store, hub) = new_hub(GRACE).await;
    let stock = MemoryStockDb::with_products([cheap_item()]).await;
    let pipeline = CheckoutPipeline::new(stock.clone(), hub.clone(), card());

    let mut trolley = Trolley::new();
    trolley.add_product(&cheap_item()); // £4.99

    let outcome = pipeline.checkout(&mut trolley, CustomerTier::Standard).await.unwrap();
    match outcome {
        CheckoutOutcome::MinimumSpend { actual, required } => {
            assert_eq!(actual, Money::from_pence(499));
            assert_eq!(required, Money::from_pounds(5));
        },
        other => panic!("expected a minimum-spend outcome, got {other:?}"),
    }
    // Trolley untouched, nothing persisted, nothing decremented.
    assert_eq!(trolley.len(), 1);
    assert_eq!(trolley.items()[0].ordered_quantity, 1);
    assert!(store.list_ids(OrderState::Ordered).await.unwrap().is_empty());
    assert_eq!(stock.stock_level(&ProductId::from("0006")).await, Some(60));

    // The same trolley sails through for a VIP.
    let outcome = pipeline.checkout(&mut trolley, CustomerTier::Vip).await.unwrap();
    assert!(matches!(outcome, CheckoutOutcome::Completed(_)));
    assert!(trolley.is_empty());
}

#[tokio::test]
async fn exactly_the_minimum_spend_is_allowed() {
    let (_guard, _store, hub) = new_hub(GRACE).await;
    let item = Product::new("0008", "Kettle", "0008.jpg", Money::from_pence(250), 10);
    let stock = MemoryStockDb::with_products([item.clone()]).await;
    let pipeline = CheckoutPipeline::new(stock, hub, card());
    let mut trolley = Trolley::new();
    trolley.add_product(&item.with_quantity(2)); // exactly £5.00
    let outcome = pipeline.checkout(&mut trolley, CustomerTier::Standard).await.unwrap();
    assert!(matches!(outcome, CheckoutOutcome::Completed(_)));
}

#[tokio::test]
async fn shortage_prunes_the_trolley_and_creates_no_order() {
    let (_guard, store, hub) = new_hub(GRACE).await;
    let stock = MemoryStockDb::with_products([tv(), radio()]).await; // radio stock is 3
    let pipeline = CheckoutPipeline::new(stock.clone(), hub.clone(), card());

    let mut trolley = Trolley::new();
    trolley.add_product(&tv().with_quantity(5));
    trolley.add_product(&radio().with_quantity(20));

    let outcome = pipeline.checkout(&mut trolley, CustomerTier::Standard).await.unwrap();
    match outcome {
        CheckoutOutcome::Shortage(shortages) => {
            assert_eq!(shortages.len(), 1);
            assert_eq!(shortages[0].id, ProductId::from("0002"));
            assert_eq!(shortages[0].stock_quantity, 3);
            assert_eq!(shortages[0].ordered_quantity, 20);
        },
        other => panic!("expected a shortage outcome, got {other:?}"),
    }
    // Only the satisfiable line remains; nothing was decremented or persisted.
    assert_eq!(trolley.len(), 1);
    assert_eq!(trolley.items()[0].id, ProductId::from("0001"));
    assert_eq!(stock.stock_level(&ProductId::from("0001")).await, Some(10));
    assert!(store.list_ids(OrderState::Ordered).await.unwrap().is_empty());
}

#[tokio::test]
async fn cancelling_payment_releases_the_reservation_and_keeps_the_trolley() {
    let (_guard, store, hub) = new_hub(GRACE).await;
    let stock = MemoryStockDb::with_products([tv()]).await;
    let pipeline = CheckoutPipeline::new(stock.clone(), hub.clone(), AutoPay(PaymentDecision::Cancelled));

    let mut trolley = Trolley::new();
    trolley.add_product(&tv().with_quantity(2));

    let outcome = pipeline.checkout(&mut trolley, CustomerTier::Standard).await.unwrap();
    assert!(matches!(outcome, CheckoutOutcome::PaymentCancelled));
    assert_eq!(trolley.len(), 1);
    assert_eq!(trolley.items()[0].ordered_quantity, 2);
    assert_eq!(stock.stock_level(&ProductId::from("0001")).await, Some(10));
    assert!(store.list_ids(OrderState::Ordered).await.unwrap().is_empty());
}

#[tokio::test]
async fn an_empty_trolley_cannot_be_checked_out() {
    let (_guard, _store, hub) = new_hub(GRACE).await;
    let stock = MemoryStockDb::new();
    let pipeline = CheckoutPipeline::new(stock, hub, card());
    let mut trolley = Trolley::new();
    let outcome = pipeline.checkout(&mut trolley, CustomerTier::Standard).await.unwrap();
    assert!(matches!(outcome, CheckoutOutcome::EmptyTrolley));
}

#[tokio::test]
async fn the_confirmed_payment_method_lands_in_the_order_file() {
    let (_guard, _store, hub) = new_hub(GRACE).await;
    let stock = MemoryStockDb::with_products([tv()]).await;
    let pipeline = CheckoutPipeline::new(stock, hub.clone(), AutoPay(PaymentDecision::Confirmed(PaymentMethod::Cash)));
    let mut trolley = Trolley::new();
    trolley.add_product(&tv());
    let outcome = pipeline.checkout(&mut trolley, CustomerTier::Prime).await.unwrap();
    let receipt = match outcome {
        CheckoutOutcome::Completed(receipt) => receipt,
        other => panic!("expected a completed checkout, got {other:?}"),
    };
    let body = hub.order_details(receipt.order_id).await.unwrap();
    assert!(body.contains("Payment_Method: Cash"));
    assert!(body.contains("Customer_Tier: Prime"));
}
