#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use happyshop_engine::{
    order_types::Product,
    OrderFileStore,
    OrderHub,
    OrderIdGenerator,
};
use hs_common::Money;
use tempfile::TempDir;

pub async fn new_hub(grace_period: Duration) -> (TempDir, OrderFileStore, Arc<OrderHub>) {
    let _ = env_logger::try_init();
    let dir = tempfile::tempdir().expect("Error creating temp dir");
    let store = OrderFileStore::new(dir.path().join("orders"));
    store.ensure_directories().await.expect("Error creating state directories");
    let ids = OrderIdGenerator::initialize(&store).await.expect("Error initialising the id generator");
    let hub = Arc::new(OrderHub::new(store.clone(), ids, grace_period));
    (dir, store, hub)
}

pub fn tv() -> Product {
    Product::new("0001", "40 inch LED HD TV", "0001.jpg", Money::from_pence(26900), 10)
}

pub fn radio() -> Product {
    Product::new("0002", "DAB Radio", "0002.jpg", Money::from_pence(2949), 3)
}

pub fn cheap_item() -> Product {
    Product::new("0006", "MP3 player", "0006.jpg", Money::from_pence(499), 60)
}
