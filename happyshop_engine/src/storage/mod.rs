mod order_counter;
mod order_file_store;

pub use order_counter::OrderIdGenerator;
pub use order_file_store::{OrderFileStore, OrderStoreError};
