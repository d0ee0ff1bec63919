use thiserror::Error;

use crate::{order_types::OrderId, storage::OrderStoreError};

#[derive(Debug, Error)]
pub enum OrderHubError {
    #[error("An order must contain at least one product line")]
    EmptyOrder,
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order storage error: {0}")]
    Store(#[from] OrderStoreError),
}
