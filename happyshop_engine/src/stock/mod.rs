//! The stock service: product lookup and transactional stock purchase.
//!
//! The rest of the engine consumes stock exclusively through the [`StockDatabase`] trait. Two backends are provided:
//! [`SqliteStockDb`] keeps the catalogue in SQLite and gets its atomicity from database transactions, and
//! [`MemoryStockDb`] keeps it in memory for unit tests and offline demos.

mod memory;
mod sqlite;

use thiserror::Error;

pub use memory::MemoryStockDb;
pub use sqlite::SqliteStockDb;

use crate::order_types::{Product, ProductId};

#[derive(Debug, Clone, Error)]
pub enum StockError {
    #[error("Stock database error: {0}")]
    DatabaseError(String),
    #[error("No product exists with id {0}")]
    ProductNotFound(ProductId),
}

impl From<sqlx::Error> for StockError {
    fn from(e: sqlx::Error) -> Self {
        StockError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait StockDatabase: Clone {
    /// Searches the catalogue. `keyword` is either an exact product id or a case-insensitive substring of the
    /// description. Returned products carry an `ordered_quantity` of 1.
    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>, StockError>;

    /// Attempts to decrement stock for every line, atomically. Returns an empty list when every decrement was
    /// applied. If any line cannot be satisfied, *no* decrement is applied and the unsatisfiable lines are returned
    /// with `stock_quantity` set to the amount actually available and `ordered_quantity` to the amount requested.
    async fn purchase_stocks(&self, lines: &[Product]) -> Result<Vec<Product>, StockError>;

    /// Restores previously purchased quantities. Compensates a reservation whose payment was cancelled.
    async fn release_stocks(&self, lines: &[Product]) -> Result<(), StockError>;
}
