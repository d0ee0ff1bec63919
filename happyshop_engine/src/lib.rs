//! HappyShop Order Coordination Engine
//!
//! This library contains the core logic for the HappyShop ordering system. It is front-end agnostic: the customer,
//! picker and order-tracker clients all drive the same engine through its public API.
//!
//! The library is divided into four main sections:
//! 1. Order storage ([`mod@storage`]). Every live order is persisted as one text file in a directory whose name
//!    encodes the order's state. The directory layout *is* the durable state; the [`storage::OrderFileStore`] owns
//!    all file operations and the [`storage::OrderIdGenerator`] hands out process-wide unique order ids that survive
//!    restarts.
//! 2. The order hub ([`mod@hub`]). A single [`hub::OrderHub`] instance coordinates order creation, state
//!    transitions, file moves, delayed cleanup of collected orders, and fan-out of order-map projections to any
//!    number of registered observers.
//! 3. The stock database ([`mod@stock`]). Product search and transactional stock purchase are consumed through the
//!    [`stock::StockDatabase`] trait. A SQLite backend is provided for real catalogues, and an in-memory backend for
//!    tests and offline demos.
//! 4. The checkout pipeline ([`mod@checkout`]). A customer's trolley is validated against the shop's business rules,
//!    stock is reserved, payment is collected through the [`checkout::PaymentTerminal`] seam, and the order is handed
//!    to the hub.
//!
//! Observers subscribe to hub events through lightweight channels ([`mod@events`]); each observer receives order-map
//! projections in the exact order the hub committed them.

pub mod checkout;
pub mod events;
pub mod helpers;
pub mod hub;
pub mod order_types;
pub mod stock;
pub mod storage;

pub use checkout::{CheckoutOutcome, CheckoutPipeline, PaymentDecision, PaymentTerminal, Trolley};
pub use hub::{OrderHub, OrderHubError};
pub use stock::{MemoryStockDb, SqliteStockDb, StockDatabase};
pub use storage::{OrderFileStore, OrderIdGenerator, OrderStoreError};
