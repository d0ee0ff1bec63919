use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use hs_common::Money;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::helpers::build_product_list;

/// Timestamp layout used in order files and receipts.
pub const ORDER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(String);

//--------------------------------------      ProductId      ---------------------------------------------------------
/// A lightweight wrapper around the catalogue's stable short product identifier (e.g. `0001`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<S: Into<String>> From<S> for ProductId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl ProductId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------       Product       ---------------------------------------------------------
/// A catalogue entry. `ordered_quantity` is only meaningful once the product sits in a trolley or an order line;
/// catalogue lookups return it as 1. Products are cloned whenever they enter a trolley so that a line never aliases
/// the search result it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub description: String,
    pub image_name: String,
    pub unit_price: Money,
    pub stock_quantity: u32,
    pub ordered_quantity: u32,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, description: impl Into<String>, image_name: impl Into<String>, unit_price: Money, stock_quantity: u32) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            image_name: image_name.into(),
            unit_price,
            stock_quantity,
            ordered_quantity: 1,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.ordered_quantity = quantity;
        self
    }

    pub fn line_total(&self) -> Money {
        self.unit_price * self.ordered_quantity
    }
}

//--------------------------------------      OrderState     ---------------------------------------------------------
/// The lifecycle state of an order. The conventional flow is Ordered → Progressing → Ready → Collected, but a picker
/// may move an order between any two distinct states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderState {
    /// The order was placed by the customer and is waiting for a picker.
    Ordered,
    /// A picker is preparing the order.
    Progressing,
    /// The order is ready for the customer to collect.
    Ready,
    /// The order has been handed over. After a grace period it leaves the live map; its file stays archived.
    Collected,
}

impl OrderState {
    pub const ALL: [OrderState; 4] = [OrderState::Ordered, OrderState::Progressing, OrderState::Ready, OrderState::Collected];

    /// Name of the storage directory that holds orders in this state. Total over all states, so an order file always
    /// has exactly one home.
    pub fn dir_name(&self) -> &'static str {
        match self {
            OrderState::Ordered => "ordered",
            OrderState::Progressing => "progressing",
            OrderState::Ready => "ready",
            OrderState::Collected => "collected",
        }
    }
}

impl Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderState::Ordered => write!(f, "Ordered"),
            OrderState::Progressing => write!(f, "Progressing"),
            OrderState::Ready => write!(f, "Ready"),
            OrderState::Collected => write!(f, "Collected"),
        }
    }
}

impl FromStr for OrderState {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ordered" => Ok(Self::Ordered),
            "Progressing" => Ok(Self::Progressing),
            "Ready" => Ok(Self::Ready),
            "Collected" => Ok(Self::Collected),
            s => Err(ConversionError(format!("Invalid order state: {s}"))),
        }
    }
}

//--------------------------------------     CustomerTier    ---------------------------------------------------------
/// Customer class that business rules key off. Standard customers are subject to the minimum-spend rule; VIP and
/// Prime bypass it, and Prime receives a discount on the receipt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerTier {
    #[default]
    Standard,
    Vip,
    Prime,
}

impl Display for CustomerTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CustomerTier::Standard => write!(f, "Standard"),
            CustomerTier::Vip => write!(f, "VIP"),
            CustomerTier::Prime => write!(f, "Prime"),
        }
    }
}

impl FromStr for CustomerTier {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Standard" => Ok(Self::Standard),
            "VIP" => Ok(Self::Vip),
            "Prime" => Ok(Self::Prime),
            s => Err(ConversionError(format!("Invalid customer tier: {s}"))),
        }
    }
}

//--------------------------------------    PaymentMethod    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "Cash"),
            PaymentMethod::CreditCard => write!(f, "CreditCard"),
            PaymentMethod::DebitCard => write!(f, "DebitCard"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash" => Ok(Self::Cash),
            "CreditCard" => Ok(Self::CreditCard),
            "DebitCard" => Ok(Self::DebitCard),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------       OrderId       ---------------------------------------------------------
/// A process-wide unique order identifier. Ids are positive, monotonically increasing, and never reused, even across
/// restarts. The bare integer doubles as the order's file stem on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub i64);

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i64> for OrderId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl FromStr for OrderId {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self).map_err(|e| ConversionError(format!("Invalid order id {s}: {e}")))
    }
}

impl OrderId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
/// A customer's finalised basket. The product list is a snapshot taken at checkout; later catalogue changes never
/// mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub state: OrderState,
    pub created_at: DateTime<Utc>,
    pub items: Vec<Product>,
    pub tier: CustomerTier,
    pub payment_method: PaymentMethod,
}

impl Order {
    pub fn new(id: OrderId, created_at: DateTime<Utc>, items: Vec<Product>, tier: CustomerTier, payment_method: PaymentMethod) -> Self {
        Self { id, state: OrderState::Ordered, created_at, items, tier, payment_method }
    }

    pub fn total(&self) -> Money {
        self.items.iter().map(Product::line_total).sum()
    }

    /// The body of the order's on-disk file. The first line carries the state and is rewritten on every transition;
    /// the directory the file lives in remains the authoritative record.
    pub fn details(&self) -> String {
        format!(
            "State: {}\nOrder_ID: {}\nOrdered_Date_Time: {}\nCustomer_Tier: {}\nPayment_Method: {}\n\n{}",
            self.state,
            self.id.value(),
            self.created_at.format(ORDER_TIMESTAMP_FORMAT),
            self.tier,
            self.payment_method,
            build_product_list(&self.items),
        )
    }
}

//--------------------------------------  OrderMapProjection ---------------------------------------------------------
/// A read-only, key-ordered snapshot of (a filtered view of) the hub's live order map. This is what observers
/// receive; the live map itself never leaves the hub.
pub type OrderMapProjection = BTreeMap<OrderId, OrderState>;
