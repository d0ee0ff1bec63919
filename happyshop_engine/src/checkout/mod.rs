//! The customer-side checkout pipeline.
//!
//! A [`Trolley`] holds the in-progress basket; [`CheckoutPipeline::checkout`] takes it through validation, stock
//! reservation, payment collection and order creation. Business-rule failures come back as data (variants of
//! [`CheckoutOutcome`]) rather than errors: the customer front end shows a message, possibly adjusts the trolley,
//! and lets the user retry. Only technical failures (stock service, order storage) surface as [`CheckoutError`].

mod pipeline;
mod receipt;
mod trolley;

use hs_common::Money;

pub use pipeline::{CheckoutError, CheckoutOutcome, CheckoutPipeline, PaymentDecision, PaymentTerminal};
pub use receipt::Receipt;
pub use trolley::{SortKey, Trolley};

/// Standard-tier customers must spend at least this much; VIP and Prime bypass the rule.
pub const MINIMUM_SPEND: Money = Money::from_pounds(5);

/// No single order line may exceed this quantity, for any tier.
pub const MAX_LINE_QUANTITY: u32 = 50;

/// Prime customers get this percentage off the pre-tax total, applied on the receipt.
pub const PRIME_DISCOUNT_PERCENT: i64 = 10;
