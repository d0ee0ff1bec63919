use std::fmt::Display;

use hs_common::Money;

use crate::{
    checkout::PRIME_DISCOUNT_PERCENT,
    helpers::build_product_list,
    order_types::{CustomerTier, Order, OrderId, PaymentMethod, ORDER_TIMESTAMP_FORMAT},
};

/// The customer's record of a completed checkout. Built from the confirmed order, so it reflects exactly what was
/// persisted. Prime customers see their discount applied here, on the pre-tax total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub order_id: OrderId,
    pub ordered_at: String,
    pub tier: CustomerTier,
    pub payment_method: PaymentMethod,
    pub lines: String,
    pub total: Money,
    pub discount: Option<Money>,
    pub amount_due: Money,
}

impl Receipt {
    pub fn for_order(order: &Order) -> Self {
        let total = order.total();
        let discount = match order.tier {
            CustomerTier::Prime => Some(total.percent_of(PRIME_DISCOUNT_PERCENT)),
            _ => None,
        };
        let amount_due = total - discount.unwrap_or_default();
        Self {
            order_id: order.id,
            ordered_at: order.created_at.format(ORDER_TIMESTAMP_FORMAT).to_string(),
            tier: order.tier,
            payment_method: order.payment_method,
            lines: build_product_list(&order.items),
            total,
            discount,
            amount_due,
        }
    }
}

impl Display for Receipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order_ID: {}\nOrdered_Date_Time: {}\nPayment_Method: {}\n\n{}",
            self.order_id.value(),
            self.ordered_at,
            self.payment_method,
            self.lines,
        )?;
        match self.tier {
            CustomerTier::Standard => Ok(()),
            CustomerTier::Vip => write!(f, "\nVIP benefit: your order is picked with priority.\n"),
            CustomerTier::Prime => {
                let discount = self.discount.unwrap_or_default();
                write!(
                    f,
                    "\nPrime discount ({PRIME_DISCOUNT_PERCENT}%): -{discount}\nAmount due: {}\n",
                    self.amount_due
                )
            },
        }
    }
}
