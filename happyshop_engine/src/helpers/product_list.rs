use hs_common::CURRENCY_SYMBOL;

use crate::order_types::Product;

const SEPARATOR_LENGTH: usize = 44;

/// Builds the receipt-like summary of a list of product lines: one row per line with id, description, quantity and
/// line total, then a separator and the grand total. The same rendering is used for the trolley display, the order
/// file body, and receipts.
pub fn build_product_list(products: &[Product]) -> String {
    let mut out = String::new();
    let mut total = 0.0;
    for p in products {
        out.push_str(&format!(
            " {:<7} {:<18.18} ({:>2}) {}{:>7.2}\n",
            p.id.as_str(),
            p.description,
            p.ordered_quantity,
            CURRENCY_SYMBOL,
            p.line_total().as_pounds(),
        ));
        total += p.line_total().as_pounds();
    }
    out.push_str(&"-".repeat(SEPARATOR_LENGTH));
    out.push('\n');
    out.push_str(&format!(" {:<35} {}{:>7.2}\n", "Total", CURRENCY_SYMBOL, total));
    out
}
