use hs_common::Money;

use crate::{
    helpers::build_product_list,
    order_types::{Product, ProductId},
};

/// The orderings a customer can apply to their trolley.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    IdAsc,
    PriceAsc,
    PriceDesc,
    DescriptionAsc,
    TotalDesc,
}

/// A customer's in-progress basket. Holds at most one line per product id: adding a product that is already in the
/// trolley merges into the existing line by summing quantities. Every product entering the trolley is cloned, so a
/// line never aliases the search result it was added from.
#[derive(Debug, Clone, Default)]
pub struct Trolley {
    items: Vec<Product>,
}

impl Trolley {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn total(&self) -> Money {
        self.items.iter().map(Product::line_total).sum()
    }

    /// Adds a product, merging with an existing line for the same id.
    pub fn add_product(&mut self, product: &Product) {
        match self.items.iter_mut().find(|line| line.id == product.id) {
            Some(line) => line.ordered_quantity += product.ordered_quantity,
            None => self.items.push(product.clone()),
        }
    }

    /// Sets a line's quantity to an exact value. Ignored for quantities of zero or for unknown ids; use
    /// [`remove_item`](Self::remove_item) to drop a line.
    pub fn set_quantity(&mut self, id: &ProductId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|line| &line.id == id) {
            line.ordered_quantity = quantity;
        }
    }

    /// Adjusts a line's quantity by `delta`, clamping at zero; a line that reaches zero is removed.
    pub fn change_quantity(&mut self, id: &ProductId, delta: i64) {
        let Some(line) = self.items.iter_mut().find(|line| &line.id == id) else {
            return;
        };
        let new_quantity = (i64::from(line.ordered_quantity) + delta).max(0);
        if new_quantity == 0 {
            self.remove_item(id);
        } else {
            line.ordered_quantity = new_quantity as u32;
        }
    }

    pub fn remove_item(&mut self, id: &ProductId) {
        self.items.retain(|line| &line.id != id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn sort_by(&mut self, key: SortKey) {
        match key {
            SortKey::IdAsc => self.items.sort_by(|a, b| a.id.cmp(&b.id)),
            SortKey::PriceAsc => self.items.sort_by(|a, b| a.unit_price.cmp(&b.unit_price)),
            SortKey::PriceDesc => self.items.sort_by(|a, b| b.unit_price.cmp(&a.unit_price)),
            SortKey::DescriptionAsc => self.items.sort_by(|a, b| a.description.cmp(&b.description)),
            SortKey::TotalDesc => self.items.sort_by(|a, b| b.line_total().cmp(&a.line_total())),
        }
    }

    /// The trolley collapsed to one line per product id with quantities summed. The merge-on-add invariant normally
    /// makes this a plain copy; checkout still groups defensively before talking to the stock service.
    pub fn grouped(&self) -> Vec<Product> {
        let mut grouped: Vec<Product> = Vec::new();
        for p in &self.items {
            match grouped.iter_mut().find(|line| line.id == p.id) {
                Some(line) => line.ordered_quantity += p.ordered_quantity,
                None => grouped.push(p.clone()),
            }
        }
        grouped
    }

    /// The trolley rendered in the receipt-style listing.
    pub fn display(&self) -> String {
        build_product_list(&self.items)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tv() -> Product {
        Product::new("0001", "40 inch LED HD TV", "0001.jpg", Money::from_pence(26900), 10)
    }

    fn radio() -> Product {
        Product::new("0002", "DAB Radio", "0002.jpg", Money::from_pence(2949), 15)
    }

    #[test]
    fn duplicate_adds_merge_into_one_line() {
        let mut trolley = Trolley::new();
        let tv = tv();
        trolley.add_product(&tv);
        trolley.add_product(&tv);
        trolley.add_product(&tv);
        trolley.sort_by(SortKey::IdAsc);
        assert_eq!(trolley.len(), 1);
        assert_eq!(trolley.items()[0].ordered_quantity, 3);
        assert_eq!(trolley.total(), Money::from_pence(80700));
    }

    #[test]
    fn lines_are_copies_of_the_searched_product() {
        let mut trolley = Trolley::new();
        let mut searched = tv();
        trolley.add_product(&searched);
        searched.ordered_quantity = 40;
        searched.description = "mutated".into();
        assert_eq!(trolley.items()[0].ordered_quantity, 1);
        assert_eq!(trolley.items()[0].description, "40 inch LED HD TV");
    }

    #[test]
    fn change_quantity_clamps_at_zero_and_removes_the_line() {
        let mut trolley = Trolley::new();
        trolley.add_product(&tv());
        trolley.change_quantity(&ProductId::from("0001"), 4);
        assert_eq!(trolley.items()[0].ordered_quantity, 5);
        trolley.change_quantity(&ProductId::from("0001"), -10);
        assert!(trolley.is_empty());
    }

    #[test]
    fn set_quantity_ignores_zero_and_unknown_ids() {
        let mut trolley = Trolley::new();
        trolley.add_product(&tv());
        trolley.set_quantity(&ProductId::from("0001"), 0);
        assert_eq!(trolley.items()[0].ordered_quantity, 1);
        trolley.set_quantity(&ProductId::from("9999"), 5);
        assert_eq!(trolley.len(), 1);
        trolley.set_quantity(&ProductId::from("0001"), 7);
        assert_eq!(trolley.items()[0].ordered_quantity, 7);
    }

    #[test]
    fn sort_orders() {
        let mut trolley = Trolley::new();
        trolley.add_product(&radio().with_quantity(10));
        trolley.add_product(&tv());
        trolley.sort_by(SortKey::IdAsc);
        assert_eq!(trolley.items()[0].id, ProductId::from("0001"));
        trolley.sort_by(SortKey::PriceAsc);
        assert_eq!(trolley.items()[0].id, ProductId::from("0002"));
        trolley.sort_by(SortKey::PriceDesc);
        assert_eq!(trolley.items()[0].id, ProductId::from("0001"));
        trolley.sort_by(SortKey::DescriptionAsc);
        assert_eq!(trolley.items()[0].id, ProductId::from("0001"));
        // 10 radios outprice one TV
        trolley.sort_by(SortKey::TotalDesc);
        assert_eq!(trolley.items()[0].id, ProductId::from("0002"));
    }

    #[test]
    fn grouped_collapses_duplicate_ids() {
        let mut trolley = Trolley::new();
        trolley.add_product(&tv().with_quantity(2));
        trolley.add_product(&radio());
        // Bypass the merge invariant to prove grouping is defensive.
        trolley.items.push(tv().with_quantity(3));
        let grouped = trolley.grouped();
        assert_eq!(grouped.len(), 2);
        let tv_line = grouped.iter().find(|p| p.id == ProductId::from("0001")).unwrap();
        assert_eq!(tv_line.ordered_quantity, 5);
    }
}
