use std::{collections::BTreeMap, sync::Arc};

use tokio::sync::Mutex;

use crate::{
    order_types::{Product, ProductId},
    stock::{StockDatabase, StockError},
};

/// An in-memory catalogue. Atomicity of [`purchase_stocks`](StockDatabase::purchase_stocks) comes from checking every
/// line before applying any decrement, all under one lock.
#[derive(Debug, Clone, Default)]
pub struct MemoryStockDb {
    products: Arc<Mutex<BTreeMap<ProductId, Product>>>,
}

impl MemoryStockDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let db = Self::new();
        {
            let mut guard = db.products.lock().await;
            for p in products {
                guard.insert(p.id.clone(), p);
            }
        }
        db
    }

    pub async fn add_product(&self, product: Product) {
        self.products.lock().await.insert(product.id.clone(), product);
    }

    pub async fn stock_level(&self, id: &ProductId) -> Option<u32> {
        self.products.lock().await.get(id).map(|p| p.stock_quantity)
    }
}

impl StockDatabase for MemoryStockDb {
    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>, StockError> {
        let needle = keyword.to_lowercase();
        let guard = self.products.lock().await;
        let matches = guard
            .values()
            .filter(|p| p.id.as_str() == keyword || p.description.to_lowercase().contains(&needle))
            .cloned()
            .map(|p| p.with_quantity(1))
            .collect();
        Ok(matches)
    }

    async fn purchase_stocks(&self, lines: &[Product]) -> Result<Vec<Product>, StockError> {
        let mut guard = self.products.lock().await;
        let mut shortages = Vec::new();
        for line in lines {
            let available = guard.get(&line.id).map(|p| p.stock_quantity).unwrap_or(0);
            if available < line.ordered_quantity {
                let mut short = line.clone();
                short.stock_quantity = available;
                shortages.push(short);
            }
        }
        if !shortages.is_empty() {
            return Ok(shortages);
        }
        for line in lines {
            if let Some(p) = guard.get_mut(&line.id) {
                p.stock_quantity -= line.ordered_quantity;
            }
        }
        Ok(Vec::new())
    }

    async fn release_stocks(&self, lines: &[Product]) -> Result<(), StockError> {
        let mut guard = self.products.lock().await;
        for line in lines {
            match guard.get_mut(&line.id) {
                Some(p) => p.stock_quantity += line.ordered_quantity,
                None => return Err(StockError::ProductNotFound(line.id.clone())),
            }
        }
        Ok(())
    }
}
