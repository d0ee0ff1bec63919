use std::str::FromStr;

use hs_common::Money;
use log::*;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Row,
    SqlitePool,
};

use crate::{
    order_types::{Product, ProductId},
    stock::{StockDatabase, StockError},
};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS products (
        id              TEXT PRIMARY KEY,
        description     TEXT NOT NULL,
        image_name      TEXT NOT NULL,
        unit_price      INTEGER NOT NULL,
        stock_quantity  INTEGER NOT NULL CHECK (stock_quantity >= 0)
    );
"#;

/// The SQLite-backed product catalogue. `purchase_stocks` runs all decrements inside one transaction with a
/// stock-level guard on each `UPDATE`, so a single unsatisfiable line rolls the whole purchase back.
#[derive(Debug, Clone)]
pub struct SqliteStockDb {
    url: String,
    pool: SqlitePool,
}

impl SqliteStockDb {
    pub async fn new_with_url(url: &str) -> Result<Self, StockError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| StockError::DatabaseError(format!("Invalid database url {url}: {e}")))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().max_connections(5).connect_with(options).await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        debug!("🛢️ Stock database ready at {url}");
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn upsert_product(&self, product: &Product) -> Result<(), StockError> {
        sqlx::query(
            "INSERT INTO products (id, description, image_name, unit_price, stock_quantity) \
             VALUES (?, ?, ?, ?, ?) \
             ON CONFLICT(id) DO UPDATE SET description = excluded.description, image_name = excluded.image_name, \
             unit_price = excluded.unit_price, stock_quantity = excluded.stock_quantity",
        )
        .bind(product.id.as_str())
        .bind(&product.description)
        .bind(&product.image_name)
        .bind(product.unit_price.value())
        .bind(i64::from(product.stock_quantity))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Seeds the classic demo catalogue. Existing rows are left untouched so repeated startups don't reset stock.
    pub async fn seed_demo_catalogue(&self) -> Result<(), StockError> {
        let catalogue = [
            Product::new("0001", "40 inch LED HD TV", "0001.jpg", Money::from_pence(26900), 10),
            Product::new("0002", "DAB Radio", "0002.jpg", Money::from_pence(2949), 15),
            Product::new("0003", "Toaster", "0003.jpg", Money::from_pence(1999), 20),
            Product::new("0004", "Watch", "0004.jpg", Money::from_pence(2999), 40),
            Product::new("0005", "Digital Camera", "0005.jpg", Money::from_pence(8999), 12),
            Product::new("0006", "MP3 player", "0006.jpg", Money::from_pence(799), 60),
            Product::new("0007", "32Gb USB2 drive", "0007.jpg", Money::from_pence(699), 100),
        ];
        for p in &catalogue {
            sqlx::query(
                "INSERT OR IGNORE INTO products (id, description, image_name, unit_price, stock_quantity) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(p.id.as_str())
            .bind(&p.description)
            .bind(&p.image_name)
            .bind(p.unit_price.value())
            .bind(i64::from(p.stock_quantity))
            .execute(&self.pool)
            .await?;
        }
        info!("🛢️ Demo catalogue seeded ({} products)", catalogue.len());
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_to_product(row: &SqliteRow) -> Result<Product, StockError> {
    let stock: i64 = row.try_get("stock_quantity")?;
    Ok(Product {
        id: ProductId::from(row.try_get::<String, _>("id")?),
        description: row.try_get("description")?,
        image_name: row.try_get("image_name")?,
        unit_price: Money::from_pence(row.try_get::<i64, _>("unit_price")?),
        stock_quantity: u32::try_from(stock).unwrap_or(0),
        ordered_quantity: 1,
    })
}

impl StockDatabase for SqliteStockDb {
    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>, StockError> {
        let rows = sqlx::query(
            "SELECT id, description, image_name, unit_price, stock_quantity FROM products \
             WHERE id = ? OR instr(lower(description), lower(?)) > 0 ORDER BY id",
        )
        .bind(keyword)
        .bind(keyword)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_product).collect()
    }

    async fn purchase_stocks(&self, lines: &[Product]) -> Result<Vec<Product>, StockError> {
        let mut tx = self.pool.begin().await?;
        let mut all_satisfied = true;
        for line in lines {
            let result = sqlx::query(
                "UPDATE products SET stock_quantity = stock_quantity - ? WHERE id = ? AND stock_quantity >= ?",
            )
            .bind(i64::from(line.ordered_quantity))
            .bind(line.id.as_str())
            .bind(i64::from(line.ordered_quantity))
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                all_satisfied = false;
                break;
            }
        }
        if all_satisfied {
            tx.commit().await?;
            return Ok(Vec::new());
        }
        tx.rollback().await?;
        let mut shortages = Vec::new();
        for line in lines {
            let available = sqlx::query("SELECT stock_quantity FROM products WHERE id = ?")
                .bind(line.id.as_str())
                .fetch_optional(&self.pool)
                .await?
                .map(|row| row.try_get::<i64, _>("stock_quantity"))
                .transpose()?
                .unwrap_or(0);
            if available < i64::from(line.ordered_quantity) {
                let mut short = line.clone();
                short.stock_quantity = u32::try_from(available).unwrap_or(0);
                shortages.push(short);
            }
        }
        debug!("🛢️ Purchase rolled back; {} line(s) short of stock", shortages.len());
        Ok(shortages)
    }

    async fn release_stocks(&self, lines: &[Product]) -> Result<(), StockError> {
        let mut tx = self.pool.begin().await?;
        for line in lines {
            let result = sqlx::query("UPDATE products SET stock_quantity = stock_quantity + ? WHERE id = ?")
                .bind(i64::from(line.ordered_quantity))
                .bind(line.id.as_str())
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(StockError::ProductNotFound(line.id.clone()));
            }
        }
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use tempfile::tempdir;

    use super::*;

    async fn demo_db(dir: &std::path::Path) -> SqliteStockDb {
        let url = format!("sqlite:{}", dir.join("stock.sqlite3").display());
        let db = SqliteStockDb::new_with_url(&url).await.unwrap();
        db.upsert_product(&Product::new("0001", "40 inch LED HD TV", "0001.jpg", Money::from_pence(26900), 10)).await.unwrap();
        db.upsert_product(&Product::new("0002", "DAB Radio", "0002.jpg", Money::from_pence(2949), 3)).await.unwrap();
        db
    }

    #[tokio::test]
    async fn search_by_id_and_by_substring() {
        let dir = tempdir().unwrap();
        let db = demo_db(dir.path()).await;
        let by_id = db.search_products("0001").await.unwrap();
        assert_eq!(by_id.len(), 1);
        assert_eq!(by_id[0].description, "40 inch LED HD TV");
        assert_eq!(by_id[0].ordered_quantity, 1);
        let by_name = db.search_products("RADIO").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, ProductId::from("0002"));
        db.close().await;
    }

    #[tokio::test]
    async fn successful_purchase_decrements_every_line() {
        let dir = tempdir().unwrap();
        let db = demo_db(dir.path()).await;
        let lines = vec![
            Product::new("0001", "40 inch LED HD TV", "0001.jpg", Money::from_pence(26900), 10).with_quantity(5),
            Product::new("0002", "DAB Radio", "0002.jpg", Money::from_pence(2949), 3).with_quantity(2),
        ];
        assert!(db.purchase_stocks(&lines).await.unwrap().is_empty());
        let tv = &db.search_products("0001").await.unwrap()[0];
        let radio = &db.search_products("0002").await.unwrap()[0];
        assert_eq!(tv.stock_quantity, 5);
        assert_eq!(radio.stock_quantity, 1);
        db.close().await;
    }

    #[tokio::test]
    async fn a_single_short_line_rolls_back_the_whole_purchase() {
        let dir = tempdir().unwrap();
        let db = demo_db(dir.path()).await;
        let lines = vec![
            Product::new("0001", "40 inch LED HD TV", "0001.jpg", Money::from_pence(26900), 10).with_quantity(5),
            Product::new("0002", "DAB Radio", "0002.jpg", Money::from_pence(2949), 3).with_quantity(20),
        ];
        let shortages = db.purchase_stocks(&lines).await.unwrap();
        assert_eq!(shortages.len(), 1);
        assert_eq!(shortages[0].id, ProductId::from("0002"));
        assert_eq!(shortages[0].stock_quantity, 3);
        assert_eq!(shortages[0].ordered_quantity, 20);
        let tv = &db.search_products("0001").await.unwrap()[0];
        assert_eq!(tv.stock_quantity, 10);
        db.close().await;
    }

    #[tokio::test]
    async fn release_restores_purchased_quantities() {
        let dir = tempdir().unwrap();
        let db = demo_db(dir.path()).await;
        let lines = vec![Product::new("0001", "40 inch LED HD TV", "0001.jpg", Money::from_pence(26900), 10).with_quantity(4)];
        assert!(db.purchase_stocks(&lines).await.unwrap().is_empty());
        db.release_stocks(&lines).await.unwrap();
        let tv = &db.search_products("0001").await.unwrap()[0];
        assert_eq!(tv.stock_quantity, 10);
        db.close().await;
    }
}
