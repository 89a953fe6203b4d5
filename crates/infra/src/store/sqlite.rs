//! SQLite-backed store.
//!
//! sqlx is async; the rest of the application is not. The store owns a
//! current-thread Tokio runtime and drives every query to completion with
//! `block_on`, so callers see plain blocking methods.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use tokio::runtime::{Builder, Runtime};

use ezstock_core::{Entity, ItemId};
use ezstock_inventory::{Category, ItemSold, Price, Quantity, StockItem};
use ezstock_sales::{SaleRecord, newest_first};

use super::{Store, StoreError, StoreResult};
use crate::config::DatabaseLocation;

/// Timestamp layout written by older builds of the app.
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CREATE_INVENTORY: &str = r#"
    CREATE TABLE IF NOT EXISTS inventory (
        id         TEXT PRIMARY KEY,
        name       TEXT NOT NULL,
        quantity   INTEGER NOT NULL,
        price      REAL NOT NULL,
        category   TEXT NOT NULL,
        date_added TEXT NOT NULL
    )
"#;

const CREATE_SALES_HISTORY: &str = r#"
    CREATE TABLE IF NOT EXISTS sales_history (
        product_name  TEXT NOT NULL,
        quantity_sold INTEGER NOT NULL,
        total_price   REAL NOT NULL,
        date_sold     TEXT NOT NULL
    )
"#;

const ITEM_COLUMNS: &str = "id, name, quantity, price, category, date_added";

/// SQLite store over a single-connection pool.
///
/// One connection keeps `:memory:` databases alive for the store's lifetime
/// and gives the single-writer behaviour the ledger relies on.
#[derive(Debug)]
pub struct SqliteStore {
    runtime: Runtime,
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `location` and ensure the schema.
    pub fn open(location: &DatabaseLocation) -> StoreResult<Self> {
        let options = match location {
            DatabaseLocation::InMemory => SqliteConnectOptions::from_str("sqlite::memory:")?,
            DatabaseLocation::File(path) => {
                ensure_parent_dir(path)?;
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
            }
        };

        let runtime = Builder::new_current_thread().enable_all().build()?;

        let pool = runtime.block_on(async {
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect_with(options)
                .await?;

            sqlx::query(CREATE_INVENTORY).execute(&pool).await?;
            sqlx::query(CREATE_SALES_HISTORY).execute(&pool).await?;

            Ok::<_, StoreError>(pool)
        })?;

        tracing::debug!(location = %location, "opened sqlite store");
        Ok(Self { runtime, pool })
    }

    /// Fresh private in-memory database (tests/dev).
    pub fn in_memory() -> StoreResult<Self> {
        Self::open(&DatabaseLocation::InMemory)
    }
}

impl Drop for SqliteStore {
    fn drop(&mut self) {
        self.runtime.block_on(self.pool.close());
    }
}

impl Store for SqliteStore {
    fn insert_item(&self, item: &StockItem) -> StoreResult<()> {
        let result = self.runtime.block_on(
            sqlx::query(
                r#"
                INSERT INTO inventory (id, name, quantity, price, category, date_added)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(item.id().as_str())
            .bind(item.name())
            .bind(i64::from(item.quantity().get()))
            .bind(price_to_real(item.price()))
            .bind(item.category().as_str())
            .bind(format_timestamp(item.date_added()))
            .execute(&self.pool),
        );

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Duplicate(item.id().clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn update_item(&self, item: &StockItem) -> StoreResult<bool> {
        let done = self.runtime.block_on(
            sqlx::query(
                r#"
                UPDATE inventory
                SET name = ?1, quantity = ?2, price = ?3, category = ?4
                WHERE id = ?5
                "#,
            )
            .bind(item.name())
            .bind(i64::from(item.quantity().get()))
            .bind(price_to_real(item.price()))
            .bind(item.category().as_str())
            .bind(item.id().as_str())
            .execute(&self.pool),
        )?;
        Ok(done.rows_affected() > 0)
    }

    fn delete_item(&self, id: &ItemId) -> StoreResult<bool> {
        let done = self.runtime.block_on(
            sqlx::query("DELETE FROM inventory WHERE id = ?1")
                .bind(id.as_str())
                .execute(&self.pool),
        )?;
        Ok(done.rows_affected() > 0)
    }

    fn find_item(&self, id: &ItemId) -> StoreResult<Option<StockItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM inventory WHERE id = ?1");
        let row = self.runtime.block_on(
            sqlx::query(&sql)
                .bind(id.as_str())
                .fetch_optional(&self.pool),
        )?;
        row.as_ref().map(item_from_row).transpose()
    }

    fn find_by_id_or_name(&self, needle: &str) -> StoreResult<Option<StockItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM inventory WHERE id = ?1 OR name = ?1 ORDER BY rowid LIMIT 1"
        );
        let row = self.runtime.block_on(
            sqlx::query(&sql)
                .bind(needle)
                .fetch_optional(&self.pool),
        )?;
        row.as_ref().map(item_from_row).transpose()
    }

    fn list_items(&self) -> StoreResult<Vec<StockItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM inventory ORDER BY rowid");
        let rows = self
            .runtime
            .block_on(sqlx::query(&sql).fetch_all(&self.pool))?;
        rows.iter().map(item_from_row).collect()
    }

    fn append_sale(&self, record: &SaleRecord) -> StoreResult<()> {
        self.runtime.block_on(
            sqlx::query(
                r#"
                INSERT INTO sales_history (product_name, quantity_sold, total_price, date_sold)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(record.product_name.as_str())
            .bind(i64::from(record.quantity_sold.get()))
            .bind(price_to_real(record.total_price))
            .bind(format_timestamp(record.date_sold))
            .execute(&self.pool),
        )?;
        Ok(())
    }

    fn list_sales(&self) -> StoreResult<Vec<SaleRecord>> {
        let rows = self.runtime.block_on(
            sqlx::query(
                r#"
                SELECT product_name, quantity_sold, total_price, date_sold
                FROM sales_history
                ORDER BY rowid
                "#,
            )
            .fetch_all(&self.pool),
        )?;
        // Legacy and RFC 3339 timestamps do not sort together as text, so
        // ordering happens on the parsed values.
        let records = rows.iter().map(sale_from_row).collect::<StoreResult<Vec<_>>>()?;
        Ok(newest_first(records))
    }

    fn clear_sales(&self) -> StoreResult<u64> {
        let done = self
            .runtime
            .block_on(sqlx::query("DELETE FROM sales_history").execute(&self.pool))?;
        Ok(done.rows_affected())
    }

    fn commit_sale(&self, sold: &ItemSold, record: &SaleRecord) -> StoreResult<()> {
        self.runtime.block_on(async {
            let mut tx = self.pool.begin().await?;

            let updated = sqlx::query(
                r#"
                UPDATE inventory
                SET quantity = ?1
                WHERE id = ?2 AND quantity = ?3
                "#,
            )
            .bind(i64::from(sold.remaining.get()))
            .bind(sold.item_id.as_str())
            .bind(i64::from(sold.previous_quantity.get()))
            .execute(&mut *tx)
            .await?;

            if updated.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(StoreError::StaleQuantity {
                    item_id: sold.item_id.clone(),
                    expected: sold.previous_quantity.get(),
                });
            }

            sqlx::query(
                r#"
                INSERT INTO sales_history (product_name, quantity_sold, total_price, date_sold)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(record.product_name.as_str())
            .bind(i64::from(record.quantity_sold.get()))
            .bind(price_to_real(record.total_price))
            .bind(format_timestamp(record.date_sold))
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            Ok::<(), StoreError>(())
        })
    }
}

fn ensure_parent_dir(path: &Path) -> StoreResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn item_from_row(row: &SqliteRow) -> StoreResult<StockItem> {
    let id: String = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let quantity: i64 = row.try_get("quantity")?;
    let price: f64 = row.try_get("price")?;
    let category: String = row.try_get("category")?;
    let date_added: String = row.try_get("date_added")?;

    let id = ItemId::parse(&id).map_err(|e| StoreError::Corrupt(e.to_string()))?;
    let category = category
        .parse::<Category>()
        .map_err(|e| StoreError::Corrupt(e.to_string()))?;

    Ok(StockItem::restore(
        id,
        name,
        quantity_from_integer(quantity)?,
        price_from_real(price)?,
        category,
        parse_timestamp(&date_added)?,
    ))
}

fn sale_from_row(row: &SqliteRow) -> StoreResult<SaleRecord> {
    let product_name: String = row.try_get("product_name")?;
    let quantity_sold: i64 = row.try_get("quantity_sold")?;
    let total_price: f64 = row.try_get("total_price")?;
    let date_sold: String = row.try_get("date_sold")?;

    Ok(SaleRecord {
        product_name,
        quantity_sold: quantity_from_integer(quantity_sold)?,
        total_price: price_from_real(total_price)?,
        date_sold: parse_timestamp(&date_sold)?,
    })
}

fn quantity_from_integer(raw: i64) -> StoreResult<Quantity> {
    u32::try_from(raw)
        .map(Quantity::new)
        .map_err(|_| StoreError::Corrupt(format!("quantity out of range: {raw}")))
}

fn price_to_real(price: Price) -> f64 {
    price.amount().to_f64().unwrap_or_default()
}

/// Recover a price from its REAL column value.
///
/// The shortest decimal form of the double reproduces any in-range [`Price`]
/// exactly; extra digits in older rows are rounded to [`Price::MAX_SCALE`].
fn price_from_real(raw: f64) -> StoreResult<Price> {
    if !raw.is_finite() {
        return Err(StoreError::Corrupt(format!("price is not a finite number: {raw}")));
    }
    let amount = Decimal::from_str(&raw.to_string())
        .map_err(|_| StoreError::Corrupt(format!("price out of range: {raw}")))?;
    Price::new(amount.round_dp(Price::MAX_SCALE)).map_err(|e| StoreError::Corrupt(e.to_string()))
}

/// Fixed-width RFC 3339 UTC with microseconds.
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> StoreResult<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, LEGACY_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| StoreError::Corrupt(format!("invalid timestamp '{raw}'")))
}
