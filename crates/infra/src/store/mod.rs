//! Persistent store abstraction for inventory rows and sales history.
//!
//! Two tables, reproduced by every backend:
//!
//! ```text
//! inventory(id PRIMARY KEY, name, quantity, price, category, date_added)
//! sales_history(product_name, quantity_sold, total_price, date_sold)
//! ```
//!
//! Items are returned in insertion order; sales newest `date_sold` first.

use std::sync::Arc;

use thiserror::Error;

use ezstock_core::ItemId;
use ezstock_inventory::{ItemSold, StockItem};
use ezstock_sales::SaleRecord;

pub mod in_memory;
pub mod sqlite;

pub use in_memory::InMemoryStore;
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operation error.
///
/// These are **infrastructure errors**; domain failures (validation, stock
/// checks) never reach the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("item {0} already exists")]
    Duplicate(ItemId),

    /// The stock level changed between the sale decision and its commit.
    #[error("stock of item {item_id} is no longer {expected}")]
    StaleQuantity { item_id: ItemId, expected: u32 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// CRUD surface the ledger and recorder run against.
///
/// Every method is one atomic unit against the backend.
pub trait Store: Send + Sync {
    /// Insert a new item; fails with [`StoreError::Duplicate`] on id collision.
    fn insert_item(&self, item: &StockItem) -> StoreResult<()>;

    /// Overwrite the mutable fields of an existing item. Returns `false` if absent.
    fn update_item(&self, item: &StockItem) -> StoreResult<bool>;

    /// Remove an item. Returns `false` if absent.
    fn delete_item(&self, id: &ItemId) -> StoreResult<bool>;

    fn find_item(&self, id: &ItemId) -> StoreResult<Option<StockItem>>;

    /// First item (insertion order) whose id or name equals `needle`.
    fn find_by_id_or_name(&self, needle: &str) -> StoreResult<Option<StockItem>>;

    fn list_items(&self) -> StoreResult<Vec<StockItem>>;

    fn append_sale(&self, record: &SaleRecord) -> StoreResult<()>;

    /// All sales, most recent first.
    fn list_sales(&self) -> StoreResult<Vec<SaleRecord>>;

    /// Delete every sale. Returns the number removed.
    fn clear_sales(&self) -> StoreResult<u64>;

    /// Apply a decided sale: set the item's quantity to `sold.remaining` and
    /// append `record`, both or neither.
    ///
    /// The decrement only applies while the stored quantity still equals
    /// `sold.previous_quantity`; otherwise [`StoreError::StaleQuantity`].
    fn commit_sale(&self, sold: &ItemSold, record: &SaleRecord) -> StoreResult<()>;
}

impl<S> Store for Arc<S>
where
    S: Store + ?Sized,
{
    fn insert_item(&self, item: &StockItem) -> StoreResult<()> {
        (**self).insert_item(item)
    }

    fn update_item(&self, item: &StockItem) -> StoreResult<bool> {
        (**self).update_item(item)
    }

    fn delete_item(&self, id: &ItemId) -> StoreResult<bool> {
        (**self).delete_item(id)
    }

    fn find_item(&self, id: &ItemId) -> StoreResult<Option<StockItem>> {
        (**self).find_item(id)
    }

    fn find_by_id_or_name(&self, needle: &str) -> StoreResult<Option<StockItem>> {
        (**self).find_by_id_or_name(needle)
    }

    fn list_items(&self) -> StoreResult<Vec<StockItem>> {
        (**self).list_items()
    }

    fn append_sale(&self, record: &SaleRecord) -> StoreResult<()> {
        (**self).append_sale(record)
    }

    fn list_sales(&self) -> StoreResult<Vec<SaleRecord>> {
        (**self).list_sales()
    }

    fn clear_sales(&self) -> StoreResult<u64> {
        (**self).clear_sales()
    }

    fn commit_sale(&self, sold: &ItemSold, record: &SaleRecord) -> StoreResult<()> {
        (**self).commit_sale(sold, record)
    }
}
