use std::sync::RwLock;

use ezstock_core::{Entity, ItemId};
use ezstock_inventory::{ItemSold, StockItem};
use ezstock_sales::{SaleRecord, newest_first};

use super::{Store, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Tables {
    /// Insertion order doubles as the row order of the SQL backend.
    items: Vec<StockItem>,
    sales: Vec<SaleRecord>,
}

/// In-memory store.
///
/// Intended for tests/dev. Both tables sit behind one lock so `commit_sale`
/// is atomic.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> StoreResult<T> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&tables))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Tables) -> StoreResult<T>) -> StoreResult<T> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;
        f(&mut tables)
    }
}

impl Store for InMemoryStore {
    fn insert_item(&self, item: &StockItem) -> StoreResult<()> {
        self.write(|t| {
            if t.items.iter().any(|i| i.id() == item.id()) {
                return Err(StoreError::Duplicate(item.id().clone()));
            }
            t.items.push(item.clone());
            Ok(())
        })
    }

    fn update_item(&self, item: &StockItem) -> StoreResult<bool> {
        self.write(|t| match t.items.iter_mut().find(|i| i.id() == item.id()) {
            Some(slot) => {
                *slot = item.clone();
                Ok(true)
            }
            None => Ok(false),
        })
    }

    fn delete_item(&self, id: &ItemId) -> StoreResult<bool> {
        self.write(|t| {
            let before = t.items.len();
            t.items.retain(|i| i.id() != id);
            Ok(t.items.len() != before)
        })
    }

    fn find_item(&self, id: &ItemId) -> StoreResult<Option<StockItem>> {
        self.read(|t| t.items.iter().find(|i| i.id() == id).cloned())
    }

    fn find_by_id_or_name(&self, needle: &str) -> StoreResult<Option<StockItem>> {
        self.read(|t| t.items.iter().find(|i| i.matches(needle)).cloned())
    }

    fn list_items(&self) -> StoreResult<Vec<StockItem>> {
        self.read(|t| t.items.clone())
    }

    fn append_sale(&self, record: &SaleRecord) -> StoreResult<()> {
        self.write(|t| {
            t.sales.push(record.clone());
            Ok(())
        })
    }

    fn list_sales(&self) -> StoreResult<Vec<SaleRecord>> {
        self.read(|t| newest_first(t.sales.clone()))
    }

    fn clear_sales(&self) -> StoreResult<u64> {
        self.write(|t| {
            let removed = t.sales.len() as u64;
            t.sales.clear();
            Ok(removed)
        })
    }

    fn commit_sale(&self, sold: &ItemSold, record: &SaleRecord) -> StoreResult<()> {
        self.write(|t| {
            let item = t
                .items
                .iter_mut()
                .find(|i| i.id() == &sold.item_id && i.quantity() == sold.previous_quantity)
                .ok_or_else(|| StoreError::StaleQuantity {
                    item_id: sold.item_id.clone(),
                    expected: sold.previous_quantity.get(),
                })?;
            item.apply_sale(sold);
            t.sales.push(record.clone());
            Ok(())
        })
    }
}
