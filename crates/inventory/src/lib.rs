//! Inventory domain module.
//!
//! This crate contains the business rules for stock items, implemented purely
//! as deterministic domain logic (no IO, no storage). Callers hand in the
//! current time; nothing here reads a clock.

pub mod category;
pub mod item;
pub mod values;

pub use category::Category;
pub use item::{
    InventoryEvent, ItemAdded, ItemDraft, ItemForm, ItemRemoved, ItemSold, ItemUpdated,
    LOW_STOCK_THRESHOLD, StockItem,
};
pub use values::{Price, Quantity, title_case};
