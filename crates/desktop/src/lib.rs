//! `ezstock-desktop`
//!
//! **Responsibility:** the boundary between the EzStock window layer and the
//! ledger/recorder services.
//!
//! This crate provides:
//! - Start-up (`bootstrap`): logging, configuration, database
//! - One command per operator action, returning display rows and notices
//! - Display formatting (currency, timestamps, low-stock highlight)

pub mod commands;
pub mod types;

pub use commands::{
    AppState, SharedStore, add_item, bootstrap, clear_sales_history, delete_item, list_inventory,
    open, sales_history, sell_item, update_item,
};
pub use types::{
    CommandResult, InventoryRow, Notice, NoticeLevel, RowStyle, SaleReceipt, SalesRow,
    format_money, format_timestamp,
};
