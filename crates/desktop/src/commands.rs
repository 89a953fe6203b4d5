//! Commands invoked by the window layer.
//!
//! Each command takes raw form strings, runs the matching ledger or recorder
//! operation and turns the outcome into display rows plus operator notices.
//! No command ever fails outright; errors become [`NoticeLevel::Error`]
//! notices and the store is left as it was.
//!
//! [`NoticeLevel::Error`]: crate::types::NoticeLevel::Error

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use ezstock_core::Entity;
use ezstock_infra::{
    AppConfig, Clearance, Clock, InMemoryStore, InventoryLedger, LedgerError, Removal,
    SalesRecorder, SqliteStore, StockLevel, Store,
};
use ezstock_inventory::{ItemForm, StockItem};

use crate::types::{CommandResult, InventoryRow, Notice, SaleReceipt, SalesRow};

/// Store handle shared by the ledger and the recorder.
pub type SharedStore = Arc<dyn Store>;

/// Application state shared across commands.
#[derive(Clone)]
pub struct AppState {
    pub ledger: InventoryLedger<SharedStore>,
    pub recorder: SalesRecorder<SharedStore>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: SharedStore, config: AppConfig) -> Self {
        Self::with_clock(store, config, Utc::now)
    }

    pub fn with_clock(store: SharedStore, config: AppConfig, clock: Clock) -> Self {
        Self {
            ledger: InventoryLedger::with_clock(store.clone(), clock),
            recorder: SalesRecorder::new(store),
            config,
        }
    }

    /// Throwaway state backed by [`InMemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryStore::new()), AppConfig::in_memory())
    }

    fn row(&self, item: StockItem) -> InventoryRow {
        let level = StockLevel {
            low_stock: item.is_low_stock(),
            item,
        };
        InventoryRow::from_level(&level, &self.config.currency_symbol)
    }
}

/// Start-up: install logging, read the environment, open the database.
pub fn bootstrap() -> anyhow::Result<AppState> {
    ezstock_observability::init();
    let config = AppConfig::from_env().context("failed to load configuration")?;
    open(config)
}

/// Open the SQLite database `config` points at.
pub fn open(config: AppConfig) -> anyhow::Result<AppState> {
    let store = SqliteStore::open(&config.database)
        .with_context(|| format!("failed to open database at {}", config.database))?;
    tracing::info!(database = %config.database, "ezstock ready");
    Ok(AppState::new(Arc::new(store), config))
}

/// How one command words its failures.
struct Wording {
    /// Replaces the validation detail when set.
    invalid: Option<&'static str>,
    not_found: &'static str,
    /// Completes "Failed to ..." for storage errors.
    action: &'static str,
}

const ADD: Wording = Wording {
    invalid: None,
    not_found: "Item ID not found in inventory.",
    action: "add item",
};

const UPDATE: Wording = Wording {
    invalid: None,
    not_found: "Item ID not found in inventory.",
    action: "update item",
};

const DELETE: Wording = Wording {
    invalid: None,
    not_found: "Item ID not found in inventory.",
    action: "delete item",
};

const SELL: Wording = Wording {
    invalid: Some("Please provide a valid Item ID/Name and a positive quantity to sell."),
    not_found: "Item not found in inventory. Please check the Item ID or Name.",
    action: "sell item",
};

fn failure<T>(err: LedgerError, wording: &Wording) -> CommandResult<T> {
    let notice = match &err {
        LedgerError::Validation(detail) => Notice::error(
            "Invalid Input",
            wording
                .invalid
                .map(str::to_string)
                .unwrap_or_else(|| format!("Error: {detail}. Please fill in all fields with valid data.")),
        ),
        LedgerError::DuplicateKey(id) => {
            Notice::error("Duplicate Item", format!("Item ID {id} already exists."))
        }
        LedgerError::NotFound(_) => Notice::error("Not Found", wording.not_found),
        LedgerError::InsufficientStock { available, .. } => Notice::error(
            "Error",
            format!("Not enough stock to sell. Available quantity: {available}"),
        ),
        LedgerError::Storage(source) => {
            tracing::error!(error = %source, action = wording.action, "storage failure");
            Notice::error(
                "Database Error",
                format!("Failed to {}: {source}", wording.action),
            )
        }
    };
    CommandResult::failed(notice)
}

pub fn add_item(state: &AppState, form: &ItemForm) -> CommandResult<InventoryRow> {
    match state.ledger.add(form) {
        Ok(item) => {
            let notice = Notice::info(
                "Success",
                format!("Item '{}' added to inventory.", item.name()),
            );
            CommandResult::ok(state.row(item), vec![notice])
        }
        Err(err) => failure(err, &ADD),
    }
}

pub fn update_item(state: &AppState, form: &ItemForm) -> CommandResult<InventoryRow> {
    match state.ledger.update(form) {
        Ok(item) => {
            let notice = Notice::info("Success", format!("Item '{}' updated.", item.name()));
            CommandResult::ok(state.row(item), vec![notice])
        }
        Err(err) => failure(err, &UPDATE),
    }
}

/// Delete the selected item. `confirmed` is the operator's answer to the
/// "are you sure" prompt.
pub fn delete_item(state: &AppState, id: &str, confirmed: bool) -> CommandResult<InventoryRow> {
    if id.trim().is_empty() {
        return CommandResult::failed(Notice::error("Error", "Please select an item to delete."));
    }

    match state.ledger.delete(id, confirmed) {
        Ok(Removal::Declined) => CommandResult::declined(),
        Ok(Removal::Removed(item)) => {
            let notice = Notice::info(
                "Deleted",
                format!(
                    "item '{}' (ID: {}) deleted successfully.",
                    item.name(),
                    item.id()
                ),
            );
            CommandResult::ok(state.row(item), vec![notice])
        }
        Err(err) => failure(err, &DELETE),
    }
}

/// Sell by id or name. A low-stock warning follows the confirmation when
/// the remaining quantity is at or below the threshold.
pub fn sell_item(state: &AppState, id_or_name: &str, quantity: &str) -> CommandResult<SaleReceipt> {
    match state.ledger.sell(id_or_name, quantity) {
        Ok(outcome) => {
            let name = outcome.item.name().to_string();
            let mut notices = vec![Notice::info(
                "Sold",
                format!(
                    "Successfully sold {} units of '{name}'.",
                    outcome.record.quantity_sold
                ),
            )];
            if outcome.low_stock {
                notices.push(Notice::warning(
                    "Low Stock Alert",
                    format!(
                        "Item '{name}' has low stock (only {} left).",
                        outcome.remaining
                    ),
                ));
            }
            let receipt = SaleReceipt {
                sale: SalesRow::from_record(&outcome.record, &state.config.currency_symbol),
                item: state.row(outcome.item),
            };
            CommandResult::ok(receipt, notices)
        }
        Err(err) => failure(err, &SELL),
    }
}

pub fn list_inventory(state: &AppState) -> CommandResult<Vec<InventoryRow>> {
    match state.ledger.list() {
        Ok(levels) => {
            let rows = levels
                .iter()
                .map(|level| InventoryRow::from_level(level, &state.config.currency_symbol))
                .collect();
            CommandResult::ok(rows, Vec::new())
        }
        Err(err) => failure(
            err,
            &Wording {
                invalid: None,
                not_found: "Inventory not found.",
                action: "load inventory",
            },
        ),
    }
}

pub fn sales_history(state: &AppState) -> CommandResult<Vec<SalesRow>> {
    match state.recorder.list() {
        Ok(records) => {
            let notices = if records.is_empty() {
                vec![Notice::info("No Data", "No sales history available.")]
            } else {
                Vec::new()
            };
            let rows = records
                .iter()
                .map(|record| SalesRow::from_record(record, &state.config.currency_symbol))
                .collect();
            CommandResult::ok(rows, notices)
        }
        Err(err) => failure(
            err,
            &Wording {
                invalid: None,
                not_found: "No sales history available.",
                action: "load sales history",
            },
        ),
    }
}

/// Wipe the sales history. Returns the number of records removed.
pub fn clear_sales_history(state: &AppState, confirmed: bool) -> CommandResult<u64> {
    match state.recorder.clear_all(confirmed) {
        Ok(Clearance::Declined) => CommandResult::declined(),
        Ok(Clearance::Cleared { removed }) => CommandResult::ok(
            removed,
            vec![Notice::info(
                "History Cleared",
                "All sales history has been cleared.",
            )],
        ),
        Err(err) => failure(
            err,
            &Wording {
                invalid: None,
                not_found: "No sales history available.",
                action: "clear history",
            },
        ),
    }
}
