//! Infrastructure layer: storage backends, the ledger/recorder services that
//! run on top of them, and configuration.

pub mod config;
pub mod error;
pub mod ledger;
pub mod recorder;
pub mod store;


pub use config::{AppConfig, DatabaseLocation};
pub use error::{LedgerError, LedgerResult};
pub use ledger::{Clock, InventoryLedger, Removal, SaleOutcome, StockLevel};
pub use recorder::{Clearance, SalesRecorder};
pub use store::{InMemoryStore, SqliteStore, Store, StoreError, StoreResult};
