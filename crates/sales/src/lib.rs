//! Sales history domain module.
//!
//! Sale records are append-only facts derived from `ItemSold` events. This
//! crate holds their shape and ordering rules; persistence lives in infra.

pub mod record;

pub use record::{SaleRecord, SalesSummary, newest_first};
