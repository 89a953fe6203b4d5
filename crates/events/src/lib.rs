//! Domain events.
//!
//! Inventory and sales crates describe what happened as typed events; the
//! infra layer logs them and turns sale events into sales-history records.

pub mod event;

pub use event::Event;
