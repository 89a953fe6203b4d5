//! Process-wide logging setup shared by every EzStock front end.

/// Install the JSON log subscriber.
///
/// Only the first call in a process takes effect.
pub fn init() {
    tracing::init();
}

/// Subscriber construction (filters, formatting).
pub mod tracing;
