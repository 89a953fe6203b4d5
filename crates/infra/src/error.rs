//! Errors reported by the ledger and recorder services.

use thiserror::Error;

use ezstock_core::{DomainError, ItemId};

use crate::store::StoreError;

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Operation-boundary error: one variant per failure the operator can see.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("item {0} already exists")]
    DuplicateKey(ItemId),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("insufficient stock (requested: {requested}, available: {available})")]
    InsufficientStock { requested: u32, available: u32 },

    #[error("storage error: {0}")]
    Storage(StoreError),
}

impl From<DomainError> for LedgerError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => Self::Validation(msg),
            DomainError::NotFound(what) => Self::NotFound(what),
            DomainError::InsufficientStock {
                requested,
                available,
            } => Self::InsufficientStock {
                requested,
                available,
            },
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(id) => Self::DuplicateKey(id),
            other => Self::Storage(other),
        }
    }
}
