use thiserror::Error;

use crate::domain::{LedgerError, RecordError, RecordId};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No expense found with ID {0}")]
    RecordNotFound(RecordId),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl AppError {
    /// True when the caller supplied a bad value and may simply retry.
    pub fn is_input_error(&self) -> bool {
        matches!(self, AppError::Record(_) | AppError::RecordNotFound(_))
    }
}
