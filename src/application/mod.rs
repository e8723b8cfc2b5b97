// Application layer - use cases on top of the ledger and its backing file.
// The CLI and the interactive menu both go through ExpenseService.

pub mod error;
pub mod reporting;
pub mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
