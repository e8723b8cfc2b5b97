// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use ledger_shredder::application::ExpenseService;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a service backed by a file in a temporary directory
pub fn test_service() -> Result<(ExpenseService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = ExpenseService::open(data_path(&temp_dir))?;
    Ok((service, temp_dir))
}

/// Path of the expense file inside a test directory (nested, to exercise dir creation)
pub fn data_path(dir: &TempDir) -> PathBuf {
    dir.path().join("data").join("expenses.csv")
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Test fixture: a spread of expenses over two months
pub struct StandardExpenses;

impl StandardExpenses {
    /// Food and transport in December, rent in November
    pub fn create_basic(service: &mut ExpenseService) -> Result<()> {
        service.add_expense(1000, "Food", "2025-12-01", "groceries")?;
        service.add_expense(2000, "Transport", "2025-12-05", "train")?;
        service.add_expense(30000, "Rent", "2025-11-10", "")?;
        Ok(())
    }
}
