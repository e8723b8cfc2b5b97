use chrono::NaiveDate;
use std::path::PathBuf;

use crate::domain::{Cents, Ledger, Record, RecordId, RecordUpdate};
use crate::storage::ExpenseFile;

use super::{AppError, MonthlyReport};

/// Application service providing the high-level expense operations.
/// This is the interface both the subcommands and the interactive menu use.
pub struct ExpenseService {
    ledger: Ledger,
    file: Option<ExpenseFile>,
}

impl ExpenseService {
    /// An in-memory service with no backing file.
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger, file: None }
    }

    /// Load the ledger stored at `path`. A missing file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let file = ExpenseFile::new(path);
        let ledger = Ledger::from_records(file.load()?)?;
        tracing::info!(
            path = %file.path().display(),
            count = ledger.len(),
            "opened expense ledger"
        );
        Ok(Self {
            ledger,
            file: Some(file),
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn file(&self) -> Option<&ExpenseFile> {
        self.file.as_ref()
    }

    /// Persist the ledger. Returns the number of records written
    /// (zero for an in-memory service).
    pub fn save(&self) -> Result<usize, AppError> {
        match &self.file {
            Some(file) => Ok(file.save(&self.ledger)?),
            None => Ok(0),
        }
    }

    // ========================
    // Mutations
    // ========================

    /// Validate and record a new expense.
    pub fn add_expense(
        &mut self,
        amount: Cents,
        category: &str,
        date_text: &str,
        note: &str,
    ) -> Result<Record, AppError> {
        let record = Record::new(amount, category, date_text, note)?;
        let id = self.ledger.add(record);
        tracing::debug!(id, amount, "added expense");
        self.get_expense(id).cloned()
    }

    /// Apply a partial update, returning the updated record.
    pub fn edit_expense(&mut self, id: RecordId, update: RecordUpdate) -> Result<Record, AppError> {
        if !self.ledger.update(id, update)? {
            return Err(AppError::RecordNotFound(id));
        }
        tracing::debug!(id, "edited expense");
        self.get_expense(id).cloned()
    }

    /// Delete an expense, returning what was removed.
    pub fn delete_expense(&mut self, id: RecordId) -> Result<Record, AppError> {
        let removed = self
            .ledger
            .take(id)
            .ok_or(AppError::RecordNotFound(id))?;
        tracing::debug!(id, "deleted expense");
        Ok(removed)
    }

    // ========================
    // Queries
    // ========================

    pub fn get_expense(&self, id: RecordId) -> Result<&Record, AppError> {
        self.ledger.get(id).ok_or(AppError::RecordNotFound(id))
    }

    /// All expenses in storage order.
    pub fn list_expenses(&self) -> Vec<&Record> {
        self.ledger.iter().collect()
    }

    pub fn expenses_by_category(&self, category: &str) -> Vec<&Record> {
        self.ledger.find_by_category(category)
    }

    pub fn expenses_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Record> {
        if start > end {
            tracing::warn!(%start, %end, "date range is inverted, nothing can match");
        }
        self.ledger.find_by_date_range(start, end)
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        self.ledger.unique_categories().into_iter().collect()
    }

    pub fn monthly_report(&self) -> Result<MonthlyReport, AppError> {
        Ok(MonthlyReport::from_ledger(&self.ledger)?)
    }

    pub fn total(&self) -> Result<Cents, AppError> {
        Ok(self.ledger.total()?)
    }
}
