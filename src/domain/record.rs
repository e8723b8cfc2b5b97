use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use super::{Cents, parse_cents};

pub type RecordId = u64;

/// The only accepted textual date form.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Invalid date format: {0}. Use YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount must be > 0")]
    NonPositiveAmount(Cents),

    #[error("Category must be a non-empty string")]
    EmptyCategory,
}

impl RecordError {
    /// Malformed input text (dates, amount text).
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            RecordError::InvalidDate(_) | RecordError::InvalidAmount(_)
        )
    }

    /// A well-formed value that breaks a domain constraint.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            RecordError::NonPositiveAmount(_) | RecordError::EmptyCategory
        )
    }
}

/// Parse strict `YYYY-MM-DD` text into a calendar date.
pub fn parse_date(text: &str) -> Result<NaiveDate, RecordError> {
    let trimmed = text.trim();
    // chrono accepts unpadded fields like "2025-1-5"; the stored form never has them
    let well_shaped = trimmed.len() == 10
        && trimmed.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_shaped {
        return Err(RecordError::InvalidDate(text.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| RecordError::InvalidDate(text.to_string()))
}

/// Parse amount text such as `12.50` into cents.
///
/// Only the text is checked here; positivity is checked when the amount
/// reaches a record.
pub fn parse_amount(text: &str) -> Result<Cents, RecordError> {
    parse_cents(text)
        .map_err(|e| RecordError::InvalidAmount(format!("'{}' ({})", text.trim(), e)))
}

fn validate_amount(amount: Cents) -> Result<Cents, RecordError> {
    if amount <= 0 {
        return Err(RecordError::NonPositiveAmount(amount));
    }
    Ok(amount)
}

fn validate_category(category: &str) -> Result<String, RecordError> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(RecordError::EmptyCategory);
    }
    Ok(trimmed.to_string())
}

/// A single expense entry.
///
/// Fields are private so a `Record` can only exist in a validated state.
/// The id stays `None` until a [`Ledger`](super::Ledger) stores the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    id: Option<RecordId>,
    amount: Cents,
    category: String,
    date: NaiveDate,
    note: String,
}

impl Record {
    /// Build a validated record from raw field values.
    pub fn new(
        amount: Cents,
        category: &str,
        date_text: &str,
        note: impl Into<String>,
    ) -> Result<Self, RecordError> {
        let date = parse_date(date_text)?;
        Ok(Self {
            id: None,
            amount: validate_amount(amount)?,
            category: validate_category(category)?,
            date,
            note: note.into(),
        })
    }

    /// Attach a persisted identity. Used when reconstructing stored rows.
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    pub fn amount(&self) -> Cents {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    /// The `YYYY-MM` key this record is summarized under.
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    pub(super) fn assign_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }

    /// Apply a partial update atomically.
    ///
    /// Every present field is validated first; on any failure the record is
    /// left exactly as it was.
    pub fn apply(&mut self, update: RecordUpdate) -> Result<(), RecordError> {
        let amount = update.amount.map(validate_amount).transpose()?;
        let category = update
            .category
            .as_deref()
            .map(validate_category)
            .transpose()?;

        if let Some(amount) = amount {
            self.amount = amount;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(note) = update.note {
            self.note = note;
        }
        Ok(())
    }

    /// Total order by `(date, id)`; a missing id sorts before any assigned one.
    pub fn chronological_cmp(&self, other: &Self) -> Ordering {
        (self.date, self.id.unwrap_or(0)).cmp(&(other.date, other.id.unwrap_or(0)))
    }
}

/// Replacement values for a record. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    pub amount: Option<Cents>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub note: Option<String>,
}

impl RecordUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(mut self, amount: Cents) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Set the date from `YYYY-MM-DD` text, failing the same way construction does.
    pub fn date_text(self, text: &str) -> Result<Self, RecordError> {
        Ok(self.date(parse_date(text)?))
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.category.is_none()
            && self.date.is_none()
            && self.note.is_none()
    }
}
