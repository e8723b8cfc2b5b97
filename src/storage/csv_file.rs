use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::domain::{
    DATE_FORMAT, Ledger, Record, RecordError, RecordId, format_cents, parse_amount,
};

/// Column order of the expense file.
pub const HEADER: [&str; 5] = ["id", "amount", "category", "date", "note"];

/// One line of the expense file, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredRow {
    /// Empty for rows written before ids were persisted
    id: Option<RecordId>,
    amount: String,
    category: String,
    date: String,
    #[serde(default)]
    note: String,
}

impl StoredRow {
    fn from_record(record: &Record) -> Self {
        Self {
            id: record.id(),
            amount: format_cents(record.amount()),
            category: record.category().to_string(),
            date: record.date().format(DATE_FORMAT).to_string(),
            note: record.note().to_string(),
        }
    }

    fn into_record(self) -> Result<Record, RecordError> {
        let amount = parse_amount(&self.amount)?;
        let record = Record::new(amount, &self.category, &self.date, self.note)?;
        Ok(match self.id {
            Some(id) => record.with_id(id),
            None => record,
        })
    }
}

/// Read and validate every row of an expense CSV.
///
/// The first bad row aborts the read; its line number (header = line 1) is
/// part of the error.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(reader);
    let mut records = Vec::new();

    for (index, result) in csv_reader.deserialize::<StoredRow>().enumerate() {
        let line = index + 2;
        let row = result.with_context(|| format!("CSV parse error on line {}", line))?;
        let record = row
            .into_record()
            .with_context(|| format!("Invalid expense on line {}", line))?;
        records.push(record);
    }

    Ok(records)
}

/// Write records with the standard header. Returns the number of rows written.
pub fn write_records<'a, W, I>(writer: W, records: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(HEADER)?;

    let mut count = 0;
    for record in records {
        csv_writer.serialize(StoredRow::from_record(record))?;
        count += 1;
    }

    csv_writer.flush()?;
    Ok(count)
}

/// The flat file an expense ledger is persisted to.
#[derive(Debug, Clone)]
pub struct ExpenseFile {
    path: PathBuf,
}

impl ExpenseFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records. A missing file is an empty ledger, not an error.
    pub fn load(&self) -> Result<Vec<Record>> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "expense file missing, starting empty");
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open expense file: {}", self.path.display()))?;
        let records = read_records(file)
            .with_context(|| format!("Failed to read expense file: {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), count = records.len(), "loaded expenses");
        Ok(records)
    }

    /// Write the ledger in chronological order, creating parent directories.
    pub fn save(&self, ledger: &Ledger) -> Result<usize> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create data directory: {}", parent.display())
                })?;
            }
        }

        let file = File::create(&self.path)
            .with_context(|| format!("Failed to create expense file: {}", self.path.display()))?;
        let count = write_records(file, ledger.sorted())
            .with_context(|| format!("Failed to write expense file: {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), count, "saved expenses");
        Ok(count)
    }
}
