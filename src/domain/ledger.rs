use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use thiserror::Error;

use super::{Cents, Record, RecordError, RecordId, RecordUpdate};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Duplicate record id {0} in stored data")]
    DuplicateId(RecordId),

    #[error("Record id {0} is out of range")]
    InvalidId(RecordId),

    #[error("Amounts are too large to add up")]
    AmountOverflow,
}

/// Highest id a stored record may carry. Leaves room for the counter to
/// keep handing out fresh ids.
pub const MAX_RECORD_ID: RecordId = i64::MAX as RecordId;

/// The in-memory collection of expense records for one session.
///
/// Records keep insertion order. Ids come from a monotonic counter, so an id
/// is never handed out twice, even after the record holding it is removed.
#[derive(Debug, Clone)]
pub struct Ledger {
    records: Vec<Record>,
    next_id: RecordId,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuild a ledger from reconstructed records.
    ///
    /// Records are sorted chronologically before insertion. Persisted ids are
    /// kept; records without one get fresh ids above the highest persisted id.
    pub fn from_records(mut records: Vec<Record>) -> Result<Self, LedgerError> {
        records.sort_by(Record::chronological_cmp);

        let mut seen = HashSet::new();
        for id in records.iter().filter_map(Record::id) {
            if id == 0 || id > MAX_RECORD_ID {
                return Err(LedgerError::InvalidId(id));
            }
            if !seen.insert(id) {
                return Err(LedgerError::DuplicateId(id));
            }
        }

        let mut ledger = Self::new();
        ledger.next_id = seen.iter().max().map_or(1, |max| max + 1);

        for mut record in records {
            if record.id().is_none() {
                record.assign_id(ledger.take_id());
            }
            ledger.records.push(record);
        }
        Ok(ledger)
    }

    fn take_id(&mut self) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Store a record, assigning it the next id. Returns the assigned id.
    pub fn add(&mut self, mut record: Record) -> RecordId {
        let id = self.take_id();
        record.assign_id(id);
        self.records.push(record);
        id
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == Some(id))
    }

    /// Apply an update to the record with `id`.
    ///
    /// `Ok(false)` means no such record; a validation failure leaves the
    /// record unchanged.
    pub fn update(&mut self, id: RecordId, update: RecordUpdate) -> Result<bool, RecordError> {
        match self.records.iter_mut().find(|r| r.id() == Some(id)) {
            Some(record) => {
                record.apply(update)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove the record with `id`, returning it if it was present.
    pub fn take(&mut self, id: RecordId) -> Option<Record> {
        let position = self.records.iter().position(|r| r.id() == Some(id))?;
        Some(self.records.remove(position))
    }

    /// Remove the record with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: RecordId) -> bool {
        self.take(id).is_some()
    }

    pub fn unique_categories(&self) -> BTreeSet<String> {
        self.records
            .iter()
            .map(|r| r.category().to_string())
            .collect()
    }

    pub fn find_by_category(&self, category: &str) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|r| r.category() == category)
            .collect()
    }

    /// Records dated within `start..=end`. An inverted range is simply empty.
    pub fn find_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|r| start <= r.date() && r.date() <= end)
            .collect()
    }

    /// Total spent per `YYYY-MM` month.
    pub fn monthly_summary(&self) -> Result<BTreeMap<String, Cents>, LedgerError> {
        let mut summary: BTreeMap<String, Cents> = BTreeMap::new();
        for record in &self.records {
            let sum = summary.entry(record.month_key()).or_insert(0);
            *sum = sum
                .checked_add(record.amount())
                .ok_or(LedgerError::AmountOverflow)?;
        }
        Ok(summary)
    }

    pub fn total(&self) -> Result<Cents, LedgerError> {
        self.records.iter().try_fold(0, |sum: Cents, record| {
            sum.checked_add(record.amount())
                .ok_or(LedgerError::AmountOverflow)
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Records in `(date, id)` order.
    pub fn sorted(&self) -> Vec<&Record> {
        let mut records: Vec<&Record> = self.records.iter().collect();
        records.sort_by(|a, b| a.chronological_cmp(b));
        records
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(amount: Cents, category: &str, date: &str) -> Record {
        Record::new(amount, category, date, "").unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.add(record(1000, "Food", "2025-12-06")), 1);
        assert_eq!(ledger.add(record(2000, "Transport", "2025-12-07")), 2);

        assert_eq!(ledger.len(), 2);
        let ids: Vec<_> = ledger.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
    }

    #[test]
    fn test_add_overwrites_carried_id() {
        let mut ledger = Ledger::new();
        let id = ledger.add(record(1000, "Food", "2025-12-06").with_id(40));
        assert_eq!(id, 1);
        assert!(ledger.get(40).is_none());
    }

    #[test]
    fn test_ids_never_reused_after_removal() {
        let mut ledger = Ledger::new();
        ledger.add(record(1000, "Food", "2025-12-06"));
        ledger.add(record(2000, "Food", "2025-12-07"));
        assert!(ledger.remove(2));
        assert!(ledger.remove(1));
        assert!(ledger.is_empty());

        assert_eq!(ledger.add(record(3000, "Rent", "2025-12-08")), 3);
    }

    #[test]
    fn test_remove_twice() {
        let mut ledger = Ledger::new();
        ledger.add(record(1000, "Food", "2025-12-06"));
        ledger.add(record(2000, "Transport", "2025-12-07"));

        assert!(ledger.remove(1));
        assert!(!ledger.remove(1));
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.iter().next().and_then(Record::id), Some(2));
    }

    #[test]
    fn test_update_found_and_missing() {
        let mut ledger = Ledger::new();
        ledger.add(record(1000, "Food", "2025-12-06"));

        assert_eq!(
            ledger.update(1, RecordUpdate::new().category("Groceries")),
            Ok(true)
        );
        assert_eq!(ledger.get(1).map(Record::category), Some("Groceries"));

        assert_eq!(ledger.update(99, RecordUpdate::new().amount(5)), Ok(false));
    }

    #[test]
    fn test_update_with_no_fields_is_found_and_unchanged() {
        let mut ledger = Ledger::new();
        ledger.add(Record::new(1250, "Food", "2025-01-15", "lunch").unwrap());
        let before = ledger.get(1).cloned();

        assert_eq!(ledger.update(1, RecordUpdate::new()), Ok(true));
        assert_eq!(ledger.get(1).cloned(), before);
    }

    #[test]
    fn test_invalid_update_leaves_record_unchanged() {
        let mut ledger = Ledger::new();
        ledger.add(record(1000, "Food", "2025-12-06"));
        let before = ledger.get(1).cloned();

        let result = ledger.update(1, RecordUpdate::new().amount(-1).note("x"));
        assert_eq!(result, Err(RecordError::NonPositiveAmount(-1)));
        assert_eq!(ledger.get(1).cloned(), before);
    }

    #[test]
    fn test_unique_categories_are_case_sensitive() {
        let mut ledger = Ledger::new();
        ledger.add(record(1000, "Food", "2025-12-06"));
        ledger.add(record(1000, "food", "2025-12-06"));
        ledger.add(record(1000, "Food", "2025-12-07"));

        let categories: Vec<_> = ledger.unique_categories().into_iter().collect();
        assert_eq!(categories, vec!["Food".to_string(), "food".to_string()]);
    }

    #[test]
    fn test_find_by_category() {
        let mut ledger = Ledger::new();
        ledger.add(record(1000, "Food", "2025-12-06"));
        ledger.add(record(2000, "Food", "2025-12-07"));
        ledger.add(record(3000, "Transport", "2025-12-08"));

        let foods = ledger.find_by_category("Food");
        assert_eq!(foods.len(), 2);
        assert!(foods.iter().all(|r| r.category() == "Food"));
        assert_eq!(foods[0].id(), Some(1));

        assert!(ledger.find_by_category("FOOD").is_empty());
    }

    #[test]
    fn test_find_by_date_range() {
        let mut ledger = Ledger::new();
        ledger.add(record(1000, "Food", "2025-12-01"));
        ledger.add(record(2000, "Transport", "2025-12-05"));
        ledger.add(record(30000, "Rent", "2025-12-10"));

        let result = ledger.find_by_date_range(day(2025, 12, 2), day(2025, 12, 8));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].amount(), 2000);

        let inclusive = ledger.find_by_date_range(day(2025, 12, 1), day(2025, 12, 10));
        assert_eq!(inclusive.len(), 3);

        assert!(
            ledger
                .find_by_date_range(day(2025, 12, 10), day(2025, 12, 1))
                .is_empty()
        );
    }

    #[test]
    fn test_monthly_summary() {
        let mut ledger = Ledger::new();
        ledger.add(record(1000, "Food", "2025-12-01"));
        ledger.add(record(2000, "Food", "2025-12-10"));
        ledger.add(record(3000, "Rent", "2025-11-15"));

        let summary = ledger.monthly_summary().unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary.get("2025-12"), Some(&3000));
        assert_eq!(summary.get("2025-11"), Some(&3000));
        assert_eq!(ledger.total(), Ok(6000));
    }

    #[test]
    fn test_monthly_summary_keeps_cents() {
        let mut ledger = Ledger::new();
        ledger.add(record(10, "Food", "2025-12-01"));
        ledger.add(record(20, "Food", "2025-12-02"));

        assert_eq!(ledger.monthly_summary().unwrap().get("2025-12"), Some(&30));
    }

    #[test]
    fn test_iteration_is_restartable() {
        let mut ledger = Ledger::new();
        ledger.add(record(1000, "Food", "2025-12-01"));
        ledger.add(record(2000, "Food", "2025-12-02"));

        assert_eq!(ledger.iter().count(), 2);
        assert_eq!((&ledger).into_iter().count(), 2);
    }

    #[test]
    fn test_from_records_preserves_ids_and_sorts() {
        let records = vec![
            record(1000, "Food", "2025-12-05").with_id(7),
            record(2000, "Rent", "2025-12-01").with_id(3),
            record(3000, "Bus", "2025-11-20"),
        ];

        let mut ledger = Ledger::from_records(records).unwrap();

        let ids: Vec<_> = ledger.iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec![8, 3, 7]);
        assert_eq!(ledger.add(record(100, "Food", "2025-12-30")), 9);
    }

    #[test]
    fn test_from_records_rejects_duplicate_ids() {
        let records = vec![
            record(1000, "Food", "2025-12-05").with_id(2),
            record(2000, "Rent", "2025-12-01").with_id(2),
        ];

        assert_eq!(
            Ledger::from_records(records).unwrap_err(),
            LedgerError::DuplicateId(2)
        );
    }

    #[test]
    fn test_sums_report_overflow() {
        let mut ledger = Ledger::new();
        ledger.add(record(Cents::MAX, "Food", "2025-12-01"));
        assert_eq!(ledger.total(), Ok(Cents::MAX));

        ledger.add(record(Cents::MAX, "Food", "2025-12-02"));
        assert_eq!(ledger.total(), Err(LedgerError::AmountOverflow));
        assert_eq!(ledger.monthly_summary(), Err(LedgerError::AmountOverflow));
    }

    #[test]
    fn test_total_overflows_across_months() {
        let mut ledger = Ledger::new();
        ledger.add(record(Cents::MAX / 2 + 1, "Food", "2025-11-01"));
        ledger.add(record(Cents::MAX / 2 + 1, "Food", "2025-12-01"));

        let summary = ledger.monthly_summary().unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(ledger.total(), Err(LedgerError::AmountOverflow));
    }

    #[test]
    fn test_from_records_rejects_unusable_ids() {
        let zero = vec![record(1000, "Food", "2025-12-05").with_id(0)];
        assert_eq!(
            Ledger::from_records(zero).unwrap_err(),
            LedgerError::InvalidId(0)
        );

        let huge = vec![
            record(1000, "Food", "2025-12-01").with_id(RecordId::MAX),
            record(2000, "Food", "2025-12-02"),
        ];
        assert_eq!(
            Ledger::from_records(huge).unwrap_err(),
            LedgerError::InvalidId(RecordId::MAX)
        );
    }

    #[test]
    fn test_from_records_accepts_highest_id() {
        let records = vec![
            record(1000, "Food", "2025-12-01").with_id(MAX_RECORD_ID),
            record(2000, "Food", "2025-12-02"),
        ];

        let ledger = Ledger::from_records(records).unwrap();
        let ids: Vec<_> = ledger.iter().filter_map(Record::id).collect();
        assert_eq!(ids, vec![MAX_RECORD_ID, MAX_RECORD_ID + 1]);
    }

    #[test]
    fn test_sorted_follows_dates_after_edit() {
        let mut ledger = Ledger::new();
        ledger.add(record(1000, "Food", "2025-12-01"));
        ledger.add(record(2000, "Food", "2025-12-02"));
        ledger
            .update(1, RecordUpdate::new().date(day(2025, 12, 3)))
            .unwrap();

        let insertion: Vec<_> = ledger.iter().filter_map(Record::id).collect();
        let sorted: Vec<_> = ledger.sorted().into_iter().filter_map(Record::id).collect();
        assert_eq!(insertion, vec![1, 2]);
        assert_eq!(sorted, vec![2, 1]);
    }
}
