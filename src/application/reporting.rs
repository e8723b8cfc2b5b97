use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{Cents, Ledger, LedgerError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyReport {
    pub months: Vec<MonthSummary>,
    pub total: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSummary {
    /// `YYYY-MM`
    pub month: String,
    pub total: Cents,
    pub count: usize,
}

impl MonthlyReport {
    /// Build the per-month report; months come out in ascending order.
    pub fn from_ledger(ledger: &Ledger) -> Result<Self, LedgerError> {
        let totals = ledger.monthly_summary()?;

        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for record in ledger {
            *counts.entry(record.month_key()).or_insert(0) += 1;
        }

        let months = totals
            .into_iter()
            .map(|(month, total)| {
                let count = counts.get(&month).copied().unwrap_or(0);
                MonthSummary {
                    month,
                    total,
                    count,
                }
            })
            .collect();

        Ok(Self {
            months,
            total: ledger.total()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}
