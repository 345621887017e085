//! Append-only ledger
//!
//! Insertion order is entry order. Nothing here validates; records arrive
//! already normalized.

use crate::models::{FinancialRecord, RecordDate};
use crate::taxonomy::TransactionType;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Ledger {
    records: Vec<FinancialRecord>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger pre-filled with the sample history shown at session start
    pub fn seeded() -> Self {
        Self {
            records: seed_records(),
        }
    }

    pub fn append(&mut self, record: FinancialRecord) {
        self.records.push(record);
    }

    /// Read-only view of every record, in append order
    pub fn snapshot(&self) -> &[FinancialRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn seed_date(year: i32, month: u32, day: u32) -> RecordDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(RecordDate::On)
        .unwrap_or(RecordDate::Today)
}

fn seed_records() -> Vec<FinancialRecord> {
    use TransactionType::{Expense, Income};

    vec![
        FinancialRecord::from_parts("Monthly salary", 3_200_000, "Income", Income, seed_date(2024, 5, 1)),
        FinancialRecord::from_parts("Team dinner at Korean BBQ", 150_000, "Food & Dining", Expense, seed_date(2024, 5, 2)),
        FinancialRecord::from_parts("Monthly transit pass", 65_000, "Transportation", Expense, seed_date(2024, 5, 3)),
        FinancialRecord::from_parts("Lunch at convenience store", 8_500, "Food & Dining", Expense, seed_date(2024, 5, 4)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut ledger = Ledger::new();
        assert!(ledger.is_empty());

        let late = FinancialRecord::from_parts("Late", 1, "Other", TransactionType::Expense, seed_date(2024, 12, 31));
        let early = FinancialRecord::from_parts("Early", 2, "Other", TransactionType::Expense, seed_date(2024, 1, 1));
        ledger.append(late.clone());
        ledger.append(early.clone());

        assert_eq!(ledger.snapshot(), &[late, early]);
    }

    #[test]
    fn test_seeded_history() {
        let ledger = Ledger::seeded();
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger.snapshot()[0].transaction_type(), TransactionType::Income);
        assert!(ledger
            .snapshot()
            .iter()
            .all(|r| !r.item().is_empty()));
    }

    #[test]
    fn test_serializes_as_array() {
        let json = serde_json::to_value(Ledger::seeded()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 4);
        assert_eq!(json[1]["category"], "Food & Dining");
    }
}
