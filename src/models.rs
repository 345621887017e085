//! Core data models for the ledger

use crate::taxonomy::TransactionType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbolic token the classifier emits when no date was stated
pub const TODAY_TOKEN: &str = "today";

//
// ================= Record Date =================
//

/// Either an explicit calendar date or "today", resolved by whoever displays it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RecordDate {
    Today,
    On(NaiveDate),
}

impl RecordDate {
    /// Accepts the literal token or an ISO `YYYY-MM-DD` date
    pub fn parse(raw: &str) -> Option<Self> {
        if raw == TODAY_TOKEN {
            return Some(RecordDate::Today);
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .map(RecordDate::On)
    }

    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        match self {
            RecordDate::Today => today,
            RecordDate::On(date) => *date,
        }
    }
}

impl fmt::Display for RecordDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordDate::Today => write!(f, "{}", TODAY_TOKEN),
            RecordDate::On(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl From<RecordDate> for String {
    fn from(date: RecordDate) -> Self {
        date.to_string()
    }
}

impl TryFrom<String> for RecordDate {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        RecordDate::parse(&value).ok_or_else(|| format!("invalid record date: {}", value))
    }
}

//
// ================= Financial Record =================
//

/// One validated ledger entry. Only the normalizer and the seed data build these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    item: String,
    amount: u64,
    category: String,
    transaction_type: TransactionType,
    date_recorded: RecordDate,
}

impl FinancialRecord {
    pub(crate) fn from_parts(
        item: impl Into<String>,
        amount: u64,
        category: impl Into<String>,
        transaction_type: TransactionType,
        date_recorded: RecordDate,
    ) -> Self {
        Self {
            item: item.into(),
            amount,
            category: category.into(),
            transaction_type,
            date_recorded,
        }
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    /// Whole currency units
    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn date_recorded(&self) -> RecordDate {
        self.date_recorded
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }
}

//
// ================= Aggregation Output =================
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: u128,
}

/// Figures shown on the summary screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_income: u128,
    pub total_expense: u128,
    /// Income minus expense; negative when spending exceeds income
    pub net: i128,
    pub by_category: Vec<CategoryTotal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_date_parse() {
        assert_eq!(RecordDate::parse("today"), Some(RecordDate::Today));
        assert_eq!(
            RecordDate::parse("2024-03-15"),
            Some(RecordDate::On(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()))
        );
        assert_eq!(RecordDate::parse("Today"), None);
        assert_eq!(RecordDate::parse("2024-02-30"), None);
        assert_eq!(RecordDate::parse("15/03/2024"), None);
    }

    #[test]
    fn test_record_date_resolve() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let explicit = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(RecordDate::Today.resolve(today), today);
        assert_eq!(RecordDate::On(explicit).resolve(today), explicit);
    }

    #[test]
    fn test_record_serialization() {
        let record = FinancialRecord::from_parts(
            "KTX ticket to Busan",
            59000,
            "Transportation",
            TransactionType::Expense,
            RecordDate::Today,
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["item"], "KTX ticket to Busan");
        assert_eq!(json["amount"], 59000);
        assert_eq!(json["transactionType"], "Expense");
        assert_eq!(json["dateRecorded"], "today");
    }
}
