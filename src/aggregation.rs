//! Aggregation engine
//!
//! Derives per-category expense totals from a ledger snapshot.
//! Recomputed from scratch on every call; there is no cached state.
//! Sums are `u128`: even `usize::MAX` records of `u64::MAX` cannot overflow.

use crate::models::{CategoryTotal, FinancialRecord, LedgerSummary};
use crate::taxonomy::TransactionType;
use tracing::debug;

/// Expense totals per category, largest first.
/// Ties keep the order in which the category first appears in the snapshot.
pub fn category_totals(snapshot: &[FinancialRecord]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for record in snapshot.iter().filter(|r| r.is_expense()) {
        match totals.iter_mut().find(|t| t.category == record.category()) {
            Some(entry) => entry.total += u128::from(record.amount()),
            None => totals.push(CategoryTotal {
                category: record.category().to_string(),
                total: u128::from(record.amount()),
            }),
        }
    }

    // sort_by is stable
    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals
}

pub fn total_for(snapshot: &[FinancialRecord], transaction_type: TransactionType) -> u128 {
    snapshot
        .iter()
        .filter(|r| r.transaction_type() == transaction_type)
        .map(|r| u128::from(r.amount()))
        .sum()
}

pub fn total_income(snapshot: &[FinancialRecord]) -> u128 {
    total_for(snapshot, TransactionType::Income)
}

pub fn total_expense(snapshot: &[FinancialRecord]) -> u128 {
    total_for(snapshot, TransactionType::Expense)
}

pub fn summarize(snapshot: &[FinancialRecord]) -> LedgerSummary {
    let total_income = total_income(snapshot);
    let total_expense = total_expense(snapshot);
    let by_category = category_totals(snapshot);

    debug!(
        records = snapshot.len(),
        categories = by_category.len(),
        total_income,
        total_expense,
        "Ledger aggregated"
    );

    LedgerSummary {
        total_income,
        total_expense,
        net: signed(total_income) - signed(total_expense),
        by_category,
    }
}

/// Totals stay far below `i128::MAX` (at most 2^64 records of under 2^64 each)
fn signed(total: u128) -> i128 {
    i128::try_from(total).unwrap_or(i128::MAX)
}
