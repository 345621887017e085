//! Category taxonomy and transaction types
//!
//! The closed set of labels every ledger entry must use.
//! Anything validating a category or transaction type goes through here.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category labels, in display order
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Food & Dining",
    "Transportation",
    "Shopping",
    "Housing",
    "Utilities",
    "Health & Fitness",
    "Entertainment",
    "Education",
    "Travel",
    "Income",
    "Other",
];

/// Fallback label for transactions nothing else fits
pub const FALLBACK_CATEGORY: &str = "Other";

/// Label reserved for money received
pub const INCOME_CATEGORY: &str = "Income";

lazy_static! {
    /// Process-wide taxonomy
    pub static ref STANDARD_TAXONOMY: Taxonomy = Taxonomy::standard();
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Expense,
    Income,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Expense, TransactionType::Income];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "Expense",
            TransactionType::Income => "Income",
        }
    }

    /// Exact, case-sensitive lookup
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == label)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed set of category labels plus the transaction types
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Taxonomy {
    categories: Vec<String>,
    transaction_types: [TransactionType; 2],
}

impl Taxonomy {
    pub fn standard() -> Self {
        Self::from_labels(DEFAULT_CATEGORIES.iter().copied())
    }

    /// Build a taxonomy from labels; duplicates keep their first position
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut categories: Vec<String> = Vec::new();
        for label in labels {
            let label = label.into();
            if !categories.contains(&label) {
                categories.push(label);
            }
        }

        Self {
            categories,
            transaction_types: TransactionType::ALL,
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn transaction_types(&self) -> &[TransactionType] {
        &self.transaction_types
    }

    /// Exact membership; no case folding or fuzzy matching
    pub fn contains_category(&self, label: &str) -> bool {
        self.categories.iter().any(|c| c == label)
    }

    pub fn transaction_type(&self, label: &str) -> Option<TransactionType> {
        TransactionType::from_label(label).filter(|t| self.transaction_types.contains(t))
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        STANDARD_TAXONOMY.clone()
    }
}
