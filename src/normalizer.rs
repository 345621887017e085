//! Record normalizer
//!
//! The only gate between the classification service and the ledger.
//! It validates what came back and never fills in or rewrites a value.

use crate::error::Rejection;
use crate::models::{FinancialRecord, RecordDate};
use crate::taxonomy::Taxonomy;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Field names, in the order they are checked for presence
pub const REQUIRED_FIELDS: [&str; 5] = [
    "item",
    "amount",
    "category",
    "transactionType",
    "dateRecorded",
];

/// Largest accepted amount: one quadrillion whole units. Exactly representable
/// as an `f64`, and small enough that ledger totals cannot overflow a `u128`.
pub const MAX_AMOUNT: u64 = 1_000_000_000_000_000;

pub struct RecordNormalizer<'a> {
    taxonomy: &'a Taxonomy,
}

impl<'a> RecordNormalizer<'a> {
    pub fn new(taxonomy: &'a Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// Normalize raw response text as returned by the service
    pub fn normalize(&self, raw: &str) -> Result<FinancialRecord, Rejection> {
        let cleaned = strip_code_fence(raw);

        let value: Value = serde_json::from_str(cleaned).map_err(|e| {
            warn!(error = %e, "Classification response is not valid JSON");
            Rejection::MalformedResponse(e.to_string())
        })?;

        self.normalize_value(&value)
    }

    /// Normalize an already-parsed response
    pub fn normalize_value(&self, value: &Value) -> Result<FinancialRecord, Rejection> {
        let fields = value.as_object().ok_or_else(|| {
            Rejection::MalformedResponse(format!("expected a JSON object, got {}", kind(value)))
        })?;

        if let Some(missing) = REQUIRED_FIELDS
            .iter()
            .find(|name| fields.get(**name).map_or(true, Value::is_null))
        {
            return Err(Rejection::IncompleteRecord((*missing).to_string()));
        }

        let item = text_field(fields, "item")?;
        if item.trim().is_empty() {
            return Err(Rejection::IncompleteRecord("item".to_string()));
        }

        let amount = parse_amount(&fields["amount"])?;

        let category = fields["category"]
            .as_str()
            .ok_or_else(|| Rejection::UnknownCategory(fields["category"].to_string()))?;
        if !self.taxonomy.contains_category(category) {
            return Err(Rejection::UnknownCategory(category.to_string()));
        }

        let type_label = fields["transactionType"]
            .as_str()
            .ok_or_else(|| Rejection::UnknownTransactionType(fields["transactionType"].to_string()))?;
        let transaction_type = self
            .taxonomy
            .transaction_type(type_label)
            .ok_or_else(|| Rejection::UnknownTransactionType(type_label.to_string()))?;

        let date_label = fields["dateRecorded"]
            .as_str()
            .ok_or_else(|| Rejection::InvalidDate(fields["dateRecorded"].to_string()))?;
        let date_recorded =
            RecordDate::parse(date_label).ok_or_else(|| Rejection::InvalidDate(date_label.to_string()))?;

        debug!(item, amount, category, %transaction_type, "Record accepted");

        Ok(FinancialRecord::from_parts(
            item,
            amount,
            category,
            transaction_type,
            date_recorded,
        ))
    }
}

/// Remove a surrounding ```json fence if the service added one
pub fn strip_code_fence(raw: &str) -> &str {
    raw.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

fn text_field<'v>(fields: &'v Map<String, Value>, name: &str) -> Result<&'v str, Rejection> {
    fields[name].as_str().ok_or_else(|| {
        Rejection::MalformedResponse(format!("`{}` must be a string", name))
    })
}

/// Whole numbers in `0..=MAX_AMOUNT`. Integral floats like `59000.0` pass.
fn parse_amount(value: &Value) -> Result<u64, Rejection> {
    let invalid = || Rejection::InvalidAmount(value.to_string());

    let amount = match value {
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                v
            } else if let Some(f) = n.as_f64() {
                // range check before the cast; `as u64` saturates
                if f >= 0.0 && f.fract() == 0.0 && f <= MAX_AMOUNT as f64 {
                    f as u64
                } else {
                    return Err(invalid());
                }
            } else {
                return Err(invalid());
            }
        }
        Value::String(s) => s.trim().parse::<u64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };

    if amount > MAX_AMOUNT {
        return Err(invalid());
    }
    Ok(amount)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::TransactionType;
    use chrono::NaiveDate;
    use serde_json::json;

    fn normalize(value: Value) -> Result<FinancialRecord, Rejection> {
        let taxonomy = Taxonomy::standard();
        RecordNormalizer::new(&taxonomy).normalize_value(&value)
    }

    fn ktx_ticket() -> Value {
        json!({
            "item": "KTX ticket to Busan",
            "amount": 59000,
            "category": "Transportation",
            "transactionType": "Expense",
            "dateRecorded": "today"
        })
    }

    #[test]
    fn test_accepts_valid_record() {
        let record = normalize(ktx_ticket()).unwrap();
        assert_eq!(record.item(), "KTX ticket to Busan");
        assert_eq!(record.amount(), 59000);
        assert_eq!(record.category(), "Transportation");
        assert_eq!(record.transaction_type(), TransactionType::Expense);
        assert_eq!(record.date_recorded(), RecordDate::Today);
    }

    #[test]
    fn test_accepts_explicit_date() {
        let mut value = ktx_ticket();
        value["dateRecorded"] = json!("2024-05-03");
        let record = normalize(value).unwrap();
        assert_eq!(
            record.date_recorded(),
            RecordDate::On(NaiveDate::from_ymd_opt(2024, 5, 3).unwrap())
        );
    }

    #[test]
    fn test_rejects_unparseable_text() {
        let taxonomy = Taxonomy::standard();
        let normalizer = RecordNormalizer::new(&taxonomy);
        assert!(matches!(
            normalizer.normalize("I spent 5000 on lunch"),
            Err(Rejection::MalformedResponse(_))
        ));
        assert!(matches!(
            normalizer.normalize("[1, 2, 3]"),
            Err(Rejection::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_strips_json_fence() {
        let taxonomy = Taxonomy::standard();
        let raw = format!("```json\n{}\n```", ktx_ticket());
        let record = RecordNormalizer::new(&taxonomy).normalize(&raw).unwrap();
        assert_eq!(record.amount(), 59000);
    }

    #[test]
    fn test_missing_field_is_incomplete() {
        let mut value = ktx_ticket();
        value.as_object_mut().unwrap().remove("category");
        assert_eq!(
            normalize(value),
            Err(Rejection::IncompleteRecord("category".to_string()))
        );

        let mut value = ktx_ticket();
        value["dateRecorded"] = Value::Null;
        assert_eq!(
            normalize(value),
            Err(Rejection::IncompleteRecord("dateRecorded".to_string()))
        );
    }

    #[test]
    fn test_blank_item_is_incomplete() {
        let mut value = ktx_ticket();
        value["item"] = json!("   ");
        assert_eq!(normalize(value), Err(Rejection::IncompleteRecord("item".to_string())));
    }

    #[test]
    fn test_rejects_bad_amounts() {
        for bad in [json!(-500), json!(12.5), json!("10k"), json!(true), json!("-3")] {
            let mut value = ktx_ticket();
            value["amount"] = bad;
            assert!(matches!(normalize(value), Err(Rejection::InvalidAmount(_))));
        }
    }

    #[test]
    fn test_accepts_integral_amount_forms() {
        for good in [json!(59000.0), json!("59000")] {
            let mut value = ktx_ticket();
            value["amount"] = good;
            assert_eq!(normalize(value).unwrap().amount(), 59000);
        }
    }

    #[test]
    fn test_amount_upper_bound() {
        let mut value = ktx_ticket();
        value["amount"] = json!(MAX_AMOUNT);
        assert_eq!(normalize(value).unwrap().amount(), MAX_AMOUNT);

        let too_large: Vec<Value> = vec![
            json!(MAX_AMOUNT + 1),
            json!(u64::MAX),
            serde_json::from_str("18446744073709551616").unwrap(),
            json!(1e300),
            json!("18446744073709551615"),
        ];
        for bad in too_large {
            let mut value = ktx_ticket();
            value["amount"] = bad;
            assert!(matches!(normalize(value), Err(Rejection::InvalidAmount(_))));
        }
    }

    #[test]
    fn test_rejects_category_outside_taxonomy() {
        for label in ["Groceries", "transportation", "Food and Dining"] {
            let mut value = ktx_ticket();
            value["category"] = json!(label);
            assert_eq!(
                normalize(value),
                Err(Rejection::UnknownCategory(label.to_string()))
            );
        }
    }

    #[test]
    fn test_rejects_unknown_transaction_type() {
        let mut value = ktx_ticket();
        value["transactionType"] = json!("Transfer");
        assert_eq!(
            normalize(value),
            Err(Rejection::UnknownTransactionType("Transfer".to_string()))
        );
    }

    #[test]
    fn test_rejects_invalid_date() {
        let mut value = ktx_ticket();
        value["dateRecorded"] = json!("yesterday");
        assert_eq!(normalize(value), Err(Rejection::InvalidDate("yesterday".to_string())));
    }

    #[test]
    fn test_custom_taxonomy_is_observed() {
        let taxonomy = Taxonomy::from_labels(["Rail", "Other", "Income"]);
        let normalizer = RecordNormalizer::new(&taxonomy);

        let mut value = ktx_ticket();
        assert!(matches!(
            normalizer.normalize_value(&value),
            Err(Rejection::UnknownCategory(_))
        ));

        value["category"] = json!("Rail");
        assert!(normalizer.normalize_value(&value).is_ok());
    }
}
