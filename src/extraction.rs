//! Extraction request builder
//!
//! Assembles the outbound classification request for one utterance.
//! The builder does no judging of its own: the instruction, the taxonomy and the
//! output schema are fixed, so the same utterance always yields the same bytes.

use crate::taxonomy::{Taxonomy, FALLBACK_CATEGORY, INCOME_CATEGORY};
use crate::models::TODAY_TOKEN;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::io::Write;

/// Request payload sent to the classification service
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
    pub system_instruction: SystemInstruction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub response_mime_type: String,
    pub response_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<Part>,
}

impl ExtractionRequest {
    /// The text being classified
    pub fn utterance(&self) -> &str {
        self.contents
            .first()
            .and_then(|c| c.parts.first())
            .map(|p| p.text.as_str())
            .unwrap_or_default()
    }

    /// SHA-256 of the serialized payload, streamed into the hasher
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        if serde_json::to_writer(&mut HashWriter(&mut hasher), self).is_err() {
            return String::new();
        }

        hex::encode(hasher.finalize())
    }
}

/// Builds requests against one taxonomy
pub struct ExtractionRequestBuilder {
    instruction: String,
    response_schema: Value,
}

impl ExtractionRequestBuilder {
    pub fn new(taxonomy: &Taxonomy) -> Self {
        Self {
            instruction: build_instruction(taxonomy),
            response_schema: build_response_schema(taxonomy),
        }
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn response_schema(&self) -> &Value {
        &self.response_schema
    }

    /// Wrap a user utterance; callers reject blank input before getting here
    pub fn build(&self, utterance: &str) -> ExtractionRequest {
        ExtractionRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: utterance.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json".to_string(),
                response_schema: self.response_schema.clone(),
            },
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: self.instruction.clone(),
                }],
            },
        }
    }
}

fn build_instruction(taxonomy: &Taxonomy) -> String {
    let types: Vec<&str> = taxonomy
        .transaction_types()
        .iter()
        .map(|t| t.as_str())
        .collect();

    format!(
        r#"You are a bookkeeping assistant. Extract exactly one financial transaction from the user's text.

CURRENCY:
- Do not convert currencies.
- Assume the stated amount's numeral is already in the target currency unless told otherwise.

AMOUNT:
- Colloquial magnitude expressions such as '10k' or 'twenty thousand' must be converted to a plain integer.
- Whole units only, no fractional subunits.

CATEGORY:
- Choose one and only one of:
- {}
- If the transaction cannot be resolved to a category, use "{}".
- Income transactions use "{}".

DEFAULTS:
- transactionType is "Expense" unless the context clearly signals a payment received, then "Income".
- dateRecorded is "{}" when no date is stated; otherwise use YYYY-MM-DD.

OUTPUT:
- Return ONLY a JSON object with exactly these fields: item, amount, category, transactionType, dateRecorded.
- category must be one of the listed categories.
- transactionType must be one of: {}.
- No explanation text."#,
        taxonomy.categories().join("\n- "),
        FALLBACK_CATEGORY,
        INCOME_CATEGORY,
        TODAY_TOKEN,
        types.join(", "),
    )
}

fn build_response_schema(taxonomy: &Taxonomy) -> Value {
    let types: Vec<&str> = taxonomy
        .transaction_types()
        .iter()
        .map(|t| t.as_str())
        .collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "item": { "type": "STRING" },
            "amount": { "type": "INTEGER" },
            "category": { "type": "STRING", "enum": taxonomy.categories() },
            "transactionType": { "type": "STRING", "enum": types },
            "dateRecorded": { "type": "STRING" }
        },
        "required": ["item", "amount", "category", "transactionType", "dateRecorded"],
        "propertyOrdering": ["item", "amount", "category", "transactionType", "dateRecorded"]
    })
}

/// Adapter to allow writing into Sha256 via std::io::Write
struct HashWriter<'a, H: Digest>(&'a mut H);

impl<'a, H: Digest> Write for HashWriter<'a, H> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
