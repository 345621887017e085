//! Session state
//!
//! Owns the ledger, the busy flag and the last outcome. All changes go through
//! `submit`, `on_success` and `on_failure`; there is no ambient global state.

use crate::aggregation;
use crate::classifier::Classifier;
use crate::error::LedgerError;
use crate::extraction::{ExtractionRequest, ExtractionRequestBuilder};
use crate::ledger::Ledger;
use crate::models::{FinancialRecord, LedgerSummary};
use crate::normalizer::RecordNormalizer;
use crate::taxonomy::Taxonomy;
use crate::Result;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Result of the most recent extraction, shown until the next one completes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum LastOutcome {
    None,
    Parsed { record: FinancialRecord },
    Failed { message: String },
}

/// Ticket for one in-flight extraction
#[derive(Debug, Clone)]
pub struct Submission {
    pub submission_id: Uuid,
    pub request: ExtractionRequest,
}

pub struct Session {
    taxonomy: Taxonomy,
    builder: ExtractionRequestBuilder,
    ledger: Ledger,
    in_flight: Option<Uuid>,
    last_outcome: LastOutcome,
}

impl Session {
    pub fn new(taxonomy: Taxonomy, ledger: Ledger) -> Self {
        let builder = ExtractionRequestBuilder::new(&taxonomy);
        Self {
            taxonomy,
            builder,
            ledger,
            in_flight: None,
            last_outcome: LastOutcome::None,
        }
    }

    /// Standard taxonomy with the sample history loaded
    pub fn seeded() -> Self {
        Self::new(Taxonomy::default(), Ledger::seeded())
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    pub fn last_outcome(&self) -> &LastOutcome {
        &self.last_outcome
    }

    pub fn summary(&self) -> LedgerSummary {
        aggregation::summarize(self.ledger.snapshot())
    }

    /// Start an extraction. Fails if one is already outstanding.
    pub fn submit(&mut self, utterance: &str) -> Result<Submission> {
        if self.in_flight.is_some() {
            return Err(LedgerError::Busy);
        }

        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(LedgerError::EmptyUtterance);
        }

        let request = self.builder.build(utterance);
        let submission_id = Uuid::new_v4();
        self.in_flight = Some(submission_id);

        info!(
            submission_id = %submission_id,
            fingerprint = %request.fingerprint(),
            "Extraction submitted"
        );

        Ok(Submission {
            submission_id,
            request,
        })
    }

    /// The service answered. Normalize and append on acceptance.
    pub fn on_success(&mut self, submission: &Submission, raw: &str) -> Result<FinancialRecord> {
        self.ensure_current(submission)?;
        self.in_flight = None;

        match RecordNormalizer::new(&self.taxonomy).normalize(raw) {
            Ok(record) => {
                self.ledger.append(record.clone());
                info!(
                    submission_id = %submission.submission_id,
                    ledger_len = self.ledger.len(),
                    "Record appended"
                );
                self.last_outcome = LastOutcome::Parsed {
                    record: record.clone(),
                };
                Ok(record)
            }
            Err(rejection) => {
                warn!(
                    submission_id = %submission.submission_id,
                    reason = rejection.code(),
                    "Record rejected: {}",
                    rejection
                );
                self.last_outcome = LastOutcome::Failed {
                    message: rejection.to_string(),
                };
                Err(LedgerError::Rejected(rejection))
            }
        }
    }

    /// The service call failed or timed out. The ledger is left alone.
    pub fn on_failure(&mut self, submission: &Submission, error: LedgerError) -> LedgerError {
        if self.ensure_current(submission).is_err() {
            return error;
        }
        self.in_flight = None;

        warn!(
            submission_id = %submission.submission_id,
            "Extraction failed: {}",
            error
        );
        self.last_outcome = LastOutcome::Failed {
            message: error.to_string(),
        };
        error
    }

    fn ensure_current(&self, submission: &Submission) -> Result<()> {
        if self.in_flight == Some(submission.submission_id) {
            Ok(())
        } else {
            warn!(
                submission_id = %submission.submission_id,
                "Ignoring completion for a submission that is not in flight"
            );
            Err(LedgerError::StaleSubmission(submission.submission_id))
        }
    }

    /// Route a finished call to `on_success` or `on_failure`
    pub fn settle(&mut self, submission: &Submission, outcome: Result<String>) -> Result<FinancialRecord> {
        match outcome {
            Ok(raw) => self.on_success(submission, &raw),
            Err(e) => Err(self.on_failure(submission, e)),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::seeded()
    }
}

/// Session behind an async mutex, shared between request handlers.
/// The lock is never held while the classification call is outstanding.
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Run one utterance through classify → normalize → append.
    ///
    /// The call and its settlement run on a spawned task, so the session is
    /// settled even when the caller's future is dropped. On timeout the
    /// submission fails but the underlying request is left running; its late
    /// reply is dropped unread. A `timeout` of `None` waits indefinitely.
    pub async fn extract(
        &self,
        classifier: Arc<dyn Classifier>,
        utterance: &str,
        timeout: Option<Duration>,
    ) -> Result<FinancialRecord> {
        let submission = self.inner.lock().await.submit(utterance)?;

        let session = self.clone();
        let settlement = tokio::spawn(async move {
            let outcome = call_classifier(classifier, submission.request.clone(), timeout).await;
            let mut guard = session.inner.lock().await;
            guard.settle(&submission, outcome)
        });

        settlement.await.map_err(|e| {
            LedgerError::ServiceError(format!("extraction task failed: {}", e))
        })?
    }

    pub async fn with<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        let session = self.inner.lock().await;
        f(&session)
    }
}

/// Classify on a detached task; a timeout stops waiting, not the request
async fn call_classifier(
    classifier: Arc<dyn Classifier>,
    request: ExtractionRequest,
    timeout: Option<Duration>,
) -> Result<String> {
    let call = tokio::spawn(async move { classifier.classify(&request).await });

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(joined) => joined,
            Err(_) => {
                return Err(LedgerError::ServiceUnavailable(format!(
                    "classification timed out after {}ms",
                    limit.as_millis()
                )))
            }
        },
        None => call.await,
    };

    joined.map_err(|e| LedgerError::ServiceError(format!("classification task failed: {}", e)))?
}
