//! Classification service seam
//!
//! The external service is a black box: it takes an extraction request and
//! hands back raw text. Whatever it returns goes through the normalizer.

use crate::error::LedgerError;
use crate::extraction::ExtractionRequest;
use crate::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Trait for the external classification call
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, request: &ExtractionRequest) -> Result<String>;
}

/// One canned reply for [`ScriptedClassifier`]
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    Unavailable(String),
    Failed(String),
}

/// Replays canned replies in order. Useful offline and in tests.
pub struct ScriptedClassifier {
    replies: Mutex<VecDeque<ScriptedReply>>,
}

impl ScriptedClassifier {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
        }
    }

    /// Shorthand for a script of successful responses
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(texts.into_iter().map(|t| ScriptedReply::Text(t.into())))
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, _request: &ExtractionRequest) -> Result<String> {
        let next = self
            .replies
            .lock()
            .map_err(|_| LedgerError::ServiceError("scripted classifier poisoned".to_string()))?
            .pop_front();

        match next {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Unavailable(reason)) => Err(LedgerError::ServiceUnavailable(reason)),
            Some(ScriptedReply::Failed(reason)) => Err(LedgerError::ServiceError(reason)),
            None => Err(LedgerError::ServiceUnavailable(
                "no scripted replies left".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::ExtractionRequestBuilder;
    use crate::taxonomy::Taxonomy;

    #[test]
    fn test_scripted_replies_in_order() {
        let classifier = ScriptedClassifier::new(vec![
            ScriptedReply::Text("{}".to_string()),
            ScriptedReply::Failed("quota".to_string()),
        ]);
        let request = ExtractionRequestBuilder::new(&Taxonomy::standard()).build("lunch");

        tokio_test::block_on(async {
            let text = tokio_test::assert_ok!(classifier.classify(&request).await);
            assert_eq!(text, "{}");
            assert!(matches!(
                classifier.classify(&request).await,
                Err(LedgerError::ServiceError(_))
            ));
            assert!(matches!(
                classifier.classify(&request).await,
                Err(LedgerError::ServiceUnavailable(_))
            ));
        });
        assert_eq!(classifier.remaining(), 0);
    }
}
