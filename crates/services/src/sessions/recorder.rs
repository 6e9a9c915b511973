use std::sync::Arc;

use quiz_core::model::{NewTestResult, TestResultId};
use storage::repository::TestResultRepository;
use tracing::{error, info};

use crate::error::PersistError;

/// Appends finished attempts to the result history.
#[derive(Clone)]
pub struct ResultRecorder {
    results: Arc<dyn TestResultRepository>,
}

impl ResultRecorder {
    #[must_use]
    pub fn new(results: Arc<dyn TestResultRepository>) -> Self {
        Self { results }
    }

    /// Record one finished attempt and return its history id.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if the history cannot be read or written. The
    /// failure is logged here; callers decide whether it is fatal.
    pub async fn record(&self, attempt: &NewTestResult) -> Result<TestResultId, PersistError> {
        match self.results.append_result(attempt).await {
            Ok(saved) => {
                info!(
                    result_id = %saved.id(),
                    test_set_id = %attempt.test_set_id(),
                    correct = attempt.correct_answers(),
                    total = attempt.total_questions(),
                    "recorded test result"
                );
                Ok(saved.id())
            }
            Err(err) => {
                error!(
                    test_set_id = %attempt.test_set_id(),
                    error = %err,
                    "failed to record test result"
                );
                Err(PersistError::from(err))
            }
        }
    }
}
