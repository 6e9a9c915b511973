use thiserror::Error;

use crate::model::{QuestionError, TestResultError, TestSetError};

/// Validation failures raised while building domain values.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    TestSet(#[from] TestSetError),
    #[error(transparent)]
    TestResult(#[from] TestResultError),
}
