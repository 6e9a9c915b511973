//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{SubjectId, TestResultError, TestSetId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// A required collection entry is missing or malformed. Blocking; not retried.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("test set {0} not found")]
    TestSetNotFound(TestSetId),
    #[error("subject {0} not found")]
    SubjectNotFound(SubjectId),
    #[error("test set {test_set} belongs to subject {actual}, not {requested}")]
    SubjectMismatch {
        test_set: TestSetId,
        requested: SubjectId,
        actual: SubjectId,
    },
    #[error("test set {0} has no questions")]
    EmptyTestSet(TestSetId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Writing a finished attempt to the history failed.
///
/// Non-fatal: the attempt is still available in memory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistError {
    #[error("failed to record test result: {0}")]
    Storage(#[from] StorageError),
}

/// A session operation was called in a state that does not allow it.
///
/// The session is left unchanged when one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("question {index} was already answered")]
    AlreadyAnswered { index: usize },
    #[error("question {index} has not been answered yet")]
    NotAnswered { index: usize },
    #[error("session already completed")]
    Completed,
    #[error("session is still in progress")]
    NotCompleted,
    #[error(transparent)]
    Attempt(#[from] TestResultError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("cannot prepare database file: {0}")]
    Io(#[from] std::io::Error),
}
