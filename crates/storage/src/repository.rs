use async_trait::async_trait;
use quiz_core::model::{
    NewTestResult, Subject, SubjectId, Tag, TestResult, TestSet, TestSetId, Word,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::collections::CollectionRepository;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid {key} entry: {reason}")]
    InvalidData { key: CollectionKey, reason: String },
}

//
// ─── COLLECTION STORE ──────────────────────────────────────────────────────────
//

/// Named collections held by the store. Each value is a JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    Subjects,
    Words,
    Tags,
    TestSets,
    TestResults,
    /// Last issued id per collection (JSON object, not an array).
    IdSequences,
}

impl CollectionKey {
    /// The collections that receive default content on first start.
    pub const SEEDED: [CollectionKey; 5] = [
        CollectionKey::Subjects,
        CollectionKey::Words,
        CollectionKey::Tags,
        CollectionKey::TestSets,
        CollectionKey::TestResults,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKey::Subjects => "subjects",
            CollectionKey::Words => "words",
            CollectionKey::Tags => "tags",
            CollectionKey::TestSets => "testSets",
            CollectionKey::TestResults => "testResults",
            CollectionKey::IdSequences => "idSequences",
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw key-value backend: one JSON string per key, last write wins.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Read the stored document, `None` if the key was never written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be read.
    async fn get_raw(&self, key: CollectionKey) -> Result<Option<String>, StorageError>;

    /// Replace the stored document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backend cannot be written.
    async fn set_raw(&self, key: CollectionKey, value: &str) -> Result<(), StorageError>;
}

/// Read and decode a JSON array.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the stored value is not an array of `T`.
pub async fn get_array<T: DeserializeOwned>(
    store: &dyn CollectionStore,
    key: CollectionKey,
) -> Result<Option<Vec<T>>, StorageError> {
    let Some(raw) = store.get_raw(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StorageError::Serialization(format!("{key}: {e}")))
}

/// Encode and write a JSON array, replacing the previous value.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails, or backend errors.
pub async fn set_array<T: Serialize + Sync>(
    store: &dyn CollectionStore,
    key: CollectionKey,
    items: &[T],
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(items)
        .map_err(|e| StorageError::Serialization(format!("{key}: {e}")))?;
    store.set_raw(key, &raw).await
}

//
// ─── TYPED REPOSITORIES ────────────────────────────────────────────────────────
//

#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the collection cannot be read or decoded.
    async fn get_subject(&self, id: SubjectId) -> Result<Option<Subject>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the collection cannot be read or decoded.
    async fn list_subjects(&self) -> Result<Vec<Subject>, StorageError>;
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the collection cannot be read or decoded.
    async fn list_tags(&self) -> Result<Vec<Tag>, StorageError>;
}

#[async_trait]
pub trait WordRepository: Send + Sync {
    /// Words of one subject, in stored order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the collection cannot be read or decoded.
    async fn list_words(&self, subject_id: SubjectId) -> Result<Vec<Word>, StorageError>;
}

#[async_trait]
pub trait TestSetRepository: Send + Sync {
    /// Fetch and validate one test set.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidData` if the stored entry is malformed,
    /// or other storage errors.
    async fn get_test_set(&self, id: TestSetId) -> Result<Option<TestSet>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the collection cannot be read or decoded.
    async fn list_test_sets(&self) -> Result<Vec<TestSet>, StorageError>;
}

#[async_trait]
pub trait TestResultRepository: Send + Sync {
    /// Append a finished attempt to the history and return it with its new id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be read or written back.
    async fn append_result(&self, attempt: &NewTestResult) -> Result<TestResult, StorageError>;

    /// All recorded attempts of one test set, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be read or decoded.
    async fn list_results(&self, test_set_id: TestSetId) -> Result<Vec<TestResult>, StorageError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<HashMap<CollectionKey, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CollectionStore for InMemoryStore {
    async fn get_raw(&self, key: CollectionKey) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).cloned())
    }

    async fn set_raw(&self, key: CollectionKey, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key, value.to_owned());
        Ok(())
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Aggregates the typed repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub store: Arc<dyn CollectionStore>,
    pub subjects: Arc<dyn SubjectRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub words: Arc<dyn WordRepository>,
    pub test_sets: Arc<dyn TestSetRepository>,
    pub test_results: Arc<dyn TestResultRepository>,
}

impl Storage {
    /// Wire every repository to the same raw store.
    #[must_use]
    pub fn from_store(store: Arc<dyn CollectionStore>) -> Self {
        let repo = CollectionRepository::new(Arc::clone(&store));
        Self {
            store,
            subjects: Arc::new(repo.clone()),
            tags: Arc::new(repo.clone()),
            words: Arc::new(repo.clone()),
            test_sets: Arc::new(repo.clone()),
            test_results: Arc::new(repo),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(InMemoryStore::new()))
    }

    /// Install the default sample content for every absent collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or written.
    pub async fn seed_defaults(&self) -> Result<Vec<CollectionKey>, StorageError> {
        crate::seed::install_defaults(self.store.as_ref()).await
    }
}
