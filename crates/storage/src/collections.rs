use async_trait::async_trait;
use quiz_core::model::{
    NewTestResult, Subject, SubjectId, Tag, TestResult, TestResultId, TestSet, TestSetId, Word,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use crate::records::{SubjectRecord, TagRecord, TestResultRecord, TestSetRecord, WordRecord};
use crate::repository::{
    CollectionKey, CollectionStore, StorageError, SubjectRepository, TagRepository,
    TestResultRepository, TestSetRepository, WordRepository, get_array, set_array,
};

/// Typed repositories over a raw [`CollectionStore`].
///
/// Every call is a full read-modify-write of one collection; there is no
/// caching, so changes made by other writers are picked up on the next call.
#[derive(Clone)]
pub struct CollectionRepository {
    store: Arc<dyn CollectionStore>,
}

impl CollectionRepository {
    #[must_use]
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    async fn load<T: serde::de::DeserializeOwned>(
        &self,
        key: CollectionKey,
    ) -> Result<Vec<T>, StorageError> {
        let items = get_array(self.store.as_ref(), key).await?;
        debug!(collection = %key, present = items.is_some(), "loaded collection");
        Ok(items.unwrap_or_default())
    }

    async fn load_sequences(&self) -> Result<BTreeMap<String, u64>, StorageError> {
        let Some(raw) = self.store.get_raw(CollectionKey::IdSequences).await? else {
            return Ok(BTreeMap::new());
        };
        serde_json::from_str(&raw)
            .map_err(|e| StorageError::Serialization(format!("{}: {e}", CollectionKey::IdSequences)))
    }

    async fn save_sequences(&self, sequences: &BTreeMap<String, u64>) -> Result<(), StorageError> {
        let raw = serde_json::to_string(sequences)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set_raw(CollectionKey::IdSequences, &raw).await
    }
}

/// Largest `id` among raw entries; entries without a numeric id are skipped.
fn max_entry_id(entries: &[Value]) -> u64 {
    entries
        .iter()
        .filter_map(|entry| entry.get("id").and_then(Value::as_u64))
        .max()
        .unwrap_or(0)
}

#[async_trait]
impl SubjectRepository for CollectionRepository {
    async fn get_subject(&self, id: SubjectId) -> Result<Option<Subject>, StorageError> {
        let subjects: Vec<SubjectRecord> = self.load(CollectionKey::Subjects).await?;
        Ok(subjects
            .into_iter()
            .find(|s| s.id == id)
            .map(SubjectRecord::into_subject))
    }

    async fn list_subjects(&self) -> Result<Vec<Subject>, StorageError> {
        let subjects: Vec<SubjectRecord> = self.load(CollectionKey::Subjects).await?;
        Ok(subjects.into_iter().map(SubjectRecord::into_subject).collect())
    }
}

#[async_trait]
impl TagRepository for CollectionRepository {
    async fn list_tags(&self) -> Result<Vec<Tag>, StorageError> {
        let tags: Vec<TagRecord> = self.load(CollectionKey::Tags).await?;
        Ok(tags.into_iter().map(TagRecord::into_tag).collect())
    }
}

#[async_trait]
impl WordRepository for CollectionRepository {
    async fn list_words(&self, subject_id: SubjectId) -> Result<Vec<Word>, StorageError> {
        let words: Vec<WordRecord> = self.load(CollectionKey::Words).await?;
        Ok(words
            .into_iter()
            .filter(|w| w.subject_id == subject_id)
            .map(WordRecord::into_word)
            .collect())
    }
}

#[async_trait]
impl TestSetRepository for CollectionRepository {
    async fn get_test_set(&self, id: TestSetId) -> Result<Option<TestSet>, StorageError> {
        let sets: Vec<TestSetRecord> = self.load(CollectionKey::TestSets).await?;
        sets.into_iter()
            .find(|s| s.id == id)
            .map(TestSetRecord::into_test_set)
            .transpose()
    }

    async fn list_test_sets(&self) -> Result<Vec<TestSet>, StorageError> {
        let sets: Vec<TestSetRecord> = self.load(CollectionKey::TestSets).await?;
        sets.into_iter().map(TestSetRecord::into_test_set).collect()
    }
}

#[async_trait]
impl TestResultRepository for CollectionRepository {
    async fn append_result(&self, attempt: &NewTestResult) -> Result<TestResult, StorageError> {
        // Entries are kept as raw JSON so fields this version does not know survive the rewrite.
        let mut entries: Vec<Value> = self.load(CollectionKey::TestResults).await?;
        let mut sequences = self.load_sequences().await?;

        let seq_key = CollectionKey::TestResults.as_str();
        let last_issued = sequences
            .get(seq_key)
            .copied()
            .unwrap_or(0)
            .max(max_entry_id(&entries));
        let id = TestResultId::new(last_issued + 1);

        let result = attempt.clone().into_result(id);
        let entry = serde_json::to_value(TestResultRecord::from_result(&result))
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        entries.push(entry);

        // Sequence first: a failed history write then only burns an id.
        sequences.insert(seq_key.to_owned(), id.value());
        self.save_sequences(&sequences).await?;
        set_array(self.store.as_ref(), CollectionKey::TestResults, &entries).await?;

        debug!(result_id = %id, history_len = entries.len(), "appended test result");
        Ok(result)
    }

    async fn list_results(&self, test_set_id: TestSetId) -> Result<Vec<TestResult>, StorageError> {
        let records: Vec<TestResultRecord> = self.load(CollectionKey::TestResults).await?;
        records
            .into_iter()
            .filter(|r| r.test_set_id == test_set_id)
            .map(TestResultRecord::into_result)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryStore;
    use quiz_core::model::{AnswerRecord, QuestionId};
    use std::sync::atomic::{AtomicBool, Ordering};
    use quiz_core::time::fixed_now;

    fn repo() -> (InMemoryStore, CollectionRepository) {
        let store = InMemoryStore::new();
        let repo = CollectionRepository::new(Arc::new(store.clone()));
        (store, repo)
    }

    fn attempt(test_set: u64) -> NewTestResult {
        NewTestResult::from_answers(
            TestSetId::new(test_set),
            SubjectId::new(1),
            1,
            vec![AnswerRecord::new(QuestionId::new(1), "Apple", true)],
            fixed_now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn first_result_gets_id_one() {
        let (_store, repo) = repo();
        let saved = repo.append_result(&attempt(1)).await.unwrap();
        assert_eq!(saved.id(), TestResultId::new(1));
        assert_eq!(repo.list_results(TestSetId::new(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ids_are_not_reissued_after_a_delete() {
        let (store, repo) = repo();
        repo.append_result(&attempt(1)).await.unwrap();
        let second = repo.append_result(&attempt(1)).await.unwrap();
        assert_eq!(second.id(), TestResultId::new(2));

        // Simulate an external delete of the newest entry.
        let mut entries: Vec<Value> = get_array(&store, CollectionKey::TestResults)
            .await
            .unwrap()
            .unwrap();
        entries.pop();
        set_array(&store, CollectionKey::TestResults, &entries).await.unwrap();

        let third = repo.append_result(&attempt(1)).await.unwrap();
        assert_eq!(third.id(), TestResultId::new(3));
    }

    #[tokio::test]
    async fn ids_continue_after_existing_history_without_sequence() {
        let (store, repo) = repo();
        store
            .set_raw(
                CollectionKey::TestResults,
                r#"[{"id": 7, "testSetId": 2, "subjectId": 1, "correctAnswers": 0,
                    "totalQuestions": 1, "date": "2024-07-08T12:50:05Z", "answerHistory": [],
                    "note": "kept"}]"#,
            )
            .await
            .unwrap();

        let saved = repo.append_result(&attempt(1)).await.unwrap();
        assert_eq!(saved.id(), TestResultId::new(8));

        let raw = store.get_raw(CollectionKey::TestResults).await.unwrap().unwrap();
        assert!(raw.contains("\"note\":\"kept\""));
    }

    /// Fails writes to one key while `failing` is set.
    #[derive(Clone)]
    struct FailingWrites {
        inner: InMemoryStore,
        key: CollectionKey,
        failing: Arc<AtomicBool>,
    }

    #[async_trait]
    impl CollectionStore for FailingWrites {
        async fn get_raw(&self, key: CollectionKey) -> Result<Option<String>, StorageError> {
            self.inner.get_raw(key).await
        }

        async fn set_raw(&self, key: CollectionKey, value: &str) -> Result<(), StorageError> {
            if key == self.key && self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::Connection("disk full".into()));
            }
            self.inner.set_raw(key, value).await
        }
    }

    fn failing_repo(key: CollectionKey) -> (FailingWrites, CollectionRepository) {
        let store = FailingWrites {
            inner: InMemoryStore::new(),
            key,
            failing: Arc::new(AtomicBool::new(true)),
        };
        let repo = CollectionRepository::new(Arc::new(store.clone()));
        (store, repo)
    }

    #[tokio::test]
    async fn failed_sequence_write_leaves_history_untouched() {
        let (store, repo) = failing_repo(CollectionKey::IdSequences);

        let err = repo.append_result(&attempt(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));
        assert!(store.inner.get_raw(CollectionKey::TestResults).await.unwrap().is_none());

        store.failing.store(false, Ordering::SeqCst);
        let saved = repo.append_result(&attempt(1)).await.unwrap();
        assert_eq!(saved.id(), TestResultId::new(1));
        assert_eq!(repo.list_results(TestSetId::new(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_history_write_skips_the_id() {
        let (store, repo) = failing_repo(CollectionKey::TestResults);

        repo.append_result(&attempt(1)).await.unwrap_err();
        assert!(repo.list_results(TestSetId::new(1)).await.unwrap().is_empty());

        store.failing.store(false, Ordering::SeqCst);
        let saved = repo.append_result(&attempt(1)).await.unwrap();
        assert_eq!(saved.id(), TestResultId::new(2));
        let ids: Vec<u64> = repo
            .list_results(TestSetId::new(1))
            .await
            .unwrap()
            .iter()
            .map(|r| r.id().value())
            .collect();
        assert_eq!(ids, vec![2]);
    }

    #[tokio::test]
    async fn list_results_filters_by_test_set() {
        let (_store, repo) = repo();
        repo.append_result(&attempt(1)).await.unwrap();
        repo.append_result(&attempt(2)).await.unwrap();
        repo.append_result(&attempt(1)).await.unwrap();

        let results = repo.list_results(TestSetId::new(1)).await.unwrap();
        let ids: Vec<u64> = results.iter().map(|r| r.id().value()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn missing_test_set_is_none() {
        let (_store, repo) = repo();
        assert!(repo.get_test_set(TestSetId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_test_set_is_invalid_data() {
        let (store, repo) = repo();
        store
            .set_raw(
                CollectionKey::TestSets,
                r#"[{"id": 1, "subjectId": 1, "name": "x",
                    "questions": [{"id": 1, "question": "?", "choices": [], "correctAnswer": "a"}]}]"#,
            )
            .await
            .unwrap();

        let err = repo.get_test_set(TestSetId::new(1)).await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidData { .. }));
    }
}
