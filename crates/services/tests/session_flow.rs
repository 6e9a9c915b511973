use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use quiz_core::model::{QuestionId, RankingOrder, SubjectId, TestResultId, TestSetId};
use quiz_core::time::{fixed_clock, fixed_now};
use services::{AdvanceOutcome, AppServices, Clock, LoadError, PersistError, SessionError};
use storage::repository::{CollectionKey, CollectionStore, InMemoryStore, Storage, StorageError};

/// Store whose writes to one collection fail while `failing` is set.
#[derive(Clone)]
struct FlakyStore {
    inner: InMemoryStore,
    key: CollectionKey,
    failing: Arc<AtomicBool>,
}

impl FlakyStore {
    fn failing_on(key: CollectionKey) -> Self {
        Self {
            inner: InMemoryStore::new(),
            key,
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl CollectionStore for FlakyStore {
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

async fn flaky_services(key: CollectionKey) -> (FlakyStore, Storage, AppServices) {
    let store = FlakyStore::failing_on(key);
    let storage = Storage::from_store(Arc::new(store.clone()));
    let services = AppServices::from_storage(storage.clone(), Clock::fixed(fixed_now()))
        .await
        .unwrap();
    (store, storage, services)
}

async fn history_ids(storage: &Storage) -> Vec<u64> {
    storage
        .test_results
        .list_results(TestSetId::new(1))
        .await
        .unwrap()
        .iter()
        .map(|r| r.id().value())
        .collect()
}

async fn seeded_services() -> (Storage, AppServices) {
    let storage = Storage::in_memory();
    let services = AppServices::from_storage(storage.clone(), fixed_clock())
        .await
        .expect("services");
    (storage, services)
}

#[tokio::test]
async fn full_attempt_is_recorded_with_next_id() {
    let (storage, services) = seeded_services().await;
    let sessions = services.sessions();

    let mut session = sessions
        .start_session(SubjectId::new(1), TestSetId::new(1))
        .await
        .unwrap();
    assert_eq!(session.subject_name(), "英語");
    assert_eq!(session.total_questions(), 3);

    let mut outcome = None;
    for choice in ["Apple", "Fish", "Book"] {
        sessions.submit_answer(&mut session, choice).unwrap();
        outcome = Some(sessions.advance(&mut session).await.unwrap());
    }

    let Some(AdvanceOutcome::Completed(report)) = outcome else {
        panic!("expected completion");
    };
    assert_eq!(report.attempt.correct_answers(), 2);
    assert_eq!(report.attempt.total_questions(), 3);
    assert_eq!(report.attempt.date(), fixed_now());
    assert_eq!(report.recorded.as_ref().ok(), Some(&TestResultId::new(6)));
    assert_eq!(report.review.mistakes().count(), 1);
    assert_eq!(session.result_id(), Some(TestResultId::new(6)));

    let history = storage.test_results.list_results(TestSetId::new(1)).await.unwrap();
    assert_eq!(history.len(), 6);
    let saved = history.last().unwrap();
    assert_eq!(saved.id(), TestResultId::new(6));
    assert!((saved.percentage() - 200.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn seeded_history_ranks_weakest_question_first() {
    let (_storage, services) = seeded_services().await;

    let ranking = services
        .rankings()
        .rankings(TestSetId::new(1), RankingOrder::Ascending)
        .await
        .unwrap();

    let rows: Vec<(u64, String)> = ranking
        .rankings()
        .iter()
        .map(|r| (r.id.value(), r.display_rate()))
        .collect();
    assert_eq!(
        rows,
        vec![
            (3, "20.0".to_owned()),
            (2, "40.0".to_owned()),
            (1, "100.0".to_owned()),
        ]
    );
    let weak: Vec<QuestionId> = ranking.weak().map(|r| r.id).collect();
    assert_eq!(weak, vec![QuestionId::new(3)]);
}

#[tokio::test]
async fn restart_starts_over_and_keeps_history() {
    let (storage, services) = seeded_services().await;
    let sessions = services.sessions();
    let mut session = sessions
        .start_session(SubjectId::new(1), TestSetId::new(1))
        .await
        .unwrap();

    assert_eq!(sessions.restart(&mut session).unwrap_err(), SessionError::NotCompleted);

    while !session.is_complete() {
        sessions.submit_answer(&mut session, "Apple").unwrap();
        sessions.advance(&mut session).await.unwrap();
    }
    let recorded = storage.test_results.list_results(TestSetId::new(1)).await.unwrap();
    let before = recorded.last().cloned().expect("recorded attempt");
    assert_eq!(before.id(), TestResultId::new(6));

    sessions.restart(&mut session).unwrap();

    assert_eq!(session.current_index(), Some(0));
    assert_eq!(session.correct_count(), 0);
    assert!(session.answers().is_empty());
    assert!(session.result_id().is_none());

    let history = storage.test_results.list_results(TestSetId::new(1)).await.unwrap();
    assert_eq!(history.len(), 6);
    let after = history.last().expect("recorded attempt");
    assert_eq!(after.id(), before.id());
    assert_eq!(after.correct_answers(), before.correct_answers());
    assert_eq!(after.answer_history(), before.answer_history());
    assert_eq!(after, &before);
}

#[tokio::test]
async fn double_submit_leaves_history_unchanged() {
    let (_storage, services) = seeded_services().await;
    let sessions = services.sessions();
    let mut session = sessions
        .start_session(SubjectId::new(1), TestSetId::new(1))
        .await
        .unwrap();

    sessions.submit_answer(&mut session, "Banana").unwrap();
    let err = sessions.submit_answer(&mut session, "Apple").unwrap_err();
    assert_eq!(err, SessionError::AlreadyAnswered { index: 0 });
    assert_eq!(session.answers().len(), 1);
    assert_eq!(session.correct_count(), 0);
}

#[tokio::test]
async fn persist_failure_keeps_attempt_and_can_be_retried() {
    let (store, storage, services) = flaky_services(CollectionKey::TestResults).await;
    let sessions = services.sessions();

    let mut session = sessions
        .start_session(SubjectId::new(1), TestSetId::new(1))
        .await
        .unwrap();
    store.set_failing(true);

    let mut outcome = None;
    for choice in ["Apple", "Dog", "Book"] {
        sessions.submit_answer(&mut session, choice).unwrap();
        outcome = Some(sessions.advance(&mut session).await.unwrap());
    }

    let Some(AdvanceOutcome::Completed(report)) = outcome else {
        panic!("expected completion");
    };
    assert!(matches!(
        report.recorded,
        Err(PersistError::Storage(StorageError::Connection(_)))
    ));
    assert_eq!(report.attempt.correct_answers(), 3);
    assert!(session.is_complete());
    assert!(session.result_id().is_none());
    assert_eq!(history_ids(&storage).await, vec![1, 2, 3, 4, 5]);

    // The failed write burned id 6.
    store.set_failing(false);
    let retried = sessions.retry_record(&mut session).await.unwrap();
    assert_eq!(retried.ok(), Some(TestResultId::new(7)));
    assert_eq!(session.result_id(), Some(TestResultId::new(7)));

    let again = sessions.retry_record(&mut session).await.unwrap();
    assert_eq!(again.ok(), Some(TestResultId::new(7)));
    assert_eq!(history_ids(&storage).await, vec![1, 2, 3, 4, 5, 7]);
}

#[tokio::test]
async fn failed_sequence_write_does_not_record_twice_on_retry() {
    let (store, storage, services) = flaky_services(CollectionKey::IdSequences).await;
    let sessions = services.sessions();

    let mut session = sessions
        .start_session(SubjectId::new(1), TestSetId::new(1))
        .await
        .unwrap();
    store.set_failing(true);

    let mut outcome = None;
    for choice in ["Apple", "Fish", "Book"] {
        sessions.submit_answer(&mut session, choice).unwrap();
        outcome = Some(sessions.advance(&mut session).await.unwrap());
    }
    let Some(AdvanceOutcome::Completed(report)) = outcome else {
        panic!("expected completion");
    };
    assert!(report.recorded.is_err());
    assert_eq!(history_ids(&storage).await, vec![1, 2, 3, 4, 5]);

    store.set_failing(false);
    let retried = sessions.retry_record(&mut session).await.unwrap();
    assert_eq!(retried.ok(), Some(TestResultId::new(6)));
    assert_eq!(history_ids(&storage).await, vec![1, 2, 3, 4, 5, 6]);

    let ranking = services
        .rankings()
        .rankings(TestSetId::new(1), RankingOrder::Ascending)
        .await
        .unwrap();
    assert_eq!(ranking.attempts(), 6);
}

#[tokio::test]
async fn retry_before_completion_is_rejected() {
    let (_storage, services) = seeded_services().await;
    let sessions = services.sessions();
    let mut session = sessions
        .start_session(SubjectId::new(1), TestSetId::new(1))
        .await
        .unwrap();

    let err = sessions.retry_record(&mut session).await.unwrap_err();
    assert_eq!(err, SessionError::NotCompleted);
}

#[tokio::test]
async fn missing_or_mismatched_entries_fail_to_start() {
    let (storage, services) = seeded_services().await;
    let sessions = services.sessions();

    let err = sessions
        .start_session(SubjectId::new(9), TestSetId::new(1))
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::SubjectNotFound(id) if id == SubjectId::new(9)));

    let err = sessions
        .start_session(SubjectId::new(1), TestSetId::new(9))
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::TestSetNotFound(id) if id == TestSetId::new(9)));

    let err = sessions
        .start_session(SubjectId::new(2), TestSetId::new(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LoadError::SubjectMismatch { actual, .. } if actual == SubjectId::new(1)
    ));

    storage
        .store
        .set_raw(CollectionKey::TestSets, "not json")
        .await
        .unwrap();
    let err = sessions
        .start_session(SubjectId::new(1), TestSetId::new(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LoadError::Storage(StorageError::Serialization(_))
    ));
}

#[tokio::test]
async fn empty_test_set_fails_to_start() {
    let (storage, services) = seeded_services().await;
    storage
        .store
        .set_raw(
            CollectionKey::TestSets,
            r#"[{"id":4,"subjectId":3,"name":"空のテスト","questions":[]}]"#,
        )
        .await
        .unwrap();

    let err = services
        .sessions()
        .start_session(SubjectId::new(3), TestSetId::new(4))
        .await
        .unwrap_err();
    assert!(matches!(err, LoadError::EmptyTestSet(id) if id == TestSetId::new(4)));
}
