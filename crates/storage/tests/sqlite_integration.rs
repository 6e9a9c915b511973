use quiz_core::model::{AnswerRecord, NewTestResult, QuestionId, SubjectId, TestResultId, TestSetId};
use quiz_core::time::fixed_now;
use storage::repository::{CollectionKey, CollectionStore, Storage};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_store_round_trips_raw_values() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_raw?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo.migrate().await.expect("migrations are idempotent");

    assert!(repo.get_raw(CollectionKey::Tags).await.unwrap().is_none());

    repo.set_raw(CollectionKey::Tags, r#"[{"id":1,"name":"名詞"}]"#)
        .await
        .unwrap();
    repo.set_raw(CollectionKey::Tags, r#"[{"id":2,"name":"動物"}]"#)
        .await
        .unwrap();

    let raw = repo.get_raw(CollectionKey::Tags).await.unwrap().unwrap();
    assert_eq!(raw, r#"[{"id":2,"name":"動物"}]"#);
}

#[tokio::test]
async fn sqlite_storage_seeds_and_records_results() {
    let storage = Storage::sqlite("sqlite:file:memdb_seeded?mode=memory&cache=shared")
        .await
        .expect("open");

    let installed = storage.seed_defaults().await.unwrap();
    assert_eq!(installed.len(), 5);

    let set = storage
        .test_sets
        .get_test_set(TestSetId::new(1))
        .await
        .unwrap()
        .expect("seeded test set");
    assert_eq!(set.name(), "基礎英単語テスト");

    let attempt = NewTestResult::from_answers(
        set.id(),
        SubjectId::new(1),
        3,
        vec![
            AnswerRecord::new(QuestionId::new(1), "Apple", true),
            AnswerRecord::new(QuestionId::new(2), "Dog", true),
            AnswerRecord::new(QuestionId::new(3), "Pen", false),
        ],
        fixed_now(),
    )
    .unwrap();
    let saved = storage.test_results.append_result(&attempt).await.unwrap();
    assert_eq!(saved.id(), TestResultId::new(6));

    let history = storage.test_results.list_results(set.id()).await.unwrap();
    assert_eq!(history.len(), 6);
    assert_eq!(history.last().map(|r| r.date()), Some(fixed_now()));

    let words = storage.words.list_words(SubjectId::new(1)).await.unwrap();
    assert_eq!(words.len(), 3);
    assert!(storage.words.list_words(SubjectId::new(2)).await.unwrap().is_empty());
}
