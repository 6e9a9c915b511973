//! Default sample content installed into an empty store.

use serde_json::{Value, json};
use tracing::{debug, info};

use crate::repository::{CollectionKey, CollectionStore, StorageError};

/// Sample document for a seeded collection. `IdSequences` has no default.
#[must_use]
pub fn default_collection(key: CollectionKey) -> Option<Value> {
    match key {
        CollectionKey::Subjects => Some(default_subjects()),
        CollectionKey::Words => Some(default_words()),
        CollectionKey::Tags => Some(default_tags()),
        CollectionKey::TestSets => Some(default_test_sets()),
        CollectionKey::TestResults => Some(default_test_results()),
        CollectionKey::IdSequences => None,
    }
}

/// Write the default content for every seeded key that is absent.
///
/// Keys that already hold a value are never touched, even if the value is an
/// empty array. Returns the keys that were installed.
///
/// # Errors
///
/// Returns `StorageError` if the store cannot be read or written.
pub async fn install_defaults(
    store: &dyn CollectionStore,
) -> Result<Vec<CollectionKey>, StorageError> {
    let mut installed = Vec::new();
    for key in CollectionKey::SEEDED {
        if store.get_raw(key).await?.is_some() {
            debug!(collection = %key, "collection present, skipping seed");
            continue;
        }
        let Some(value) = default_collection(key) else {
            continue;
        };
        store.set_raw(key, &value.to_string()).await?;
        installed.push(key);
    }
    if !installed.is_empty() {
        info!(count = installed.len(), "installed default collections");
    }
    Ok(installed)
}

/// Overwrite every seeded key with its default content.
///
/// # Errors
///
/// Returns `StorageError` if the store cannot be written.
pub async fn reset_defaults(store: &dyn CollectionStore) -> Result<(), StorageError> {
    for key in CollectionKey::SEEDED {
        if let Some(value) = default_collection(key) {
            store.set_raw(key, &value.to_string()).await?;
        }
    }
    info!("reset all collections to defaults");
    Ok(())
}

fn default_subjects() -> Value {
    json!([
        { "id": 1, "name": "英語" },
        { "id": 2, "name": "数学" },
        { "id": 3, "name": "理科" }
    ])
}

fn default_words() -> Value {
    json!([
        {
            "id": 1,
            "subjectId": 1,
            "word": "Apple",
            "meaning": "<p>りんご</p><p><strong>果物の一種</strong></p>",
            "tagIds": [1, 2],
            "isMarked": false,
            "createdAt": "2023-05-01T10:00:00Z"
        },
        {
            "id": 2,
            "subjectId": 1,
            "word": "Book",
            "meaning": "<p>本</p><p><em>情報を記録するための媒体</em></p>",
            "tagIds": [1],
            "isMarked": true,
            "createdAt": "2023-05-02T11:30:00Z"
        },
        {
            "id": 3,
            "subjectId": 1,
            "word": "Cat",
            "meaning": "<p>猫</p><p><u>ネコ科の動物</u></p>",
            "tagIds": [3],
            "isMarked": false,
            "createdAt": "2023-05-03T09:15:00Z"
        }
    ])
}

fn default_tags() -> Value {
    json!([
        { "id": 1, "name": "名詞" },
        { "id": 2, "name": "食べ物" },
        { "id": 3, "name": "動物" }
    ])
}

fn question(id: u64, prompt: &str, choices: [&str; 4], correct: &str) -> Value {
    json!({
        "id": id,
        "question": prompt,
        "choices": choices,
        "correctAnswer": correct
    })
}

fn default_test_sets() -> Value {
    json!([
        {
            "id": 1,
            "name": "基礎英単語テスト",
            "subjectId": 1,
            "questions": [
                question(1, "「りんご」の英語は？", ["Apple", "Banana", "Orange", "Grape"], "Apple"),
                question(2, "「犬」の英語は？", ["Cat", "Dog", "Bird", "Fish"], "Dog"),
                question(3, "「本」の英語は？", ["Pen", "Pencil", "Book", "Notebook"], "Book")
            ]
        },
        {
            "id": 2,
            "name": "中級英単語テスト",
            "subjectId": 1,
            "questions": [
                question(1, "「勤勉な」の英語は？", ["Diligent", "Lazy", "Careless", "Reckless"], "Diligent"),
                question(2, "「曖昧な」の英語は？", ["Clear", "Ambiguous", "Precise", "Exact"], "Ambiguous"),
                question(
                    3,
                    "「遺産」の英語は？",
                    ["Legacy", "Inheritance", "Heritage", "All of the above"],
                    "All of the above"
                )
            ]
        },
        {
            "id": 3,
            "name": "基礎数学テスト",
            "subjectId": 2,
            "questions": [
                question(1, "2 + 3 × 4 = ?", ["14", "20", "24", "None of the above"], "14"),
                question(2, "√16 = ?", ["2", "4", "8", "16"], "4"),
                question(3, "3の2乗は？", ["6", "8", "9", "12"], "9")
            ]
        }
    ])
}

fn answer(question_id: u64, user_answer: &str, is_correct: bool) -> Value {
    json!({
        "questionId": question_id,
        "userAnswer": user_answer,
        "isCorrect": is_correct
    })
}

fn result(id: u64, correct: u32, date: &str, history: [Value; 3]) -> Value {
    json!({
        "id": id,
        "testSetId": 1,
        "subjectId": 1,
        "correctAnswers": correct,
        "totalQuestions": 3,
        "date": date,
        "answerHistory": history
    })
}

fn default_test_results() -> Value {
    json!([
        result(1, 2, "2024-07-08T12:50:05.004Z", [
            answer(1, "Apple", true),
            answer(2, "Fish", false),
            answer(3, "Book", true)
        ]),
        result(2, 1, "2024-07-08T13:10:28.715Z", [
            answer(1, "Apple", true),
            answer(2, "Bird", false),
            answer(3, "Notebook", false)
        ]),
        result(3, 1, "2024-07-08T13:21:41.239Z", [
            answer(1, "Apple", true),
            answer(2, "Bird", false),
            answer(3, "NoteBook", false)
        ]),
        result(4, 2, "2024-07-08T14:06:48.881Z", [
            answer(1, "Apple", true),
            answer(2, "Dog", true),
            answer(3, "Notebook", false)
        ]),
        result(5, 2, "2024-07-10T15:06:38.054Z", [
            answer(1, "Apple", true),
            answer(2, "Dog", true),
            answer(3, "Notebook", false)
        ])
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{SubjectRecord, TagRecord, TestResultRecord, TestSetRecord, WordRecord};
    use crate::repository::{InMemoryStore, get_array};

    #[tokio::test]
    async fn installs_only_absent_keys() {
        let store = InMemoryStore::new();
        store.set_raw(CollectionKey::Tags, "[]").await.unwrap();

        let installed = install_defaults(&store).await.unwrap();
        assert_eq!(installed.len(), 4);
        assert!(!installed.contains(&CollectionKey::Tags));
        assert_eq!(store.get_raw(CollectionKey::Tags).await.unwrap().as_deref(), Some("[]"));

        let again = install_defaults(&store).await.unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test]
    async fn defaults_decode_into_domain_types() {
        let store = InMemoryStore::new();
        install_defaults(&store).await.unwrap();

        let subjects: Vec<SubjectRecord> = get_array(&store, CollectionKey::Subjects).await.unwrap().unwrap();
        assert_eq!(subjects.len(), 3);
        let tags: Vec<TagRecord> = get_array(&store, CollectionKey::Tags).await.unwrap().unwrap();
        assert_eq!(tags.len(), 3);
        let words: Vec<WordRecord> = get_array(&store, CollectionKey::Words).await.unwrap().unwrap();
        assert_eq!(words.len(), 3);

        let sets: Vec<TestSetRecord> = get_array(&store, CollectionKey::TestSets).await.unwrap().unwrap();
        for set in sets {
            let set = set.into_test_set().unwrap();
            assert_eq!(set.question_count(), 3);
            assert_eq!(set.unanswerable_questions().count(), 0);
        }

        let results: Vec<TestResultRecord> =
            get_array(&store, CollectionKey::TestResults).await.unwrap().unwrap();
        assert_eq!(results.len(), 5);
        for record in results {
            record.into_result().unwrap();
        }
    }

    #[tokio::test]
    async fn reset_overwrites_existing_values() {
        let store = InMemoryStore::new();
        store.set_raw(CollectionKey::TestResults, "[]").await.unwrap();
        reset_defaults(&store).await.unwrap();

        let results: Vec<Value> = get_array(&store, CollectionKey::TestResults).await.unwrap().unwrap();
        assert_eq!(results.len(), 5);
    }
}
