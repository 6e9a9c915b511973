//! Persisted JSON shapes of the store collections.
//!
//! These mirror the domain types so collections can be (de)serialized without
//! leaking the camelCase wire format into the domain layer. Conversion into the
//! domain runs the domain validation, so malformed entries surface as
//! `StorageError::InvalidData` instead of failing later.

use chrono::{DateTime, Utc};
use quiz_core::model::{
    AnswerRecord, Question, QuestionId, Subject, SubjectId, Tag, TagId, TestResult,
    TestResultId, TestSet, TestSetId, Word, WordId,
};
use serde::{Deserialize, Serialize};

use crate::repository::{CollectionKey, StorageError};

fn invalid<E: Into<quiz_core::Error>>(key: CollectionKey) -> impl FnOnce(E) -> StorageError {
    move |err| StorageError::InvalidData {
        key,
        reason: err.into().to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRecord {
    pub id: SubjectId,
    pub name: String,
}

impl SubjectRecord {
    #[must_use]
    pub fn into_subject(self) -> Subject {
        Subject::new(self.id, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub id: TagId,
    pub name: String,
}

impl TagRecord {
    #[must_use]
    pub fn into_tag(self) -> Tag {
        Tag::new(self.id, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    pub id: WordId,
    pub subject_id: SubjectId,
    pub word: String,
    pub meaning: String,
    #[serde(default)]
    pub tag_ids: Vec<TagId>,
    #[serde(default)]
    pub is_marked: bool,
    pub created_at: DateTime<Utc>,
}

impl WordRecord {
    #[must_use]
    pub fn into_word(self) -> Word {
        Word::new(
            self.id,
            self.subject_id,
            self.word,
            self.meaning,
            self.tag_ids,
            self.is_marked,
            self.created_at,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub question: String,
    pub choices: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSetRecord {
    pub id: TestSetId,
    pub subject_id: SubjectId,
    pub name: String,
    pub questions: Vec<QuestionRecord>,
}

impl TestSetRecord {
    /// Convert the record back into a validated `TestSet`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidData` if a question has no choices, ids
    /// repeat, or the name is blank.
    pub fn into_test_set(self) -> Result<TestSet, StorageError> {
        let questions = self
            .questions
            .into_iter()
            .map(|q| Question::new(q.id, q.question, q.choices, q.correct_answer))
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid(CollectionKey::TestSets))?;
        TestSet::new(self.id, self.subject_id, self.name, questions)
            .map_err(invalid(CollectionKey::TestSets))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerHistoryRecord {
    pub question_id: QuestionId,
    pub user_answer: String,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResultRecord {
    pub id: TestResultId,
    pub test_set_id: TestSetId,
    pub subject_id: SubjectId,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub date: DateTime<Utc>,
    pub answer_history: Vec<AnswerHistoryRecord>,
}

impl TestResultRecord {
    #[must_use]
    pub fn from_result(result: &TestResult) -> Self {
        Self {
            id: result.id(),
            test_set_id: result.test_set_id(),
            subject_id: result.subject_id(),
            correct_answers: result.correct_answers(),
            total_questions: result.total_questions(),
            date: result.date(),
            answer_history: result
                .answer_history()
                .iter()
                .map(|a| AnswerHistoryRecord {
                    question_id: a.question_id,
                    user_answer: a.user_answer.clone(),
                    is_correct: a.is_correct,
                })
                .collect(),
        }
    }

    /// Convert the record back into a domain `TestResult`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidData` if the stored counts disagree with the
    /// answer history.
    pub fn into_result(self) -> Result<TestResult, StorageError> {
        let history = self
            .answer_history
            .into_iter()
            .map(|a| AnswerRecord::new(a.question_id, a.user_answer, a.is_correct))
            .collect();
        TestResult::from_persisted(
            self.id,
            self.test_set_id,
            self.subject_id,
            self.correct_answers,
            self.total_questions,
            self.date,
            history,
        )
        .map_err(invalid(CollectionKey::TestResults))
    }
}
