use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{QuestionId, SubjectId, TestResultId, TestSetId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestResultError {
    #[error("correct answers ({correct}) does not match answer history ({counted})")]
    CountMismatch { correct: u32, counted: u32 },

    #[error("correct answers ({correct}) exceeds total questions ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },

    #[error("too many answers for a single attempt: {len}")]
    TooManyAnswers { len: usize },
}

//
// ─── ANSWER RECORD ─────────────────────────────────────────────────────────────
//

/// The answer given to one question during one attempt.
///
/// `is_correct` is decided once, when the answer is submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    pub user_answer: String,
    pub is_correct: bool,
}

impl AnswerRecord {
    #[must_use]
    pub fn new(question_id: QuestionId, user_answer: impl Into<String>, is_correct: bool) -> Self {
        Self {
            question_id,
            user_answer: user_answer.into(),
            is_correct,
        }
    }
}

fn count_correct(history: &[AnswerRecord]) -> Result<u32, TestResultError> {
    let counted = history.iter().filter(|a| a.is_correct).count();
    u32::try_from(counted).map_err(|_| TestResultError::TooManyAnswers { len: history.len() })
}

/// Percentage of correct answers, `0.0` for an empty attempt.
#[must_use]
pub fn score_percentage(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(correct) / f64::from(total) * 100.0
}

//
// ─── NEW (UNSAVED) RESULT ──────────────────────────────────────────────────────
//

/// A finished attempt that has not been assigned a history id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTestResult {
    test_set_id: TestSetId,
    subject_id: SubjectId,
    correct_answers: u32,
    total_questions: u32,
    date: DateTime<Utc>,
    answer_history: Vec<AnswerRecord>,
}

impl NewTestResult {
    /// Build an attempt from its answers; the correct count is derived from them.
    ///
    /// # Errors
    ///
    /// Returns `TestResultError::TooManyAnswers` if the history cannot be counted in `u32`.
    pub fn from_answers(
        test_set_id: TestSetId,
        subject_id: SubjectId,
        total_questions: u32,
        answer_history: Vec<AnswerRecord>,
        date: DateTime<Utc>,
    ) -> Result<Self, TestResultError> {
        let correct_answers = count_correct(&answer_history)?;
        if correct_answers > total_questions {
            return Err(TestResultError::CorrectExceedsTotal {
                correct: correct_answers,
                total: total_questions,
            });
        }
        Ok(Self {
            test_set_id,
            subject_id,
            correct_answers,
            total_questions,
            date,
            answer_history,
        })
    }

    /// Attach a history id.
    #[must_use]
    pub fn into_result(self, id: TestResultId) -> TestResult {
        TestResult { id, inner: self }
    }

    #[must_use]
    pub fn test_set_id(&self) -> TestSetId {
        self.test_set_id
    }

    #[must_use]
    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[must_use]
    pub fn answer_history(&self) -> &[AnswerRecord] {
        &self.answer_history
    }

    #[must_use]
    pub fn percentage(&self) -> f64 {
        score_percentage(self.correct_answers, self.total_questions)
    }
}

//
// ─── PERSISTED RESULT ──────────────────────────────────────────────────────────
//

/// A recorded attempt. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    id: TestResultId,
    inner: NewTestResult,
}

impl TestResult {
    /// Rehydrate a recorded attempt from storage.
    ///
    /// # Errors
    ///
    /// Returns `TestResultError::CountMismatch` if `correct_answers` disagrees with
    /// the answer history, or `TestResultError::CorrectExceedsTotal`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: TestResultId,
        test_set_id: TestSetId,
        subject_id: SubjectId,
        correct_answers: u32,
        total_questions: u32,
        date: DateTime<Utc>,
        answer_history: Vec<AnswerRecord>,
    ) -> Result<Self, TestResultError> {
        let counted = count_correct(&answer_history)?;
        if counted != correct_answers {
            return Err(TestResultError::CountMismatch {
                correct: correct_answers,
                counted,
            });
        }
        let inner = NewTestResult::from_answers(
            test_set_id,
            subject_id,
            total_questions,
            answer_history,
            date,
        )?;
        Ok(inner.into_result(id))
    }

    #[must_use]
    pub fn id(&self) -> TestResultId {
        self.id
    }

    #[must_use]
    pub fn test_set_id(&self) -> TestSetId {
        self.inner.test_set_id
    }

    #[must_use]
    pub fn subject_id(&self) -> SubjectId {
        self.inner.subject_id
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.inner.correct_answers
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.inner.total_questions
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.inner.date
    }

    #[must_use]
    pub fn answer_history(&self) -> &[AnswerRecord] {
        &self.inner.answer_history
    }

    #[must_use]
    pub fn percentage(&self) -> f64 {
        self.inner.percentage()
    }
}
