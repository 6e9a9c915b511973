use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{
    AnswerRecord, AttemptReview, NewTestResult, Question, TestResultError, TestResultId, TestSet,
};

use super::progress::SessionProgress;
use crate::error::{LoadError, SessionError};

//
// ─── STATES ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq)]
enum SessionPhase {
    InProgress { current: usize },
    Completed { attempt: NewTestResult },
}

/// What `advance` moved the session to.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Now awaiting an answer for the question at `index`.
    Next { index: usize },
    /// The last question was passed; the finished attempt is ready to record.
    Completed(NewTestResult),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at a test set.
///
/// Questions are presented in test-set order. Each question takes exactly one
/// answer, then `advance` moves on; after the last question the session is
/// complete and holds the finished attempt. Nothing is persisted here.
pub struct TestSession {
    test_set: TestSet,
    subject_name: String,
    phase: SessionPhase,
    answers: Vec<AnswerRecord>,
    correct_count: u32,
    started_at: DateTime<Utc>,
    result_id: Option<TestResultId>,
}

impl TestSession {
    /// Start an attempt at the first question.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::EmptyTestSet` if the test set has no questions.
    pub fn new(
        test_set: TestSet,
        subject_name: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, LoadError> {
        if test_set.is_empty() {
            return Err(LoadError::EmptyTestSet(test_set.id()));
        }
        let capacity = test_set.question_count();
        Ok(Self {
            test_set,
            subject_name: subject_name.into(),
            phase: SessionPhase::InProgress { current: 0 },
            answers: Vec::with_capacity(capacity),
            correct_count: 0,
            started_at,
            result_id: None,
        })
    }

    #[must_use]
    pub fn test_set(&self) -> &TestSet {
        &self.test_set
    }

    #[must_use]
    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.test_set.question_count()
    }

    /// Index of the question on screen, `None` once complete.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            SessionPhase::InProgress { current } => Some(current),
            SessionPhase::Completed { .. } => None,
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_index().and_then(|i| self.test_set.question(i))
    }

    /// The answer given to the question on screen, if any.
    #[must_use]
    pub fn current_answer(&self) -> Option<&AnswerRecord> {
        self.current_index().and_then(|i| self.answers.get(i))
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.phase, SessionPhase::Completed { .. })
    }

    /// The finished attempt, once complete.
    #[must_use]
    pub fn attempt(&self) -> Option<&NewTestResult> {
        match &self.phase {
            SessionPhase::Completed { attempt } => Some(attempt),
            SessionPhase::InProgress { .. } => None,
        }
    }

    /// History id of the finished attempt, once it has been recorded.
    #[must_use]
    pub fn result_id(&self) -> Option<TestResultId> {
        self.result_id
    }

    pub(crate) fn set_result_id(&mut self, id: TestResultId) {
        self.result_id = Some(id);
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.total_questions();
        SessionProgress {
            position: self.current_index().map_or(total, |i| i + 1),
            total,
            answered: self.answers.len(),
            correct: self.correct_count,
            is_complete: self.is_complete(),
        }
    }

    /// Question-by-question comparison of the answers given so far.
    #[must_use]
    pub fn review(&self) -> AttemptReview {
        AttemptReview::build(self.test_set.questions(), &self.answers)
    }

    /// Answer the question on screen.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyAnswered` if this question already has an
    /// answer and `SessionError::Completed` after the last question.
    pub fn submit_answer(&mut self, choice: &str) -> Result<&AnswerRecord, SessionError> {
        let SessionPhase::InProgress { current } = self.phase else {
            return Err(SessionError::Completed);
        };
        if self.answers.len() > current {
            return Err(SessionError::AlreadyAnswered { index: current });
        }
        let question = self
            .test_set
            .question(current)
            .ok_or(SessionError::Completed)?;

        let is_correct = question.is_correct(choice);
        self.answers
            .push(AnswerRecord::new(question.id(), choice, is_correct));
        if is_correct {
            self.correct_count += 1;
        }

        self.answers.last().ok_or(SessionError::Completed)
    }

    /// Move past the answered question. After the last question the session
    /// completes with the attempt dated `now`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAnswered` if the question on screen has no
    /// answer yet and `SessionError::Completed` if already complete.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<Advance, SessionError> {
        let SessionPhase::InProgress { current } = self.phase else {
            return Err(SessionError::Completed);
        };
        if self.answers.len() <= current {
            return Err(SessionError::NotAnswered { index: current });
        }

        let next = current + 1;
        if next < self.total_questions() {
            self.phase = SessionPhase::InProgress { current: next };
            return Ok(Advance::Next { index: next });
        }

        let total = u32::try_from(self.total_questions()).map_err(|_| {
            TestResultError::TooManyAnswers {
                len: self.total_questions(),
            }
        })?;
        let attempt = NewTestResult::from_answers(
            self.test_set.id(),
            self.test_set.subject_id(),
            total,
            self.answers.clone(),
            now,
        )?;
        self.phase = SessionPhase::Completed {
            attempt: attempt.clone(),
        };
        Ok(Advance::Completed(attempt))
    }

    /// Start over from the first question. Recorded history is not touched.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` while the attempt is in progress.
    pub fn restart(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if !self.is_complete() {
            return Err(SessionError::NotCompleted);
        }
        self.phase = SessionPhase::InProgress { current: 0 };
        self.answers.clear();
        self.correct_count = 0;
        self.started_at = now;
        self.result_id = None;
        Ok(())
    }
}

impl fmt::Debug for TestSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSession")
            .field("test_set_id", &self.test_set.id())
            .field("questions_len", &self.test_set.question_count())
            .field("current", &self.current_index())
            .field("answers_len", &self.answers.len())
            .field("correct_count", &self.correct_count)
            .field("result_id", &self.result_id)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
