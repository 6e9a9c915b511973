use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{QuestionId, SubjectId, TestSetId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {0} has no choices")]
    NoChoices(QuestionId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestSetError {
    #[error("test set name cannot be empty")]
    EmptyName,

    #[error("question id {0} appears more than once")]
    DuplicateQuestionId(QuestionId),

    #[error(transparent)]
    Question(#[from] QuestionError),
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question.
///
/// `correct_answer` is expected to match exactly one of `choices`. This is not
/// enforced: a question whose answer is missing from its choices loads fine but
/// can never be answered correctly (see [`Question::is_answerable`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    choices: Vec<String>,
    correct_answer: String,
}

impl Question {
    /// Build a question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::NoChoices` if `choices` is empty.
    pub fn new(
        id: QuestionId,
        prompt: impl Into<String>,
        choices: Vec<String>,
        correct_answer: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        if choices.is_empty() {
            return Err(QuestionError::NoChoices(id));
        }
        Ok(Self {
            id,
            prompt: prompt.into(),
            choices,
            correct_answer: correct_answer.into(),
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    /// Exact, case-sensitive comparison against the correct answer.
    #[must_use]
    pub fn is_correct(&self, choice: &str) -> bool {
        choice == self.correct_answer
    }

    /// Returns true when the correct answer is one of the offered choices.
    #[must_use]
    pub fn is_answerable(&self) -> bool {
        self.choices.iter().any(|c| c == &self.correct_answer)
    }
}

//
// ─── TEST SET ──────────────────────────────────────────────────────────────────
//

/// An ordered list of questions belonging to a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSet {
    id: TestSetId,
    subject_id: SubjectId,
    name: String,
    questions: Vec<Question>,
}

impl TestSet {
    /// Build a test set, preserving question order.
    ///
    /// # Errors
    ///
    /// Returns `TestSetError::EmptyName` for a blank name and
    /// `TestSetError::DuplicateQuestionId` when two questions share an id
    /// (per-question statistics are keyed by id).
    pub fn new(
        id: TestSetId,
        subject_id: SubjectId,
        name: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, TestSetError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TestSetError::EmptyName);
        }

        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id()) {
                return Err(TestSetError::DuplicateQuestionId(question.id()));
            }
        }

        Ok(Self {
            id,
            subject_id,
            name,
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> TestSetId {
        self.id
    }

    #[must_use]
    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Questions whose correct answer is not among their choices.
    pub fn unanswerable_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().filter(|q| !q.is_answerable())
    }
}
