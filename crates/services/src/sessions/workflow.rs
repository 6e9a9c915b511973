use std::sync::Arc;

use quiz_core::model::{AnswerRecord, AttemptReview, NewTestResult, SubjectId, TestResultId, TestSetId};
use storage::repository::{SubjectRepository, TestResultRepository, TestSetRepository};
use tracing::{debug, warn};

use super::recorder::ResultRecorder;
use super::service::{Advance, TestSession};
use crate::Clock;
use crate::error::{LoadError, PersistError, SessionError};

/// What the caller sees after a session reaches the end.
#[derive(Debug)]
pub struct CompletionReport {
    pub attempt: NewTestResult,
    pub review: AttemptReview,
    /// Outcome of writing the attempt to the history. A failure here does not
    /// undo the completion; retry with [`TestSessionService::retry_record`].
    pub recorded: Result<TestResultId, PersistError>,
}

/// Result of advancing past an answered question.
#[derive(Debug)]
pub enum AdvanceOutcome {
    Next { index: usize },
    Completed(CompletionReport),
}

/// Orchestrates session start, answering and result recording.
#[derive(Clone)]
pub struct TestSessionService {
    clock: Clock,
    subjects: Arc<dyn SubjectRepository>,
    test_sets: Arc<dyn TestSetRepository>,
    recorder: ResultRecorder,
}

impl TestSessionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        subjects: Arc<dyn SubjectRepository>,
        test_sets: Arc<dyn TestSetRepository>,
        results: Arc<dyn TestResultRepository>,
    ) -> Self {
        Self {
            clock,
            subjects,
            test_sets,
            recorder: ResultRecorder::new(results),
        }
    }

    /// Load a test set of the given subject and start an attempt at it.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the subject or test set is missing, malformed,
    /// belongs to another subject, or has no questions.
    pub async fn start_session(
        &self,
        subject_id: SubjectId,
        test_set_id: TestSetId,
    ) -> Result<TestSession, LoadError> {
        let subject = self
            .subjects
            .get_subject(subject_id)
            .await?
            .ok_or(LoadError::SubjectNotFound(subject_id))?;
        let test_set = self
            .test_sets
            .get_test_set(test_set_id)
            .await?
            .ok_or(LoadError::TestSetNotFound(test_set_id))?;

        if test_set.subject_id() != subject_id {
            return Err(LoadError::SubjectMismatch {
                test_set: test_set_id,
                requested: subject_id,
                actual: test_set.subject_id(),
            });
        }

        for question in test_set.unanswerable_questions() {
            warn!(
                test_set_id = %test_set_id,
                question_id = %question.id(),
                "correct answer is not among the choices"
            );
        }

        let session = TestSession::new(test_set, subject.name(), self.clock.now())?;
        debug!(?session, "session started");
        Ok(session)
    }

    /// Answer the question on screen.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the question was already answered or the
    /// session is complete.
    pub fn submit_answer(
        &self,
        session: &mut TestSession,
        choice: &str,
    ) -> Result<AnswerRecord, SessionError> {
        session.submit_answer(choice).cloned()
    }

    /// Move to the next question, or finish and record the attempt.
    ///
    /// Recording failures are reported in the [`CompletionReport`], not as an
    /// error of this call.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the question on screen has not been answered
    /// or the session is already complete.
    pub async fn advance(&self, session: &mut TestSession) -> Result<AdvanceOutcome, SessionError> {
        match session.advance(self.clock.now())? {
            Advance::Next { index } => Ok(AdvanceOutcome::Next { index }),
            Advance::Completed(attempt) => {
                let recorded = self.recorder.record(&attempt).await;
                if let Ok(id) = &recorded {
                    session.set_result_id(*id);
                }
                Ok(AdvanceOutcome::Completed(CompletionReport {
                    review: session.review(),
                    attempt,
                    recorded,
                }))
            }
        }
    }

    /// Record a completed attempt whose first write failed.
    ///
    /// Returns the existing id if the attempt was already recorded.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` while the attempt is in progress,
    /// or `Ok(Err(PersistError))` if the write fails again.
    pub async fn retry_record(
        &self,
        session: &mut TestSession,
    ) -> Result<Result<TestResultId, PersistError>, SessionError> {
        if let Some(id) = session.result_id() {
            return Ok(Ok(id));
        }
        let attempt = session.attempt().cloned().ok_or(SessionError::NotCompleted)?;
        let recorded = self.recorder.record(&attempt).await;
        if let Ok(id) = &recorded {
            session.set_result_id(*id);
        }
        Ok(recorded)
    }

    /// Start the same test set over. Recorded history is kept.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCompleted` while the attempt is in progress.
    pub fn restart(&self, session: &mut TestSession) -> Result<(), SessionError> {
        session.restart(self.clock.now())
    }
}
