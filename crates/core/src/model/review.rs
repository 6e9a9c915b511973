use crate::model::ids::QuestionId;
use crate::model::result::AnswerRecord;
use crate::model::test_set::Question;

/// One row of the end-of-attempt review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionReview {
    /// 1-based position in the test set.
    pub number: usize,
    pub question_id: QuestionId,
    pub prompt: String,
    pub correct_answer: String,
    /// `None` when the attempt has no answer for this question.
    pub user_answer: Option<String>,
    pub is_correct: Option<bool>,
}

/// Question-by-question comparison of an attempt against the answer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReview {
    pub items: Vec<QuestionReview>,
}

impl AttemptReview {
    /// Pair each question with the answer recorded for its id.
    #[must_use]
    pub fn build(questions: &[Question], answers: &[AnswerRecord]) -> Self {
        let items = questions
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let answer = answers.iter().find(|a| a.question_id == question.id());
                QuestionReview {
                    number: index + 1,
                    question_id: question.id(),
                    prompt: question.prompt().to_owned(),
                    correct_answer: question.correct_answer().to_owned(),
                    user_answer: answer.map(|a| a.user_answer.clone()),
                    is_correct: answer.map(|a| a.is_correct),
                }
            })
            .collect();
        Self { items }
    }

    /// Questions answered incorrectly, in order.
    pub fn mistakes(&self) -> impl Iterator<Item = &QuestionReview> {
        self.items.iter().filter(|item| item.is_correct == Some(false))
    }
}
