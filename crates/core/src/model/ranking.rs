use std::collections::HashMap;

use crate::model::ids::QuestionId;
use crate::model::result::TestResult;
use crate::model::test_set::Question;

/// Questions below this correct rate (percent) are considered weak.
pub const WEAK_RATE_THRESHOLD: f64 = 30.0;

/// Historical accuracy of one question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionRanking {
    pub id: QuestionId,
    pub question: String,
    /// Percentage in `[0, 100]`. `0` also when the question was never answered.
    pub correct_rate: f64,
}

impl QuestionRanking {
    #[must_use]
    pub fn is_weak(&self) -> bool {
        self.correct_rate < WEAK_RATE_THRESHOLD
    }

    /// Rate with one decimal, e.g. `33.3`.
    #[must_use]
    pub fn display_rate(&self) -> String {
        format!("{:.1}", self.correct_rate)
    }
}

/// Sort direction for rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankingOrder {
    /// Lowest correct rate first.
    #[default]
    Ascending,
    Descending,
}

impl RankingOrder {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            RankingOrder::Ascending => RankingOrder::Descending,
            RankingOrder::Descending => RankingOrder::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    correct: u32,
    total: u32,
}

/// Per-question answer counts over a set of recorded attempts.
#[derive(Debug, Clone)]
pub struct QuestionStats<'q> {
    questions: &'q [Question],
    tallies: HashMap<QuestionId, Tally>,
    ignored: usize,
}

impl<'q> QuestionStats<'q> {
    /// Count answers per question.
    ///
    /// Every result passed in is counted; callers select the results that belong
    /// to the test set. Answers for question ids not in `questions` (edited or
    /// removed questions) are skipped and reported by [`QuestionStats::ignored`].
    #[must_use]
    pub fn tally(questions: &'q [Question], results: &[TestResult]) -> Self {
        let mut tallies: HashMap<QuestionId, Tally> = questions
            .iter()
            .map(|q| (q.id(), Tally::default()))
            .collect();
        let mut ignored = 0;

        for answer in results.iter().flat_map(TestResult::answer_history) {
            match tallies.get_mut(&answer.question_id) {
                Some(tally) => {
                    tally.total = tally.total.saturating_add(1);
                    if answer.is_correct {
                        tally.correct = tally.correct.saturating_add(1);
                    }
                }
                None => ignored += 1,
            }
        }

        Self {
            questions,
            tallies,
            ignored,
        }
    }

    /// Number of answer records that referenced unknown questions.
    #[must_use]
    pub fn ignored(&self) -> usize {
        self.ignored
    }

    /// `(correct, total)` for a question, if it belongs to the set.
    #[must_use]
    pub fn counts(&self, id: QuestionId) -> Option<(u32, u32)> {
        self.tallies.get(&id).map(|t| (t.correct, t.total))
    }

    /// One ranking per question, in question order.
    #[must_use]
    pub fn rankings(&self) -> Vec<QuestionRanking> {
        self.questions
            .iter()
            .map(|q| {
                let tally = self.tallies.get(&q.id()).copied().unwrap_or_default();
                let correct_rate = if tally.total > 0 {
                    f64::from(tally.correct) / f64::from(tally.total) * 100.0
                } else {
                    0.0
                };
                QuestionRanking {
                    id: q.id(),
                    question: q.prompt().to_owned(),
                    correct_rate,
                }
            })
            .collect()
    }
}

/// Historical correct rate per question, in question order.
#[must_use]
pub fn compute_rankings(questions: &[Question], results: &[TestResult]) -> Vec<QuestionRanking> {
    QuestionStats::tally(questions, results).rankings()
}

/// Stable sort by correct rate; ties keep their current order.
pub fn sort_rankings(rankings: &mut [QuestionRanking], order: RankingOrder) {
    match order {
        RankingOrder::Ascending => {
            rankings.sort_by(|a, b| a.correct_rate.total_cmp(&b.correct_rate));
        }
        RankingOrder::Descending => {
            rankings.sort_by(|a, b| b.correct_rate.total_cmp(&a.correct_rate));
        }
    }
}
