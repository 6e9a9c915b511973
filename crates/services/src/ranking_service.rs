use std::sync::Arc;

use quiz_core::model::{QuestionId, QuestionRanking, QuestionStats, RankingOrder, TestSet, TestSetId, sort_rankings};
use storage::repository::{TestResultRepository, TestSetRepository};
use tracing::warn;

use crate::error::LoadError;

/// Per-question correct rates of one test set, sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRanking {
    test_set: TestSet,
    order: RankingOrder,
    attempts: usize,
    rankings: Vec<QuestionRanking>,
}

impl TestRanking {
    #[must_use]
    pub fn test_set(&self) -> &TestSet {
        &self.test_set
    }

    #[must_use]
    pub fn order(&self) -> RankingOrder {
        self.order
    }

    /// Number of recorded attempts the rates are based on.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    #[must_use]
    pub fn rankings(&self) -> &[QuestionRanking] {
        &self.rankings
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&QuestionRanking> {
        self.rankings.iter().find(|r| r.id == id)
    }

    /// Questions under the weak threshold, in the current order.
    pub fn weak(&self) -> impl Iterator<Item = &QuestionRanking> {
        self.rankings.iter().filter(|r| r.is_weak())
    }

    /// Re-sort in place without reloading the history.
    pub fn resort(&mut self, order: RankingOrder) {
        sort_rankings(&mut self.rankings, order);
        self.order = order;
    }
}

/// Computes question rankings from the recorded history.
#[derive(Clone)]
pub struct RankingService {
    test_sets: Arc<dyn TestSetRepository>,
    results: Arc<dyn TestResultRepository>,
}

impl RankingService {
    #[must_use]
    pub fn new(
        test_sets: Arc<dyn TestSetRepository>,
        results: Arc<dyn TestResultRepository>,
    ) -> Self {
        Self { test_sets, results }
    }

    /// Load a test set and its history and rank its questions by correct rate.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::TestSetNotFound` if the set does not exist, or
    /// `LoadError::Storage` if the set or history cannot be read.
    pub async fn rankings(
        &self,
        test_set_id: TestSetId,
        order: RankingOrder,
    ) -> Result<TestRanking, LoadError> {
        let test_set = self
            .test_sets
            .get_test_set(test_set_id)
            .await?
            .ok_or(LoadError::TestSetNotFound(test_set_id))?;
        let results = self.results.list_results(test_set_id).await?;

        let stats = QuestionStats::tally(test_set.questions(), &results);
        if stats.ignored() > 0 {
            warn!(
                test_set_id = %test_set_id,
                ignored = stats.ignored(),
                "answer records reference questions no longer in the test set"
            );
        }
        let mut rankings = stats.rankings();
        sort_rankings(&mut rankings, order);

        Ok(TestRanking {
            attempts: results.len(),
            test_set,
            order,
            rankings,
        })
    }
}
