mod ids;
mod ranking;
mod result;
mod review;
mod subject;
mod test_set;
mod word;

pub use ids::{ParseIdError, QuestionId, SubjectId, TagId, TestResultId, TestSetId, WordId};

pub use ranking::{
    QuestionRanking, QuestionStats, RankingOrder, WEAK_RATE_THRESHOLD, compute_rankings,
    sort_rankings,
};
pub use result::{AnswerRecord, NewTestResult, TestResult, TestResultError, score_percentage};
pub use review::{AttemptReview, QuestionReview};
pub use subject::{Subject, Tag};
pub use test_set::{Question, QuestionError, TestSet, TestSetError};
pub use word::{MarkFilter, Word, WordSort, filter_and_sort};
