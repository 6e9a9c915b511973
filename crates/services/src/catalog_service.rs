use std::sync::Arc;

use quiz_core::model::{MarkFilter, Subject, SubjectId, Tag, TestSetId, Word, WordSort, filter_and_sort};
use storage::repository::{SubjectRepository, TagRepository, TestSetRepository, WordRepository};

use crate::error::LoadError;

/// One entry of the test list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSetSummary {
    pub id: TestSetId,
    pub name: String,
    pub question_count: usize,
}

/// A subject with the test sets that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectCatalog {
    pub subject: Subject,
    pub test_sets: Vec<TestSetSummary>,
}

/// Read-only listings of subjects, tags, test sets and flashcard words.
#[derive(Clone)]
pub struct CatalogService {
    subjects: Arc<dyn SubjectRepository>,
    tags: Arc<dyn TagRepository>,
    words: Arc<dyn WordRepository>,
    test_sets: Arc<dyn TestSetRepository>,
}

impl CatalogService {
    #[must_use]
    pub fn new(
        subjects: Arc<dyn SubjectRepository>,
        tags: Arc<dyn TagRepository>,
        words: Arc<dyn WordRepository>,
        test_sets: Arc<dyn TestSetRepository>,
    ) -> Self {
        Self {
            subjects,
            tags,
            words,
            test_sets,
        }
    }

    /// # Errors
    ///
    /// Returns `LoadError::Storage` if the collection cannot be read.
    pub async fn subjects(&self) -> Result<Vec<Subject>, LoadError> {
        Ok(self.subjects.list_subjects().await?)
    }

    /// # Errors
    ///
    /// Returns `LoadError::Storage` if the collection cannot be read.
    pub async fn tags(&self) -> Result<Vec<Tag>, LoadError> {
        Ok(self.tags.list_tags().await?)
    }

    /// Test sets of one subject, in stored order.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::SubjectNotFound` for an unknown subject, or
    /// `LoadError::Storage` if a collection cannot be read.
    pub async fn test_sets_for_subject(
        &self,
        subject_id: SubjectId,
    ) -> Result<SubjectCatalog, LoadError> {
        let subject = self
            .subjects
            .get_subject(subject_id)
            .await?
            .ok_or(LoadError::SubjectNotFound(subject_id))?;

        let test_sets = self
            .test_sets
            .list_test_sets()
            .await?
            .into_iter()
            .filter(|set| set.subject_id() == subject_id)
            .map(|set| TestSetSummary {
                id: set.id(),
                name: set.name().to_owned(),
                question_count: set.question_count(),
            })
            .collect();

        Ok(SubjectCatalog { subject, test_sets })
    }

    /// Flashcard words of one subject, filtered and sorted.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Storage` if the collection cannot be read.
    pub async fn words_for_subject(
        &self,
        subject_id: SubjectId,
        filter: MarkFilter,
        sort: WordSort,
    ) -> Result<Vec<Word>, LoadError> {
        let words = self.words.list_words(subject_id).await?;
        Ok(filter_and_sort(&words, filter, sort))
    }
}
