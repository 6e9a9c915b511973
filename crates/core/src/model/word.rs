use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::model::ids::{SubjectId, TagId, WordId};

/// A vocabulary card. `meaning` holds rich-text HTML as authored in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    id: WordId,
    subject_id: SubjectId,
    word: String,
    meaning: String,
    tag_ids: Vec<TagId>,
    is_marked: bool,
    created_at: DateTime<Utc>,
}

impl Word {
    #[must_use]
    pub fn new(
        id: WordId,
        subject_id: SubjectId,
        word: impl Into<String>,
        meaning: impl Into<String>,
        tag_ids: Vec<TagId>,
        is_marked: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            subject_id,
            word: word.into(),
            meaning: meaning.into(),
            tag_ids,
            is_marked,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> WordId {
        self.id
    }

    #[must_use]
    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    #[must_use]
    pub fn word(&self) -> &str {
        &self.word
    }

    #[must_use]
    pub fn meaning(&self) -> &str {
        &self.meaning
    }

    #[must_use]
    pub fn tag_ids(&self) -> &[TagId] {
        &self.tag_ids
    }

    #[must_use]
    pub fn is_marked(&self) -> bool {
        self.is_marked
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── FILTER / SORT ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MarkFilter {
    #[default]
    All,
    Marked,
    Unmarked,
}

impl MarkFilter {
    #[must_use]
    pub fn matches(self, word: &Word) -> bool {
        match self {
            MarkFilter::All => true,
            MarkFilter::Marked => word.is_marked(),
            MarkFilter::Unmarked => !word.is_marked(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordSort {
    WordAsc,
    WordDesc,
    CreatedAtAsc,
    /// Newest first.
    #[default]
    CreatedAtDesc,
}

impl WordSort {
    fn compare(self, a: &Word, b: &Word) -> Ordering {
        match self {
            WordSort::WordAsc => compare_text(a.word(), b.word()),
            WordSort::WordDesc => compare_text(b.word(), a.word()),
            WordSort::CreatedAtAsc => a.created_at().cmp(&b.created_at()),
            WordSort::CreatedAtDesc => b.created_at().cmp(&a.created_at()),
        }
    }
}

// Case-insensitive first so "apple" sorts next to "Apple".
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Filter by mark state, then stable-sort.
#[must_use]
pub fn filter_and_sort(words: &[Word], filter: MarkFilter, sort: WordSort) -> Vec<Word> {
    let mut selected: Vec<Word> = words.iter().filter(|w| filter.matches(w)).cloned().collect();
    selected.sort_by(|a, b| sort.compare(a, b));
    selected
}
