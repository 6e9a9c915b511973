/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    /// 1-based number of the question on screen; equals `total` once complete.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub correct: u32,
    pub is_complete: bool,
}

impl SessionProgress {
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.answered)
    }
}
