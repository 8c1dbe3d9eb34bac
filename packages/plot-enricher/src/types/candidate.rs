//! Candidate plot passage produced by page extraction.

/// Extracted text that passed validation, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePassage {
    pub text: String,
    pub source_url: String,
    /// Source host is on the high-trust allowlist.
    pub preferred: bool,
}

impl CandidatePassage {
    pub fn new(text: impl Into<String>, source_url: impl Into<String>, preferred: bool) -> Self {
        Self {
            text: text.into(),
            source_url: source_url.into(),
            preferred,
        }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
