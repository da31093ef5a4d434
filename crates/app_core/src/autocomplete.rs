//! Tag autocomplete: substring filtering over the vocabulary, highlighted
//! candidate navigation, and committing existing or freshly coined tags.

use crate::TagVocabulary;
use ipc_proto::TAG_DELIMITER;
use std::fmt;

/// Prefix shown in front of a tag that does not exist yet
pub const NEW_TAG_MARKER: &str = "(new) ";

/// One entry of the autocomplete dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// A tag already in the vocabulary
    Existing(String),
    /// The query itself, offered as a new tag
    New(String),
}

impl Candidate {
    /// The bare tag this candidate commits
    pub fn tag(&self) -> &str {
        match self {
            Candidate::Existing(tag) | Candidate::New(tag) => tag,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Candidate::New(_))
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Existing(tag) => f.write_str(tag),
            Candidate::New(tag) => write!(f, "{}{}", NEW_TAG_MARKER, tag),
        }
    }
}

/// Highlight movement in the dropdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Compute the dropdown for `query`.
///
/// Every vocabulary tag containing `query` (case-sensitive substring) that is
/// not already `selected`, in vocabulary order. When `query` is neither known
/// nor selected, a single [`Candidate::New`] follows the existing matches.
/// A query containing the wire tag delimiter is never offered as a new tag.
pub fn candidates(query: &str, vocabulary: &TagVocabulary, selected: &[String]) -> Vec<Candidate> {
    if query.is_empty() {
        return Vec::new();
    }

    let is_selected = |tag: &str| selected.iter().any(|s| s == tag);

    let mut results: Vec<Candidate> = vocabulary
        .iter()
        .filter(|tag| tag.contains(query))
        .filter(|tag| !is_selected(tag))
        .map(|tag| Candidate::Existing(tag.to_string()))
        .collect();

    if !vocabulary.contains(query) && !is_selected(query) && !query.contains(TAG_DELIMITER) {
        results.push(Candidate::New(query.to_string()));
    }

    results
}

/// Search box state: query, dropdown and highlighted entry.
///
/// `highlighted` is always a valid index into the candidates, or 0 when there
/// are none.
#[derive(Debug, Clone, Default)]
pub struct TagSearch {
    query: String,
    candidates: Vec<Candidate>,
    highlighted: usize,
    active: bool,
}

impl TagSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    /// Whether the dropdown is showing
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Recompute the dropdown for a new query
    pub fn set_query(&mut self, query: String, vocabulary: &TagVocabulary, selected: &[String]) {
        if query.is_empty() {
            self.reset();
            return;
        }

        self.candidates = candidates(&query, vocabulary, selected);
        self.query = query;
        self.active = true;
        self.highlighted = 0;
    }

    /// Recompute the dropdown for the current query, e.g. after the
    /// vocabulary changed underneath it
    pub fn refresh(&mut self, vocabulary: &TagVocabulary, selected: &[String]) {
        if !self.active {
            return;
        }
        self.candidates = candidates(&self.query, vocabulary, selected);
        self.clamp_highlight();
    }

    /// Move the highlight by one with wrap-around
    pub fn navigate(&mut self, direction: Direction) {
        let len = self.candidates.len();
        if len == 0 {
            return;
        }

        self.highlighted = match direction {
            Direction::Down => (self.highlighted + 1) % len,
            Direction::Up => (self.highlighted + len - 1) % len,
        };
    }

    /// Commit the highlighted candidate into `selected`.
    ///
    /// A new tag is added to the vocabulary first. The committed entry leaves
    /// the dropdown and the highlight is clamped into the shorter list.
    /// Returns the committed tag.
    pub fn confirm_highlighted(
        &mut self,
        vocabulary: &mut TagVocabulary,
        selected: &mut Vec<String>,
    ) -> Option<String> {
        let candidate = self.candidates.get(self.highlighted)?.clone();
        let tag = candidate.tag().to_string();

        if candidate.is_new() {
            vocabulary.insert(tag.clone());
        }
        if !selected.contains(&tag) {
            selected.push(tag.clone());
        }

        self.candidates.remove(self.highlighted);
        self.clamp_highlight();

        tracing::debug!(tag = %tag, new = candidate.is_new(), "Tag committed");
        Some(tag)
    }

    /// Highlight and commit a specific candidate (pointer selection).
    /// Nothing happens when it is no longer in the dropdown.
    pub fn pick(
        &mut self,
        candidate: &Candidate,
        vocabulary: &mut TagVocabulary,
        selected: &mut Vec<String>,
    ) -> Option<String> {
        self.highlighted = self.candidates.iter().position(|c| c == candidate)?;
        self.confirm_highlighted(vocabulary, selected)
    }

    /// Drop the query and dropdown (focus loss)
    pub fn reset(&mut self) {
        self.query.clear();
        self.candidates.clear();
        self.highlighted = 0;
        self.active = false;
    }

    fn clamp_highlight(&mut self) {
        if self.highlighted >= self.candidates.len() {
            self.highlighted = self.candidates.len().saturating_sub(1);
        }
    }
}
