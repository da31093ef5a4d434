//! Known tag vocabulary

use std::collections::HashSet;

/// The set of known tags, in insertion order.
///
/// Seeded from the remote catalog and extended locally when the operator
/// coins a new tag. Tags are never removed during a session.
#[derive(Debug, Clone, Default)]
pub struct TagVocabulary {
    tags: Vec<String>,
    index: HashSet<String>,
}

impl TagVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vocabulary, keeping the first occurrence of duplicates
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocabulary = Self::new();
        for tag in tags {
            vocabulary.insert(tag);
        }
        vocabulary
    }

    /// Add a tag; returns false if it was already known
    pub fn insert<S: Into<String>>(&mut self, tag: S) -> bool {
        let tag = tag.into();
        if self.index.contains(&tag) {
            return false;
        }
        self.index.insert(tag.clone());
        self.tags.push(tag);
        true
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.index.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Install the catalog's tags.
    ///
    /// Catalog order comes first; tags already known locally but missing from
    /// the catalog are kept after them.
    pub fn merge_catalog(&mut self, catalog: Vec<String>) {
        let previous = std::mem::take(&mut self.tags);
        self.index.clear();

        for tag in catalog.into_iter().chain(previous) {
            self.insert(tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order_and_dedups() {
        let mut vocab = TagVocabulary::from_tags(["b", "a", "b"]);
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["b", "a"]);

        assert!(vocab.insert("c"));
        assert!(!vocab.insert("a"));
        assert_eq!(vocab.len(), 3);
        assert!(vocab.contains("c"));
        assert!(!vocab.contains("C"));
    }

    #[test]
    fn test_merge_catalog_keeps_local_tags() {
        let mut vocab = TagVocabulary::new();
        vocab.insert("coined");
        vocab.insert("hentai");

        vocab.merge_catalog(vec!["ecchi".to_string(), "hentai".to_string()]);
        assert_eq!(vocab.iter().collect::<Vec<_>>(), vec!["ecchi", "hentai", "coined"]);
    }
}
