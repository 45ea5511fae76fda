//! Media-query index: interned query identifiers and the mapping from each
//! query to the ordered set of rule positions belonging to it.
//!
//! Identifiers are interned per stylesheet: parsing the same textual query
//! twice yields the same [`MediaId`]. Equality is structural on the
//! normalized query text, so `screen and (min-width: 768px)` is one
//! identifier, distinct from plain `screen`.

use std::collections::HashMap;

use crate::error::CssError;

/// Identifier for an interned media query within one stylesheet.
///
/// Id 0 is reserved for the unconditional sentinel (`:all`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MediaId(pub(crate) usize);

impl MediaId {
    /// The unconditional sentinel: rules outside any `@media` block.
    pub const ALL: MediaId = MediaId(0);
}

/// Per-stylesheet index from media query to rule ids and back.
#[derive(Clone, Debug)]
pub struct MediaIndex {
    /// Interner storage; index is the `MediaId`. Slot 0 is `:all`.
    queries: Vec<String>,
    lookup: HashMap<String, MediaId>,
    /// Ordered rule ids per `MediaId`.
    rules: Vec<Vec<usize>>,
    /// Reverse map; rules under `:all` are deliberately absent, so an empty
    /// answer from [`media_for`](Self::media_for) means unconditional.
    by_rule: HashMap<usize, Vec<MediaId>>,
}

const NO_RULES: &[usize] = &[];
const NO_MEDIA: &[MediaId] = &[];

impl MediaIndex {
    pub fn new() -> Self {
        let sentinel = ":all".to_string();
        let mut lookup = HashMap::new();
        lookup.insert(sentinel.clone(), MediaId::ALL);
        MediaIndex {
            queries: vec![sentinel],
            lookup,
            rules: vec![Vec::new()],
            by_rule: HashMap::new(),
        }
    }

    /// Interns `query`, returning the existing id when the same text was
    /// seen before. Fails when the distinct-query ceiling is hit.
    pub fn intern(&mut self, query: &str, limit: usize) -> Result<MediaId, CssError> {
        if let Some(&id) = self.lookup.get(query) {
            return Ok(id);
        }
        // Slot 0 is the sentinel, so the ceiling is on real queries.
        if self.queries.len() > limit {
            return Err(CssError::TooManyMediaQueries { limit });
        }
        let id = MediaId(self.queries.len());
        self.queries.push(query.to_string());
        self.lookup.insert(query.to_string(), id);
        self.rules.push(Vec::new());
        Ok(id)
    }

    /// Interning for internal rebuilds, where every query was already
    /// admitted once and the ceiling cannot be re-hit.
    pub(crate) fn intern_known(&mut self, query: &str) -> MediaId {
        if let Some(&id) = self.lookup.get(query) {
            return id;
        }
        let id = MediaId(self.queries.len());
        self.queries.push(query.to_string());
        self.lookup.insert(query.to_string(), id);
        self.rules.push(Vec::new());
        id
    }

    /// Records that rule `rule_id` belongs to `media`.
    pub fn register(&mut self, rule_id: usize, media: MediaId) {
        let slot = &mut self.rules[media.0];
        if slot.last() != Some(&rule_id) {
            slot.push(rule_id);
        }
        if media != MediaId::ALL {
            let list = self.by_rule.entry(rule_id).or_default();
            if !list.contains(&media) {
                list.push(media);
            }
        }
    }

    /// Ordered rule ids registered under the given query text.
    ///
    /// `":all"` answers the unconditional rules; an unknown query answers
    /// the empty set.
    pub fn rules_for(&self, query: &str) -> &[usize] {
        match self.lookup.get(query) {
            Some(id) => &self.rules[id.0],
            None => NO_RULES,
        }
    }

    /// Media ids a rule is registered under. Empty means unconditional.
    pub fn media_for(&self, rule_id: usize) -> &[MediaId] {
        match self.by_rule.get(&rule_id) {
            Some(list) => list,
            None => NO_MEDIA,
        }
    }

    /// The normalized query text behind an id.
    pub fn query_text(&self, id: MediaId) -> &str {
        &self.queries[id.0]
    }

    /// Every interned query, the sentinel excluded.
    pub fn queries(&self) -> impl Iterator<Item = &str> {
        self.queries.iter().skip(1).map(String::as_str)
    }
}

impl Default for MediaIndex {
    fn default() -> Self {
        MediaIndex::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let mut index = MediaIndex::new();
        let a = index.intern("screen", 16).unwrap();
        let b = index.intern("screen", 16).unwrap();
        let c = index.intern("print", 16).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn ceiling_is_enforced() {
        let mut index = MediaIndex::new();
        index.intern("screen", 1).unwrap();
        let err = index.intern("print", 1).unwrap_err();
        assert!(matches!(err, CssError::TooManyMediaQueries { limit: 1 }));
    }

    #[test]
    fn all_rules_are_not_reverse_mapped() {
        let mut index = MediaIndex::new();
        index.register(0, MediaId::ALL);
        let print = index.intern("print", 16).unwrap();
        index.register(1, print);
        assert_eq!(index.rules_for(":all"), &[0]);
        assert_eq!(index.rules_for("print"), &[1]);
        assert!(index.media_for(0).is_empty());
        assert_eq!(index.media_for(1), &[print]);
    }
}
