//! In-memory inverted index over the reference dataset.
//!
//! Maps normalized street-name words, locality words, postcodes, and
//! states to posting sets of record positions. Built once from a loaded
//! record snapshot and immutable afterwards; share it behind an `Arc`
//! and reload by building a new index and swapping the handle.
//!
//! Lookups union the posting sets of the query's significant tokens
//! (with a small edit-distance fallback for longer tokens) and narrow
//! the union through locality/postcode/state sets when the query
//! carries geographic tokens. An empty result is a normal precursor to
//! a no-match outcome, not an error.

use std::collections::HashMap;

use roaring::RoaringBitmap;

use address_match_resolver_models::{ReferenceRecord, TokenKind};

use crate::normalize::ParsedQuery;

/// Tokens must be longer than this for edit-distance key fallback.
const FUZZY_MIN_TOKEN_LEN: usize = 5;

/// Maximum edit distance for the key fallback.
const FUZZY_MAX_EDITS: usize = 1;

/// Inverted index over an immutable reference record snapshot.
pub struct ReferenceIndex {
    records: Vec<ReferenceRecord>,
    by_street_word: HashMap<String, RoaringBitmap>,
    by_locality_word: HashMap<String, RoaringBitmap>,
    by_postcode: HashMap<String, RoaringBitmap>,
    by_state: HashMap<String, RoaringBitmap>,
}

impl ReferenceIndex {
    /// Builds the index from a validated record snapshot.
    ///
    /// Records are sorted by id so that positions (and therefore all
    /// downstream tie-breaks) are deterministic for a given snapshot.
    /// Record text fields are expected in normalized form.
    #[must_use]
    pub fn build(mut records: Vec<ReferenceRecord>) -> Self {
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records.dedup_by(|a, b| a.id == b.id);

        let mut by_street_word: HashMap<String, RoaringBitmap> = HashMap::new();
        let mut by_locality_word: HashMap<String, RoaringBitmap> = HashMap::new();
        let mut by_postcode: HashMap<String, RoaringBitmap> = HashMap::new();
        let mut by_state: HashMap<String, RoaringBitmap> = HashMap::new();

        for (position, record) in (0u32..).zip(records.iter()) {
            for word in record.street_name.split_whitespace() {
                by_street_word
                    .entry(word.to_string())
                    .or_default()
                    .insert(position);
            }
            for word in record.locality.split_whitespace() {
                by_locality_word
                    .entry(word.to_string())
                    .or_default()
                    .insert(position);
            }
            by_postcode
                .entry(record.postcode.clone())
                .or_default()
                .insert(position);
            by_state
                .entry(record.state.clone())
                .or_default()
                .insert(position);
        }

        log::info!(
            "Built reference index: {} records, {} street words, {} localities, {} postcodes",
            records.len(),
            by_street_word.len(),
            by_locality_word.len(),
            by_postcode.len()
        );

        Self {
            records,
            by_street_word,
            by_locality_word,
            by_postcode,
            by_state,
        }
    }

    /// Number of records in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the snapshot holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records, sorted by id.
    #[must_use]
    pub fn records(&self) -> &[ReferenceRecord] {
        &self.records
    }

    /// The record at an index position returned by [`Self::lookup`].
    ///
    /// # Panics
    ///
    /// Panics if `position` did not come from this index's posting sets.
    #[must_use]
    pub fn record(&self, position: u32) -> &ReferenceRecord {
        &self.records[position as usize]
    }

    /// Retrieves the candidate posting set for a parsed query.
    ///
    /// Unions street-word postings for every word-like token, then
    /// intersects with the locality/postcode union (and the state set)
    /// when geographic tokens are present. Falls back to the wider
    /// street union when the intersection is empty, and to the
    /// geographic union when no street token matched at all.
    #[must_use]
    pub fn lookup(&self, query: &ParsedQuery) -> RoaringBitmap {
        let mut street_union = RoaringBitmap::new();
        let mut locality_union = RoaringBitmap::new();
        let mut postcode_union = RoaringBitmap::new();

        for token in &query.tokens {
            match token.kind {
                TokenKind::Word | TokenKind::StreetType => {
                    street_union |= lookup_word(&self.by_street_word, &token.text);
                    locality_union |= lookup_word(&self.by_locality_word, &token.text);
                }
                TokenKind::Postcode => {
                    if let Some(postings) = self.by_postcode.get(&token.text) {
                        postcode_union |= postings;
                    }
                }
                TokenKind::Number | TokenKind::UnitMarker | TokenKind::StateCode => {}
            }
        }

        let geographic = locality_union | postcode_union;

        let mut result = if street_union.is_empty() {
            geographic.clone()
        } else if geographic.is_empty() {
            street_union
        } else {
            let narrowed = &street_union & &geographic;
            if narrowed.is_empty() {
                // Geographic tokens contradict the street tokens (wrong
                // postcode, misheard suburb). Keep the street union and
                // let scoring sort it out.
                log::debug!("geographic intersection empty, falling back to street union");
                street_union
            } else {
                narrowed
            }
        };

        if let Some(state) = &query.state {
            if let Some(postings) = self.by_state.get(state) {
                let narrowed = &result & postings;
                if !narrowed.is_empty() {
                    result = narrowed;
                }
            }
        }

        result
    }
}

/// Exact posting lookup with an edit-distance fallback for longer
/// tokens that miss every key outright.
fn lookup_word(map: &HashMap<String, RoaringBitmap>, token: &str) -> RoaringBitmap {
    if let Some(postings) = map.get(token) {
        return postings.clone();
    }

    let mut union = RoaringBitmap::new();
    if token.len() >= FUZZY_MIN_TOKEN_LEN {
        for (key, postings) in map {
            if key.len().abs_diff(token.len()) <= FUZZY_MAX_EDITS
                && strsim::levenshtein(key, token) <= FUZZY_MAX_EDITS
            {
                union |= postings;
            }
        }
    }
    union
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::ParsedQuery;
    use crate::synonyms::SynonymTable;
    use address_match_resolver_models::StreetNumber;

    fn record(id: &str, street: &str, locality: &str, state: &str, postcode: &str) -> ReferenceRecord {
        ReferenceRecord {
            id: id.to_string(),
            unit: None,
            number: Some(StreetNumber::exact(245)),
            street_name: street.to_string(),
            street_type: Some("STREET".to_string()),
            locality: locality.to_string(),
            state: state.to_string(),
            postcode: postcode.to_string(),
            geocode: None,
        }
    }

    fn fixture() -> ReferenceIndex {
        ReferenceIndex::build(vec![
            record("GAVIC1", "HIGH", "PRAHRAN", "VIC", "3181"),
            record("GAVIC2", "HIGH", "KEW", "VIC", "3101"),
            record("GANSW1", "HIGH", "PENRITH", "NSW", "2750"),
            record("GAVIC3", "CHAPEL", "PRAHRAN", "VIC", "3181"),
        ])
    }

    fn parse(text: &str) -> ParsedQuery {
        ParsedQuery::parse(text, &SynonymTable::default())
    }

    fn ids(index: &ReferenceIndex, postings: &RoaringBitmap) -> Vec<String> {
        postings.iter().map(|p| index.record(p).id.clone()).collect()
    }

    #[test]
    fn records_sorted_and_deduplicated_by_id() {
        let index = ReferenceIndex::build(vec![
            record("B", "HIGH", "PRAHRAN", "VIC", "3181"),
            record("A", "HIGH", "PRAHRAN", "VIC", "3181"),
            record("A", "HIGH", "PRAHRAN", "VIC", "3181"),
        ]);
        let ids: Vec<&str> = index.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["A", "B"]);
    }

    #[test]
    fn geographic_tokens_narrow_the_street_union() {
        let index = fixture();
        let postings = index.lookup(&parse("245 HIGH STREET PRAHRAN VIC 3181"));
        assert_eq!(ids(&index, &postings), ["GAVIC1"]);
    }

    #[test]
    fn street_only_query_spans_localities() {
        let index = fixture();
        let postings = index.lookup(&parse("245 HIGH STREET"));
        assert_eq!(ids(&index, &postings), ["GANSW1", "GAVIC1", "GAVIC2"]);
    }

    #[test]
    fn state_token_narrows_without_locality() {
        let index = fixture();
        let postings = index.lookup(&parse("245 HIGH STREET VIC"));
        assert_eq!(ids(&index, &postings), ["GAVIC1", "GAVIC2"]);
    }

    #[test]
    fn misspelled_locality_matches_within_tolerance() {
        let index = fixture();
        let postings = index.lookup(&parse("245 HIGH STREET PRAHRAM VIC"));
        assert_eq!(ids(&index, &postings), ["GAVIC1"]);
    }

    #[test]
    fn short_tokens_get_no_fuzzy_fallback() {
        let index = fixture();
        // "KEWW" is 4 chars, below the fuzzy threshold; "HIGH" still
        // matches so the street union carries the lookup.
        let postings = index.lookup(&parse("245 HIGH STREET KEWW"));
        assert_eq!(ids(&index, &postings), ["GANSW1", "GAVIC1", "GAVIC2"]);
    }

    #[test]
    fn contradictory_postcode_falls_back_to_street_union() {
        let index = fixture();
        let postings = index.lookup(&parse("245 CHAPEL STREET KEW"));
        // CHAPEL exists only in PRAHRAN; the KEW narrowing would empty
        // the set, so the street union survives.
        assert!(ids(&index, &postings).contains(&"GAVIC3".to_string()));
    }

    #[test]
    fn unmatched_query_returns_empty_set() {
        let index = fixture();
        let postings = index.lookup(&parse("999 NOWHERE PLAZA"));
        assert!(postings.is_empty());
    }

    #[test]
    fn empty_index_returns_empty_set() {
        let index = ReferenceIndex::build(Vec::new());
        assert!(index.is_empty());
        let postings = index.lookup(&parse("245 HIGH STREET"));
        assert!(postings.is_empty());
    }
}
