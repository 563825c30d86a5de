//! Bounded candidate generation.
//!
//! Turns the reference index posting set for a query into a working set
//! of plausible records for the scorer: a cheap structural pre-filter
//! on the street number, a coarse token-overlap relevance signal, and
//! truncation to a configured maximum. Truncation trades recall for
//! bounded scoring cost; the best match is not guaranteed once the raw
//! candidate count exceeds the cap.

use address_match_resolver_models::{ReferenceRecord, StreetNumber, TokenKind};

use crate::index::ReferenceIndex;
use crate::normalize::ParsedQuery;

/// How far a record's street number may sit from the query's number and
/// still be worth scoring. Adjacent-number queries stay in the set so
/// the scorer can report them under its mismatch ceiling.
const NUMBER_TOLERANCE: u32 = 2;

/// A reference record considered plausible enough to score.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Position of the record in the index snapshot.
    pub position: u32,
    /// The candidate record.
    pub record: &'a ReferenceRecord,
    /// Coarse relevance: count of query tokens found in the record.
    pub overlap: u32,
}

/// Generates the bounded candidate set for a parsed query.
///
/// The returned set is ordered by descending overlap (position
/// ascending on ties) and never contains the same record twice.
#[must_use]
pub fn generate<'a>(
    index: &'a ReferenceIndex,
    query: &ParsedQuery,
    max_candidates: usize,
) -> Vec<Candidate<'a>> {
    let postings = index.lookup(query);

    let mut candidates: Vec<Candidate<'a>> = postings
        .iter()
        .map(|position| {
            let record = index.record(position);
            Candidate {
                position,
                record,
                overlap: token_overlap(query, record),
            }
        })
        .filter(|candidate| number_plausible(query, candidate.record))
        .collect();

    candidates.sort_unstable_by(|a, b| {
        b.overlap
            .cmp(&a.overlap)
            .then_with(|| a.position.cmp(&b.position))
    });

    if candidates.len() > max_candidates {
        log::debug!(
            "Truncating candidate set from {} to {max_candidates}",
            candidates.len()
        );
        candidates.truncate(max_candidates);
    }

    candidates
}

/// Structural pre-filter: the candidate must carry a street number near
/// the query's number, or one side must have no number at all.
fn number_plausible(query: &ParsedQuery, record: &ReferenceRecord) -> bool {
    let Some(query_number) = &query.number else {
        return true;
    };
    let Some(record_number) = &record.number else {
        return true;
    };

    within_tolerance(record_number, query_number.first)
}

fn within_tolerance(number: &StreetNumber, n: u32) -> bool {
    if number.covers(n) {
        return true;
    }
    let low = number.first.saturating_sub(NUMBER_TOLERANCE);
    let high = number.last.unwrap_or(number.first).saturating_add(NUMBER_TOLERANCE);
    n >= low && n <= high
}

/// Counts how many query tokens appear verbatim in the record's fields.
fn token_overlap(query: &ParsedQuery, record: &ReferenceRecord) -> u32 {
    let mut overlap = 0u32;

    for token in &query.tokens {
        let hit = match token.kind {
            TokenKind::Word | TokenKind::StreetType => {
                record.street_name.split_whitespace().any(|w| w == token.text)
                    || record.locality.split_whitespace().any(|w| w == token.text)
                    || record.street_type.as_deref() == Some(token.text.as_str())
            }
            TokenKind::Postcode => record.postcode == token.text,
            TokenKind::StateCode => record.state == token.text,
            TokenKind::Number | TokenKind::UnitMarker => false,
        };
        if hit {
            overlap += 1;
        }
    }

    overlap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synonyms::SynonymTable;

    fn record(id: &str, number: u32, street: &str, locality: &str) -> ReferenceRecord {
        ReferenceRecord {
            id: id.to_string(),
            unit: None,
            number: Some(StreetNumber::exact(number)),
            street_name: street.to_string(),
            street_type: Some("STREET".to_string()),
            locality: locality.to_string(),
            state: "VIC".to_string(),
            postcode: "3181".to_string(),
            geocode: None,
        }
    }

    fn parse(text: &str) -> ParsedQuery {
        ParsedQuery::parse(text, &SynonymTable::default())
    }

    #[test]
    fn filters_out_distant_street_numbers() {
        let index = ReferenceIndex::build(vec![
            record("A", 245, "HIGH", "PRAHRAN"),
            record("B", 246, "HIGH", "PRAHRAN"),
            record("C", 900, "HIGH", "PRAHRAN"),
        ]);
        let candidates = generate(&index, &parse("245 HIGH STREET PRAHRAN"), 200);
        let ids: Vec<&str> = candidates.iter().map(|c| c.record.id.as_str()).collect();
        assert!(ids.contains(&"A"));
        assert!(ids.contains(&"B"));
        assert!(!ids.contains(&"C"));
    }

    #[test]
    fn keeps_all_numbers_when_query_has_none() {
        let index = ReferenceIndex::build(vec![
            record("A", 245, "HIGH", "PRAHRAN"),
            record("C", 900, "HIGH", "PRAHRAN"),
        ]);
        let candidates = generate(&index, &parse("HIGH STREET PRAHRAN"), 200);
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn ranges_pass_the_number_filter() {
        let ranged = ReferenceRecord {
            number: Some(StreetNumber {
                first: 240,
                last: Some(250),
                suffix: None,
            }),
            ..record("A", 0, "HIGH", "PRAHRAN")
        };
        let index = ReferenceIndex::build(vec![ranged]);
        let candidates = generate(&index, &parse("245 HIGH STREET PRAHRAN"), 200);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn orders_by_overlap_then_position() {
        let index = ReferenceIndex::build(vec![
            record("A", 245, "HIGH", "KEW"),
            record("B", 245, "HIGH", "PRAHRAN"),
        ]);
        let candidates = generate(&index, &parse("245 HIGH STREET PRAHRAN 3181"), 200);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].record.id, "B");
        assert!(candidates[0].overlap > candidates[1].overlap);
    }

    #[test]
    fn truncates_to_the_configured_maximum() {
        let records: Vec<ReferenceRecord> = (0..50)
            .map(|i| record(&format!("R{i:03}"), 245, "HIGH", "PRAHRAN"))
            .collect();
        let index = ReferenceIndex::build(records);
        let candidates = generate(&index, &parse("245 HIGH STREET PRAHRAN"), 10);
        assert_eq!(candidates.len(), 10);
    }

    #[test]
    fn empty_lookup_produces_empty_set() {
        let index = ReferenceIndex::build(vec![record("A", 245, "HIGH", "PRAHRAN")]);
        let candidates = generate(&index, &parse("999 NOWHERE PLAZA"), 200);
        assert!(candidates.is_empty());
    }
}
