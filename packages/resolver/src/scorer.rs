//! Field-weighted candidate scoring.
//!
//! Each candidate is compared to the parsed query per structural field
//! using Jaro-Winkler similarity (symmetric, bounded to `[0, 1]`, equal
//! to 1 for identical normalized strings). Sub-scores combine through
//! the configured [`FieldWeights`] into an aggregate clamped to
//! `[0, 1]`. Fields absent from the query contribute a neutral
//! sub-score so their absence neither rewards nor penalizes.
//!
//! A numeric street-number mismatch with both sides present caps the
//! aggregate at a hard ceiling: a wrong house number must not be
//! disguised by a perfect street-name match.

use address_match_resolver_models::{
    ConfigError, FieldScores, FieldWeights, ReferenceRecord, StreetNumber,
};

use crate::normalize::ParsedQuery;

/// Default cap on the aggregate score when street numbers disagree.
pub const DEFAULT_NUMBER_MISMATCH_CEILING: f64 = 0.5;

/// Sub-score for a field the query does not carry.
const NEUTRAL_SUBSCORE: f64 = 0.5;

/// Sub-score when the street number matches but its letter suffix does
/// not ("12A" against "12B").
const SUFFIX_MISMATCH_SUBSCORE: f64 = 0.8;

/// Postcode sub-score when exactly one digit differs.
const POSTCODE_NEAR_SUBSCORE: f64 = 0.5;

/// Scores candidates against a parsed query.
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: FieldWeights,
    number_mismatch_ceiling: f64,
}

impl Default for Scorer {
    fn default() -> Self {
        // The built-in weights are known to sum to 1.
        Self {
            weights: FieldWeights::default(),
            number_mismatch_ceiling: DEFAULT_NUMBER_MISMATCH_CEILING,
        }
    }
}

impl Scorer {
    /// Creates a scorer with explicit weights and mismatch ceiling.
    ///
    /// # Errors
    ///
    /// Returns an error if the weights do not sum to 1 within floating
    /// tolerance or the ceiling is outside `[0, 1]`.
    pub fn new(weights: FieldWeights, number_mismatch_ceiling: f64) -> Result<Self, ConfigError> {
        weights.validate()?;
        if !(0.0..=1.0).contains(&number_mismatch_ceiling) || !number_mismatch_ceiling.is_finite() {
            return Err(ConfigError::CeilingOutOfRange(number_mismatch_ceiling));
        }
        Ok(Self {
            weights,
            number_mismatch_ceiling,
        })
    }

    /// Scores one candidate record against the query.
    ///
    /// Returns the aggregate score in `[0, 1]` and the per-field
    /// breakdown. Pure and exception-free: a low score is a normal
    /// outcome, not an error.
    #[must_use]
    pub fn score(&self, query: &ParsedQuery, record: &ReferenceRecord) -> (f64, FieldScores) {
        let (street_number, number_mismatch) = score_street_number(query, record);

        let fields = FieldScores {
            street_number,
            street_name: score_name_field(
                &query.street_words,
                query.split_known,
                &record.street_name,
            ),
            street_type: score_street_type(query, record),
            locality: score_name_field(&query.locality_words, query.split_known, &record.locality),
            state: score_exact(query.state.as_deref(), &record.state),
            postcode: score_postcode(query.postcode.as_deref(), &record.postcode),
        };

        let weighted = self.weights.street_number * fields.street_number
            + self.weights.street_name * fields.street_name
            + self.weights.street_type * fields.street_type
            + self.weights.locality * fields.locality
            + self.weights.state * fields.state
            + self.weights.postcode * fields.postcode;

        let mut aggregate = weighted.clamp(0.0, 1.0);
        if number_mismatch {
            aggregate = aggregate.min(self.number_mismatch_ceiling);
        }

        (aggregate, fields)
    }
}

/// Street number sub-score plus whether the hard ceiling applies.
fn score_street_number(query: &ParsedQuery, record: &ReferenceRecord) -> (f64, bool) {
    let (Some(query_number), Some(record_number)) = (&query.number, &record.number) else {
        return (NEUTRAL_SUBSCORE, false);
    };

    if !record_number.covers(query_number.first) {
        return (0.0, true);
    }

    (suffix_score(query_number, record_number), false)
}

fn suffix_score(query_number: &StreetNumber, record_number: &StreetNumber) -> f64 {
    match (&query_number.suffix, &record_number.suffix) {
        (Some(a), Some(b)) if a != b => SUFFIX_MISMATCH_SUBSCORE,
        _ => 1.0,
    }
}

/// Similarity for a word-sequence field (street name or locality).
///
/// With a known street/locality split the query words are compared
/// directly. Without one, the best sliding window of the query's word
/// sequence (window length = the record field's word count) stands in
/// for the field.
fn score_name_field(words: &[String], split_known: bool, target: &str) -> f64 {
    if words.is_empty() {
        return NEUTRAL_SUBSCORE;
    }

    if split_known {
        return strsim::jaro_winkler(&words.join(" "), target);
    }

    let target_words = target.split_whitespace().count().max(1);
    let window = target_words.min(words.len());
    let mut best = 0.0f64;
    for start in 0..=(words.len() - window) {
        let joined = words[start..start + window].join(" ");
        best = best.max(strsim::jaro_winkler(&joined, target));
    }
    best
}

fn score_street_type(query: &ParsedQuery, record: &ReferenceRecord) -> f64 {
    let Some(query_type) = &query.street_type else {
        return NEUTRAL_SUBSCORE;
    };
    match &record.street_type {
        Some(record_type) if record_type == query_type => 1.0,
        _ => 0.0,
    }
}

fn score_exact(query_value: Option<&str>, record_value: &str) -> f64 {
    match query_value {
        Some(value) if value == record_value => 1.0,
        Some(_) => 0.0,
        None => NEUTRAL_SUBSCORE,
    }
}

fn score_postcode(query_postcode: Option<&str>, record_postcode: &str) -> f64 {
    match query_postcode {
        Some(value) if value == record_postcode => 1.0,
        Some(value) if strsim::levenshtein(value, record_postcode) == 1 => POSTCODE_NEAR_SUBSCORE,
        Some(_) => 0.0,
        None => NEUTRAL_SUBSCORE,
    }
}
