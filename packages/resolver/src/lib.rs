#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address resolution engine over a GNAF-style reference dataset.
//!
//! Takes a free-form address string, normalizes and tokenizes it,
//! retrieves candidate records from an in-memory inverted index,
//! scores each candidate with field-weighted approximate matching, and
//! returns a ranked, confidence-annotated result.
//!
//! # Architecture
//!
//! - **Normalize**: uppercase, strip punctuation, expand abbreviations
//!   (ST→STREET), tag tokens (number, street type, state, postcode).
//! - **Generate**: union/intersect inverted posting sets over street
//!   words, localities, and postcodes; pre-filter on street number;
//!   bound the working set.
//! - **Score**: Jaro-Winkler per field, combined through configured
//!   weights, with a hard ceiling on street-number mismatches.
//! - **Resolve**: acceptance/separation thresholds decide Matched,
//!   Ambiguous, or NoMatch.
//!
//! The index snapshot is immutable and shared behind an `Arc`; every
//! resolution call is a pure function of (query, config, snapshot) and
//! calls may run fully in parallel. Reloading reference data means
//! building a new index and swapping the handle.
//!
//! # Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use address_match_resolver::index::ReferenceIndex;
//! use address_match_resolver::{ReferenceRecord, Resolver, ResolverConfig, StreetNumber};
//!
//! let records = vec![ReferenceRecord {
//!     id: "GAVIC411711441".to_string(),
//!     unit: None,
//!     number: Some(StreetNumber::exact(245)),
//!     street_name: "HIGH".to_string(),
//!     street_type: Some("STREET".to_string()),
//!     locality: "PRAHRAN".to_string(),
//!     state: "VIC".to_string(),
//!     postcode: "3181".to_string(),
//!     geocode: None,
//! }];
//!
//! let index = Arc::new(ReferenceIndex::build(records));
//! let resolver = Resolver::new(index, ResolverConfig::default()).unwrap();
//! let result = resolver.resolve("245 High St, Prahran VIC 3181");
//! assert!(result.best.is_some());
//! ```

pub mod candidates;
pub mod index;
pub mod normalize;
pub mod scorer;
pub mod synonyms;

use std::sync::Arc;

pub use address_match_resolver_models::{
    ConfigError, FieldScores, FieldWeights, Geocode, MatchStatus, NoMatchReason, NormalizedToken,
    ReferenceRecord, ResolutionResult, ResolverConfig, ScoredMatch, StreetNumber, TokenKind,
};

use index::ReferenceIndex;
use normalize::ParsedQuery;
use scorer::Scorer;
use synonyms::SynonymTable;

/// A handle for resolving raw address strings against a reference
/// snapshot.
///
/// Cheap to clone (the index is shared) and safe to use from multiple
/// threads concurrently; it never mutates the snapshot.
#[derive(Clone)]
pub struct Resolver {
    index: Arc<ReferenceIndex>,
    config: ResolverConfig,
    scorer: Scorer,
    synonyms: SynonymTable,
}

impl Resolver {
    /// Creates a resolver over an index snapshot.
    ///
    /// Configuration is validated eagerly; no matching work begins with
    /// bad thresholds, and nothing is silently clamped.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(index: Arc<ReferenceIndex>, config: ResolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            index,
            config,
            scorer: Scorer::default(),
            synonyms: SynonymTable::default(),
        })
    }

    /// Replaces the default scorer (custom weights or mismatch ceiling).
    #[must_use]
    pub fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Replaces the built-in abbreviation tables.
    #[must_use]
    pub fn with_synonyms(mut self, synonyms: SynonymTable) -> Self {
        self.synonyms = synonyms;
        self
    }

    /// The shared index snapshot this resolver reads.
    #[must_use]
    pub fn snapshot(&self) -> &Arc<ReferenceIndex> {
        &self.index
    }

    /// Resolves one raw address string.
    ///
    /// Pure with respect to (query, config, snapshot): identical inputs
    /// against an unchanged snapshot produce identical results. Invalid
    /// input degrades to a `NoMatch` result with a reason code rather
    /// than an error.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> ResolutionResult {
        let query = ParsedQuery::parse(raw, &self.synonyms);
        if query.is_empty() {
            return ResolutionResult::no_match(NoMatchReason::InvalidInput);
        }

        let candidates = candidates::generate(&self.index, &query, self.config.max_candidates);
        if candidates.is_empty() {
            log::info!("No candidates for query: {raw}");
            return ResolutionResult::no_match(NoMatchReason::NoCandidates);
        }

        let mut scored: Vec<(f64, FieldScores, &ReferenceRecord)> = candidates
            .iter()
            .map(|candidate| {
                let (score, fields) = self.scorer.score(&query, candidate.record);
                (score, fields, candidate.record)
            })
            .collect();

        // Descending score; ascending record id on ties for determinism.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.2.id.cmp(&b.2.id)));

        if log::log_enabled!(log::Level::Debug) {
            for (score, _, record) in scored.iter().take(10) {
                log::debug!("[{score:4.2}] {record}");
            }
        }

        let top = scored[0].0;
        if top < self.config.minimum_threshold {
            log::info!("Best candidate below minimum for query: {raw}");
            return ResolutionResult::no_match(NoMatchReason::BelowMinimum);
        }

        let separated = scored
            .get(1)
            .is_none_or(|second| top - second.0 >= self.config.separation_threshold);
        let status = if top >= self.config.acceptance_threshold && separated {
            MatchStatus::Matched
        } else {
            MatchStatus::Ambiguous
        };

        let alternatives: Vec<ScoredMatch> = scored
            .into_iter()
            .take(self.config.max_alternatives)
            .map(|(score, fields, record)| ScoredMatch {
                record: record.clone(),
                score,
                fields,
            })
            .collect();

        let best = alternatives.first().cloned();
        if let Some(best) = &best {
            log::info!("[{:4.2}] {},{}", best.score, best.record, best.record.id);
        }

        ResolutionResult {
            status,
            best,
            alternatives,
            reason: None,
        }
    }

    /// Resolves a sequence of raw query lines.
    ///
    /// Order-preserving and independent per line: the output has
    /// exactly one result per input line, with no cross-query state.
    #[must_use]
    pub fn resolve_batch<'a>(
        &self,
        queries: impl IntoIterator<Item = &'a str>,
    ) -> Vec<ResolutionResult> {
        queries.into_iter().map(|q| self.resolve(q)).collect()
    }
}
