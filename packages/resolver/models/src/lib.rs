#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the address resolution engine.
//!
//! This crate contains only data types, configuration structs, and simple
//! conversions. It has no heavyweight dependencies (no index, no I/O).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a normalized address token.
///
/// A closed set so that downstream field dispatch is exhaustively
/// checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// All digits, or digits with a single trailing letter ("12A").
    Number,
    /// A unit/flat/apartment marker word ("UNIT", "FLAT", "APT").
    UnitMarker,
    /// A known street type ("STREET", "ROAD") or its abbreviation.
    StreetType,
    /// A known state abbreviation ("VIC", "NSW").
    StateCode,
    /// A token matching the postcode format (4 digits).
    Postcode,
    /// Anything else.
    Word,
}

/// A single cleaned, classified token from an address string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedToken {
    /// Canonical (uppercased, expanded) token text.
    pub text: String,
    /// Coarse role guess for the token.
    pub kind: TokenKind,
    /// Zero-based position in the normalized token sequence.
    pub position: usize,
}

/// A street number: exact ("245"), ranged ("245-247"), optionally with
/// a letter suffix ("12A").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreetNumber {
    /// First (or only) number.
    pub first: u32,
    /// Last number of a range, if any.
    pub last: Option<u32>,
    /// Letter suffix on the first number, if any.
    pub suffix: Option<String>,
}

impl StreetNumber {
    /// Creates an exact street number with no suffix.
    #[must_use]
    pub const fn exact(first: u32) -> Self {
        Self {
            first,
            last: None,
            suffix: None,
        }
    }

    /// Returns `true` if `n` equals the number or falls within its range.
    #[must_use]
    pub fn covers(&self, n: u32) -> bool {
        match self.last {
            Some(last) => n >= self.first && n <= last,
            None => n == self.first,
        }
    }
}

impl fmt::Display for StreetNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first)?;
        if let Some(suffix) = &self.suffix {
            write!(f, "{suffix}")?;
        }
        if let Some(last) = self.last {
            write!(f, "-{last}")?;
        }
        Ok(())
    }
}

/// A WGS84 coordinate attached to a reference record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geocode {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

/// A single canonical address from the reference dataset.
///
/// Text fields are stored in their normalized form (uppercased,
/// abbreviations expanded). Locality, state, and postcode are always
/// non-empty; malformed source rows are excluded at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    /// Unique persistent identifier (e.g. a GNAF address detail PID).
    pub id: String,
    /// Unit/flat number, if any.
    pub unit: Option<String>,
    /// Street number (exact or range), if any.
    pub number: Option<StreetNumber>,
    /// Normalized street name (without the street type).
    pub street_name: String,
    /// Canonical street type ("STREET", "ROAD"), if any.
    pub street_type: Option<String>,
    /// Normalized locality/suburb name.
    pub locality: String,
    /// State abbreviation ("VIC", "NSW").
    pub state: String,
    /// Postcode.
    pub postcode: String,
    /// Geocode, if the source provides one.
    pub geocode: Option<Geocode>,
}

impl fmt::Display for ReferenceRecord {
    /// Formats the one-line canonical address:
    /// `UNIT 1 245A HIGH STREET PRAHRAN VIC 3181`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(unit) = &self.unit {
            write!(f, "UNIT {unit} ")?;
        }
        if let Some(number) = &self.number {
            write!(f, "{number} ")?;
        }
        write!(f, "{}", self.street_name)?;
        if let Some(street_type) = &self.street_type {
            write!(f, " {street_type}")?;
        }
        write!(f, " {} {} {}", self.locality, self.state, self.postcode)
    }
}

/// Per-field sub-scores produced by the scorer, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldScores {
    /// Street number sub-score.
    pub street_number: f64,
    /// Street name sub-score.
    pub street_name: f64,
    /// Street type sub-score.
    pub street_type: f64,
    /// Locality sub-score.
    pub locality: f64,
    /// State sub-score.
    pub state: f64,
    /// Postcode sub-score.
    pub postcode: f64,
}

/// A candidate record with its aggregate score and field breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMatch {
    /// The matched reference record.
    pub record: ReferenceRecord,
    /// Aggregate weighted score in `[0, 1]`.
    pub score: f64,
    /// Per-field sub-score breakdown.
    pub fields: FieldScores,
}

/// Terminal outcome of a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    /// A single record matched with high confidence.
    Matched,
    /// Multiple plausible records, none clearly best.
    Ambiguous,
    /// No record matched.
    NoMatch,
}

/// Why a resolution produced [`MatchStatus::NoMatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoMatchReason {
    /// The query was empty or contained no usable tokens.
    InvalidInput,
    /// The reference index returned no candidates.
    NoCandidates,
    /// All candidates scored below the minimum consideration threshold.
    BelowMinimum,
}

/// The result of resolving one raw query string.
///
/// `alternatives` is always sorted by descending score, ties broken by
/// ascending record id. When `status` is [`MatchStatus::Matched`] or
/// [`MatchStatus::Ambiguous`], `best` equals `alternatives[0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// Terminal status.
    pub status: MatchStatus,
    /// Best match, if any.
    pub best: Option<ScoredMatch>,
    /// Ranked alternatives (including the best match).
    pub alternatives: Vec<ScoredMatch>,
    /// Reason code when `status` is [`MatchStatus::NoMatch`].
    pub reason: Option<NoMatchReason>,
}

impl ResolutionResult {
    /// A `NoMatch` result with the given reason.
    #[must_use]
    pub const fn no_match(reason: NoMatchReason) -> Self {
        Self {
            status: MatchStatus::NoMatch,
            best: None,
            alternatives: Vec::new(),
            reason: Some(reason),
        }
    }
}

/// Tunable thresholds and limits for the resolver.
///
/// All thresholds live in `[0, 1]`. The acceptance threshold must be at
/// least `minimum_threshold + separation_threshold`; anything else is a
/// caller misconfiguration and is rejected eagerly, never clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Minimum top score for a confident `Matched` outcome.
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: f64,

    /// Minimum margin between the top two scores for `Matched`.
    #[serde(default = "default_separation_threshold")]
    pub separation_threshold: f64,

    /// Minimum top score for a result to be considered at all.
    #[serde(default = "default_minimum_threshold")]
    pub minimum_threshold: f64,

    /// Maximum candidate set size handed to the scorer.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Maximum number of ranked alternatives returned.
    #[serde(default = "default_max_alternatives")]
    pub max_alternatives: usize,
}

const fn default_acceptance_threshold() -> f64 {
    0.85
}

const fn default_separation_threshold() -> f64 {
    0.05
}

const fn default_minimum_threshold() -> f64 {
    0.60
}

const fn default_max_candidates() -> usize {
    200
}

const fn default_max_alternatives() -> usize {
    10
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: default_acceptance_threshold(),
            separation_threshold: default_separation_threshold(),
            minimum_threshold: default_minimum_threshold(),
            max_candidates: default_max_candidates(),
            max_alternatives: default_max_alternatives(),
        }
    }
}

impl ResolverConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any threshold is outside `[0, 1]`, if the
    /// thresholds are improperly ordered, or if a limit is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("acceptance_threshold", self.acceptance_threshold),
            ("separation_threshold", self.separation_threshold),
            ("minimum_threshold", self.minimum_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }

        if self.acceptance_threshold < self.minimum_threshold + self.separation_threshold {
            return Err(ConfigError::ThresholdOrdering {
                acceptance: self.acceptance_threshold,
                minimum: self.minimum_threshold,
                separation: self.separation_threshold,
            });
        }

        if self.max_candidates == 0 {
            return Err(ConfigError::ZeroLimit("max_candidates"));
        }
        if self.max_alternatives == 0 {
            return Err(ConfigError::ZeroLimit("max_alternatives"));
        }

        Ok(())
    }
}

/// Relative importance of each field in the aggregate score.
///
/// Weights must sum to 1 within floating tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldWeights {
    /// Weight of the street number sub-score.
    #[serde(default = "default_weight_street_number")]
    pub street_number: f64,
    /// Weight of the street name sub-score.
    #[serde(default = "default_weight_street_name")]
    pub street_name: f64,
    /// Weight of the street type sub-score.
    #[serde(default = "default_weight_street_type")]
    pub street_type: f64,
    /// Weight of the locality sub-score.
    #[serde(default = "default_weight_locality")]
    pub locality: f64,
    /// Weight of the state sub-score.
    #[serde(default = "default_weight_state")]
    pub state: f64,
    /// Weight of the postcode sub-score.
    #[serde(default = "default_weight_postcode")]
    pub postcode: f64,
}

const fn default_weight_street_number() -> f64 {
    0.30
}

const fn default_weight_street_name() -> f64 {
    0.35
}

const fn default_weight_street_type() -> f64 {
    0.10
}

const fn default_weight_locality() -> f64 {
    0.15
}

const fn default_weight_state() -> f64 {
    0.05
}

const fn default_weight_postcode() -> f64 {
    0.05
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            street_number: default_weight_street_number(),
            street_name: default_weight_street_name(),
            street_type: default_weight_street_type(),
            locality: default_weight_locality(),
            state: default_weight_state(),
            postcode: default_weight_postcode(),
        }
    }
}

/// Tolerance for the weight-sum check.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

impl FieldWeights {
    /// Sum of all weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.street_number
            + self.street_name
            + self.street_type
            + self.locality
            + self.state
            + self.postcode
    }

    /// Validates that every weight is non-negative and the sum is 1.
    ///
    /// # Errors
    ///
    /// Returns an error if a weight is negative or the weights do not
    /// sum to 1 within floating tolerance.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("street_number", self.street_number),
            ("street_name", self.street_name),
            ("street_type", self.street_type),
            ("locality", self.locality),
            ("state", self.state),
            ("postcode", self.postcode),
        ] {
            if !(0.0..=1.0).contains(&value) || !value.is_finite() {
                return Err(ConfigError::WeightOutOfRange { name, value });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum(sum));
        }

        Ok(())
    }
}

/// Errors from resolver or scorer configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A threshold is outside `[0, 1]`.
    #[error("Threshold {name} out of range [0, 1]: {value}")]
    ThresholdOutOfRange {
        /// Name of the offending threshold.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Thresholds are improperly ordered.
    #[error(
        "acceptance_threshold ({acceptance}) must be at least \
         minimum_threshold ({minimum}) + separation_threshold ({separation})"
    )]
    ThresholdOrdering {
        /// Acceptance threshold.
        acceptance: f64,
        /// Minimum consideration threshold.
        minimum: f64,
        /// Separation threshold.
        separation: f64,
    },

    /// A limit that must be positive is zero.
    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),

    /// A field weight is outside `[0, 1]`.
    #[error("Field weight {name} out of range [0, 1]: {value}")]
    WeightOutOfRange {
        /// Name of the offending weight.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Field weights do not sum to 1.
    #[error("Field weights must sum to 1, got {0}")]
    WeightSum(f64),

    /// The street-number mismatch ceiling is outside `[0, 1]`.
    #[error("Number mismatch ceiling out of range [0, 1]: {0}")]
    CeilingOutOfRange(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ResolverConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        let config = ResolverConfig {
            acceptance_threshold: 1.5,
            ..ResolverConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_misordered_thresholds() {
        let config = ResolverConfig {
            acceptance_threshold: 0.5,
            minimum_threshold: 0.6,
            separation_threshold: 0.05,
            ..ResolverConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOrdering { .. })
        ));
    }

    #[test]
    fn rejects_zero_candidate_limit() {
        let config = ResolverConfig {
            max_candidates: 0,
            ..ResolverConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroLimit("max_candidates"))
        ));
    }

    #[test]
    fn default_weights_sum_to_one() {
        assert!(FieldWeights::default().validate().is_ok());
    }

    #[test]
    fn rejects_weights_not_summing_to_one() {
        let weights = FieldWeights {
            street_name: 0.5,
            ..FieldWeights::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(ConfigError::WeightSum(_))
        ));
    }

    #[test]
    fn rejects_negative_weight() {
        let weights = FieldWeights {
            street_number: -0.1,
            street_name: 0.75,
            ..FieldWeights::default()
        };
        assert!(matches!(
            weights.validate(),
            Err(ConfigError::WeightOutOfRange { .. })
        ));
    }

    #[test]
    fn street_number_covers_exact() {
        let number = StreetNumber::exact(245);
        assert!(number.covers(245));
        assert!(!number.covers(246));
    }

    #[test]
    fn street_number_covers_range() {
        let number = StreetNumber {
            first: 245,
            last: Some(249),
            suffix: None,
        };
        assert!(number.covers(245));
        assert!(number.covers(247));
        assert!(number.covers(249));
        assert!(!number.covers(251));
    }

    #[test]
    fn street_number_display() {
        assert_eq!(StreetNumber::exact(245).to_string(), "245");
        let ranged = StreetNumber {
            first: 245,
            last: Some(247),
            suffix: None,
        };
        assert_eq!(ranged.to_string(), "245-247");
        let suffixed = StreetNumber {
            first: 12,
            last: None,
            suffix: Some("A".to_string()),
        };
        assert_eq!(suffixed.to_string(), "12A");
    }

    #[test]
    fn record_display_full() {
        let record = ReferenceRecord {
            id: "GAVIC1".to_string(),
            unit: Some("1".to_string()),
            number: Some(StreetNumber::exact(245)),
            street_name: "HIGH".to_string(),
            street_type: Some("STREET".to_string()),
            locality: "PRAHRAN".to_string(),
            state: "VIC".to_string(),
            postcode: "3181".to_string(),
            geocode: None,
        };
        assert_eq!(
            record.to_string(),
            "UNIT 1 245 HIGH STREET PRAHRAN VIC 3181"
        );
    }

    #[test]
    fn record_display_minimal() {
        let record = ReferenceRecord {
            id: "GAVIC2".to_string(),
            unit: None,
            number: None,
            street_name: "HIGH".to_string(),
            street_type: None,
            locality: "PRAHRAN".to_string(),
            state: "VIC".to_string(),
            postcode: "3181".to_string(),
            geocode: None,
        };
        assert_eq!(record.to_string(), "HIGH PRAHRAN VIC 3181");
    }
}
