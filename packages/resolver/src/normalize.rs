//! Address normalization and query parsing.
//!
//! Provides a deterministic normalization pipeline applied symmetrically
//! at index time and query time. This ensures that "245 HIGH ST" and
//! "245 HIGH STREET" produce the same normalized form.
//!
//! Normalization never fails: unparseable tokens degrade to
//! [`TokenKind::Word`] and an empty input normalizes to an empty
//! sequence (which downstream stages report as no match).

use regex::Regex;
use std::sync::LazyLock;

use address_match_resolver_models::{NormalizedToken, StreetNumber, TokenKind};

use crate::synonyms::SynonymTable;

/// Regex to strip punctuation characters that do not contribute to
/// address matching. Digit-letter pairs like "12A" carry no punctuation
/// and pass through intact.
static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.,#'/\\\-()&;:!?*]+").expect("valid regex"));

/// Regex for a street number: digits with an optional single letter
/// suffix ("245", "12A").
static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([A-Z])?$").expect("valid regex"));

/// Regex for the postcode format (exactly 4 digits).
static POSTCODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}$").expect("valid regex"));

/// Normalizes a raw address string into an ordered token sequence.
///
/// The pipeline:
/// 1. Uppercase
/// 2. Strip punctuation (`.`, `,`, `#`, `'`, `/`, `\`, `-`, ...)
/// 3. Expand abbreviations (ST→STREET, N→NORTH, etc.)
/// 4. Tag each token with a coarse [`TokenKind`]
///
/// A 4-digit token is tagged [`TokenKind::Postcode`] only once an
/// alphabetic token has been seen; a leading 4-digit token is a street
/// number ("2450 PACIFIC HIGHWAY ..." vs "... COFFS HARBOUR NSW 2450").
#[must_use]
pub fn normalize(text: &str, table: &SynonymTable) -> Vec<NormalizedToken> {
    let upper = text.to_uppercase();
    let no_punct = PUNCTUATION_RE.replace_all(&upper, " ");

    let expanded: Vec<String> = no_punct
        .split_whitespace()
        .map(|t| table.expand_token(t).to_string())
        .collect();

    let mut tokens = Vec::with_capacity(expanded.len());
    let mut seen_alphabetic = false;

    for (position, text) in expanded.into_iter().enumerate() {
        let kind = classify(&text, seen_alphabetic, table);
        if kind == TokenKind::Word
            || kind == TokenKind::StreetType
            || kind == TokenKind::StateCode
            || kind == TokenKind::UnitMarker
        {
            seen_alphabetic = true;
        }
        tokens.push(NormalizedToken {
            text,
            kind,
            position,
        });
    }

    tokens
}

/// Classifies a single expanded token.
fn classify(text: &str, seen_alphabetic: bool, table: &SynonymTable) -> TokenKind {
    if POSTCODE_RE.is_match(text) && seen_alphabetic {
        return TokenKind::Postcode;
    }
    if NUMBER_RE.is_match(text) {
        return TokenKind::Number;
    }
    if table.is_state(text) {
        return TokenKind::StateCode;
    }
    if table.is_unit_marker(text) {
        return TokenKind::UnitMarker;
    }
    if table.is_street_type(text) {
        return TokenKind::StreetType;
    }
    TokenKind::Word
}

/// Normalizes a single reference record field (street name, locality).
///
/// Same pipeline as [`normalize`] but without kind tagging; used when
/// loading reference data so that index keys and query tokens agree.
#[must_use]
pub fn normalize_field(text: &str, table: &SynonymTable) -> String {
    let upper = text.to_uppercase();
    let no_punct = PUNCTUATION_RE.replace_all(&upper, " ");

    let expanded: Vec<&str> = no_punct
        .split_whitespace()
        .map(|t| table.expand_token(t))
        .collect();

    expanded.join(" ")
}

/// The field-level view of a normalized query, consumed by the
/// candidate generator and the scorer.
///
/// When the query contains no street-type token the street/locality
/// boundary is unknown; `split_known` is false and both word lists hold
/// the full word sequence, which the scorer matches by sliding window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// The full normalized token sequence.
    pub tokens: Vec<NormalizedToken>,
    /// Unit/flat number, if one was recognized.
    pub unit: Option<String>,
    /// Street number, if one was recognized.
    pub number: Option<StreetNumber>,
    /// Words believed to form the street name.
    pub street_words: Vec<String>,
    /// Canonical street type, if present.
    pub street_type: Option<String>,
    /// Words believed to form the locality.
    pub locality_words: Vec<String>,
    /// State abbreviation, if present.
    pub state: Option<String>,
    /// Postcode, if present.
    pub postcode: Option<String>,
    /// Whether the street/locality split is known (street type seen).
    pub split_known: bool,
}

impl ParsedQuery {
    /// Normalizes and parses a raw query string.
    #[must_use]
    pub fn parse(text: &str, table: &SynonymTable) -> Self {
        let tokens = normalize(text, table);
        Self::from_tokens(tokens)
    }

    /// Returns `true` if the query produced no tokens at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Derives the field view from an already-normalized token sequence.
    #[must_use]
    pub fn from_tokens(tokens: Vec<NormalizedToken>) -> Self {
        let mut unit: Option<String> = None;
        let mut number: Option<StreetNumber> = None;
        let mut state: Option<String> = None;
        let mut postcode: Option<String> = None;
        let mut street_type: Option<String> = None;
        let mut street_type_position: Option<usize> = None;

        // Positions consumed by unit handling, excluded from the number
        // scan below.
        let mut consumed = vec![false; tokens.len()];

        // "UNIT 5 ..." / "FLAT 2 ...": a marker claims the next number.
        for window_start in 0..tokens.len().saturating_sub(1) {
            let (marker, value) = (&tokens[window_start], &tokens[window_start + 1]);
            if marker.kind == TokenKind::UnitMarker
                && value.kind == TokenKind::Number
                && unit.is_none()
            {
                unit = Some(value.text.clone());
                consumed[window_start] = true;
                consumed[window_start + 1] = true;
            }
        }

        // "1/24 HIGH ST" arrives as two leading numbers after punctuation
        // stripping: the first is the unit, the second the street number.
        if unit.is_none()
            && tokens.len() >= 2
            && tokens[0].kind == TokenKind::Number
            && tokens[1].kind == TokenKind::Number
        {
            unit = Some(tokens[0].text.clone());
            consumed[0] = true;
        }

        for token in &tokens {
            match token.kind {
                TokenKind::Number => {
                    if number.is_none() && !consumed[token.position] {
                        number = parse_street_number(&token.text);
                    }
                }
                TokenKind::StateCode => {
                    if state.is_none() {
                        state = Some(token.text.clone());
                    }
                }
                TokenKind::Postcode => {
                    // Last postcode-shaped token wins; earlier ones were
                    // most likely misread street numbers.
                    postcode = Some(token.text.clone());
                }
                TokenKind::StreetType => {
                    if street_type.is_none() {
                        street_type = Some(token.text.clone());
                        street_type_position = Some(token.position);
                    }
                }
                TokenKind::UnitMarker | TokenKind::Word => {}
            }
        }

        let mut street_words = Vec::new();
        let mut locality_words = Vec::new();
        let split_known = street_type_position.is_some();

        for token in &tokens {
            if consumed[token.position] {
                continue;
            }
            match token.kind {
                TokenKind::Word => {
                    if let Some(split) = street_type_position {
                        if token.position < split {
                            street_words.push(token.text.clone());
                        } else {
                            locality_words.push(token.text.clone());
                        }
                    } else {
                        street_words.push(token.text.clone());
                        locality_words.push(token.text.clone());
                    }
                }
                // A street-type token after the split point is part of a
                // locality like "STREET KILDA" (expanded "ST KILDA").
                TokenKind::StreetType => {
                    if let Some(split) = street_type_position {
                        if token.position > split {
                            locality_words.push(token.text.clone());
                        }
                    }
                }
                _ => {}
            }
        }

        Self {
            tokens,
            unit,
            number,
            street_words,
            street_type,
            locality_words,
            state,
            postcode,
            split_known,
        }
    }
}

/// Parses a number token ("245", "12A") into a [`StreetNumber`].
fn parse_street_number(text: &str) -> Option<StreetNumber> {
    let captures = NUMBER_RE.captures(text)?;
    let first: u32 = captures.get(1)?.as_str().parse().ok()?;
    let suffix = captures.get(2).map(|m| m.as_str().to_string());
    Some(StreetNumber {
        first,
        last: None,
        suffix,
    })
}
