#![allow(clippy::too_many_lines)]
//! Street type, directional, and unit-marker synonym tables.
//!
//! These tables map common abbreviations to their canonical expanded
//! forms. They are applied symmetrically at index time and query time
//! so that "245 HIGH ST" matches "245 HIGH STREET".
//!
//! The built-in tables cover the Australian street-type vocabulary used
//! by GNAF-style reference datasets. Callers with a different
//! jurisdiction can supply their own [`SynonymTable`]; the tables are
//! data, not logic.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

/// Maps street type abbreviations to their canonical full form.
///
/// Source: GNAF `STREET_TYPE_AUT` codes plus common informal variants.
static STREET_TYPES: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    BTreeMap::from([
        ("ALLY", "ALLEY"),
        ("APP", "APPROACH"),
        ("ARC", "ARCADE"),
        ("AV", "AVENUE"),
        ("AVE", "AVENUE"),
        ("BVD", "BOULEVARD"),
        ("BLVD", "BOULEVARD"),
        ("BND", "BEND"),
        ("BRK", "BREAK"),
        ("BDGE", "BRIDGE"),
        ("BDWY", "BROADWAY"),
        ("BYPA", "BYPASS"),
        ("CSWY", "CAUSEWAY"),
        ("CTR", "CENTRE"),
        ("CH", "CHASE"),
        ("CIR", "CIRCLE"),
        ("CCT", "CIRCUIT"),
        ("CRCS", "CIRCUS"),
        ("CL", "CLOSE"),
        ("CON", "CONCOURSE"),
        ("CNR", "CORNER"),
        ("CT", "COURT"),
        ("CTYD", "COURTYARD"),
        ("CR", "CRESCENT"),
        ("CRES", "CRESCENT"),
        ("CRST", "CREST"),
        ("CRSS", "CROSS"),
        ("DR", "DRIVE"),
        ("DVE", "DRIVE"),
        ("ENT", "ENTRANCE"),
        ("ESP", "ESPLANADE"),
        ("EXP", "EXPRESSWAY"),
        ("FAWY", "FAIRWAY"),
        ("FTRK", "FIRETRACK"),
        ("FWY", "FREEWAY"),
        ("FRNT", "FRONT"),
        ("GAP", "GAP"),
        ("GDN", "GARDEN"),
        ("GDNS", "GARDENS"),
        ("GTE", "GATE"),
        ("GLD", "GLADE"),
        ("GLEN", "GLEN"),
        ("GRA", "GRANGE"),
        ("GRN", "GREEN"),
        ("GR", "GROVE"),
        ("HTS", "HEIGHTS"),
        ("HIRD", "HIGHROAD"),
        ("HWY", "HIGHWAY"),
        ("JNC", "JUNCTION"),
        ("LANE", "LANE"),
        ("LN", "LANE"),
        ("LNWY", "LANEWAY"),
        ("LINK", "LINK"),
        ("LKT", "LOOKOUT"),
        ("LOOP", "LOOP"),
        ("MALL", "MALL"),
        ("MNDR", "MEANDER"),
        ("MEWS", "MEWS"),
        ("MTWY", "MOTORWAY"),
        ("NOOK", "NOOK"),
        ("OTLK", "OUTLOOK"),
        ("PDE", "PARADE"),
        ("PWY", "PARKWAY"),
        ("PKWY", "PARKWAY"),
        ("PASS", "PASS"),
        ("PSGE", "PASSAGE"),
        ("PATH", "PATH"),
        ("PWAY", "PATHWAY"),
        ("PIAZ", "PIAZZA"),
        ("PL", "PLACE"),
        ("PLZA", "PLAZA"),
        ("PKT", "POCKET"),
        ("PNT", "POINT"),
        ("PROM", "PROMENADE"),
        ("QDRT", "QUADRANT"),
        ("QYS", "QUAYS"),
        ("RMBL", "RAMBLE"),
        ("REST", "REST"),
        ("RTT", "RETREAT"),
        ("RDGE", "RIDGE"),
        ("RISE", "RISE"),
        ("RD", "ROAD"),
        ("RTY", "ROTARY"),
        ("RTE", "ROUTE"),
        ("ROW", "ROW"),
        ("SVWY", "SERVICEWAY"),
        ("SHUN", "SHUNT"),
        ("SPUR", "SPUR"),
        ("SQ", "SQUARE"),
        ("ST", "STREET"),
        ("STR", "STREET"),
        ("SBWY", "SUBWAY"),
        ("TARN", "TARN"),
        ("TCE", "TERRACE"),
        ("THOR", "THOROUGHFARE"),
        ("TLWY", "TOLLWAY"),
        ("TOP", "TOP"),
        ("TOR", "TOR"),
        ("TRK", "TRACK"),
        ("TRL", "TRAIL"),
        ("TURN", "TURN"),
        ("UPAS", "UNDERPASS"),
        ("VALE", "VALE"),
        ("VIAD", "VIADUCT"),
        ("VIEW", "VIEW"),
        ("VSTA", "VISTA"),
        ("WALK", "WALK"),
        ("WAY", "WAY"),
        ("WKWY", "WALKWAY"),
        ("WHRF", "WHARF"),
        ("WYND", "WYND"),
    ])
});

/// Maps directional abbreviations to their full form.
static DIRECTIONALS: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    BTreeMap::from([
        ("N", "NORTH"),
        ("NTH", "NORTH"),
        ("S", "SOUTH"),
        ("STH", "SOUTH"),
        ("E", "EAST"),
        ("W", "WEST"),
        ("NE", "NORTHEAST"),
        ("NW", "NORTHWEST"),
        ("SE", "SOUTHEAST"),
        ("SW", "SOUTHWEST"),
    ])
});

/// Unit/flat marker words. "U" is handled as both a marker and an
/// abbreviation ("U 5" and "UNIT 5" read the same).
static UNIT_MARKERS: LazyLock<BTreeSet<&'static str>> = LazyLock::new(|| {
    BTreeSet::from([
        "UNIT",
        "U",
        "FLAT",
        "APT",
        "APARTMENT",
        "SUITE",
        "SHOP",
        "LOT",
        "VILLA",
        "ROOM",
    ])
});

/// Australian state and territory abbreviations.
static STATES: LazyLock<BTreeSet<&'static str>> = LazyLock::new(|| {
    BTreeSet::from(["NSW", "VIC", "QLD", "SA", "WA", "TAS", "NT", "ACT", "OT"])
});

/// Abbreviation and classification tables used by the normalizer.
///
/// [`SynonymTable::default()`] gives the built-in GNAF-oriented tables.
/// A caller-supplied table replaces the dictionary wholesale.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    street_types: BTreeMap<String, String>,
    canonical_street_types: BTreeSet<String>,
    directionals: BTreeMap<String, String>,
    unit_markers: BTreeSet<String>,
    states: BTreeSet<String>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::from_parts(
            STREET_TYPES.iter().map(|(k, v)| (*k, *v)),
            DIRECTIONALS.iter().map(|(k, v)| (*k, *v)),
            UNIT_MARKERS.iter().copied(),
            STATES.iter().copied(),
        )
    }
}

impl SynonymTable {
    /// Builds a table from caller-supplied entries.
    ///
    /// Street type and directional entries map abbreviation → canonical
    /// form; canonical forms are also recognized as their own kind.
    pub fn from_parts<'a>(
        street_types: impl IntoIterator<Item = (&'a str, &'a str)>,
        directionals: impl IntoIterator<Item = (&'a str, &'a str)>,
        unit_markers: impl IntoIterator<Item = &'a str>,
        states: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let street_types: BTreeMap<String, String> = street_types
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v.to_uppercase()))
            .collect();
        let canonical_street_types = street_types.values().cloned().collect();

        Self {
            street_types,
            canonical_street_types,
            directionals: directionals
                .into_iter()
                .map(|(k, v)| (k.to_uppercase(), v.to_uppercase()))
                .collect(),
            unit_markers: unit_markers.into_iter().map(str::to_uppercase).collect(),
            states: states.into_iter().map(str::to_uppercase).collect(),
        }
    }

    /// Expands a single token if it matches a known abbreviation.
    ///
    /// Checks directional abbreviations first, then street types.
    /// Returns the expanded form or the original token unchanged.
    #[must_use]
    pub fn expand_token<'a>(&'a self, token: &'a str) -> &'a str {
        if let Some(expanded) = self.directionals.get(token) {
            return expanded;
        }
        if let Some(expanded) = self.street_types.get(token) {
            return expanded;
        }
        token
    }

    /// Returns `true` if the token is a known street type abbreviation
    /// or its canonical expanded form.
    #[must_use]
    pub fn is_street_type(&self, token: &str) -> bool {
        self.street_types.contains_key(token) || self.canonical_street_types.contains(token)
    }

    /// Returns `true` if the token is a known directional abbreviation
    /// or its canonical expanded form.
    #[must_use]
    pub fn is_directional(&self, token: &str) -> bool {
        self.directionals.contains_key(token)
            || self.directionals.values().any(|canonical| canonical == token)
    }

    /// Returns `true` if the token is a unit/flat marker word.
    #[must_use]
    pub fn is_unit_marker(&self, token: &str) -> bool {
        self.unit_markers.contains(token)
    }

    /// Returns `true` if the token is a known state abbreviation.
    #[must_use]
    pub fn is_state(&self, token: &str) -> bool {
        self.states.contains(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_street_types() {
        let table = SynonymTable::default();
        assert_eq!(table.expand_token("ST"), "STREET");
        assert_eq!(table.expand_token("RD"), "ROAD");
        assert_eq!(table.expand_token("AVE"), "AVENUE");
        assert_eq!(table.expand_token("PDE"), "PARADE");
        assert_eq!(table.expand_token("CRES"), "CRESCENT");
        assert_eq!(table.expand_token("TCE"), "TERRACE");
        assert_eq!(table.expand_token("CCT"), "CIRCUIT");
        assert_eq!(table.expand_token("HWY"), "HIGHWAY");
    }

    #[test]
    fn expands_directionals() {
        let table = SynonymTable::default();
        assert_eq!(table.expand_token("N"), "NORTH");
        assert_eq!(table.expand_token("NTH"), "NORTH");
        assert_eq!(table.expand_token("STH"), "SOUTH");
        assert_eq!(table.expand_token("SW"), "SOUTHWEST");
    }

    #[test]
    fn passes_through_unknown_tokens() {
        let table = SynonymTable::default();
        assert_eq!(table.expand_token("HIGH"), "HIGH");
        assert_eq!(table.expand_token("PRAHRAN"), "PRAHRAN");
        assert_eq!(table.expand_token("245"), "245");
    }

    #[test]
    fn identifies_street_types() {
        let table = SynonymTable::default();
        assert!(table.is_street_type("ST"));
        assert!(table.is_street_type("STREET"));
        assert!(table.is_street_type("PDE"));
        assert!(table.is_street_type("PARADE"));
        assert!(!table.is_street_type("HIGH"));
    }

    #[test]
    fn identifies_unit_markers() {
        let table = SynonymTable::default();
        assert!(table.is_unit_marker("UNIT"));
        assert!(table.is_unit_marker("FLAT"));
        assert!(table.is_unit_marker("U"));
        assert!(!table.is_unit_marker("HIGH"));
    }

    #[test]
    fn identifies_states() {
        let table = SynonymTable::default();
        assert!(table.is_state("VIC"));
        assert!(table.is_state("NSW"));
        assert!(table.is_state("ACT"));
        assert!(!table.is_state("XYZ"));
    }

    #[test]
    fn caller_supplied_table_replaces_builtins() {
        let table = SynonymTable::from_parts(
            [("STRASSE", "STREET")],
            [] as [(&str, &str); 0],
            ["WHG"],
            ["BE"],
        );
        assert_eq!(table.expand_token("STRASSE"), "STREET");
        assert_eq!(table.expand_token("ST"), "ST");
        assert!(table.is_unit_marker("WHG"));
        assert!(table.is_state("BE"));
        assert!(!table.is_state("VIC"));
    }
}
