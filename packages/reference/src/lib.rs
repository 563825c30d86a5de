#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reference address dataset loader.
//!
//! Parses GNAF-style address exports (pipe-delimited `.psv` or
//! comma-delimited `.csv`) and yields validated, normalized
//! [`ReferenceRecord`]s for indexing. Text fields pass through the same
//! normalization pipeline the resolver applies to queries, so index
//! keys and query tokens always agree.
//!
//! Malformed rows are skipped with a log line rather than failing the
//! whole load; a missing or unreadable store is an error, because the
//! engine cannot serve queries without a reference snapshot.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use address_match_resolver::index::ReferenceIndex;
use address_match_resolver::normalize;
use address_match_resolver::synonyms::SynonymTable;
use address_match_resolver_models::{Geocode, ReferenceRecord, StreetNumber};

/// A raw row from a GNAF-style address export.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    /// Persistent address identifier.
    #[serde(rename = "ADDRESS_DETAIL_PID")]
    pub pid: String,
    /// Flat/unit number.
    #[serde(rename = "FLAT_NUMBER", default)]
    pub flat_number: String,
    /// First (or only) street number.
    #[serde(rename = "NUMBER_FIRST", default)]
    pub number_first: String,
    /// Letter suffix on the first number ("A" in "12A").
    #[serde(rename = "NUMBER_FIRST_SUFFIX", default)]
    pub number_first_suffix: String,
    /// Last street number of a range ("247" in "245-247").
    #[serde(rename = "NUMBER_LAST", default)]
    pub number_last: String,
    /// Street name.
    #[serde(rename = "STREET_NAME", default)]
    pub street_name: String,
    /// Street type code ("STREET", "ROAD", ...).
    #[serde(rename = "STREET_TYPE_CODE", default)]
    pub street_type: String,
    /// Locality (suburb/town) name.
    #[serde(rename = "LOCALITY_NAME", default)]
    pub locality: String,
    /// State abbreviation.
    #[serde(rename = "STATE_ABBREVIATION", default)]
    pub state: String,
    /// 4-digit postcode.
    #[serde(rename = "POSTCODE", default)]
    pub postcode: String,
    /// Latitude (WGS84).
    #[serde(rename = "LATITUDE", default)]
    pub latitude: Option<f64>,
    /// Longitude (WGS84).
    #[serde(rename = "LONGITUDE", default)]
    pub longitude: Option<f64>,
}

impl RawRow {
    /// Converts this raw row into a validated reference record.
    ///
    /// Returns `None` if required fields (pid, street name, locality,
    /// state, postcode) are missing. Coordinates are optional; invalid
    /// ones are dropped rather than failing the row.
    #[must_use]
    pub fn to_record(&self, table: &SynonymTable) -> Option<ReferenceRecord> {
        let pid = self.pid.trim();
        if pid.is_empty() {
            return None;
        }

        let street_name = normalize::normalize_field(&self.street_name, table);
        let locality = normalize::normalize_field(&self.locality, table);
        let state = self.state.trim().to_uppercase();
        let postcode = self.postcode.trim().to_string();

        if street_name.is_empty() || locality.is_empty() || state.is_empty() || postcode.is_empty()
        {
            return None;
        }

        let street_type = {
            let normalized = normalize::normalize_field(&self.street_type, table);
            if normalized.is_empty() {
                None
            } else {
                Some(normalized)
            }
        };

        let unit = {
            let trimmed = self.flat_number.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_uppercase())
            }
        };

        Some(ReferenceRecord {
            id: pid.to_string(),
            unit,
            number: self.parse_number(),
            street_name,
            street_type,
            locality,
            state,
            postcode,
            geocode: self.parse_geocode(),
        })
    }

    fn parse_number(&self) -> Option<StreetNumber> {
        let first: u32 = self.number_first.trim().parse().ok()?;
        let last: Option<u32> = self.number_last.trim().parse().ok();
        let suffix = {
            let trimmed = self.number_first_suffix.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_uppercase())
            }
        };
        Some(StreetNumber {
            first,
            last: last.filter(|l| *l > first),
            suffix,
        })
    }

    fn parse_geocode(&self) -> Option<Geocode> {
        let (latitude, longitude) = (self.latitude?, self.longitude?);
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Geocode {
            latitude,
            longitude,
        })
    }
}

/// Loads all records from a reference store file.
///
/// The delimiter follows the extension: `|` for `.psv`, `,` otherwise.
///
/// # Errors
///
/// Returns an error if the store does not exist or cannot be parsed at
/// all. Individually malformed rows are skipped, not fatal.
pub fn load_records(path: &Path) -> Result<Vec<ReferenceRecord>, ReferenceError> {
    if !path.exists() {
        return Err(ReferenceError::StoreNotFound(path.display().to_string()));
    }

    let file = std::fs::File::open(path).map_err(|e| ReferenceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let table = SynonymTable::default();
    let mut records = Vec::new();
    let count = parse_reader(file, delimiter_for(path), &table, |record| {
        records.push(record);
    })
    .map_err(|source| ReferenceError::Csv {
        path: path.display().to_string(),
        source,
    })?;

    log::info!("Loaded {count} reference records from {}", path.display());

    Ok(records)
}

/// Loads a reference store and builds the index snapshot over it.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded or holds no valid
/// records.
pub fn load_index(path: &Path) -> Result<Arc<ReferenceIndex>, ReferenceError> {
    let records = load_records(path)?;
    if records.is_empty() {
        return Err(ReferenceError::EmptyStore(path.display().to_string()));
    }
    Ok(Arc::new(ReferenceIndex::build(records)))
}

/// Parses reference rows from any `Read` source.
///
/// Invokes the callback once per valid record and returns the count of
/// records yielded. Malformed rows are logged and skipped.
///
/// # Errors
///
/// Returns an error if the source is not readable as delimited data.
pub fn parse_reader(
    reader: impl Read,
    delimiter: u8,
    table: &SynonymTable,
    mut on_record: impl FnMut(ReferenceRecord),
) -> Result<u64, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let mut count = 0u64;
    for result in csv_reader.deserialize::<RawRow>() {
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                log::trace!("  skipping malformed row: {e}");
                continue;
            }
        };

        if let Some(record) = row.to_record(table) {
            on_record(record);
            count += 1;
        } else {
            log::trace!("  skipping incomplete row: {}", row.pid);
        }
    }

    Ok(count)
}

fn delimiter_for(path: &Path) -> u8 {
    if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("psv"))
    {
        b'|'
    } else {
        b','
    }
}

/// Errors from reference store loading.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    /// CSV parsing error.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// Path to the store file.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// I/O error reading the store.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Store file does not exist.
    #[error("Reference store not found: {0}")]
    StoreNotFound(String),

    /// Store parsed but yielded no valid records.
    #[error("Reference store has no valid records: {0}")]
    EmptyStore(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "ADDRESS_DETAIL_PID|FLAT_NUMBER|NUMBER_FIRST|NUMBER_FIRST_SUFFIX|NUMBER_LAST|STREET_NAME|STREET_TYPE_CODE|LOCALITY_NAME|STATE_ABBREVIATION|POSTCODE|LATITUDE|LONGITUDE";

    fn parse_rows(data: &str) -> Vec<ReferenceRecord> {
        let table = SynonymTable::default();
        let mut records = Vec::new();
        parse_reader(data.as_bytes(), b'|', &table, |r| records.push(r)).unwrap();
        records
    }

    #[test]
    fn parses_basic_row() {
        let data = format!(
            "{HEADER}\nGAVIC411711441||245|||HIGH|STREET|PRAHRAN|VIC|3181|-37.8500|144.9930\n"
        );
        let records = parse_rows(&data);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.id, "GAVIC411711441");
        assert_eq!(record.number, Some(StreetNumber::exact(245)));
        assert_eq!(record.street_name, "HIGH");
        assert_eq!(record.street_type.as_deref(), Some("STREET"));
        assert_eq!(record.locality, "PRAHRAN");
        assert_eq!(record.state, "VIC");
        assert_eq!(record.postcode, "3181");
        assert!(record.geocode.is_some());
    }

    #[test]
    fn normalizes_abbreviated_fields() {
        let data = format!("{HEADER}\nGAVIC1||245|||High|St|St Kilda|vic|3182||\n");
        let records = parse_rows(&data);
        assert_eq!(records[0].street_name, "HIGH");
        assert_eq!(records[0].street_type.as_deref(), Some("STREET"));
        assert_eq!(records[0].locality, "STREET KILDA");
        assert_eq!(records[0].state, "VIC");
    }

    #[test]
    fn parses_number_range_and_suffix() {
        let data = format!(
            "{HEADER}\nGAVIC1|2|245|A|247|HIGH|STREET|PRAHRAN|VIC|3181||\n"
        );
        let records = parse_rows(&data);
        let number = records[0].number.as_ref().unwrap();
        assert_eq!(number.first, 245);
        assert_eq!(number.last, Some(247));
        assert_eq!(number.suffix.as_deref(), Some("A"));
        assert_eq!(records[0].unit.as_deref(), Some("2"));
    }

    #[test]
    fn drops_inverted_number_range() {
        let data = format!("{HEADER}\nGAVIC1||245||100|HIGH|STREET|PRAHRAN|VIC|3181||\n");
        let records = parse_rows(&data);
        assert_eq!(records[0].number.as_ref().unwrap().last, None);
    }

    #[test]
    fn skips_rows_missing_required_fields() {
        let data = format!(
            "{HEADER}\n\
             ||245|||HIGH|STREET|PRAHRAN|VIC|3181||\n\
             GAVIC2||245|||HIGH|STREET||VIC|3181||\n\
             GAVIC3||245|||HIGH|STREET|PRAHRAN||3181||\n\
             GAVIC4||245|||HIGH|STREET|PRAHRAN|VIC|||\n\
             GAVIC5||245|||HIGH|STREET|PRAHRAN|VIC|3181||\n"
        );
        let records = parse_rows(&data);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "GAVIC5");
    }

    #[test]
    fn drops_out_of_range_coordinates() {
        let data = format!("{HEADER}\nGAVIC1||245|||HIGH|STREET|PRAHRAN|VIC|3181|95.0|144.9\n");
        let records = parse_rows(&data);
        assert!(records[0].geocode.is_none());
    }

    #[test]
    fn row_without_street_number_still_loads() {
        let data = format!("{HEADER}\nGAVIC1|||||HIGH|STREET|PRAHRAN|VIC|3181||\n");
        let records = parse_rows(&data);
        assert_eq!(records[0].number, None);
    }

    #[test]
    fn missing_store_is_an_error() {
        let result = load_records(Path::new("/nonexistent/reference.psv"));
        assert!(matches!(result, Err(ReferenceError::StoreNotFound(_))));
    }

    #[test]
    fn loads_psv_file_from_disk() {
        let tmp = std::env::temp_dir().join("address_match_reference_psv_test");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        let path = tmp.join("reference.psv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(
            file,
            "GAVIC411711441||245|||HIGH|STREET|PRAHRAN|VIC|3181|-37.85|144.99"
        )
        .unwrap();
        writeln!(
            file,
            "GAVIC411711443||247|||HIGH|STREET|PRAHRAN|VIC|3181|-37.85|144.99"
        )
        .unwrap();

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 2);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn loads_comma_delimited_csv() {
        let tmp = std::env::temp_dir().join("address_match_reference_csv_test");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        let path = tmp.join("reference.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", HEADER.replace('|', ",")).unwrap();
        writeln!(file, "GAVIC1,,245,,,HIGH,STREET,PRAHRAN,VIC,3181,,").unwrap();

        let records = load_records(&path).unwrap();
        assert_eq!(records.len(), 1);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn load_index_rejects_empty_store() {
        let tmp = std::env::temp_dir().join("address_match_reference_empty_test");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        let path = tmp.join("reference.psv");
        std::fs::write(&path, format!("{HEADER}\n")).unwrap();

        let result = load_index(&path);
        assert!(matches!(result, Err(ReferenceError::EmptyStore(_))));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
