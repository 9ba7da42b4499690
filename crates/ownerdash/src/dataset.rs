//! Source dataset loading.
//!
//! The dataset is a headered CSV with one row per owner, already sorted by
//! descending acreage. Row order is display order; nothing here re-sorts.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// One owner row from the source dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OwnerRecord {
    /// 1-based position in file order.
    pub rank: usize,
    /// Owner name (`TOP_OWNER`).
    pub owner: String,
    /// Standardized mailing address (`MAIL_STD`). Joins to the edit maps;
    /// may be empty and may repeat across rows.
    pub mailing_address: String,
    /// Number of parcels held (`PARCEL_CNT`).
    pub parcel_count: u64,
    /// Total acreage across parcels (`TOTAL_ACRE`).
    pub total_acres: f64,
}

/// Raw CSV row. Columns not listed here are ignored.
#[derive(Debug, Deserialize)]
struct Row {
    #[serde(rename = "TOP_OWNER")]
    owner: String,
    #[serde(rename = "MAIL_STD")]
    mailing_address: String,
    #[serde(rename = "PARCEL_CNT", deserialize_with = "deserialize_count")]
    parcel_count: u64,
    #[serde(rename = "TOTAL_ACRE", deserialize_with = "deserialize_acres")]
    total_acres: f64,
}

/// Accepts `12` as well as `12.0`, which spreadsheet exports sometimes emit
/// for integer columns.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(n) = raw.parse::<u64>() {
        return Ok(n);
    }
    match raw.parse::<f64>() {
        Ok(n) if n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64 => Ok(n as u64),
        _ => Err(serde::de::Error::custom(format!(
            "expected a non-negative integer, found {raw:?}"
        ))),
    }
}

/// Acreage must be a finite, non-negative number.
fn deserialize_acres<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let acres = f64::deserialize(deserializer)?;
    if acres.is_finite() && acres >= 0.0 {
        Ok(acres)
    } else {
        Err(serde::de::Error::custom(format!(
            "expected a non-negative acreage, found {acres}"
        )))
    }
}

/// Load the dataset at `path`, preserving file order.
///
/// # Errors
///
/// Returns [`Error::DatasetOpen`] if the file cannot be opened or its header
/// cannot be read, and [`Error::DatasetParse`] for the first malformed row.
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Vec<OwnerRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| Error::DatasetOpen {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    let records = read_dataset(file, path)?;
    debug!("Loaded {} owner rows from {}", records.len(), path.display());
    Ok(records)
}

/// Parse dataset rows from any reader. `path` is only used in errors.
///
/// # Errors
///
/// See [`load_dataset`].
pub fn read_dataset<R: Read>(reader: R, path: &Path) -> Result<Vec<OwnerRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    // Surface a missing or unreadable header as an open failure.
    let headers = rdr.headers().map_err(|source| Error::DatasetOpen {
        path: path.to_path_buf(),
        source,
    })?;
    if headers.is_empty() {
        return Err(Error::DatasetOpen {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "missing header row")
                .into(),
        });
    }

    rdr.deserialize::<Row>()
        .enumerate()
        .map(|(idx, row)| {
            let row = row.map_err(|source| Error::DatasetParse {
                path: path.to_path_buf(),
                record: idx + 1,
                source,
            })?;
            Ok(OwnerRecord {
                rank: idx + 1,
                owner: row.owner,
                mailing_address: row.mailing_address,
                parcel_count: row.parcel_count,
                total_acres: row.total_acres,
            })
        })
        .collect()
}

/// Totals shown in the dashboard header.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DatasetSummary {
    /// Number of owner rows.
    pub owners: usize,
    /// Sum of `TOTAL_ACRE`.
    pub total_acres: f64,
    /// Sum of `PARCEL_CNT`.
    pub total_parcels: u64,
}

impl DatasetSummary {
    /// Compute totals over `records`.
    #[must_use]
    pub fn from_records(records: &[OwnerRecord]) -> Self {
        records.iter().fold(Self::default(), |acc, r| Self {
            owners: acc.owners + 1,
            total_acres: acc.total_acres + r.total_acres,
            total_parcels: acc.total_parcels.saturating_add(r.parcel_count),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "TOP_OWNER,MAIL_STD,PARCEL_CNT,TOTAL_ACRE\n";

    fn parse(body: &str) -> Result<Vec<OwnerRecord>> {
        read_dataset(body.as_bytes(), Path::new("test.csv"))
    }

    #[test]
    fn test_reads_rows_in_file_order() {
        let csv = format!(
            "{HEADER}SMALL FARMS LLC,PO BOX 9,2,10.5\nBIG RANCH INC,123 MAIN ST,3,500\n"
        );
        let records = parse(&csv).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].rank, 1);
        assert_eq!(records[0].owner, "SMALL FARMS LLC");
        assert_eq!(records[1].rank, 2);
        assert_eq!(records[1].mailing_address, "123 MAIN ST");
        assert_eq!(records[1].parcel_count, 3);
        assert!((records[1].total_acres - 500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_blank_mailing_address_is_empty_key() {
        let csv = format!("{HEADER}NO ADDRESS CO,,1,42.0\n");
        let records = parse(&csv).unwrap();
        assert_eq!(records[0].mailing_address, "");
    }

    #[test]
    fn test_extra_columns_ignored_and_fields_trimmed() {
        let csv = "APN,TOP_OWNER,MAIL_STD,PARCEL_CNT,TOTAL_ACRE,COUNTY\n\
                   001, ACME , 1 ELM ST ,4,12.25,TULARE\n";
        let records = parse(csv).unwrap();
        assert_eq!(records[0].owner, "ACME");
        assert_eq!(records[0].mailing_address, "1 ELM ST");
        assert_eq!(records[0].parcel_count, 4);
    }

    #[test]
    fn test_quoted_fields_with_commas() {
        let csv = format!("{HEADER}\"SMITH, JOHN & MARY\",\"PO BOX 1, FRESNO CA\",1,5\n");
        let records = parse(&csv).unwrap();
        assert_eq!(records[0].owner, "SMITH, JOHN & MARY");
        assert_eq!(records[0].mailing_address, "PO BOX 1, FRESNO CA");
    }

    #[test]
    fn test_parcel_count_accepts_integral_float() {
        let csv = format!("{HEADER}A,B,7.0,1\n");
        assert_eq!(parse(&csv).unwrap()[0].parcel_count, 7);
    }

    #[test]
    fn test_parcel_count_rejects_fraction() {
        let csv = format!("{HEADER}A,B,7.5,1\n");
        let err = parse(&csv).unwrap_err();
        assert!(matches!(err, Error::DatasetParse { record: 1, .. }));
    }

    #[test]
    fn test_acreage_rejects_negative_and_non_finite() {
        for acres in ["-3.5", "NaN", "inf"] {
            let csv = format!("{HEADER}A,B,1,{acres}\n");
            let err = parse(&csv).unwrap_err();
            assert!(
                matches!(err, Error::DatasetParse { record: 1, .. }),
                "acres: {acres}"
            );
        }
    }

    #[test]
    fn test_acreage_accepts_zero() {
        let csv = format!("{HEADER}A,B,1,0\n");
        assert!(parse(&csv).unwrap()[0].total_acres.abs() < f64::EPSILON);
    }

    #[test]
    fn test_malformed_row_reports_record_number() {
        let csv = format!("{HEADER}A,B,1,1\nC,D,x,2\n");
        match parse(&csv).unwrap_err() {
            Error::DatasetParse { record, path, .. } => {
                assert_eq!(record, 2);
                assert_eq!(path, Path::new("test.csv"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "TOP_OWNER,PARCEL_CNT,TOTAL_ACRE\nA,1,1\n";
        assert!(parse(csv).unwrap_err().is_dataset_error());
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, Error::DatasetOpen { .. }));
        assert!(err.to_string().contains("missing header row"));
    }

    #[test]
    fn test_header_only_is_empty_dataset() {
        assert!(parse(HEADER).unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_dataset("/nonexistent/top200.csv").unwrap_err();
        assert!(matches!(err, Error::DatasetOpen { .. }));
        assert!(err.to_string().contains("/nonexistent/top200.csv"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}OWNER ONE,PO BOX 1,3,1200.9").unwrap();

        let records = load_dataset(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].owner, "OWNER ONE");
    }

    #[test]
    fn test_summary() {
        let csv = format!("{HEADER}A,X,3,500\nB,Y,1200,0.75\n");
        let summary = DatasetSummary::from_records(&parse(&csv).unwrap());

        assert_eq!(summary.owners, 2);
        assert_eq!(summary.total_parcels, 1203);
        assert!((summary.total_acres - 500.75).abs() < 1e-9);
    }

    #[test]
    fn test_summary_empty() {
        assert_eq!(DatasetSummary::from_records(&[]), DatasetSummary::default());
    }
}
