//! CSV export of the joined dataset and edits.
//!
//! Column layout matches the browser's "Export CSV" button.

use std::io::Write;

use serde::Serialize;

use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::render::whole_acres;

/// Header line. The page carries it as `data-export-header` for the
/// browser's export.
pub const EXPORT_HEADER: [&str; 7] = [
    "Rank",
    "Owner",
    "Rv_Owner",
    "Packer",
    "Mailing_Address",
    "Parcels",
    "Acres",
];

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    rank: usize,
    owner: &'a str,
    rv_owner: &'a str,
    packer: &'a str,
    mailing_address: &'a str,
    parcels: u64,
    acres: u64,
}

/// Write every dashboard row as CSV with a header line.
///
/// Returns the number of data rows written.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_csv<W: Write>(dashboard: &Dashboard<'_>, out: W) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    writer.write_record(EXPORT_HEADER)?;
    for row in &dashboard.rows {
        writer.serialize(ExportRow {
            rank: row.record.rank,
            owner: &row.record.owner,
            rv_owner: row.rv.unwrap_or_default(),
            packer: row.packer.unwrap_or_default(),
            mailing_address: &row.record.mailing_address,
            parcels: row.record.parcel_count,
            acres: whole_acres(row.record.total_acres),
        })?;
    }
    writer.flush()?;
    Ok(dashboard.rows.len())
}
