//! Joins dataset rows with the edit maps.
//!
//! Both the HTML page and the CSV export are built from a [`Dashboard`], so
//! they always agree on which edit value belongs to which row.

use crate::dataset::{DatasetSummary, OwnerRecord};
use crate::store::{EditField, Edits};

/// Rows at or above this rank are highlighted.
pub const HIGHLIGHT_RANKS: usize = 3;

/// A dataset row with its edit values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardRow<'a> {
    /// The source row.
    pub record: &'a OwnerRecord,
    /// `Rv_Owner` value for the row's mailing address.
    pub rv: Option<&'a str>,
    /// `Packer` value for the row's mailing address.
    pub packer: Option<&'a str>,
}

impl DashboardRow<'_> {
    /// The edit value for `field`.
    #[must_use]
    pub fn value(&self, field: EditField) -> Option<&str> {
        match field {
            EditField::Rv => self.rv,
            EditField::Packer => self.packer,
        }
    }

    /// Whether this row is one of the top-ranked rows.
    #[must_use]
    pub fn is_highlighted(&self) -> bool {
        self.record.rank <= HIGHLIGHT_RANKS
    }
}

/// Everything the page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard<'a> {
    /// Dataset totals.
    pub summary: DatasetSummary,
    /// Entries in the stored `Rv_Owner` map.
    pub rv_edits: usize,
    /// Entries in the stored `Packer` map.
    pub packer_edits: usize,
    /// One row per dataset record, in file order.
    pub rows: Vec<DashboardRow<'a>>,
}

impl<'a> Dashboard<'a> {
    /// Join `records` with `edits` by mailing address.
    ///
    /// Edit counts are the sizes of the stored maps, including keys that no
    /// longer match any row.
    #[must_use]
    pub fn join(records: &'a [OwnerRecord], edits: &'a Edits) -> Self {
        let rows = records
            .iter()
            .map(|record| DashboardRow {
                record,
                rv: edits.value(EditField::Rv, &record.mailing_address),
                packer: edits.value(EditField::Packer, &record.mailing_address),
            })
            .collect();

        Self {
            summary: DatasetSummary::from_records(records),
            rv_edits: edits.count(EditField::Rv),
            packer_edits: edits.count(EditField::Packer),
            rows,
        }
    }

    /// Stored entry count for `field`.
    #[must_use]
    pub fn edit_count(&self, field: EditField) -> usize {
        match field {
            EditField::Rv => self.rv_edits,
            EditField::Packer => self.packer_edits,
        }
    }
}
