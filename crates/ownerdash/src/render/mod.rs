//! HTML rendering for the dashboard page.
//!
//! The page is self-contained: stylesheet and client script are compiled in
//! and inlined. Output depends only on its inputs, so two renders of the same
//! dataset and edits are byte-identical.

use std::fmt::Write as _;

use v_htmlescape::escape;

use crate::config::Config;
use crate::dashboard::{Dashboard, DashboardRow};
use crate::export::EXPORT_HEADER;
use crate::store::EditField;

const DASHBOARD_CSS: &str = include_str!("assets/dashboard.css");
const DASHBOARD_JS: &str = include_str!("assets/dashboard.js");

/// Render the full dashboard document.
#[must_use]
pub fn render_dashboard(dashboard: &Dashboard<'_>, config: &Config) -> String {
    let title = config.dashboard.title.as_str();
    let rv_file = config.data.rv_edits_path.display().to_string();
    let packer_file = config.data.packer_edits_path.display().to_string();
    let export_header = EXPORT_HEADER.join(",");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{css}    </style>
</head>
<body data-export-name="{export_name}" data-export-header="{export_header}">
    <h1>{title}</h1>
    <p class="subtitle">By total acreage &bull; Edits saved to: {rv_file} &amp; {packer_file}</p>
{toolbar}{stats}{table}
    <script>
{js}    </script>
</body>
</html>
"#,
        title = escape(title),
        css = DASHBOARD_CSS,
        js = DASHBOARD_JS,
        export_name = escape(&config.dashboard.export_file_name),
        export_header = escape(&export_header),
        rv_file = escape(&rv_file),
        packer_file = escape(&packer_file),
        toolbar = render_toolbar(),
        stats = render_stats(dashboard),
        table = render_table(dashboard),
    )
}

fn render_toolbar() -> &'static str {
    r#"
    <div class="toolbar">
        <button id="saveAll" class="primary">SAVE ALL</button>
        <button id="exportCsv">Export CSV</button>
        <button id="clearEdits">Clear All Edits</button>
        <span id="saveStatus"></span>
    </div>
"#
}

fn render_stats(dashboard: &Dashboard<'_>) -> String {
    let boxes = [
        (
            group_thousands(whole_acres(dashboard.summary.total_acres)),
            format!("Total Acres (Top {})", dashboard.summary.owners),
        ),
        (
            group_thousands(dashboard.summary.total_parcels),
            "Parcels".to_string(),
        ),
        (
            group_thousands(dashboard.edit_count(EditField::Rv) as u64),
            format!("{} Edits", EditField::Rv.label()),
        ),
        (
            group_thousands(dashboard.edit_count(EditField::Packer) as u64),
            format!("{} Edits", EditField::Packer.label()),
        ),
    ];

    let mut html = String::from("\n    <div class=\"stats\">\n");
    for (value, label) in boxes {
        let _ = write!(
            html,
            r#"        <div class="stat-box">
            <div class="stat-value">{value}</div>
            <div class="stat-label">{label}</div>
        </div>
"#,
            label = escape(&label),
        );
    }
    html.push_str("    </div>\n");
    html
}

fn render_table(dashboard: &Dashboard<'_>) -> String {
    let mut html = String::from(
        r#"
    <table>
        <thead>
            <tr>
                <th>#</th>
                <th>Owner Name</th>
                <th>Rv_Owner</th>
                <th>Packer</th>
                <th>Mailing Address</th>
                <th>Parcels</th>
                <th>Acres</th>
            </tr>
        </thead>
        <tbody>
"#,
    );
    for row in &dashboard.rows {
        render_row(&mut html, row);
    }
    html.push_str("        </tbody>\n    </table>\n");
    html
}

fn render_row(html: &mut String, row: &DashboardRow<'_>) {
    let record = row.record;
    let acres = whole_acres(record.total_acres);
    let _ = write!(
        html,
        r#"            <tr{row_class}>
                <td class="rank">{rank}</td>
                <td class="owner">{owner}</td>
                <td class="rv-owner">{rv_input}</td>
                <td class="packer">{packer_input}</td>
                <td class="address">{address}</td>
                <td class="parcels" data-value="{parcels}">{parcels_display}</td>
                <td class="acres" data-value="{acres}">{acres_display}</td>
            </tr>
"#,
        row_class = if row.is_highlighted() { r#" class="top3""# } else { "" },
        rank = record.rank,
        owner = escape(&record.owner),
        rv_input = render_input(row, EditField::Rv),
        packer_input = render_input(row, EditField::Packer),
        address = escape(&record.mailing_address),
        parcels = record.parcel_count,
        parcels_display = group_thousands(record.parcel_count),
        acres_display = group_thousands(acres),
    );
}

fn render_input(row: &DashboardRow<'_>, field: EditField) -> String {
    let value = row.value(field).unwrap_or_default();
    let class = if value.is_empty() { "" } else { " class=\"edited\"" };
    format!(
        r#"<input type="text"{class} data-key="{key}" data-field="{field}" value="{value}">"#,
        key = escape(&row.record.mailing_address),
        value = escape(value),
    )
}

/// Whole acres, truncated toward zero. Negative inputs clamp to zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn whole_acres(acres: f64) -> u64 {
    if acres.is_finite() {
        acres.max(0.0).trunc() as u64
    } else {
        0
    }
}

/// Format `n` with comma thousands separators (`1234567` -> `1,234,567`).
#[must_use]
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
