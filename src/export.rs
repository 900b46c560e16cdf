//! CSV rendering of the visible record set.
//!
//! The creation timestamp is written in the storage time zone (UTC); only the
//! on-screen list view applies the display-zone conversion.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::scope::VisibleOpportunity;

pub const CSV_COLUMNS: [&str; 13] = [
    "ID",
    "Creation Date",
    "Preventa Name",
    "Opportunity Name",
    "Deal ID",
    "Client",
    "Salesperson",
    "Product",
    "Requested Date",
    "Delivery Date",
    "Preventa Status",
    "Commercial Status Description",
    "Comments",
];

/// Render the rows the scoping policy produced. The "Preventa Name" column
/// carries the owner username only when the policy resolved it (admin
/// callers); for everyone else it stays empty.
pub fn format_csv(rows: &[VisibleOpportunity]) -> String {
    let mut csv = String::new();
    let _ = writeln!(csv, "{}", CSV_COLUMNS.join(","));

    for row in rows {
        let o = &row.record;
        let fields = [
            o.id.to_string(),
            o.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            row.owner.clone().unwrap_or_default(),
            o.name.clone(),
            o.deal_id.clone().unwrap_or_default(),
            o.client.clone(),
            o.salesperson.clone(),
            o.product.clone(),
            o.requested_date.format("%Y-%m-%d").to_string(),
            o.delivery_date.format("%Y-%m-%d").to_string(),
            o.status.clone(),
            o.status_description.clone().unwrap_or_default(),
            o.comments.clone().unwrap_or_default(),
        ];
        let line: Vec<String> = fields.iter().map(|f| csv_escape(f)).collect();
        let _ = writeln!(csv, "{}", line.join(","));
    }

    csv
}

/// `Opportunities<year>_<DD-MM-YYYY_HH-MM>.csv`
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!(
        "Opportunities{}_{}.csv",
        now.format("%Y"),
        now.format("%d-%m-%Y_%H-%M")
    )
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
