//! Wide-table CSV export.

use std::io::Write;

use risk_core::RiskTable;
use serde::Serialize;

/// One exported row: identity columns, the five categories, then composite.
#[derive(Serialize)]
struct WideRow<'a> {
    company: &'a str,
    year: &'a str,
    industry: &'a str,
    market: f64,
    credit: f64,
    operational: f64,
    legal_compliance: f64,
    technical: f64,
    composite: f64,
}

/// Write the shaped table as CSV with a header row.
pub fn write_wide_csv<W: Write>(table: &RiskTable, writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in table.rows() {
        writer.serialize(WideRow {
            company: &row.company,
            year: &row.year,
            industry: &row.industry,
            market: row.scores.market,
            credit: row.scores.credit,
            operational: row.scores.operational,
            legal_compliance: row.scores.legal_compliance,
            technical: row.scores.technical,
            composite: row.composite(),
        })?;
    }
    writer.flush()?;
    Ok(())
}
