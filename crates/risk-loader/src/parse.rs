//! CSV parsing and required-column validation.

use risk_core::{
    LoadError, RawRecord, INDICATOR_COLUMNS, INDICATOR_COUNT, INDUSTRY_SENTINEL, YEAR_SENTINEL,
};

pub const COMPANY_COLUMN: &str = "company";
pub const YEAR_COLUMN: &str = "year";
pub const INDUSTRY_COLUMN: &str = "industry";

/// Columns every source must carry, in the order schema errors report them.
pub fn required_columns() -> Vec<&'static str> {
    std::iter::once(COMPANY_COLUMN)
        .chain(INDICATOR_COLUMNS)
        .collect()
}

/// Positions of the known columns inside a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub company: usize,
    pub year: Option<usize>,
    pub industry: Option<usize>,
    pub indicators: [usize; INDICATOR_COUNT],
}

impl ColumnLayout {
    /// Resolve column positions from already-trimmed headers.
    ///
    /// Fails with `LoadError::Schema` naming every missing required column.
    pub fn resolve(headers: &[&str]) -> Result<Self, LoadError> {
        let position = |name: &str| headers.iter().position(|h| *h == name);

        let missing: Vec<String> = required_columns()
            .into_iter()
            .filter(|name| position(*name).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::Schema { missing });
        }

        let mut indicators = [0usize; INDICATOR_COUNT];
        for (slot, name) in indicators.iter_mut().zip(INDICATOR_COLUMNS) {
            *slot = position(name).unwrap_or_default();
        }

        Ok(Self {
            company: position(COMPANY_COLUMN).unwrap_or_default(),
            year: position(YEAR_COLUMN),
            industry: position(INDUSTRY_COLUMN),
            indicators,
        })
    }
}

/// Parse comma-separated text into raw records.
///
/// Headers are trimmed before validation; cell values are trimmed too. An
/// empty numeric cell becomes NaN, anything else that is not a number is an
/// error. Missing `year`/`industry` columns and blank cells in them are
/// backfilled with sentinels.
pub fn parse_records(text: &str) -> Result<Vec<RawRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Csv(e.to_string()))?
        .clone();
    let header_names: Vec<&str> = headers.iter().collect();
    let layout = ColumnLayout::resolve(&header_names)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| LoadError::Csv(e.to_string()))?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

        let mut indicators = [f64::NAN; INDICATOR_COUNT];
        for (value, (&idx, name)) in indicators
            .iter_mut()
            .zip(layout.indicators.iter().zip(INDICATOR_COLUMNS))
        {
            *value = parse_number(cell(idx)).ok_or_else(|| LoadError::InvalidNumber {
                line,
                column: name.to_string(),
                value: cell(idx).to_string(),
            })?;
        }

        rows.push(RawRecord {
            company: cell(layout.company).to_string(),
            year: layout
                .year
                .map(cell)
                .filter(|y| !y.is_empty())
                .unwrap_or(YEAR_SENTINEL)
                .to_string(),
            industry: layout
                .industry
                .map(cell)
                .filter(|i| !i.is_empty())
                .unwrap_or(INDUSTRY_SENTINEL)
                .to_string(),
            indicators,
        });
    }

    Ok(rows)
}

fn parse_number(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        return Some(f64::NAN);
    }
    cell.parse::<f64>().ok()
}
