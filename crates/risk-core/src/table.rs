//! The shaped wide table shared by every dashboard view.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::Serialize;

use crate::types::{RawRecord, RiskRecord, YEAR_SENTINEL};

/// Immutable company x year table of derived risk scores.
///
/// Built once at startup and shared read-only; there is no API that mutates
/// rows after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskTable {
    rows: Vec<RiskRecord>,
    years: Vec<String>,
}

impl RiskTable {
    pub fn from_raw(records: Vec<RawRecord>) -> Self {
        Self::from_records(records.into_iter().map(RiskRecord::from_raw).collect())
    }

    pub fn from_records(rows: Vec<RiskRecord>) -> Self {
        let mut years: Vec<String> = distinct(rows.iter().map(|r| r.year.as_str()))
            .into_iter()
            .map(str::to_string)
            .collect();
        years.sort_by(|a, b| compare_years(a, b));

        Self { rows, years }
    }

    pub fn rows(&self) -> &[RiskRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct years, ascending, with the catch-all bucket first.
    pub fn years(&self) -> &[String] {
        &self.years
    }

    pub fn latest_year(&self) -> Option<&str> {
        self.years.last().map(String::as_str)
    }

    /// Rows of a year in source order.
    pub fn rows_for_year<'a>(&'a self, year: &'a str) -> impl Iterator<Item = &'a RiskRecord> + 'a {
        self.rows.iter().filter(move |r| r.year == year)
    }

    /// First row matching both year and company.
    pub fn find(&self, year: &str, company: &str) -> Option<&RiskRecord> {
        self.rows
            .iter()
            .find(|r| r.year == year && r.company == company)
    }

    /// Distinct companies of a year in first-seen order.
    pub fn companies_for_year(&self, year: &str) -> Vec<&str> {
        distinct(self.rows.iter().filter(|r| r.year == year).map(|r| r.company.as_str()))
    }

    /// Distinct industries of a year in first-seen order.
    pub fn industries_for_year(&self, year: &str) -> Vec<&str> {
        distinct(self.rows.iter().filter(|r| r.year == year).map(|r| r.industry.as_str()))
    }

    /// The `n` rows of a year with the highest composite score.
    ///
    /// Ties keep source order. NaN composites sort after every number. Returns
    /// fewer than `n` only when the year has fewer rows.
    pub fn top_rows(&self, year: &str, n: usize) -> Vec<&RiskRecord> {
        let mut rows: Vec<&RiskRecord> = self.rows.iter().filter(|r| r.year == year).collect();
        rows.sort_by(|a, b| descending_nan_last(a.composite(), b.composite()));
        rows.truncate(n);
        rows
    }

    /// Company names of `top_rows`, one entry per row.
    pub fn top_companies(&self, year: &str, n: usize) -> Vec<String> {
        self.top_rows(year, n)
            .into_iter()
            .map(|r| r.company.clone())
            .collect()
    }
}

/// Year ordering: blank and `YEAR_SENTINEL` first, then integers numerically,
/// then any other text. The latest year is therefore never the catch-all.
pub fn compare_years(a: &str, b: &str) -> Ordering {
    year_rank(a)
        .cmp(&year_rank(b))
        .then_with(|| match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => Ordering::Equal,
        })
        .then_with(|| a.cmp(b))
}

fn year_rank(year: &str) -> u8 {
    let year = year.trim();
    if year.is_empty() || year == YEAR_SENTINEL {
        0
    } else if year.parse::<i64>().is_ok() {
        1
    } else {
        2
    }
}

fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(*v)).collect()
}
