use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Year assigned to every row when the source has no `year` column.
pub const YEAR_SENTINEL: &str = "ALL";

/// Industry assigned to every row when the source has no `industry` column.
pub const INDUSTRY_SENTINEL: &str = "UNSPECIFIED";

/// Number of raw sub-indicator columns (`RD_0` .. `RD_6`).
pub const INDICATOR_COUNT: usize = 7;

/// Raw sub-indicator column names in positional order.
pub const INDICATOR_COLUMNS: [&str; INDICATOR_COUNT] =
    ["RD_0", "RD_1", "RD_2", "RD_3", "RD_4", "RD_5", "RD_6"];

/// One row of the source CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub company: String,
    pub year: String,
    pub industry: String,
    /// `RD_0` .. `RD_6`; empty source cells are NaN
    pub indicators: [f64; INDICATOR_COUNT],
}

/// Aggregate risk category derived from the raw sub-indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Market,
    Credit,
    Operational,
    LegalCompliance,
    Technical,
}

impl RiskCategory {
    /// All categories in display order.
    pub const ALL: [RiskCategory; 5] = [
        RiskCategory::Market,
        RiskCategory::Credit,
        RiskCategory::Operational,
        RiskCategory::LegalCompliance,
        RiskCategory::Technical,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            RiskCategory::Market => "market",
            RiskCategory::Credit => "credit",
            RiskCategory::Operational => "operational",
            RiskCategory::LegalCompliance => "legal_compliance",
            RiskCategory::Technical => "technical",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::Market => "Market Risk",
            RiskCategory::Credit => "Credit Risk",
            RiskCategory::Operational => "Operational Risk",
            RiskCategory::LegalCompliance => "Legal & Compliance Risk",
            RiskCategory::Technical => "Technical Risk",
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|c| c.label()).collect()
    }
}

/// Value plotted by the comparison bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Metric {
    #[default]
    Composite,
    Category(RiskCategory),
}

impl Metric {
    /// Composite first, then every category.
    pub fn all() -> Vec<Metric> {
        std::iter::once(Metric::Composite)
            .chain(RiskCategory::ALL.into_iter().map(Metric::Category))
            .collect()
    }

    pub fn key(&self) -> &'static str {
        match self {
            Metric::Composite => "composite",
            Metric::Category(c) => c.key(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Composite => "Composite (mean of categories)",
            Metric::Category(c) => c.label(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Returned when a metric key matches neither `composite` nor a category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown metric: {0}")]
pub struct UnknownMetric(pub String);

impl FromStr for Metric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "composite" {
            return Ok(Metric::Composite);
        }
        RiskCategory::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .map(Metric::Category)
            .ok_or_else(|| UnknownMetric(s.to_string()))
    }
}

impl Serialize for Metric {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        key.parse().map_err(serde::de::Error::custom)
    }
}

/// The five category scores of a row.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RiskScores {
    pub market: f64,
    pub credit: f64,
    pub operational: f64,
    pub legal_compliance: f64,
    pub technical: f64,
}

impl RiskScores {
    /// Derive the categories from `RD_0` .. `RD_6`.
    pub fn from_indicators(rd: &[f64; INDICATOR_COUNT]) -> Self {
        Self {
            market: rd[0],
            credit: rd[1],
            operational: rd[2] + rd[5],
            legal_compliance: rd[3],
            technical: rd[4] + rd[6],
        }
    }

    pub fn get(&self, category: RiskCategory) -> f64 {
        match category {
            RiskCategory::Market => self.market,
            RiskCategory::Credit => self.credit,
            RiskCategory::Operational => self.operational,
            RiskCategory::LegalCompliance => self.legal_compliance,
            RiskCategory::Technical => self.technical,
        }
    }

    /// Scores in `RiskCategory::ALL` order.
    pub fn values(&self) -> [f64; 5] {
        RiskCategory::ALL.map(|c| self.get(c))
    }

    /// Arithmetic mean of the five categories.
    pub fn composite(&self) -> f64 {
        self.values().iter().sum::<f64>() / RiskCategory::ALL.len() as f64
    }
}

/// One row of the shaped wide table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskRecord {
    pub company: String,
    pub year: String,
    pub industry: String,
    pub scores: RiskScores,
}

impl RiskRecord {
    pub fn from_raw(raw: RawRecord) -> Self {
        Self {
            scores: RiskScores::from_indicators(&raw.indicators),
            company: raw.company,
            year: raw.year,
            industry: raw.industry,
        }
    }

    pub fn composite(&self) -> f64 {
        self.scores.composite()
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Composite => self.composite(),
            Metric::Category(c) => self.scores.get(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_scores_from_indicators() {
        let scores = RiskScores::from_indicators(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);

        assert_eq!(scores.market, 1.0);
        assert_eq!(scores.credit, 2.0);
        assert_eq!(scores.operational, 9.0);
        assert_eq!(scores.legal_compliance, 4.0);
        assert_eq!(scores.technical, 12.0);
        assert_relative_eq!(scores.composite(), 5.6, epsilon = 1e-12);
    }

    #[test]
    fn test_composite_tracks_categories() {
        let raw = RawRecord {
            company: "A".to_string(),
            year: "2021".to_string(),
            industry: "Banking".to_string(),
            indicators: [0.5, -1.25, 2.0, 0.0, 3.5, -0.5, 1.0],
        };
        let record = RiskRecord::from_raw(raw);
        let mean = record.scores.values().iter().sum::<f64>() / 5.0;

        assert_relative_eq!(record.composite(), mean, epsilon = 1e-12);
        assert_relative_eq!(record.metric(Metric::Composite), mean, epsilon = 1e-12);
        assert_eq!(
            record.metric(Metric::Category(RiskCategory::Operational)),
            1.5
        );
    }

    #[test]
    fn test_nan_indicator_poisons_composite() {
        let scores = RiskScores::from_indicators(&[f64::NAN, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        assert!(scores.market.is_nan());
        assert!(scores.composite().is_nan());
    }

    #[test]
    fn test_metric_keys_round_trip() {
        for metric in Metric::all() {
            assert_eq!(metric.key().parse::<Metric>(), Ok(metric));
        }
        assert_eq!(
            "volatility".parse::<Metric>(),
            Err(UnknownMetric("volatility".to_string()))
        );
    }

    #[test]
    fn test_metric_display_uses_key() {
        let metric = Metric::Category(RiskCategory::LegalCompliance);
        assert_eq!(metric.to_string(), "legal_compliance");
        assert_eq!(Metric::default(), Metric::Composite);
    }
}
