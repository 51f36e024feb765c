use risk_core::Metric;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Interactive inputs of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlId {
    Year,
    Company,
    Industry,
    CompareCompanies,
    CompareMetric,
    Theme,
}

impl ControlId {
    pub const ALL: [ControlId; 6] = [
        ControlId::Year,
        ControlId::Company,
        ControlId::Industry,
        ControlId::CompareCompanies,
        ControlId::CompareMetric,
        ControlId::Theme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlId::Year => "year",
            ControlId::Company => "company",
            ControlId::Industry => "industry",
            ControlId::CompareCompanies => "compare_companies",
            ControlId::CompareMetric => "compare_metric",
            ControlId::Theme => "theme",
        }
    }
}

impl std::fmt::Display for ControlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named artifacts pushed to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputId {
    CompanyOptions,
    IndustryOptions,
    CompareOptions,
    Radar,
    Bars,
    Heatmap,
    PageStyle,
}

/// Value carried by a control.
///
/// Serialized untagged so the browser sends plain JSON: `null` or a string for
/// single selections, an array for the multi-select, a boolean for the toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ControlValue {
    Text(Option<String>),
    List(Vec<String>),
    Flag(bool),
}

impl ControlValue {
    pub fn text(value: impl Into<String>) -> Self {
        ControlValue::Text(Some(value.into()))
    }

    fn kind(&self) -> &'static str {
        match self {
            ControlValue::Text(_) => "text",
            ControlValue::List(_) => "list",
            ControlValue::Flag(_) => "flag",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("Control {control} expects a {expected} value, got {got}")]
    WrongShape {
        control: ControlId,
        expected: &'static str,
        got: &'static str,
    },

    #[error(transparent)]
    UnknownMetric(#[from] risk_core::UnknownMetric),

    #[error("Control {0} cannot be cleared")]
    Required(ControlId),
}

/// Current value of every control for one session.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlState {
    pub year: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    #[serde(default)]
    pub compare_companies: Vec<String>,
    #[serde(default)]
    pub compare_metric: Metric,
    /// Dark mode toggle
    #[serde(default)]
    pub theme: bool,
}

impl ControlState {
    pub fn get(&self, id: ControlId) -> ControlValue {
        match id {
            ControlId::Year => ControlValue::Text(self.year.clone()),
            ControlId::Company => ControlValue::Text(self.company.clone()),
            ControlId::Industry => ControlValue::Text(self.industry.clone()),
            ControlId::CompareCompanies => ControlValue::List(self.compare_companies.clone()),
            ControlId::CompareMetric => ControlValue::text(self.compare_metric.key()),
            ControlId::Theme => ControlValue::Flag(self.theme),
        }
    }

    /// Write a control. Returns whether the stored value changed.
    ///
    /// A value of the wrong shape leaves the state untouched.
    pub fn set(&mut self, id: ControlId, value: ControlValue) -> Result<bool, ControlError> {
        let wrong_shape = |expected: &'static str, value: &ControlValue| ControlError::WrongShape {
            control: id,
            expected,
            got: value.kind(),
        };

        let changed = match (id, value) {
            (ControlId::Year, ControlValue::Text(v)) => replace(&mut self.year, v),
            (ControlId::Company, ControlValue::Text(v)) => replace(&mut self.company, v),
            (ControlId::Industry, ControlValue::Text(v)) => replace(&mut self.industry, v),
            (ControlId::CompareCompanies, ControlValue::List(v)) => {
                replace(&mut self.compare_companies, v)
            }
            // a cleared multi-select arrives as null
            (ControlId::CompareCompanies, ControlValue::Text(None)) => {
                replace(&mut self.compare_companies, Vec::new())
            }
            (ControlId::CompareMetric, ControlValue::Text(Some(key))) => {
                let metric: Metric = key.parse()?;
                replace(&mut self.compare_metric, metric)
            }
            (ControlId::CompareMetric, ControlValue::Text(None)) => {
                return Err(ControlError::Required(id));
            }
            (ControlId::Theme, ControlValue::Flag(v)) => replace(&mut self.theme, v),
            (ControlId::Year | ControlId::Company | ControlId::Industry, other) => {
                return Err(wrong_shape("text", &other));
            }
            (ControlId::CompareCompanies, other) => return Err(wrong_shape("list", &other)),
            (ControlId::CompareMetric, other) => return Err(wrong_shape("text", &other)),
            (ControlId::Theme, other) => return Err(wrong_shape("flag", &other)),
        };

        Ok(changed)
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
