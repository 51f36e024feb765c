//! The risk dashboard wired onto the view graph.

use std::sync::Arc;

use risk_core::{Metric, RiskTable};
use serde::{Deserialize, Serialize};

use crate::charts::{bar_figure, heatmap_figure, radar_figure};
use crate::controls::{ControlError, ControlId, ControlState, ControlValue, OutputId};
use crate::figure::Figure;
use crate::graph::{Emission, Inputs, Update, ViewGraph};
use crate::theme::{PageStyle, Theme};

/// Companies preselected for comparison when a year is chosen.
pub const DEFAULT_COMPARE_COUNT: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    fn plain(value: &str) -> Self {
        Self {
            label: value.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OutputValue {
    Figure(Figure),
    Options(Vec<SelectOption>),
    Style(PageStyle),
}

pub type DashboardGraph = ViewGraph<RiskTable, OutputValue>;

fn options_by_year(table: &RiskTable, inputs: &Inputs<'_>) -> Emission<OutputValue> {
    let (companies, industries, company, compare) = match inputs.text(ControlId::Year) {
        Some(year) => {
            let top = table.top_companies(year, DEFAULT_COMPARE_COUNT);
            (
                table.companies_for_year(year),
                table.industries_for_year(year),
                top.first().cloned(),
                top,
            )
        }
        None => (Vec::new(), Vec::new(), None, Vec::new()),
    };
    let options = |values: &[&str]| -> Vec<SelectOption> {
        values.iter().map(|v| SelectOption::plain(v)).collect()
    };

    Emission::default()
        .output(OutputId::CompanyOptions, OutputValue::Options(options(&companies)))
        .output(OutputId::IndustryOptions, OutputValue::Options(options(&industries)))
        .output(OutputId::CompareOptions, OutputValue::Options(options(&companies)))
        .write(ControlId::Company, ControlValue::Text(company))
        .write(ControlId::Industry, ControlValue::Text(None))
        .write(ControlId::CompareCompanies, ControlValue::List(compare))
}

fn theme_of(inputs: &Inputs<'_>) -> Theme {
    Theme::from_dark_mode(inputs.flag(ControlId::Theme))
}

/// Build the dashboard's bindings. Registered once at startup and shared.
pub fn dashboard_graph() -> DashboardGraph {
    DashboardGraph::new()
        .bind(
            "options_by_year",
            &[ControlId::Year],
            &[ControlId::Company, ControlId::Industry, ControlId::CompareCompanies],
            options_by_year,
        )
        .bind("radar", &[ControlId::Year, ControlId::Company, ControlId::Theme], &[], |table, inputs| {
            let figure = radar_figure(
                table,
                inputs.text(ControlId::Year),
                inputs.text(ControlId::Company),
                theme_of(inputs),
            );
            Emission::default().output(OutputId::Radar, OutputValue::Figure(figure))
        })
        .bind(
            "bars",
            &[ControlId::Year, ControlId::CompareCompanies, ControlId::CompareMetric, ControlId::Theme],
            &[],
            |table, inputs| {
                // the metric control only ever holds a valid key
                let metric = inputs
                    .text(ControlId::CompareMetric)
                    .and_then(|key| key.parse::<Metric>().ok())
                    .unwrap_or_default();
                let figure = bar_figure(
                    table,
                    inputs.text(ControlId::Year),
                    inputs.list(ControlId::CompareCompanies),
                    metric,
                    theme_of(inputs),
                );
                Emission::default().output(OutputId::Bars, OutputValue::Figure(figure))
            },
        )
        // the industry selection is an option list only; no view narrows by it
        .bind("heatmap", &[ControlId::Year, ControlId::Theme], &[], |table, inputs| {
            let figure = heatmap_figure(table, inputs.text(ControlId::Year), theme_of(inputs));
            Emission::default().output(OutputId::Heatmap, OutputValue::Figure(figure))
        })
        .bind("page_style", &[ControlId::Theme], &[], |_, inputs| {
            Emission::default().output(
                OutputId::PageStyle,
                OutputValue::Style(theme_of(inputs).page_style()),
            )
        })
}

/// Everything the browser needs to draw the page on first load.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub controls: ControlState,
    pub year_options: Vec<SelectOption>,
    pub metric_options: Vec<SelectOption>,
    #[serde(flatten)]
    pub update: Update<OutputValue>,
}

/// Control state of one browser session over the shared table and graph.
pub struct DashboardSession {
    state: ControlState,
    table: Arc<RiskTable>,
    graph: Arc<DashboardGraph>,
}

impl DashboardSession {
    /// Open a session on the latest year and render every output.
    pub fn start(table: Arc<RiskTable>, graph: Arc<DashboardGraph>) -> (Self, DashboardSnapshot) {
        let state = ControlState {
            year: table.latest_year().map(str::to_string),
            ..Default::default()
        };
        let mut session = Self::from_state(table, graph, state);
        let update = session
            .graph
            .render_all(&session.table, &mut session.state)
            .unwrap_or_else(|e| {
                // bindings only write values of the declared shape
                tracing::error!("Initial render rejected a control write: {}", e);
                Update::default()
            });

        let snapshot = DashboardSnapshot {
            controls: session.state.clone(),
            year_options: session.year_options(),
            metric_options: metric_options(),
            update,
        };
        (session, snapshot)
    }

    /// Resume from a client-held state without recomputing anything.
    pub fn from_state(table: Arc<RiskTable>, graph: Arc<DashboardGraph>, state: ControlState) -> Self {
        Self { state, table, graph }
    }

    pub fn apply(
        &mut self,
        control: ControlId,
        value: ControlValue,
    ) -> Result<Update<OutputValue>, ControlError> {
        let update = self
            .graph
            .apply(&self.table, &mut self.state, control, value)?;
        tracing::debug!(
            "Control {} changed, recomputed [{}]",
            control,
            update.recomputed.join(", ")
        );
        Ok(update)
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn into_state(self) -> ControlState {
        self.state
    }

    fn year_options(&self) -> Vec<SelectOption> {
        self.table
            .years()
            .iter()
            .map(|y| SelectOption::plain(y))
            .collect()
    }
}

fn metric_options() -> Vec<SelectOption> {
    Metric::all()
        .into_iter()
        .map(|m| SelectOption {
            label: m.label().to_string(),
            value: m.key().to_string(),
        })
        .collect()
}
