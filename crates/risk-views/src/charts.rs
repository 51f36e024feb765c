//! Figure builders for the three dashboard charts.
//!
//! Every builder takes the theme so that recoloring never needs to touch the
//! data selection, and returns an empty or zeroed figure instead of failing
//! when no rows match.

use risk_core::{Metric, RiskCategory, RiskRecord, RiskTable};

use crate::figure::{
    Axis, BarTrace, ColorBar, Figure, Font, HeatmapTrace, Layout, Line, Marker, Polar, PolarTrace,
    RadialAxis, Title, Trace,
};
use crate::theme::{Theme, BLUE, RED, RED_FILL};

/// Category labels closed into a loop for the radar polygon.
fn closed_labels() -> Vec<String> {
    let mut theta: Vec<String> = RiskCategory::labels().into_iter().map(String::from).collect();
    theta.push(RiskCategory::ALL[0].label().to_string());
    theta
}

/// Risk profile of one company for one year.
///
/// Uses the first row matching (year, company); plots zeros when nothing
/// matches.
pub fn radar_figure(
    table: &RiskTable,
    year: Option<&str>,
    company: Option<&str>,
    theme: Theme,
) -> Figure {
    let values = match (year, company) {
        (Some(y), Some(c)) => table.find(y, c).map(|row| row.scores.values()),
        _ => None,
    }
    .unwrap_or([0.0; 5]);

    let mut r = values.to_vec();
    r.push(values[0]);

    let trace = PolarTrace {
        r,
        theta: closed_labels(),
        fill: "toself".to_string(),
        name: company.map(str::to_string),
        line: Line {
            color: RED.to_string(),
            width: 3.0,
        },
        fillcolor: RED_FILL.to_string(),
    };

    let mut layout = Layout::themed(theme).with_title(format!(
        "{} risk profile ({})",
        company.unwrap_or("No company"),
        year.unwrap_or("no year")
    ));
    layout.showlegend = Some(false);
    layout.polar = Some(Polar {
        radialaxis: RadialAxis {
            visible: true,
            tickfont: Font {
                color: theme.text().to_string(),
                size: Some(10),
            },
        },
        bgcolor: theme.background().to_string(),
    });

    Figure {
        data: vec![Trace::Scatterpolar(trace)],
        layout,
    }
}

/// Round to two decimals for bar labels, without printing `-0.00`.
pub fn format_score(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.2}", rounded)
}

/// One bar per selected company of the year, ascending by `metric`.
pub fn bar_figure(
    table: &RiskTable,
    year: Option<&str>,
    companies: &[String],
    metric: Metric,
    theme: Theme,
) -> Figure {
    let Some(year) = year else {
        return Figure::empty(theme);
    };

    let mut rows: Vec<&RiskRecord> = table
        .rows_for_year(year)
        .filter(|r| companies.iter().any(|c| *c == r.company))
        .collect();
    if rows.is_empty() {
        return Figure::empty(theme);
    }
    rows.sort_by(|a, b| ascending_nan_last(a.metric(metric), b.metric(metric)));

    let values: Vec<f64> = rows.iter().map(|r| r.metric(metric)).collect();
    let trace = BarTrace {
        y: rows.iter().map(|r| r.company.clone()).collect(),
        marker: Marker {
            color: values
                .iter()
                .map(|v| (if *v >= 0.0 { RED } else { BLUE }).to_string())
                .collect(),
        },
        text: values.iter().map(|v| format_score(*v)).collect(),
        x: values,
        orientation: "h".to_string(),
        textposition: "outside".to_string(),
    };

    let mut layout = Layout::themed(theme).with_title(format!(
        "Company comparison ({}, metric: {})",
        year,
        metric.label()
    ));
    layout.showlegend = Some(false);
    layout.xaxis = Some(Axis::titled("Risk score"));
    layout.yaxis = Some(Axis::titled("Company"));

    Figure {
        data: vec![Trace::Bar(trace)],
        layout,
    }
}

/// Category x company matrix over every company present in a year.
pub fn heatmap_figure(table: &RiskTable, year: Option<&str>, theme: Theme) -> Figure {
    let Some(year) = year else {
        return Figure::empty(theme);
    };

    let rows: Vec<&RiskRecord> = table.rows_for_year(year).collect();
    if rows.is_empty() {
        return Figure::empty(theme);
    }

    let z: Vec<Vec<f64>> = RiskCategory::ALL
        .iter()
        .map(|c| rows.iter().map(|r| r.scores.get(*c)).collect())
        .collect();

    let trace = HeatmapTrace {
        z,
        x: rows.iter().map(|r| r.company.clone()).collect(),
        y: RiskCategory::labels().into_iter().map(String::from).collect(),
        colorscale: "RdBu".to_string(),
        reversescale: true,
        colorbar: ColorBar {
            title: Title::new("Score"),
        },
    };

    let mut layout = Layout::themed(theme).with_title(format!("{} risk heatmap", year));
    layout.xaxis = Some(Axis::titled("Company"));
    layout.yaxis = Some(Axis::titled("Risk category"));

    Figure {
        data: vec![Trace::Heatmap(trace)],
        layout,
    }
}

fn ascending_nan_last(a: f64, b: f64) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use risk_core::RawRecord;

    fn table() -> RiskTable {
        let row = |company: &str, year: &str, industry: &str, rd: [f64; 7]| RawRecord {
            company: company.to_string(),
            year: year.to_string(),
            industry: industry.to_string(),
            indicators: rd,
        };
        RiskTable::from_raw(vec![
            row("A", "2021", "Banking", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]),
            row("B", "2021", "Energy", [-1.0, -1.0, -1.0, -1.0, -1.0, 0.0, 0.0]),
            row("C", "2021", "Banking", [0.004, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]),
            row("D", "2020", "Energy", [2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0]),
        ])
    }

    fn polar(figure: &Figure) -> &PolarTrace {
        match &figure.data[0] {
            Trace::Scatterpolar(t) => t,
            other => panic!("expected radar trace, got {other:?}"),
        }
    }

    fn bars(figure: &Figure) -> &BarTrace {
        match &figure.data[0] {
            Trace::Bar(t) => t,
            other => panic!("expected bar trace, got {other:?}"),
        }
    }

    #[test]
    fn test_radar_closes_polygon() {
        let figure = radar_figure(&table(), Some("2021"), Some("A"), Theme::Light);
        let trace = polar(&figure);

        assert_eq!(trace.r, vec![1.0, 2.0, 9.0, 4.0, 12.0, 1.0]);
        assert_eq!(trace.theta.len(), 6);
        assert_eq!(trace.theta.first(), trace.theta.last());
        assert_eq!(trace.fill, "toself");
    }

    #[test]
    fn test_radar_zeroed_when_no_match() {
        for (year, company) in [(Some("2021"), Some("Z")), (Some("1999"), Some("A")), (None, None)] {
            let figure = radar_figure(&table(), year, company, Theme::Dark);
            assert_eq!(polar(&figure).r, vec![0.0; 6]);
            assert_eq!(figure.layout.paper_bgcolor, "#2E2E2E");
        }
    }

    #[test]
    fn test_bars_sorted_ascending_and_colored_by_sign() {
        let selected = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let figure = bar_figure(&table(), Some("2021"), &selected, Metric::Composite, Theme::Light);
        let trace = bars(&figure);

        assert_eq!(trace.y, vec!["B", "C", "A"]);
        assert_eq!(trace.marker.color, vec![BLUE, RED, RED]);
        assert_eq!(trace.text, vec!["-1.00", "0.00", "5.60"]);
        assert_eq!(trace.orientation, "h");
    }

    #[test]
    fn test_bars_use_selected_metric() {
        let selected = vec!["A".to_string(), "B".to_string()];
        let metric = Metric::Category(RiskCategory::Technical);
        let figure = bar_figure(&table(), Some("2021"), &selected, metric, Theme::Light);

        assert_eq!(bars(&figure).x, vec![-1.0, 12.0]);
        let title = figure.layout.title.unwrap().text;
        assert!(title.contains("Technical Risk"));
    }

    #[test]
    fn test_bars_empty_cases() {
        let t = table();
        assert!(bar_figure(&t, Some("2021"), &[], Metric::Composite, Theme::Light).is_empty());
        assert!(bar_figure(&t, Some("2019"), &["A".to_string()], Metric::Composite, Theme::Light).is_empty());
        assert!(bar_figure(&t, None, &["A".to_string()], Metric::Composite, Theme::Light).is_empty());
    }

    #[test]
    fn test_heatmap_matrix_shape() {
        let figure = heatmap_figure(&table(), Some("2021"), Theme::Light);
        let Trace::Heatmap(trace) = &figure.data[0] else {
            panic!("expected heatmap trace");
        };

        assert_eq!(trace.x, vec!["A", "B", "C"]);
        assert_eq!(trace.y.len(), 5);
        assert_eq!(trace.z.len(), 5);
        assert!(trace.z.iter().all(|row| row.len() == 3));
        // operational row, company A
        assert_eq!(trace.z[2][0], 9.0);
    }

    #[test]
    fn test_heatmap_spans_every_industry_of_the_year() {
        let figure = heatmap_figure(&table(), Some("2021"), Theme::Dark);
        let Trace::Heatmap(trace) = &figure.data[0] else {
            panic!("expected heatmap trace");
        };
        // Banking and Energy companies side by side
        assert_eq!(trace.x, vec!["A", "B", "C"]);
        assert_eq!(figure.layout.title.as_ref().map(|t| t.text.as_str()), Some("2021 risk heatmap"));

        assert!(heatmap_figure(&table(), Some("1999"), Theme::Light).is_empty());
        assert!(heatmap_figure(&table(), None, Theme::Light).is_empty());
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(5.6), "5.60");
        assert_eq!(format_score(-0.004), "0.00");
        assert_eq!(format_score(1.005), "1.00");
        assert_eq!(format_score(-2.346), "-2.35");
    }
}
