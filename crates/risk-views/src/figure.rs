//! Declarative chart specifications in Plotly's JSON schema.
//!
//! The server only describes figures; the browser-side charting library draws
//! them. Optional fields are skipped so the serialized layout stays minimal.

use serde::{Deserialize, Serialize};

use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    /// A figure with no traces, still carrying the theme colors.
    pub fn empty(theme: Theme) -> Self {
        Self {
            data: Vec::new(),
            layout: Layout::themed(theme),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatterpolar(PolarTrace),
    Bar(BarTrace),
    Heatmap(HeatmapTrace),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolarTrace {
    pub r: Vec<f64>,
    pub theta: Vec<String>,
    pub fill: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub line: Line,
    pub fillcolor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub color: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarTrace {
    pub x: Vec<f64>,
    pub y: Vec<String>,
    pub orientation: String,
    pub marker: Marker,
    pub text: Vec<String>,
    pub textposition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub color: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapTrace {
    /// One row per category, one column per company.
    pub z: Vec<Vec<f64>>,
    pub x: Vec<String>,
    pub y: Vec<String>,
    pub colorscale: String,
    pub reversescale: bool,
    pub colorbar: ColorBar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorBar {
    pub title: Title,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub text: String,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub l: u32,
    pub r: u32,
    pub t: u32,
    pub b: u32,
}

impl Default for Margin {
    fn default() -> Self {
        Self { l: 30, r: 30, t: 60, b: 30 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub automargin: Option<bool>,
}

impl Axis {
    pub fn titled(text: impl Into<String>) -> Self {
        Self {
            title: Some(Title::new(text)),
            automargin: Some(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polar {
    pub radialaxis: RadialAxis,
    pub bgcolor: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadialAxis {
    pub visible: bool,
    pub tickfont: Font,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    pub paper_bgcolor: String,
    pub plot_bgcolor: String,
    pub font: Font,
    pub margin: Margin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polar: Option<Polar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xaxis: Option<Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yaxis: Option<Axis>,
}

impl Layout {
    pub fn themed(theme: Theme) -> Self {
        Self {
            title: None,
            paper_bgcolor: theme.background().to_string(),
            plot_bgcolor: theme.background().to_string(),
            font: Font {
                color: theme.text().to_string(),
                size: None,
            },
            margin: Margin::default(),
            showlegend: None,
            polar: None,
            xaxis: None,
            yaxis: None,
        }
    }

    pub fn with_title(mut self, text: impl Into<String>) -> Self {
        self.title = Some(Title::new(text));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_figure_serializes_themed_layout() {
        let value = serde_json::to_value(Figure::empty(Theme::Dark)).unwrap();

        assert_eq!(value["data"], json!([]));
        assert_eq!(value["layout"]["paper_bgcolor"], "#2E2E2E");
        assert_eq!(value["layout"]["font"], json!({"color": "white"}));
        assert!(value["layout"].get("title").is_none());
    }

    #[test]
    fn test_trace_type_tag() {
        let trace = Trace::Bar(BarTrace {
            x: vec![1.0],
            y: vec!["A".into()],
            orientation: "h".into(),
            marker: Marker { color: vec!["#C25759".into()] },
            text: vec!["1.00".into()],
            textposition: "outside".into(),
        });
        let value = serde_json::to_value(trace).unwrap();
        assert_eq!(value["type"], "bar");
        assert_eq!(value["orientation"], "h");
    }
}
