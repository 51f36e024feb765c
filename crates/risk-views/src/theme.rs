use serde::{Deserialize, Serialize};

/// Bars and radar fill for non-negative scores.
pub const RED: &str = "#C25759";
pub const RED_FILL: &str = "rgba(194,87,89,0.20)";
/// Bars for negative scores.
pub const BLUE: &str = "#599CB4";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_mode(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn background(&self) -> &'static str {
        match self {
            Theme::Light => "white",
            Theme::Dark => "#2E2E2E",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Theme::Light => "black",
            Theme::Dark => "white",
        }
    }

    pub fn page_style(&self) -> PageStyle {
        PageStyle {
            theme: *self,
            background: self.background().to_string(),
            text: self.text().to_string(),
        }
    }
}

/// Colors applied to the whole page around the charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageStyle {
    pub theme: Theme,
    pub background: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palettes() {
        assert_eq!(Theme::from_dark_mode(false), Theme::Light);
        assert_eq!(Theme::from_dark_mode(true).background(), "#2E2E2E");
        assert_eq!(Theme::Dark.text(), "white");
        assert_eq!(Theme::Light.page_style().background, "white");
    }
}
