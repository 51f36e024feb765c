//! Reactive view graph for the risk dashboard.
//!
//! Controls hold the current UI selections; bindings are pure functions of a
//! declared subset of controls that produce figures, option lists and page
//! styling. Changing a control recomputes exactly the bindings that read it.

pub mod charts;
pub mod controls;
pub mod dashboard;
pub mod figure;
pub mod graph;
pub mod theme;

pub use controls::{ControlError, ControlId, ControlState, ControlValue, OutputId};
pub use dashboard::{
    dashboard_graph, DashboardGraph, DashboardSession, DashboardSnapshot, OutputValue,
    SelectOption, DEFAULT_COMPARE_COUNT,
};
pub use figure::Figure;
pub use graph::{Emission, Inputs, Update, ViewGraph};
pub use theme::{PageStyle, Theme};
