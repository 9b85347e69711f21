//! GUI module - User interface components

mod app;
mod chart_viewer;
mod control_panel;

pub use app::GaitPcaApp;
pub use chart_viewer::{ChartView, ChartViewer};
pub use control_panel::{ControlPanel, ControlPanelAction};
