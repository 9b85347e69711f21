//! Control Panel Widget
//! Left side panel with file selection, analysis settings and actions.

use crate::config::AnalysisConfig;
use egui::{Color32, RichText};
use std::path::PathBuf;

/// Left side control panel with file selection and processing controls.
pub struct ControlPanel {
    pub mot_path: Option<PathBuf>,
    pub config: AnalysisConfig,
    pub columns: Vec<String>,
    pub row_count: usize,
    pub status: String,
    pub has_results: bool,
}

impl ControlPanel {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            mot_path: None,
            config,
            columns: Vec::new(),
            row_count: 0,
            status: "Ready".to_string(),
            has_results: false,
        }
    }

    /// Update the data source summary after a load
    pub fn update_source(&mut self, path: PathBuf, columns: Vec<String>, row_count: usize) {
        self.mot_path = Some(path);
        self.columns = columns;
        self.row_count = row_count;
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("Gait PCA")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .mot_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());
                    ui.label(RichText::new(&path_text).size(12.0));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Browse").clicked() {
                            action = ControlPanelAction::BrowseMot;
                        }
                    });
                });
                if self.mot_path.is_some() {
                    ui.label(
                        RichText::new(format!(
                            "{} rows, {} columns",
                            self.row_count,
                            self.columns.len()
                        ))
                        .size(11.0)
                        .color(Color32::GRAY),
                    );
                }
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Settings Section =====
        ui.label(RichText::new("Analysis Settings").size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 140.0;
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Time column:"));
            ui.text_edit_singleline(&mut self.config.time_column);
        });
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Top contributors:"));
            ui.add(egui::DragValue::new(&mut self.config.top_contributors).range(1..=20));
        });
        ui.horizontal(|ui| {
            ui.add_sized([label_width, 20.0], egui::Label::new("Loading charts:"));
            ui.add(egui::DragValue::new(&mut self.config.loading_components).range(1..=12));
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.mot_path.is_some(), |ui| {
                let button = egui::Button::new(RichText::new("Run Analysis").size(16.0))
                    .min_size(egui::vec2(200.0, 35.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::Analyze;
                }
            });

            ui.add_space(8.0);

            ui.add_enabled_ui(self.has_results, |ui| {
                let export = egui::Button::new(RichText::new("Export PNGs").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(export).clicked() {
                    action = ControlPanelAction::ExportCharts;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        let status_color = if self.status.starts_with("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.has_results {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseMot,
    Analyze,
    ExportCharts,
}
