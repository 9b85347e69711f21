//! Gait PCA Main Application
//! Main window with control panel and chart viewer.

use crate::charts::StaticChartRenderer;
use crate::config::AnalysisConfig;
use crate::data::MotLoader;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::pipeline;
use egui::SidePanel;
use log::{error, info};
use std::path::PathBuf;

/// Main application window.
pub struct GaitPcaApp {
    loader: MotLoader,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
}

impl GaitPcaApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: AnalysisConfig,
        initial: Option<PathBuf>,
    ) -> Self {
        let mut app = Self {
            loader: MotLoader::new(),
            control_panel: ControlPanel::new(config),
            chart_viewer: ChartViewer::new(),
        };
        if let Some(path) = initial {
            app.load_and_analyze(path);
        }
        app
    }

    /// Handle .mot file selection
    fn handle_browse_mot(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Motion files", &["mot", "sto", "txt"])
            .pick_file()
        {
            self.load_and_analyze(path);
        }
    }

    fn load_and_analyze(&mut self, path: PathBuf) {
        self.chart_viewer.clear();
        self.control_panel.has_results = false;

        match self.loader.load_mot(&path) {
            Ok(table) => {
                let columns = table.column_names();
                let rows = table.row_count();
                self.control_panel.update_source(path, columns, rows);
                self.handle_analyze();
            }
            Err(e) => {
                error!("Failed to load {}: {}", path.display(), e);
                self.control_panel.set_status(format!("Error: {e}"));
            }
        }
    }

    fn handle_analyze(&mut self) {
        let Some(table) = self.loader.get_table() else {
            self.control_panel.set_status("Error: no file loaded");
            return;
        };

        let config = self.control_panel.config.clone();
        if let Err(e) = config.validate() {
            self.control_panel.set_status(format!("Error: {e}"));
            return;
        }

        match pipeline::analyze_table(table, &config) {
            Ok(mut result) => {
                result.source = self.loader.get_file_path().cloned();
                let n = result.pca.n_components;
                let pc1 = result.pca.explained_variance_ratio[0] * 100.0;
                self.chart_viewer.set_result(result);
                self.control_panel.has_results = true;
                self.control_panel
                    .set_status(format!("Complete: {n} components, PC1 explains {pc1:.2}%"));
            }
            Err(e) => {
                error!("Analysis failed: {}", e);
                self.control_panel.has_results = false;
                self.chart_viewer.clear();
                self.control_panel.set_status(format!("Error: {e}"));
            }
        }
    }

    /// Render charts to PNG files in a user-chosen directory
    fn handle_export_charts(&mut self) {
        let Some(result) = &self.chart_viewer.result else {
            self.control_panel.set_status("No charts to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new()
            .set_directory(&self.control_panel.config.output_dir)
            .pick_folder()
        else {
            return;
        };

        let rendered = StaticChartRenderer::render_all(result, &self.control_panel.config)
            .and_then(|charts| StaticChartRenderer::save_all(&charts, &dir));
        match rendered {
            Ok(paths) => {
                info!("Exported {} charts to {}", paths.len(), dir.display());
                self.control_panel
                    .set_status(format!("Exported {} charts", paths.len()));
            }
            Err(e) => {
                self.control_panel.set_status(format!("Error: {e}"));
            }
        }
    }
}

impl eframe::App for GaitPcaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::BrowseMot => self.handle_browse_mot(),
                        ControlPanelAction::Analyze => self.handle_analyze(),
                        ControlPanelAction::ExportCharts => self.handle_export_charts(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        let top = self.control_panel.config.top_contributors;
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui, top);
        });
    }
}
