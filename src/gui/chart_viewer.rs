//! Chart Viewer Widget
//! Central panel showing the statistics table and the PCA charts of the current result.

use crate::charts::ChartPlotter;
use crate::pipeline::AnalysisResult;
use egui::{ComboBox, RichText, ScrollArea};

const CHART_HEIGHT: f32 = 420.0;

/// Which chart the viewer displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartView {
    Statistics,
    ExplainedVariance,
    Loadings,
    Projection,
}

pub struct ChartViewer {
    pub result: Option<AnalysisResult>,
    pub view: ChartView,
    /// Component shown in the loadings view (0-based)
    pub component: usize,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            result: None,
            view: ChartView::ExplainedVariance,
            component: 0,
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the current result
    pub fn clear(&mut self) {
        self.result = None;
        self.component = 0;
    }

    pub fn set_result(&mut self, result: AnalysisResult) {
        self.component = 0;
        self.result = Some(result);
    }

    pub fn show(&mut self, ui: &mut egui::Ui, top_contributors: usize) {
        let Some(result) = &self.result else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.view, ChartView::Statistics, "Statistics");
            ui.selectable_value(
                &mut self.view,
                ChartView::ExplainedVariance,
                "Explained variance",
            );
            ui.selectable_value(&mut self.view, ChartView::Loadings, "Loadings");
            ui.selectable_value(&mut self.view, ChartView::Projection, "PC1 vs PC2");
        });
        ui.separator();

        let labels = result.pca.component_labels();
        match self.view {
            ChartView::Statistics => {
                if let Some(name) = &result.header.name {
                    ui.label(RichText::new(name).size(16.0).strong());
                }
                ScrollArea::vertical().show(ui, |ui| {
                    ChartPlotter::draw_stats_table(ui, &result.column_stats);
                });
            }
            ChartView::ExplainedVariance => {
                ChartPlotter::draw_explained_variance(ui, &result.pca, CHART_HEIGHT);
            }
            ChartView::Loadings => {
                let selected = labels.get(self.component).cloned().unwrap_or_default();
                ComboBox::from_id_salt("loading_component")
                    .selected_text(&selected)
                    .show_ui(ui, |ui| {
                        for (j, label) in labels.iter().enumerate() {
                            ui.selectable_value(&mut self.component, j, label);
                        }
                    });

                if let Some(top) = result.pca.top_contributors(self.component, top_contributors) {
                    ui.label(
                        RichText::new(format!("Variables contributing most to {selected}"))
                            .size(14.0)
                            .strong(),
                    );
                    ChartPlotter::draw_loadings(ui, &selected, &top, CHART_HEIGHT);
                }
            }
            ChartView::Projection => {
                ChartPlotter::draw_projection(
                    ui,
                    &result.projection_scores,
                    result.time(),
                    CHART_HEIGHT,
                );
            }
        }
    }
}
