//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot.

use crate::charts::palette::{self, normalize, plasma};
use crate::charts::renderer::display_label;
use crate::pca::{Contribution, Pca};
use crate::stats::ColumnStats;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};
use nalgebra::DMatrix;

/// Number of color buckets used to approximate the continuous time map
const TIME_BUCKETS: usize = 24;

fn color32((r, g, b): (u8, u8, u8)) -> Color32 {
    Color32::from_rgb(r, g, b)
}

/// Creates PCA diagnostic charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Individual explained variance as bars, cumulative as a line.
    pub fn draw_explained_variance(ui: &mut egui::Ui, pca: &Pca, height: f32) {
        let bar_color = color32(palette::VARIANCE_BAR);
        let line_color = color32(palette::CUMULATIVE_LINE);

        let bars: Vec<Bar> = pca
            .explained_variance_ratio
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                Bar::new((i + 1) as f64, r)
                    .width(0.7)
                    .name(format!("PC{}", i + 1))
            })
            .collect();

        let cumulative: Vec<[f64; 2]> = pca
            .cumulative_variance_ratio
            .iter()
            .enumerate()
            .map(|(i, &c)| [(i + 1) as f64, c])
            .collect();

        Plot::new("explained_variance")
            .height(height)
            .legend(Legend::default())
            .x_axis_label("Principal component")
            .y_axis_label("Fraction of explained variance")
            .include_y(0.0)
            .include_y(1.05)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .color(bar_color.gamma_multiply(0.6))
                        .name("Individual variance"),
                );
                plot_ui.line(
                    Line::new(PlotPoints::from(cumulative.clone()))
                        .color(line_color)
                        .width(2.0)
                        .name("Cumulative variance"),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(cumulative))
                        .radius(4.0)
                        .color(line_color)
                        .name("Cumulative variance"),
                );
            });
    }

    /// Absolute loadings of the top contributors, colored by sign.
    pub fn draw_loadings(ui: &mut egui::Ui, label: &str, contributions: &[Contribution], height: f32) {
        let names: Vec<String> = contributions.iter().map(|c| display_label(&c.name)).collect();

        let bars: Vec<Bar> = contributions
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let color = if c.loading >= 0.0 {
                    color32(palette::POSITIVE_LOADING)
                } else {
                    color32(palette::NEGATIVE_LOADING)
                };
                Bar::new(i as f64, c.loading.abs())
                    .width(0.6)
                    .fill(color)
                    .name(format!("{} ({:+.4})", c.name, c.loading))
            })
            .collect();

        Plot::new(format!("loadings_{label}"))
            .height(height)
            .y_axis_label("Absolute loading")
            .include_y(0.0)
            .allow_scroll(false)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                    names.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name(label));
            });
    }

    /// PC1 vs PC2 scatter; point color follows time.
    pub fn draw_projection(ui: &mut egui::Ui, scores: &DMatrix<f64>, time: &[f64], height: f32) {
        if scores.ncols() < 2 {
            ui.label("Projection needs two components");
            return;
        }

        let t_min = time.iter().copied().fold(f64::INFINITY, f64::min);
        let t_max = time.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut buckets: Vec<Vec<[f64; 2]>> = vec![Vec::new(); TIME_BUCKETS];
        for (row, &t) in scores.row_iter().zip(time) {
            let pos = normalize(t, t_min, t_max);
            let idx = ((pos * TIME_BUCKETS as f64) as usize).min(TIME_BUCKETS - 1);
            buckets[idx].push([row[0], row[1]]);
        }

        Plot::new("projection")
            .height(height)
            .data_aspect(1.0)
            .x_axis_label("PC1")
            .y_axis_label("PC2")
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                for (idx, points) in buckets.into_iter().enumerate() {
                    if points.is_empty() {
                        continue;
                    }
                    let center = (idx as f64 + 0.5) / TIME_BUCKETS as f64;
                    plot_ui.points(
                        Points::new(PlotPoints::from(points))
                            .radius(3.0)
                            .color(color32(plasma(center))),
                    );
                }
            });

        // Color bar legend
        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("{t_min:.2} s")).size(11.0));
            for k in 0..TIME_BUCKETS {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(8.0, 12.0), egui::Sense::hover());
                let center = (k as f64 + 0.5) / TIME_BUCKETS as f64;
                ui.painter().rect_filled(rect, 0.0, color32(plasma(center)));
            }
            ui.label(RichText::new(format!("{t_max:.2} s")).size(11.0));
        });
    }

    /// Draw statistics table
    pub fn draw_stats_table(ui: &mut egui::Ui, stats: &[ColumnStats]) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("column_stats_table")
                    .striped(true)
                    .min_col_width(70.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in ["Variable", "N", "Mean", "Std", "Variance", "Min", "Max"] {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        for s in stats {
                            ui.label(RichText::new(&s.name).size(11.0));
                            ui.label(RichText::new(s.count.to_string()).size(11.0));
                            for v in [s.mean, s.std, s.variance, s.min, s.max] {
                                ui.label(RichText::new(format!("{v:.4}")).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
