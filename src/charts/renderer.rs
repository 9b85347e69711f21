//! Static Chart Renderer
//! Renders the PCA diagnostic charts into PNG images with plotters.
//!
//! Charts:
//! 1. Explained variance: individual ratios as bars, cumulative ratio as a line
//! 2. Loadings: top contributors per component, one chart per component
//! 3. Projection: PC1 vs PC2 scatter colored by time, with a color bar

use crate::charts::palette::{self, normalize, plasma};
use crate::config::AnalysisConfig;
use crate::pca::Contribution;
use crate::pipeline::AnalysisResult;
use image::RgbImage;
use log::{debug, info};
use nalgebra::DMatrix;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};
use thiserror::Error;

const FONT: &str = "sans-serif";
const COLOR_BAR_WIDTH: i32 = 110;
const COLOR_BAR_STEPS: usize = 96;

/// Smallest chart that leaves room for axes, captions and the color bar.
pub const MIN_CHART_WIDTH: u32 = 320;
pub const MIN_CHART_HEIGHT: u32 = 240;
/// Upper bound per side; the RGB buffer is `width * height * 3` bytes.
pub const MAX_CHART_SIDE: u32 = 8192;

/// Whether a chart of this size can be rendered.
pub fn chart_size_supported(width: u32, height: u32) -> bool {
    (MIN_CHART_WIDTH..=MAX_CHART_SIDE).contains(&width)
        && (MIN_CHART_HEIGHT..=MAX_CHART_SIDE).contains(&height)
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing failed: {0}")]
    Backend(String),
    #[error("Chart size {width}x{height} is invalid")]
    InvalidSize { width: u32, height: u32 },
    #[error("Nothing to plot: {0}")]
    EmptySeries(&'static str),
    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn backend(err: impl std::fmt::Display) -> RenderError {
    RenderError::Backend(err.to_string())
}

fn rgb((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

/// Variable name with underscores turned into line breaks.
pub fn display_label(name: &str) -> String {
    name.replace('_', "\n")
}

/// Expand `[min, max]` by 5% on both sides; empty ranges get a unit span.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span <= 0.0 {
        (min - 0.5, max + 0.5)
    } else {
        (min - span * 0.05, max + span * 0.05)
    }
}

/// A rendered chart and the file stem it is saved under.
#[derive(Clone)]
pub struct RenderedChart {
    pub name: String,
    pub image: RgbImage,
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Draw into an in-memory RGB buffer and hand back the image.
    fn draw_on_buffer<F>(width: u32, height: u32, draw: F) -> Result<RgbImage, RenderError>
    where
        F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<(), RenderError>,
    {
        if !chart_size_supported(width, height) {
            return Err(RenderError::InvalidSize { width, height });
        }

        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(backend)?;
            draw(&root)?;
            root.present().map_err(backend)?;
        }

        RgbImage::from_raw(width, height, buffer).ok_or(RenderError::InvalidSize { width, height })
    }

    /// Individual (bars) and cumulative (line) explained variance per component.
    pub fn render_explained_variance(
        ratios: &[f64],
        cumulative: &[f64],
        width: u32,
        height: u32,
    ) -> Result<RgbImage, RenderError> {
        if ratios.is_empty() {
            return Err(RenderError::EmptySeries("explained variance"));
        }
        let n = ratios.len();
        let bar_color = rgb(palette::VARIANCE_BAR);
        let line_color = rgb(palette::CUMULATIVE_LINE);

        Self::draw_on_buffer(width, height, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption("Explained variance by principal component", (FONT, 22))
                .margin(15)
                .x_label_area_size(45)
                .y_label_area_size(60)
                .build_cartesian_2d(0.5f64..(n as f64 + 0.5), 0f64..1.05f64)
                .map_err(backend)?;

            chart
                .configure_mesh()
                .x_labels(n.min(40) * 2 + 1)
                .x_label_formatter(&|x| {
                    if (x - x.round()).abs() < 1e-6 && *x >= 1.0 {
                        format!("{:.0}", x)
                    } else {
                        String::new()
                    }
                })
                .x_desc("Principal component")
                .y_desc("Fraction of explained variance")
                .draw()
                .map_err(backend)?;

            chart
                .draw_series(ratios.iter().enumerate().map(|(i, &r)| {
                    let x = (i + 1) as f64;
                    Rectangle::new([(x - 0.35, 0.0), (x + 0.35, r)], bar_color.mix(0.5).filled())
                }))
                .map_err(backend)?
                .label("Individual variance")
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 14, y + 5)], bar_color.mix(0.5).filled())
                });

            let points: Vec<(f64, f64)> = cumulative
                .iter()
                .enumerate()
                .map(|(i, &c)| ((i + 1) as f64, c))
                .collect();

            chart
                .draw_series(LineSeries::new(points.clone(), line_color.stroke_width(2)))
                .map_err(backend)?
                .label("Cumulative variance")
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 14, y)], line_color.stroke_width(2))
                });
            chart
                .draw_series(points.iter().map(|&p| Circle::new(p, 4, line_color.filled())))
                .map_err(backend)?;

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::MiddleRight)
                .background_style(&WHITE.mix(0.85))
                .border_style(&BLACK)
                .draw()
                .map_err(backend)?;
            Ok(())
        })
    }

    /// Bar chart of the strongest contributors to one component.
    ///
    /// Bar height is the absolute loading; color shows the sign.
    pub fn render_loadings(
        label: &str,
        contributions: &[Contribution],
        width: u32,
        height: u32,
    ) -> Result<RgbImage, RenderError> {
        if contributions.is_empty() {
            return Err(RenderError::EmptySeries("loadings"));
        }
        let n = contributions.len();
        let y_max = contributions
            .iter()
            .map(|c| c.loading.abs())
            .fold(0.0f64, f64::max)
            .max(1e-6)
            * 1.15;
        let labels: Vec<String> = contributions.iter().map(|c| display_label(&c.name)).collect();

        Self::draw_on_buffer(width, height, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(format!("Variables contributing most to {label}"), (FONT, 22))
                .margin(15)
                .x_label_area_size(90)
                .y_label_area_size(60)
                .build_cartesian_2d((0..n).into_segmented(), 0f64..y_max)
                .map_err(backend)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_label_formatter(&|_| String::new())
                .y_desc("Absolute loading")
                .draw()
                .map_err(backend)?;

            chart
                .draw_series(contributions.iter().enumerate().map(|(i, c)| {
                    let color = if c.loading >= 0.0 {
                        rgb(palette::POSITIVE_LOADING)
                    } else {
                        rgb(palette::NEGATIVE_LOADING)
                    };
                    let mut bar = Rectangle::new(
                        [
                            (SegmentValue::Exact(i), 0.0),
                            (SegmentValue::Exact(i + 1), c.loading.abs()),
                        ],
                        color.filled(),
                    );
                    bar.set_margin(0, 0, 12, 12);
                    bar
                }))
                .map_err(backend)?;

            // Multi-line category labels under each bar
            let style = TextStyle::from((FONT, 14).into_font())
                .pos(Pos::new(HPos::Center, VPos::Top))
                .color(&BLACK);
            for (i, text) in labels.iter().enumerate() {
                let (x, y) = chart.backend_coord(&(SegmentValue::CenterOf(i), 0.0));
                let mut element = MultiLineText::<_, String>::new((x, y + 8), style.clone());
                for line in text.lines() {
                    element.push_line(line);
                }
                root.draw(&element).map_err(backend)?;
            }
            Ok(())
        })
    }

    /// Scatter of the first two score columns, colored by time.
    pub fn render_projection(
        scores: &DMatrix<f64>,
        time: &[f64],
        width: u32,
        height: u32,
    ) -> Result<RgbImage, RenderError> {
        if scores.nrows() == 0 || scores.ncols() < 2 || time.len() != scores.nrows() {
            return Err(RenderError::EmptySeries("projection"));
        }
        let (x_min, x_max) = padded_range(scores.column(0).iter().copied());
        let (y_min, y_max) = padded_range(scores.column(1).iter().copied());
        let t_min = time.iter().copied().fold(f64::INFINITY, f64::min);
        let t_max = time.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (bar_lo, bar_hi) = if t_max > t_min {
            (t_min, t_max)
        } else {
            (t_min - 0.5, t_min + 0.5)
        };

        Self::draw_on_buffer(width, height, |root| {
            let (main, bar_area) = root.split_horizontally(width as i32 - COLOR_BAR_WIDTH);

            let mut chart = ChartBuilder::on(&main)
                .caption("Projection on PC1 vs PC2", (FONT, 22))
                .margin(15)
                .x_label_area_size(45)
                .y_label_area_size(60)
                .build_cartesian_2d(x_min..x_max, y_min..y_max)
                .map_err(backend)?;

            chart
                .configure_mesh()
                .x_desc("PC1")
                .y_desc("PC2")
                .draw()
                .map_err(backend)?;

            chart
                .draw_series(scores.row_iter().zip(time).map(|(row, &t)| {
                    let color = rgb(plasma(normalize(t, t_min, t_max)));
                    Circle::new((row[0], row[1]), 4, color.filled())
                }))
                .map_err(backend)?;

            let mut bar = ChartBuilder::on(&bar_area)
                .margin_top(50)
                .margin_bottom(60)
                .margin_right(45)
                .y_label_area_size(50)
                .build_cartesian_2d(0f64..1f64, bar_lo..bar_hi)
                .map_err(backend)?;

            bar.configure_mesh()
                .disable_mesh()
                .disable_x_axis()
                .y_desc("Time (s)")
                .draw()
                .map_err(backend)?;

            let step = (bar_hi - bar_lo) / COLOR_BAR_STEPS as f64;
            bar.draw_series((0..COLOR_BAR_STEPS).map(|k| {
                let lo = bar_lo + step * k as f64;
                let color = rgb(plasma(normalize(lo + step / 2.0, bar_lo, bar_hi)));
                Rectangle::new([(0.0, lo), (1.0, lo + step)], color.filled())
            }))
            .map_err(backend)?;
            Ok(())
        })
    }

    /// Render every chart for a finished analysis, in display order.
    pub fn render_all(
        result: &AnalysisResult,
        config: &AnalysisConfig,
    ) -> Result<Vec<RenderedChart>, RenderError> {
        let (w, h) = (config.chart_width, config.chart_height);
        let pca = &result.pca;
        let mut charts = Vec::new();

        charts.push(RenderedChart {
            name: "explained_variance".to_string(),
            image: Self::render_explained_variance(
                &pca.explained_variance_ratio,
                &pca.cumulative_variance_ratio,
                w,
                h,
            )?,
        });

        let labels = pca.component_labels();
        for (j, label) in labels.iter().enumerate().take(config.loading_components) {
            let Some(top) = pca.top_contributors(j, config.top_contributors) else {
                continue;
            };
            debug!("Rendering loadings for {}", label);
            charts.push(RenderedChart {
                name: format!("loadings_{}", label.to_lowercase()),
                image: Self::render_loadings(label, &top, w, h)?,
            });
        }

        charts.push(RenderedChart {
            name: "projection_pc1_pc2".to_string(),
            image: Self::render_projection(&result.projection_scores, result.time(), w, h)?,
        });

        Ok(charts)
    }

    /// Write charts as `<name>.png` into `dir`, creating it if needed.
    pub fn save_all(charts: &[RenderedChart], dir: &Path) -> Result<Vec<PathBuf>, RenderError> {
        std::fs::create_dir_all(dir).map_err(|source| RenderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths = Vec::with_capacity(charts.len());
        for chart in charts {
            let path = dir.join(format!("{}.png", chart.name));
            chart.image.save(&path)?;
            info!("Saved {}", path.display());
            paths.push(path);
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("hip_flexion_r"), "hip\nflexion\nr");
        assert_eq!(display_label("pelvis"), "pelvis");
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range([0.0, 10.0].into_iter()), (-0.5, 10.5));
        assert_eq!(padded_range([2.0, 2.0].into_iter()), (1.5, 2.5));
        assert_eq!(padded_range(std::iter::empty()), (0.0, 1.0));
    }

    #[test]
    fn test_zero_size_rejected() {
        let err = StaticChartRenderer::render_explained_variance(&[1.0], &[1.0], 0, 100).unwrap_err();
        assert!(matches!(err, RenderError::InvalidSize { width: 0, height: 100 }));
    }

    #[test]
    fn test_size_bounds() {
        assert!(chart_size_supported(800, 500));
        assert!(chart_size_supported(MIN_CHART_WIDTH, MIN_CHART_HEIGHT));
        assert!(!chart_size_supported(200, 150));
        assert!(!chart_size_supported(MAX_CHART_SIDE + 1, 500));
        assert!(MIN_CHART_WIDTH as i32 > COLOR_BAR_WIDTH * 2);

        let scores = DMatrix::<f64>::zeros(3, 2);
        let err = StaticChartRenderer::render_projection(&scores, &[0.0, 1.0, 2.0], 200, 150)
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidSize { width: 200, height: 150 }));
    }

    #[test]
    fn test_empty_series_rejected() {
        assert!(matches!(
            StaticChartRenderer::render_loadings("PC1", &[], 400, 300),
            Err(RenderError::EmptySeries(_))
        ));
        let scores = DMatrix::<f64>::zeros(3, 1);
        assert!(matches!(
            StaticChartRenderer::render_projection(&scores, &[0.0, 1.0, 2.0], 400, 300),
            Err(RenderError::EmptySeries(_))
        ));
    }
}
