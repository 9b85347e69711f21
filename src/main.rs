//! Gait PCA - kinematics PCA report & chart viewer
//!
//! Loads a `.mot` trial, prints variance and PCA summaries, and renders the charts.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use gait_pca::charts::StaticChartRenderer;
use gait_pca::gui::GaitPcaApp;
use gait_pca::report::{self, AnalysisReport};
use gait_pca::{analyze_file, AnalysisConfig};
use log::{info, warn};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "gait_pca", version, about = "PCA of gait kinematics (.mot) files")]
struct CliArgs {
    /// Input .mot file
    #[arg(required_unless_present = "gui")]
    input: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for rendered PNG charts
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write a JSON report to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write the principal component scores as CSV to this path
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Open rendered charts with the system viewer
    #[arg(long)]
    open: bool,

    /// Launch the interactive viewer
    #[arg(long)]
    gui: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl CliArgs {
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AnalysisConfig::default(),
        };
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.no_charts {
            config.render_charts = false;
        }
        if self.open {
            config.open_charts = true;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(level: &str) {
    let log_level = level.parse::<log::LevelFilter>().unwrap_or_else(|_| {
        eprintln!("Warning: Invalid log level '{level}' provided. Defaulting to Info.");
        log::LevelFilter::Info
    });
    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .init();
}

fn run_viewer(config: AnalysisConfig, initial: Option<PathBuf>) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("Gait PCA"),
        ..Default::default()
    };

    eframe::run_native(
        "Gait PCA",
        options,
        Box::new(move |cc| Ok(Box::new(GaitPcaApp::new(cc, config, initial)))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}

fn run_report(
    input: &Path,
    config: &AnalysisConfig,
    json: Option<&Path>,
    scores: Option<&Path>,
) -> Result<()> {
    let result =
        analyze_file(input, config).with_context(|| format!("analyzing {}", input.display()))?;

    print!("{}", report::format_report(&result, config.loading_components));

    if let Some(path) = json {
        AnalysisReport::from_result(&result)
            .write_json(path)
            .with_context(|| format!("writing JSON report {}", path.display()))?;
        info!("Wrote JSON report to {}", path.display());
    }

    if let Some(path) = scores {
        report::write_scores_csv(&result, &config.time_column, path)
            .with_context(|| format!("writing scores {}", path.display()))?;
        info!("Wrote PC scores to {}", path.display());
    }

    if !config.render_charts {
        return Ok(());
    }

    let charts = StaticChartRenderer::render_all(&result, config).context("rendering charts")?;
    let paths = StaticChartRenderer::save_all(&charts, &config.output_dir)
        .with_context(|| format!("saving charts to {}", config.output_dir.display()))?;

    if config.open_charts {
        for path in &paths {
            if let Err(e) = open::that(path) {
                warn!("Could not open {}: {}", path.display(), e);
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(&args.log_level);

    let config = args.analysis_config()?;

    if args.gui {
        return run_viewer(config, args.input.clone());
    }

    let input = args
        .input
        .as_ref()
        .ok_or_else(|| anyhow!("an input .mot file is required"))?;
    run_report(input, &config, args.json.as_deref(), args.scores.as_deref())
}
