//! Analysis pipeline: load -> statistics -> standardize + PCA -> projection

use crate::config::AnalysisConfig;
use crate::data::{
    DataProcessor, FeatureMatrix, LoaderError, MotHeader, MotLoader, MotionTable, ProcessorError,
};
use crate::pca::{Pca, PcaError};
use crate::stats::{ColumnStats, StatsCalculator};
use log::info;
use nalgebra::DMatrix;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Components kept by the separate fit used for the 2D projection.
pub const PROJECTION_COMPONENTS: usize = 2;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
    #[error("PCA failed: {0}")]
    Pca(#[from] PcaError),
}

/// Everything computed for one trial.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub source: Option<PathBuf>,
    pub header: MotHeader,
    /// Per-column statistics, time included
    pub column_stats: Vec<ColumnStats>,
    pub features: FeatureMatrix,
    /// Fit keeping every component
    pub pca: Pca,
    pub scores: DMatrix<f64>,
    /// Independent two-component fit
    pub projection: Pca,
    pub projection_scores: DMatrix<f64>,
}

impl AnalysisResult {
    pub fn time(&self) -> &[f64] {
        &self.features.time
    }

    /// Full-fit scores as a frame with columns `PC1..PCk` and the time column.
    pub fn scores_frame(&self, time_column: &str) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = self
            .pca
            .component_labels()
            .into_iter()
            .enumerate()
            .map(|(j, label)| {
                let values: Vec<f64> = self.scores.column(j).iter().copied().collect();
                Column::new(label.into(), values)
            })
            .collect();
        columns.push(Column::new(time_column.into(), self.features.time.clone()));
        DataFrame::new(columns)
    }
}

/// Load a `.mot` file and run the full analysis on it.
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> Result<AnalysisResult, AnalysisError> {
    info!("Loading {}", path.display());
    let mut loader = MotLoader::new();
    let table = loader.load_mot(path)?;
    info!(
        "Loaded {} rows x {} columns",
        table.row_count(),
        table.column_count()
    );

    let mut result = analyze_table(table, config)?;
    result.source = Some(path.to_path_buf());
    Ok(result)
}

/// Run the analysis on an already loaded table.
pub fn analyze_table(
    table: &MotionTable,
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let column_stats = StatsCalculator::column_stats(table)?;

    let features = DataProcessor::prepare_features(table, &config.time_column)?;
    info!(
        "Fitting PCA on {} observations x {} variables",
        features.n_observations(),
        features.n_variables()
    );

    let (pca, scores) = Pca::fit_transform(&features.values, &features.names, None)?;
    let (projection, projection_scores) = Pca::fit_transform(
        &features.values,
        &features.names,
        Some(PROJECTION_COMPONENTS),
    )?;

    Ok(AnalysisResult {
        source: None,
        header: table.header.clone(),
        column_stats,
        features,
        pca,
        scores,
        projection,
        projection_scores,
    })
}
