//! Data Processor Module
//! Splits the time column from the kinematic variables and builds the numeric matrix.

use crate::data::MotionTable;
use log::warn;
use nalgebra::DMatrix;
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Time column '{0}' not found")]
    MissingTimeColumn(String),
    #[error("Column '{0}' contains null values")]
    NullValues(String),
}

/// Kinematic variables as an N x M matrix, with the time series kept alongside.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    /// Variable names in file order (time excluded)
    pub names: Vec<String>,
    /// Observations in rows, variables in columns
    pub values: DMatrix<f64>,
    pub time: Vec<f64>,
}

impl FeatureMatrix {
    pub fn n_observations(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_variables(&self) -> usize {
        self.values.ncols()
    }
}

/// Handles time splitting and matrix conversion.
pub struct DataProcessor;

impl DataProcessor {
    /// Extract a column as a dense `f64` vector.
    pub fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>, ProcessorError> {
        let column = df.column(name)?.cast(&DataType::Float64)?;
        let ca = column.f64()?;
        if ca.null_count() > 0 {
            return Err(ProcessorError::NullValues(name.to_string()));
        }
        Ok(ca.into_no_null_iter().collect())
    }

    /// Separate the time column from the observed variables.
    ///
    /// Returns the time series and a derived frame without it; the source
    /// table is left untouched.
    pub fn split_time(
        table: &MotionTable,
        time_col: &str,
    ) -> Result<(Vec<f64>, DataFrame), ProcessorError> {
        if !table
            .df
            .get_column_names()
            .iter()
            .any(|name| name.as_str() == time_col)
        {
            return Err(ProcessorError::MissingTimeColumn(time_col.to_string()));
        }

        let time = Self::column_values(&table.df, time_col)?;
        if let Some(idx) = time.windows(2).position(|w| w[1] <= w[0]) {
            warn!(
                "Time column '{}' is not strictly increasing at row {}",
                time_col,
                idx + 1
            );
        }

        let data = table.df.drop(time_col)?;
        Ok((time, data))
    }

    /// Convert every column of the frame into an N x M matrix.
    pub fn to_matrix(df: &DataFrame) -> Result<(Vec<String>, DMatrix<f64>), ProcessorError> {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let columns = names
            .iter()
            .map(|name| Self::column_values(df, name))
            .collect::<Result<Vec<_>, _>>()?;

        let values = DMatrix::from_fn(df.height(), names.len(), |i, j| columns[j][i]);
        Ok((names, values))
    }

    /// Build the feature matrix used by the PCA stage.
    pub fn prepare_features(
        table: &MotionTable,
        time_col: &str,
    ) -> Result<FeatureMatrix, ProcessorError> {
        let (time, data) = Self::split_time(table, time_col)?;
        let (names, values) = Self::to_matrix(&data)?;
        Ok(FeatureMatrix {
            names,
            values,
            time,
        })
    }
}
