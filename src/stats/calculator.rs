//! Statistics Calculator Module
//! Per-column descriptive statistics over the loaded trial.

use crate::data::{DataProcessor, MotionTable, ProcessorError};
use serde::Serialize;
use statrs::statistics::Statistics;

/// Descriptive statistics for a single column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    /// Unbiased sample variance (n - 1 denominator)
    pub variance: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for ColumnStats {
    fn default() -> Self {
        Self {
            name: String::new(),
            count: 0,
            mean: f64::NAN,
            std: f64::NAN,
            variance: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
        }
    }
}

/// Handles statistical calculations over table columns.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> ColumnStats {
        let n = values.len();
        if n == 0 {
            return ColumnStats::default();
        }

        let variance = if n > 1 { values.variance() } else { f64::NAN };

        ColumnStats {
            name: String::new(),
            count: n,
            mean: values.mean(),
            std: variance.sqrt(),
            variance,
            min: values.min(),
            max: values.max(),
        }
    }

    /// Statistics for every column of the table, time included, in file order.
    pub fn column_stats(table: &MotionTable) -> Result<Vec<ColumnStats>, ProcessorError> {
        table
            .column_names()
            .into_iter()
            .map(|name| {
                let values = DataProcessor::column_values(&table.df, &name)?;
                let mut stats = Self::compute_descriptive_stats(&values);
                stats.name = name;
                Ok(stats)
            })
            .collect()
    }

    /// Sample variance of every column, in file order.
    pub fn column_variances(table: &MotionTable) -> Result<Vec<(String, f64)>, ProcessorError> {
        Ok(Self::column_stats(table)?
            .into_iter()
            .map(|s| (s.name, s.variance))
            .collect())
    }
}
