//! Principal Component Analysis implementation

mod analysis;
mod decomposition;
mod scaler;

pub use analysis::{rank_by_magnitude, Contribution, Pca};
pub use decomposition::{covariance_matrix, EigenDecomposition};
pub use scaler::StandardScaler;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PcaError {
    #[error("Need at least 2 observations and 1 variable, got {rows} x {cols}")]
    InsufficientData { rows: usize, cols: usize },
    #[error("Column '{0}' has zero variance and cannot be standardized")]
    DegenerateColumn(String),
    #[error("Column '{0}' contains NaN or infinite values")]
    NonFiniteValue(String),
    #[error("Requested {requested} components but only {available} variables are available")]
    InvalidComponentCount { requested: usize, available: usize },
    #[error("Expected {expected} columns, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("Total variance is zero")]
    ZeroTotalVariance,
}
