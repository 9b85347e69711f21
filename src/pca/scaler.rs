//! Column standardization (zero mean, unit population variance)

use super::PcaError;
use nalgebra::{DMatrix, DVector};
use statrs::statistics::Statistics;

/// Relative threshold below which a column's spread counts as zero.
const DEGENERATE_TOL: f64 = 1e-12;

/// Per-column mean and population standard deviation (ddof = 0).
#[derive(Debug, Clone)]
pub struct StandardScaler {
    pub mean: DVector<f64>,
    pub std: DVector<f64>,
}

impl StandardScaler {
    /// Fit the scaler on an N x M matrix.
    ///
    /// Fails on fewer than two observations or no variables, on non-finite
    /// values, and on any column whose standard deviation is zero.
    pub fn fit(data: &DMatrix<f64>, names: &[String]) -> Result<Self, PcaError> {
        let (n_rows, n_cols) = data.shape();
        if n_cols < 1 || n_rows < 2 {
            return Err(PcaError::InsufficientData {
                rows: n_rows,
                cols: n_cols,
            });
        }
        if names.len() != n_cols {
            return Err(PcaError::DimensionMismatch {
                expected: n_cols,
                found: names.len(),
            });
        }

        let mut mean = DVector::zeros(n_cols);
        let mut std = DVector::zeros(n_cols);

        for (j, column) in data.column_iter().enumerate() {
            if column.iter().any(|v| !v.is_finite()) {
                return Err(PcaError::NonFiniteValue(names[j].clone()));
            }

            let m = column.iter().mean();
            let s = column.iter().population_std_dev();

            if !(s > DEGENERATE_TOL * m.abs().max(1.0)) {
                return Err(PcaError::DegenerateColumn(names[j].clone()));
            }

            mean[j] = m;
            std[j] = s;
        }

        Ok(Self { mean, std })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Standardize a matrix with the fitted statistics.
    pub fn transform(&self, data: &DMatrix<f64>) -> Result<DMatrix<f64>, PcaError> {
        if data.ncols() != self.n_features() {
            return Err(PcaError::DimensionMismatch {
                expected: self.n_features(),
                found: data.ncols(),
            });
        }

        let mut scaled = data.clone();
        for (j, mut column) in scaled.column_iter_mut().enumerate() {
            let (m, s) = (self.mean[j], self.std[j]);
            column.apply(|x| *x = (*x - m) / s);
        }
        Ok(scaled)
    }

    pub fn fit_transform(
        data: &DMatrix<f64>,
        names: &[String],
    ) -> Result<(Self, DMatrix<f64>), PcaError> {
        let scaler = Self::fit(data, names)?;
        let scaled = scaler.transform(data)?;
        Ok((scaler, scaled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("v{i}")).collect()
    }

    #[test]
    fn test_standardized_columns() {
        let data = DMatrix::from_row_slice(
            5,
            3,
            &[
                1.0, 10.0, -3.0, //
                2.0, 30.0, -1.0, //
                3.0, 20.0, 4.0, //
                4.0, 50.0, 2.0, //
                7.0, 40.0, 0.5,
            ],
        );
        let (_, scaled) = StandardScaler::fit_transform(&data, &names(3)).unwrap();

        for column in scaled.column_iter() {
            let mean = column.sum() / 5.0;
            let var = column.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 5.0;
            assert!(mean.abs() < 1e-10);
            assert!((var.sqrt() - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_fitted_population_statistics() {
        let data = DMatrix::from_row_slice(4, 2, &[1.0, 10.0, 2.0, 10.0, 3.0, 20.0, 4.0, 20.0]);
        let scaler = StandardScaler::fit(&data, &names(2)).unwrap();
        assert!((scaler.mean[0] - 2.5).abs() < 1e-12);
        assert!((scaler.mean[1] - 15.0).abs() < 1e-12);
        // ddof = 0: sqrt(1.25) and 5, not the sample values
        assert!((scaler.std[0] - 1.25f64.sqrt()).abs() < 1e-12);
        assert!((scaler.std[1] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_constant_column_is_degenerate() {
        let data = DMatrix::from_row_slice(3, 2, &[1.0, 0.1, 2.0, 0.1, 3.0, 0.1]);
        let err = StandardScaler::fit(&data, &names(2)).unwrap_err();
        assert!(matches!(err, PcaError::DegenerateColumn(name) if name == "v1"));
    }

    #[test]
    fn test_insufficient_data() {
        let one_row = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        assert!(matches!(
            StandardScaler::fit(&one_row, &names(2)),
            Err(PcaError::InsufficientData { rows: 1, cols: 2 })
        ));

        let no_cols = DMatrix::<f64>::zeros(4, 0);
        assert!(matches!(
            StandardScaler::fit(&no_cols, &[]),
            Err(PcaError::InsufficientData { rows: 4, cols: 0 })
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let data = DMatrix::from_row_slice(2, 2, &[1.0, f64::NAN, 2.0, 3.0]);
        let err = StandardScaler::fit(&data, &names(2)).unwrap_err();
        assert!(matches!(err, PcaError::NonFiniteValue(name) if name == "v1"));
    }

    #[test]
    fn test_transform_checks_width() {
        let data = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 5.0]);
        let scaler = StandardScaler::fit(&data, &names(2)).unwrap();
        let wrong = DMatrix::from_row_slice(1, 3, &[1.0, 2.0, 3.0]);
        assert!(matches!(
            scaler.transform(&wrong),
            Err(PcaError::DimensionMismatch {
                expected: 2,
                found: 3
            })
        ));
    }
}
