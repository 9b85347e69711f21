//! Matrix decomposition utilities for PCA

use nalgebra::{DMatrix, DVector, SymmetricEigen};

/// Eigenvalue decomposition result
#[derive(Debug, Clone)]
pub struct EigenDecomposition {
    /// Eigenvalues (sorted in descending order, clamped at zero)
    pub eigenvalues: DVector<f64>,
    /// Eigenvectors (columns correspond to eigenvalues)
    pub eigenvectors: DMatrix<f64>,
}

impl EigenDecomposition {
    /// Decompose a symmetric matrix.
    ///
    /// Columns are ordered by descending eigenvalue and each eigenvector is
    /// oriented so that its largest-magnitude entry is positive.
    pub fn from_symmetric(matrix: &DMatrix<f64>) -> Self {
        let n = matrix.nrows();
        let eigen = SymmetricEigen::new(matrix.clone());

        let mut indices: Vec<usize> = (0..n).collect();
        indices.sort_by(|&a, &b| {
            eigen.eigenvalues[b]
                .partial_cmp(&eigen.eigenvalues[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // Round-off can leave tiny negative eigenvalues on rank-deficient input
        let eigenvalues =
            DVector::from_iterator(n, indices.iter().map(|&i| eigen.eigenvalues[i].max(0.0)));

        let mut eigenvectors = DMatrix::zeros(n, n);
        for (new_idx, &old_idx) in indices.iter().enumerate() {
            let mut column = eigen.eigenvectors.column(old_idx).clone_owned();
            orient(&mut column);
            eigenvectors.set_column(new_idx, &column);
        }

        Self {
            eigenvalues,
            eigenvectors,
        }
    }
}

/// Flip the sign so the largest-magnitude entry is positive (first on ties).
fn orient(vector: &mut DVector<f64>) {
    let mut pivot = 0;
    for (i, v) in vector.iter().enumerate() {
        if v.abs() > vector[pivot].abs() {
            pivot = i;
        }
    }
    if !vector.is_empty() && vector[pivot] < 0.0 {
        vector.neg_mut();
    }
}

/// Calculate covariance matrix (n - 1 denominator)
pub fn covariance_matrix(data: &DMatrix<f64>) -> DMatrix<f64> {
    let n = data.nrows() as f64;
    let mean = data.row_mean();

    let mut centered = data.clone();
    for mut row in centered.row_iter_mut() {
        row -= &mean;
    }

    centered.transpose() * &centered / (n - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eigen_decomposition() {
        let matrix = DMatrix::from_row_slice(2, 2, &[4.0, 2.0, 2.0, 3.0]);
        let eigen = EigenDecomposition::from_symmetric(&matrix);

        // (7 ± sqrt(17)) / 2
        let expected_hi = (7.0 + 17f64.sqrt()) / 2.0;
        let expected_lo = (7.0 - 17f64.sqrt()) / 2.0;
        assert!((eigen.eigenvalues[0] - expected_hi).abs() < 1e-10);
        assert!((eigen.eigenvalues[1] - expected_lo).abs() < 1e-10);

        // A v = λ v for the leading pair
        let v = eigen.eigenvectors.column(0);
        let av = &matrix * v;
        assert!((av - v * eigen.eigenvalues[0]).norm() < 1e-10);
    }

    #[test]
    fn test_sign_convention() {
        let matrix = DMatrix::from_row_slice(3, 3, &[2.0, -1.0, 0.0, -1.0, 2.0, -1.0, 0.0, -1.0, 2.0]);
        let eigen = EigenDecomposition::from_symmetric(&matrix);

        for column in eigen.eigenvectors.column_iter() {
            let pivot = column
                .iter()
                .copied()
                .fold(0.0f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });
            assert!(pivot > 0.0);
            assert!((column.norm() - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn test_covariance_matrix() {
        let data = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 9.0]);
        let cov = covariance_matrix(&data);

        assert_eq!(cov.shape(), (2, 2));
        assert!((cov[(0, 0)] - 4.0).abs() < 1e-12);
        assert!((cov[(0, 1)] - cov[(1, 0)]).abs() < 1e-12);
        assert!((cov[(0, 1)] - 7.0).abs() < 1e-12);
    }
}
