//! PCA model: fit, transform, explained variance and loadings

use super::decomposition::{covariance_matrix, EigenDecomposition};
use super::{PcaError, StandardScaler};
use nalgebra::DMatrix;
use serde::Serialize;

/// A variable's loading on one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub name: String,
    pub loading: f64,
}

/// Rank variables by descending absolute loading.
///
/// The sort is stable, so equal magnitudes keep their original column order.
pub fn rank_by_magnitude(names: &[String], loadings: &[f64]) -> Vec<Contribution> {
    let mut ranked: Vec<Contribution> = names
        .iter()
        .zip(loadings)
        .map(|(name, &loading)| Contribution {
            name: name.clone(),
            loading,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.loading
            .abs()
            .partial_cmp(&a.loading.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

/// Fitted PCA on standardized data.
#[derive(Debug, Clone)]
pub struct Pca {
    /// Number of components retained
    pub n_components: usize,
    /// Original variable names
    pub feature_names: Vec<String>,
    /// Standardization fitted on the training matrix
    pub scaler: StandardScaler,
    /// Loadings: one row per variable, one column per component
    pub components: DMatrix<f64>,
    /// Eigenvalues of the retained components
    pub explained_variance: Vec<f64>,
    /// Fraction of the total variance (all components) per retained component
    pub explained_variance_ratio: Vec<f64>,
    pub cumulative_variance_ratio: Vec<f64>,
}

impl Pca {
    /// Fit PCA on an N x M matrix.
    ///
    /// `n_components = None` keeps all M components; `Some(k)` keeps the
    /// leading `k` and requires `1 <= k <= M`.
    pub fn fit(
        data: &DMatrix<f64>,
        feature_names: &[String],
        n_components: Option<usize>,
    ) -> Result<Self, PcaError> {
        let (scaler, scaled) = StandardScaler::fit_transform(data, feature_names)?;
        let n_features = scaled.ncols();

        let n_components = match n_components {
            None => n_features,
            Some(k) if (1..=n_features).contains(&k) => k,
            Some(k) => {
                return Err(PcaError::InvalidComponentCount {
                    requested: k,
                    available: n_features,
                })
            }
        };

        let eigen = EigenDecomposition::from_symmetric(&covariance_matrix(&scaled));
        let total_variance = eigen.eigenvalues.sum();
        if !(total_variance > 0.0) {
            return Err(PcaError::ZeroTotalVariance);
        }

        let explained_variance: Vec<f64> =
            eigen.eigenvalues.iter().take(n_components).copied().collect();
        let explained_variance_ratio: Vec<f64> = explained_variance
            .iter()
            .map(|v| v / total_variance)
            .collect();
        let cumulative_variance_ratio = explained_variance_ratio
            .iter()
            .scan(0.0, |acc, r| {
                *acc += r;
                Some(*acc)
            })
            .collect();

        let components = eigen.eigenvectors.columns(0, n_components).into_owned();

        Ok(Self {
            n_components,
            feature_names: feature_names.to_vec(),
            scaler,
            components,
            explained_variance,
            explained_variance_ratio,
            cumulative_variance_ratio,
        })
    }

    /// Standardize and project data onto the retained components (N x k scores).
    pub fn transform(&self, data: &DMatrix<f64>) -> Result<DMatrix<f64>, PcaError> {
        let scaled = self.scaler.transform(data)?;
        Ok(scaled * &self.components)
    }

    pub fn fit_transform(
        data: &DMatrix<f64>,
        feature_names: &[String],
        n_components: Option<usize>,
    ) -> Result<(Self, DMatrix<f64>), PcaError> {
        let pca = Self::fit(data, feature_names, n_components)?;
        let scores = pca.transform(data)?;
        Ok((pca, scores))
    }

    /// Component labels `PC1..PCk`.
    pub fn component_labels(&self) -> Vec<String> {
        (1..=self.n_components).map(|i| format!("PC{i}")).collect()
    }

    /// Loading vector of one component (0-based), in variable order.
    pub fn loadings(&self, component: usize) -> Option<Vec<f64>> {
        (component < self.n_components)
            .then(|| self.components.column(component).iter().copied().collect())
    }

    /// All variables ranked by absolute loading on one component (0-based).
    pub fn ranked_contributions(&self, component: usize) -> Option<Vec<Contribution>> {
        self.loadings(component)
            .map(|loadings| rank_by_magnitude(&self.feature_names, &loadings))
    }

    /// The `n` strongest contributors to one component (0-based).
    pub fn top_contributors(&self, component: usize, n: usize) -> Option<Vec<Contribution>> {
        self.ranked_contributions(component).map(|mut ranked| {
            ranked.truncate(n);
            ranked
        })
    }
}
