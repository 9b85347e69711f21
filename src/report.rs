//! Console and JSON reporting of analysis results.

use crate::pca::Contribution;
use crate::pipeline::AnalysisResult;
use crate::stats::ColumnStats;
use polars::prelude::{CsvWriter, SerWriter};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::Path;

/// Serializable summary of one component.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentReport {
    pub label: String,
    pub explained_variance: f64,
    pub explained_variance_ratio: f64,
    pub cumulative_variance_ratio: f64,
    /// Loadings in variable order
    pub loadings: Vec<Contribution>,
}

/// Serializable summary of a full run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub source: Option<String>,
    pub trial_name: Option<String>,
    /// `inDegrees` from the file header, when declared
    pub in_degrees: Option<bool>,
    pub rows: usize,
    pub variables: Vec<String>,
    pub column_stats: Vec<ColumnStats>,
    pub components: Vec<ComponentReport>,
}

impl AnalysisReport {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let pca = &result.pca;
        let components = pca
            .component_labels()
            .into_iter()
            .enumerate()
            .map(|(j, label)| ComponentReport {
                label,
                explained_variance: pca.explained_variance[j],
                explained_variance_ratio: pca.explained_variance_ratio[j],
                cumulative_variance_ratio: pca.cumulative_variance_ratio[j],
                loadings: pca
                    .feature_names
                    .iter()
                    .zip(pca.components.column(j).iter())
                    .map(|(name, &loading)| Contribution {
                        name: name.clone(),
                        loading,
                    })
                    .collect(),
            })
            .collect();

        Self {
            source: result.source.as_ref().map(|p| p.display().to_string()),
            trial_name: result.header.name.clone(),
            in_degrees: result.header.in_degrees(),
            rows: result.features.n_observations(),
            variables: result.features.names.clone(),
            column_stats: result.column_stats.clone(),
            components,
        }
    }

    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Write the PC scores (`PC1..PCk` plus time) as CSV.
pub fn write_scores_csv(
    result: &AnalysisResult,
    time_column: &str,
    path: &Path,
) -> anyhow::Result<()> {
    let mut frame = result.scores_frame(time_column)?;
    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut frame)?;
    Ok(())
}

/// Variance of each column, time included.
pub fn format_variances(stats: &[ColumnStats]) -> String {
    let width = stats.iter().map(|s| s.name.len()).max().unwrap_or(0).max(8);
    let mut out = String::new();
    let _ = writeln!(out, "{:-<1$}", "", width + 16);
    let _ = writeln!(out, "Variance of each variable");
    let _ = writeln!(out, "{:-<1$}", "", width + 16);
    for s in stats {
        let _ = writeln!(out, "{:<width$} {:>15.6}", s.name, s.variance);
    }
    out
}

/// Individual and cumulative explained variance per component.
pub fn format_explained_variance(ratios: &[f64], cumulative: &[f64]) -> String {
    let mut out = String::new();
    for (i, r) in ratios.iter().enumerate() {
        let _ = writeln!(out, "PC{}: {:.4} ({:.2}% of variance)", i + 1, r, r * 100.0);
    }
    let _ = writeln!(out, "\nCumulative variance:");
    for (i, c) in cumulative.iter().enumerate() {
        let _ = writeln!(out, "PC1 to PC{}: {:.4} ({:.2}%)", i + 1, c, c * 100.0);
    }
    out
}

/// Ranked absolute loadings for one component.
pub fn format_contributions(label: &str, ranked: &[Contribution]) -> String {
    let width = ranked.iter().map(|c| c.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    let _ = writeln!(out, "Contributions to {label}:");
    for c in ranked {
        let _ = writeln!(out, "{:<width$} {:>10.6}", c.name, c.loading.abs());
    }
    out
}

/// Full console report in pipeline order.
pub fn format_report(result: &AnalysisResult, loading_components: usize) -> String {
    let pca = &result.pca;
    let mut out = format_variances(&result.column_stats);
    out.push('\n');
    out.push_str(&format_explained_variance(
        &pca.explained_variance_ratio,
        &pca.cumulative_variance_ratio,
    ));

    for (j, label) in pca
        .component_labels()
        .iter()
        .enumerate()
        .take(loading_components)
    {
        if let Some(ranked) = pca.ranked_contributions(j) {
            out.push('\n');
            out.push_str(&format_contributions(label, &ranked));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explained_variance_lines() {
        let text = format_explained_variance(&[0.75, 0.25], &[0.75, 1.0]);
        assert!(text.contains("PC1: 0.7500 (75.00% of variance)"));
        assert!(text.contains("PC2: 0.2500 (25.00% of variance)"));
        assert!(text.contains("PC1 to PC2: 1.0000 (100.00%)"));
    }

    #[test]
    fn test_contributions_are_absolute() {
        let ranked = vec![
            Contribution {
                name: "knee_angle_r".into(),
                loading: -0.6,
            },
            Contribution {
                name: "hip".into(),
                loading: 0.3,
            },
        ];
        let text = format_contributions("PC2", &ranked);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Contributions to PC2:");
        assert!(lines[1].starts_with("knee_angle_r"));
        assert!(lines[1].ends_with("0.600000"));
        assert!(!lines[1].contains('-'));
    }
}
