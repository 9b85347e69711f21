//! End-to-end tests over synthetic `.mot` files.

use gait_pca::charts::StaticChartRenderer;
use gait_pca::data::{LoaderError, MotLoader};
use gait_pca::pca::{PcaError, StandardScaler};
use gait_pca::report::AnalysisReport;
use gait_pca::{analyze_file, AnalysisConfig, AnalysisError};
use std::f64::consts::PI;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// =============================================================================
// FILE GENERATORS
// =============================================================================

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// A gait-like trial: hip, knee and ankle angles over one stride plus pelvis tilt.
fn gait_trial(rows: usize) -> String {
    let mut text = format!(
        "Coordinates\nversion=1\nnRows={rows}\nnColumns=5\ninDegrees=yes\nendheader\n\
time\thip_flexion_r\tknee_angle_r\tankle_angle_r\tpelvis_tilt\n"
    );
    for i in 0..rows {
        let t = i as f64 * 0.01;
        let phase = 2.0 * PI * i as f64 / rows as f64;
        let hip = 20.0 * phase.cos() + 5.0;
        let knee = 30.0 * (phase + 0.6).sin().max(0.0) + 0.4 * hip;
        let ankle = 10.0 * (2.0 * phase).sin() - 0.1 * knee;
        let pelvis = 3.0 * (3.0 * phase).cos();
        text.push_str(&format!(
            "{t:.3}\t{hip:.6}\t{knee:.6}\t{ankle:.6}\t{pelvis:.6}\n"
        ));
    }
    text
}

fn no_charts() -> AnalysisConfig {
    AnalysisConfig {
        render_charts: false,
        ..Default::default()
    }
}

// =============================================================================
// LOADER
// =============================================================================

#[test]
fn test_minimal_file_shape() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "minimal.mot",
        "trial\nsome metadata\nENDHEADER\n\
time a b c\n\
0.0 1 2 3\n\
0.1 2 1 5\n\
0.2 4 3 4\n\
0.3 3 5 1\n\
0.4 5 4 2\n",
    );

    let mut loader = MotLoader::new();
    let table = loader.load_mot(&path).unwrap();
    assert_eq!(table.row_count(), 5);
    assert_eq!(table.column_count(), 4);
    assert_eq!(table.column_names(), vec!["time", "a", "b", "c"]);
    assert_eq!(loader.get_file_path(), Some(&path));
}

#[test]
fn test_missing_sentinel_is_fatal() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bad.mot", "trial\ntime a\n0 1\n1 2\n");
    let err = analyze_file(&path, &no_charts()).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Loader(LoaderError::MissingHeaderTerminator)
    ));
}

#[test]
fn test_non_numeric_cell_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "bad.mot",
        "endheader\ntime a b\n0 1 2\n0.1 2 n/a\n0.2 3 4\n",
    );
    let err = analyze_file(&path, &no_charts()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Line 4"), "{message}");
    assert!(message.contains("'b'"), "{message}");
}

// =============================================================================
// PCA
// =============================================================================

#[test]
fn test_gait_trial_properties() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "walk.mot", &gait_trial(101));
    let result = analyze_file(&path, &no_charts()).unwrap();

    assert_eq!(result.source.as_ref(), Some(&path));
    assert_eq!(result.header.name.as_deref(), Some("Coordinates"));
    assert_eq!(result.column_stats.len(), 5);
    assert_eq!(result.column_stats[0].name, "time");

    // One component per variable, time excluded
    let pca = &result.pca;
    assert_eq!(pca.n_components, 4);
    assert_eq!(pca.feature_names, result.features.names);

    let total: f64 = pca.explained_variance_ratio.iter().sum();
    assert!((total - 1.0).abs() < 1e-6);
    let cumulative = &pca.cumulative_variance_ratio;
    assert!(cumulative.windows(2).all(|w| w[1] >= w[0] - 1e-15));
    assert!((cumulative.last().unwrap() - 1.0).abs() < 1e-6);
    assert!(pca
        .explained_variance_ratio
        .windows(2)
        .all(|w| w[0] >= w[1]));
}

#[test]
fn test_standardized_features() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "walk.mot", &gait_trial(64));
    let result = analyze_file(&path, &no_charts()).unwrap();

    let (_, scaled) =
        StandardScaler::fit_transform(&result.features.values, &result.features.names).unwrap();
    let n = scaled.nrows() as f64;
    for column in scaled.column_iter() {
        let mean = column.sum() / n;
        let std = (column.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();
        assert!(mean.abs() < 1e-9);
        assert!((std - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_projection_matches_full_fit() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "walk.mot", &gait_trial(80));
    let result = analyze_file(&path, &no_charts()).unwrap();

    assert_eq!(result.projection.n_components, 2);
    assert_eq!(result.projection_scores.ncols(), 2);
    for j in 0..2 {
        for i in 0..result.scores.nrows() {
            let diff = (result.projection_scores[(i, j)] - result.scores[(i, j)]).abs();
            assert!(diff < 1e-9, "row {i} PC{} differs by {diff}", j + 1);
        }
    }
}

#[test]
fn test_top_contributors_sorted_by_magnitude() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "walk.mot", &gait_trial(90));
    let result = analyze_file(&path, &no_charts()).unwrap();

    for component in 0..4 {
        let top = result.pca.top_contributors(component, 5).unwrap();
        assert_eq!(top.len(), 4);
        assert!(top
            .windows(2)
            .all(|w| w[0].loading.abs() >= w[1].loading.abs()));
        // Sign convention: the strongest loading is positive
        assert!(top[0].loading > 0.0);
    }
}

#[test]
fn test_constant_column_is_degenerate() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "flat.mot",
        "endheader\ntime knee flat\n0 1 7\n0.1 3 7\n0.2 2 7\n",
    );
    let err = analyze_file(&path, &no_charts()).unwrap_err();
    assert!(matches!(err, AnalysisError::Pca(PcaError::DegenerateColumn(name)) if name == "flat"));
}

#[test]
fn test_single_row_is_insufficient() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "one.mot", "endheader\ntime a b\n0 1 2\n");
    let err = analyze_file(&path, &no_charts()).unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Pca(PcaError::InsufficientData { rows: 1, cols: 2 })
    ));
}

// =============================================================================
// REPORTING
// =============================================================================

#[test]
fn test_json_report() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "walk.mot", &gait_trial(50));
    let result = analyze_file(&path, &no_charts()).unwrap();

    let json_path = dir.path().join("report.json");
    AnalysisReport::from_result(&result)
        .write_json(&json_path)
        .unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["rows"], 50);
    assert_eq!(value["trial_name"], "Coordinates");
    assert_eq!(value["in_degrees"], true);
    let components = value["components"].as_array().unwrap();
    assert_eq!(components.len(), 4);
    assert_eq!(components[0]["label"], "PC1");
    assert_eq!(components[0]["loadings"].as_array().unwrap().len(), 4);
    assert_eq!(value["column_stats"].as_array().unwrap().len(), 5);
}

#[test]
fn test_console_report_sections() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "walk.mot", &gait_trial(40));
    let result = analyze_file(&path, &no_charts()).unwrap();

    let text = gait_pca::report::format_report(&result, 4);
    assert!(text.contains("Variance of each variable"));
    assert!(text.contains("PC1: "));
    assert!(text.contains("PC1 to PC4: 1.0000 (100.00%)"));
    for pc in 1..=4 {
        assert!(text.contains(&format!("Contributions to PC{pc}:")));
    }
}

#[test]
fn test_scores_csv() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "walk.mot", &gait_trial(30));
    let result = analyze_file(&path, &no_charts()).unwrap();

    let csv_path = dir.path().join("scores.csv");
    gait_pca::report::write_scores_csv(&result, "time", &csv_path).unwrap();

    let text = fs::read_to_string(&csv_path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("PC1,PC2,PC3,PC4,time"));
    assert_eq!(lines.count(), 30);
}

// =============================================================================
// CHARTS
// =============================================================================

#[test]
fn test_render_and_save_all_charts() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "walk.mot", &gait_trial(60));
    let config = AnalysisConfig {
        output_dir: dir.path().join("charts"),
        chart_width: 640,
        chart_height: 400,
        ..Default::default()
    };
    let result = analyze_file(&path, &config).unwrap();

    let charts = StaticChartRenderer::render_all(&result, &config).unwrap();
    assert_eq!(charts.len(), 1 + config.loading_components + 1);

    let names: Vec<&str> = charts.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "explained_variance",
            "loadings_pc1",
            "loadings_pc2",
            "loadings_pc3",
            "loadings_pc4",
            "projection_pc1_pc2",
        ]
    );
    for chart in &charts {
        assert_eq!(chart.image.dimensions(), (640, 400), "{}", chart.name);
    }

    let saved = StaticChartRenderer::save_all(&charts, &config.output_dir).unwrap();
    assert_eq!(saved.len(), charts.len());
    for (file, chart) in saved.iter().zip(&charts) {
        let file_name = file.file_name().and_then(|n| n.to_str());
        assert_eq!(file_name, Some(format!("{}.png", chart.name).as_str()));
        assert_eq!(image::image_dimensions(file).unwrap(), (640, 400));
    }
}

#[test]
fn test_validated_config_renders_at_minimum_size() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "walk.mot", &gait_trial(20));

    let too_small = AnalysisConfig {
        chart_width: 200,
        chart_height: 150,
        ..Default::default()
    };
    assert!(too_small.validate().is_err());

    let config = AnalysisConfig {
        chart_width: gait_pca::charts::MIN_CHART_WIDTH,
        chart_height: gait_pca::charts::MIN_CHART_HEIGHT,
        ..Default::default()
    };
    assert!(config.validate().is_ok());
    let result = analyze_file(&path, &config).unwrap();
    let charts = StaticChartRenderer::render_all(&result, &config).unwrap();
    assert_eq!(charts.len(), 6);
}
