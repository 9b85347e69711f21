//! Gait PCA - kinematics (.mot) analysis library
//!
//! Loads a motion-capture joint-angle trial, reports per-column variance,
//! standardizes the variables, runs PCA and renders the diagnostic charts.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod pca;
pub mod pipeline;
pub mod report;
pub mod stats;

pub use config::AnalysisConfig;
pub use pipeline::{analyze_file, analyze_table, AnalysisError, AnalysisResult};
