//! Data module - .mot loading and processing

mod loader;
mod processor;

pub use loader::{find_header_end, parse_mot, LoaderError, MotHeader, MotLoader, MotionTable};
pub use processor::{DataProcessor, FeatureMatrix, ProcessorError};
