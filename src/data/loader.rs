//! Motion File Loader Module
//! Handles `.mot` loading: header block scanning and whitespace table parsing into Polars.

use log::{debug, warn};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Token marking the end of the metadata block (matched case-insensitively).
pub const HEADER_SENTINEL: &str = "endheader";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Header terminator 'endheader' not found")]
    MissingHeaderTerminator,
    #[error("No column header line after 'endheader'")]
    MissingColumnHeader,
    #[error("Line {line}: expected {expected} fields, found {found}")]
    RowWidth {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("Line {line}, column '{column}': '{value}' is not a number")]
    InvalidNumber {
        line: usize,
        column: String,
        value: String,
    },
    #[error("Failed to build table: {0}")]
    Polars(#[from] PolarsError),
}

/// Metadata captured from the header block.
///
/// OpenSim writes the trial name on the first line followed by `key=value`
/// pairs such as `nRows=151`, `nColumns=24` and `inDegrees=yes`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotHeader {
    pub name: Option<String>,
    pub entries: Vec<(String, String)>,
}

impl MotHeader {
    fn parse(lines: &[&str]) -> Self {
        let mut header = MotHeader::default();

        for line in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match trimmed.split_once('=') {
                Some((key, value)) => header
                    .entries
                    .push((key.trim().to_string(), value.trim().to_string())),
                None if header.name.is_none() && header.entries.is_empty() => {
                    header.name = Some(trimmed.to_string());
                }
                None => {}
            }
        }

        header
    }

    /// Look up a header value by key (case-insensitive).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Declared row count (`nRows`), if present and numeric.
    pub fn declared_rows(&self) -> Option<usize> {
        self.get("nRows").and_then(|v| v.parse().ok())
    }

    /// Declared column count (`nColumns`), if present and numeric.
    pub fn declared_columns(&self) -> Option<usize> {
        self.get("nColumns").and_then(|v| v.parse().ok())
    }

    /// Whether angles are stored in degrees (`inDegrees=yes`).
    pub fn in_degrees(&self) -> Option<bool> {
        self.get("inDegrees").map(|v| {
            let v = v.to_ascii_lowercase();
            v == "yes" || v == "true" || v == "1"
        })
    }
}

/// A loaded kinematics trial: header metadata plus the numeric table.
#[derive(Debug, Clone)]
pub struct MotionTable {
    pub header: MotHeader,
    pub df: DataFrame,
}

impl MotionTable {
    /// Column names in file order.
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn column_count(&self) -> usize {
        self.df.width()
    }
}

/// Index of the first line containing the header sentinel.
pub fn find_header_end(lines: &[&str]) -> Option<usize> {
    lines
        .iter()
        .position(|line| line.to_lowercase().contains(HEADER_SENTINEL))
}

/// Parse the full text of a `.mot` file.
pub fn parse_mot(text: &str) -> Result<MotionTable, LoaderError> {
    let lines: Vec<&str> = text.lines().collect();
    let header_end = find_header_end(&lines).ok_or(LoaderError::MissingHeaderTerminator)?;
    let header = MotHeader::parse(&lines[..header_end]);

    // Body lines paired with their 1-based line number in the file
    let mut body = lines
        .iter()
        .enumerate()
        .skip(header_end + 1)
        .map(|(i, line)| (i + 1, *line))
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header_line) = body.next().ok_or(LoaderError::MissingColumnHeader)?;
    let names: Vec<String> = header_line.split_whitespace().map(str::to_string).collect();

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    for (line_no, line) in body {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != names.len() {
            return Err(LoaderError::RowWidth {
                line: line_no,
                expected: names.len(),
                found: fields.len(),
            });
        }
        for ((field, name), column) in fields.iter().zip(&names).zip(columns.iter_mut()) {
            let value = field
                .parse::<f64>()
                .map_err(|_| LoaderError::InvalidNumber {
                    line: line_no,
                    column: name.clone(),
                    value: field.to_string(),
                })?;
            column.push(value);
        }
    }

    let df = DataFrame::new(
        names
            .iter()
            .zip(columns)
            .map(|(name, values)| Column::new(name.as_str().into(), values))
            .collect(),
    )?;

    let table = MotionTable { header, df };
    check_declared_shape(&table);
    Ok(table)
}

/// Warn when the header's declared shape disagrees with the parsed body.
fn check_declared_shape(table: &MotionTable) {
    if let Some(rows) = table.header.declared_rows() {
        if rows != table.row_count() {
            warn!(
                "Header declares nRows={} but {} data rows were parsed",
                rows,
                table.row_count()
            );
        }
    }
    if let Some(cols) = table.header.declared_columns() {
        if cols != table.column_count() {
            warn!(
                "Header declares nColumns={} but {} columns were parsed",
                cols,
                table.column_count()
            );
        }
    }
}

/// Handles `.mot` loading and keeps the most recent table.
pub struct MotLoader {
    table: Option<MotionTable>,
    file_path: Option<PathBuf>,
}

impl Default for MotLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl MotLoader {
    pub fn new() -> Self {
        Self {
            table: None,
            file_path: None,
        }
    }

    /// Load a `.mot` file, replacing any previously loaded table.
    pub fn load_mot(&mut self, file_path: &Path) -> Result<&MotionTable, LoaderError> {
        self.file_path = Some(file_path.to_path_buf());

        let text = std::fs::read_to_string(file_path).map_err(|source| LoaderError::Io {
            path: file_path.to_path_buf(),
            source,
        })?;
        let table = parse_mot(&text)?;
        debug!(
            "Parsed {} rows x {} columns from {}",
            table.row_count(),
            table.column_count(),
            file_path.display()
        );

        Ok(&*self.table.insert(table))
    }

    /// Get a reference to the loaded table.
    pub fn get_table(&self) -> Option<&MotionTable> {
        self.table.as_ref()
    }

    /// Get file path.
    pub fn get_file_path(&self) -> Option<&PathBuf> {
        self.file_path.as_ref()
    }
}
