//! Delimited-file sample ingest.
//!
//! Turns one column of a CSV (or other delimited) file into a numeric sample.
//! A missing column is fatal (exit code 2). Unparsable cells are skipped and
//! collected as row errors. An empty result is fatal (exit code 3).

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use csv::StringRecord;

use crate::error::AppError;

/// Which column holds the observations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    /// Header name (case-insensitive).
    Name(String),
    /// Zero-based position.
    Index(usize),
}

impl ColumnSelector {
    /// Digits select by position, anything else by header name.
    pub fn parse(s: &str) -> Self {
        match s.trim().parse::<usize>() {
            Ok(i) => ColumnSelector::Index(i),
            Err(_) => ColumnSelector::Name(s.trim().to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub path: PathBuf,
    pub column: ColumnSelector,
    pub delimiter: u8,
    pub has_header: bool,
    /// Drop values `<= 0` (most catalog densities live on `x > 0`).
    pub positive_only: bool,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct IngestedSample {
    pub values: Vec<f64>,
    /// Resolved column label (header name, or `#<index>`).
    pub column: String,
    pub rows_read: usize,
    pub dropped_non_positive: usize,
    pub row_errors: Vec<RowError>,
}

pub fn load_sample(config: &IngestConfig) -> Result<IngestedSample, AppError> {
    let file = File::open(&config.path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open sample file '{}': {e}", config.path.display()),
        )
    })?;
    read_sample(file, config)
}

/// Same as [`load_sample`] for any reader (`config.path` is only used in messages).
pub fn read_sample<R: Read>(reader: R, config: &IngestConfig) -> Result<IngestedSample, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(config.has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let (col_idx, column) = if config.has_header {
        let headers = reader
            .headers()
            .map_err(|e| AppError::new(2, format!("Failed to read headers: {e}")))?
            .clone();
        resolve_column(&headers, &config.column)?
    } else {
        match &config.column {
            ColumnSelector::Index(i) => (*i, format!("#{i}")),
            ColumnSelector::Name(name) => {
                return Err(AppError::new(
                    2,
                    format!("Column `{name}` selected by name, but the file has no header row."),
                ));
            }
        }
    };

    let first_line = if config.has_header { 2 } else { 1 };
    let mut values = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut dropped_non_positive = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + first_line;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_value(&record, col_idx) {
            Ok(v) if config.positive_only && v <= 0.0 => dropped_non_positive += 1,
            Ok(v) => values.push(v),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        tracing::warn!(
            skipped = row_errors.len(),
            first_line = row_errors[0].line,
            first_error = %row_errors[0].message,
            "rows skipped during ingest"
        );
    }

    if values.is_empty() {
        return Err(AppError::new(
            3,
            format!(
                "No usable values in column `{column}` of '{}' ({rows_read} rows read).",
                config.path.display()
            ),
        ));
    }

    Ok(IngestedSample {
        values,
        column,
        rows_read,
        dropped_non_positive,
        row_errors,
    })
}

fn resolve_column(
    headers: &StringRecord,
    selector: &ColumnSelector,
) -> Result<(usize, String), AppError> {
    match selector {
        ColumnSelector::Index(i) => {
            let name = headers.get(*i).ok_or_else(|| {
                AppError::new(
                    2,
                    format!("Column index {i} out of range ({} columns).", headers.len()),
                )
            })?;
            Ok((*i, normalize_header_name(name)))
        }
        ColumnSelector::Name(name) => {
            let wanted = normalize_header_name(name);
            headers
                .iter()
                .position(|h| normalize_header_name(h) == wanted)
                .map(|i| (i, wanted.clone()))
                .ok_or_else(|| AppError::new(2, format!("Missing required column: `{name}`")))
        }
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports may prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_value(record: &StringRecord, idx: usize) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing value.".to_string())?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid number '{raw}'."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite value '{raw}'."))
    }
}
