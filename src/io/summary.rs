//! Read/write session summary JSON files.
//!
//! A summary is the portable representation of a session:
//! - tool name and creation time
//! - the sample size the PDF was built from
//! - every fit record in history order
//!
//! Infinite covariance entries are written as `null` and read back as `inf`.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::fit::record::FitRecord;
use crate::fit::session::FitSession;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionFile {
    pub tool: String,
    pub created_at: DateTime<Utc>,
    pub sample_size: Option<usize>,
    pub records: Vec<FitRecord>,
}

impl SessionFile {
    pub fn from_session(session: &FitSession) -> Self {
        Self {
            tool: "distfit".to_string(),
            created_at: Utc::now(),
            sample_size: session.sample().map(<[f64]>::len),
            records: session.history().to_vec(),
        }
    }
}

/// Write a summary JSON file.
pub fn write_summary_json(path: &Path, session: &FitSession) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create summary JSON '{}': {e}", path.display()),
        )
    })?;

    serde_json::to_writer_pretty(file, &SessionFile::from_session(session))
        .map_err(|e| AppError::new(2, format!("Failed to write summary JSON: {e}")))?;

    Ok(())
}

/// Read a summary JSON file.
///
/// Every record is shape-checked so that a hand-edited file fails here with
/// exit code 2 rather than later when its curves are evaluated.
pub fn read_summary_json(path: &Path) -> Result<SessionFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open summary JSON '{}': {e}", path.display()),
        )
    })?;
    let summary: SessionFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid summary JSON: {e}")))?;

    for (i, record) in summary.records.iter().enumerate() {
        record
            .check_shape()
            .map_err(|e| AppError::new(2, format!("Invalid summary JSON: record {i}: {e}")))?;
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelKind;
    use crate::fit::session::FitRequest;

    #[test]
    fn summary_round_trips_through_disk() {
        // Counts halve from one value to the next.
        let sample: Vec<f64> = (1..=6u32)
            .flat_map(|k| std::iter::repeat(k as f64).take(1 << (6 - k)))
            .collect();
        let mut session = FitSession::with_sample(sample);
        session
            .fit(&FitRequest::new(ModelKind::Exponential).initial_params(vec![0.5]))
            .unwrap();

        let path =
            std::env::temp_dir().join(format!("distfit-summary-{}.json", std::process::id()));
        write_summary_json(&path, &session).unwrap();
        let back = read_summary_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.tool, "distfit");
        assert_eq!(back.sample_size, Some(63));
        assert_eq!(back.records.len(), 1);
        assert_eq!(back.records[0].model, ModelKind::Exponential);
        assert!((back.records[0].params[0] - session.history()[0].params[0]).abs() < 1e-12);
        assert_eq!(back.records[0].xdata, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn infinite_observations_do_not_break_the_round_trip() {
        let mut sample: Vec<f64> = (1..=6u32)
            .flat_map(|k| std::iter::repeat(k as f64).take(1 << (6 - k)))
            .collect();
        sample.push(f64::INFINITY);
        let mut session = FitSession::with_sample(sample);
        session
            .fit(&FitRequest::new(ModelKind::Exponential).initial_params(vec![0.5]))
            .unwrap();

        let path =
            std::env::temp_dir().join(format!("distfit-summary-inf-{}.json", std::process::id()));
        write_summary_json(&path, &session).unwrap();
        let back = read_summary_json(&path);
        let _ = std::fs::remove_file(&path);

        let back = back.unwrap();
        assert_eq!(back.sample_size, Some(64));
        assert_eq!(back.records[0].xdata, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn record_with_too_few_parameters_is_rejected() {
        let sample: Vec<f64> = (1..=6u32)
            .flat_map(|k| std::iter::repeat(k as f64).take(1 << (6 - k)))
            .collect();
        let mut session = FitSession::with_sample(sample);
        session
            .fit(&FitRequest::new(ModelKind::Exponential).initial_params(vec![0.5]))
            .unwrap();
        let mut file = SessionFile::from_session(&session);
        // Relabel the one-parameter record as a two-parameter model.
        file.records[0].model = ModelKind::Gamma;

        let path =
            std::env::temp_dir().join(format!("distfit-summary-bad-{}.json", std::process::id()));
        std::fs::write(&path, serde_json::to_string(&file).unwrap()).unwrap();
        let err = read_summary_json(&path);
        let _ = std::fs::remove_file(&path);

        let err = err.unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("gamma"), "{err}");
    }

    #[test]
    fn missing_file_is_a_usage_error() {
        let err = read_summary_json(Path::new("/nonexistent/distfit.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
