//! Export observed vs fitted frequencies to CSV.
//!
//! One row per `(record, support point)`, so several fits can be compared in
//! a spreadsheet by filtering on `fit` or `model`.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::AppError;
use crate::fit::record::FitRecord;
use crate::models::predict;

/// Write per-point results of every record to a CSV file.
pub fn write_results_csv(path: &Path, history: &[FitRecord]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;
    write_results(file, history)
}

/// Same as [`write_results_csv`] for any writer.
pub fn write_results<W: Write>(mut out: W, history: &[FitRecord]) -> Result<(), AppError> {
    // Header
    writeln!(out, "fit,model,x,y_obs,y_fit,residual")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for (i, record) in history.iter().enumerate() {
        for (&x, &y_obs) in record.xdata.iter().zip(record.ydata.iter()) {
            let y_fit = predict(record.model, x, &record.params);
            writeln!(
                out,
                "{},{},{:.10e},{:.10e},{:.10e},{:.10e}",
                i + 1,
                record.model.name(),
                x,
                y_obs,
                y_fit,
                y_obs - y_fit,
            )
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EmpiricalPdf;
    use crate::domain::{Bounds, ModelKind};

    #[test]
    fn one_row_per_point_and_record() {
        let pdf = EmpiricalPdf::from_sample(&[1.0, 2.0, 2.0]).unwrap();
        let record = FitRecord {
            model: ModelKind::Exponential,
            params: vec![1.0],
            covariance: vec![vec![0.0]],
            xdata: pdf.support().to_vec(),
            ydata: pdf.frequencies().to_vec(),
            pdf,
            initial_params: vec![2.0],
            bounds: Bounds::default(),
            iterations: 3,
            sse: 0.1,
        };

        let mut buf = Vec::new();
        write_results(&mut buf, &[record.clone(), record]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "fit,model,x,y_obs,y_fit,residual");
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("1,exponential,"));
        assert!(lines[4].starts_with("2,exponential,"));

        let cols: Vec<f64> = lines[1].split(',').skip(2).map(|c| c.parse().unwrap()).collect();
        assert!((cols[0] - 1.0).abs() < 1e-12);
        assert!((cols[2] - (-1.0f64).exp()).abs() < 1e-9);
        assert!((cols[3] - (cols[1] - cols[2])).abs() < 1e-9);
    }
}
