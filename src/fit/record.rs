//! Persisted result of one successful fit.

use serde::{Deserialize, Serialize};

use crate::data::EmpiricalPdf;
use crate::domain::{Bounds, ModelKind, Series, Spacing};
use crate::models::predict_all;

/// Everything needed to inspect, compare or re-plot a fit.
///
/// Created by `FitSession::fit` and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitRecord {
    pub model: ModelKind,
    /// Optimized parameters, catalog order.
    pub params: Vec<f64>,
    /// Parameter covariance; `+∞` entries mean "could not be estimated".
    #[serde(with = "nonfinite_matrix")]
    pub covariance: Vec<Vec<f64>>,
    /// The (possibly restricted) empirical PDF that was fitted.
    pub pdf: EmpiricalPdf,
    /// Exact arrays handed to the optimizer.
    pub xdata: Vec<f64>,
    pub ydata: Vec<f64>,
    pub initial_params: Vec<f64>,
    pub bounds: Bounds,
    pub iterations: usize,
    /// Sum of squared residuals at the optimum.
    pub sse: f64,
}

impl FitRecord {
    /// Check the shapes a record must have before its curves can be evaluated:
    /// one parameter per catalog slot, a square covariance of the same size and
    /// paired x/y data.
    pub fn check_shape(&self) -> Result<(), String> {
        let p = self.model.param_len();
        if self.params.len() != p {
            return Err(format!(
                "{} needs {p} parameters, record has {}",
                self.model.name(),
                self.params.len()
            ));
        }
        if self.initial_params.len() != p {
            return Err(format!(
                "{} needs {p} initial parameters, record has {}",
                self.model.name(),
                self.initial_params.len()
            ));
        }
        if self.covariance.len() != p || self.covariance.iter().any(|row| row.len() != p) {
            return Err(format!("covariance of {} is not {p}x{p}", self.model.name()));
        }
        if self.xdata.len() != self.ydata.len() {
            return Err(format!(
                "xdata has {} points, ydata has {}",
                self.xdata.len(),
                self.ydata.len()
            ));
        }
        Ok(())
    }

    /// Fitted density re-evaluated at the record's own `xdata`.
    pub fn curve(&self) -> Series {
        Series {
            label: self.model.name().to_string(),
            x: self.xdata.clone(),
            y: predict_all(self.model, &self.xdata, &self.params),
        }
    }

    /// Fitted density on `n` evenly spaced points across the record's x-range.
    ///
    /// Log spacing needs a strictly positive range and falls back to linear
    /// otherwise.
    pub fn curve_on_grid(&self, n: usize, spacing: Spacing) -> Series {
        let Some((lo, hi)) = self.x_range() else {
            return self.curve();
        };
        let n = n.max(2);
        let log = spacing == Spacing::Log && lo > 0.0;

        let x: Vec<f64> = (0..n)
            .map(|i| {
                let u = i as f64 / (n as f64 - 1.0);
                if log {
                    (lo.ln() + u * (hi.ln() - lo.ln())).exp()
                } else {
                    lo + u * (hi - lo)
                }
            })
            .collect();
        let y = predict_all(self.model, &x, &self.params);
        Series {
            label: self.model.name().to_string(),
            x,
            y,
        }
    }

    pub fn x_range(&self) -> Option<(f64, f64)> {
        let lo = self.xdata.iter().copied().reduce(f64::min)?;
        let hi = self.xdata.iter().copied().reduce(f64::max)?;
        Some((lo, hi))
    }

    /// `sqrt(diag(covariance))`.
    pub fn std_errors(&self) -> Vec<f64> {
        self.covariance
            .iter()
            .enumerate()
            .map(|(i, row)| row.get(i).copied().unwrap_or(f64::INFINITY).sqrt())
            .collect()
    }

    /// Root mean squared residual.
    pub fn rmse(&self) -> f64 {
        if self.xdata.is_empty() {
            return f64::NAN;
        }
        (self.sse / self.xdata.len() as f64).sqrt()
    }
}

/// JSON has no infinity: non-finite entries are written as `null` and read
/// back as `+∞`.
mod nonfinite_matrix {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(m: &[Vec<f64>], s: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<Vec<Option<f64>>> = m
            .iter()
            .map(|row| row.iter().map(|v| v.is_finite().then_some(*v)).collect())
            .collect();
        rows.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<f64>>, D::Error> {
        let rows: Vec<Vec<Option<f64>>> = Vec::deserialize(d)?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().map(|v| v.unwrap_or(f64::INFINITY)).collect())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FitRecord {
        let sample = [1.0, 1.0, 2.0, 4.0];
        let pdf = EmpiricalPdf::from_sample(&sample).unwrap();
        FitRecord {
            model: ModelKind::Exponential,
            params: vec![0.5],
            covariance: vec![vec![0.04]],
            xdata: pdf.support().to_vec(),
            ydata: pdf.frequencies().to_vec(),
            pdf,
            initial_params: vec![2.0],
            bounds: Bounds::default(),
            iterations: 4,
            sse: 0.03,
        }
    }

    #[test]
    fn curve_uses_record_x_values() {
        let r = record();
        let c = r.curve();
        assert_eq!(c.x, vec![1.0, 2.0, 4.0]);
        assert!((c.y[1] - (-1.0_f64).exp()).abs() < 1e-12);
        assert_eq!(c.label, "exponential");
    }

    #[test]
    fn grid_spans_the_x_range() {
        let r = record();
        for spacing in [Spacing::Linear, Spacing::Log] {
            let g = r.curve_on_grid(5, spacing);
            assert_eq!(g.len(), 5);
            assert!((g.x[0] - 1.0).abs() < 1e-12);
            assert!((g.x[4] - 4.0).abs() < 1e-12);
        }
        let log = r.curve_on_grid(3, Spacing::Log);
        assert!((log.x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn std_errors_are_root_of_diagonal() {
        assert!((record().std_errors()[0] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn infinite_covariance_survives_json() {
        let mut r = record();
        r.covariance = vec![vec![f64::INFINITY]];
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("[[null]]"), "{json}");
        let back: FitRecord = serde_json::from_str(&json).unwrap();
        assert!(back.covariance[0][0].is_infinite());
    }
}
