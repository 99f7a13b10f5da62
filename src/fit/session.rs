//! Fit sessions: one empirical PDF, many fit attempts.
//!
//! A session is built with or without a sample. With a sample it eagerly
//! builds the empirical PDF and is `Ready`; without one every fit call must
//! bring its own data. Successful fits are appended to the history in call
//! order. Failed fits leave the history untouched.

use crate::data::EmpiricalPdf;
use crate::domain::{Bounds, FitOptions, ModelKind, PlotStyle, SessionState, Series};
use crate::error::FitError;
use crate::fit::fitter::curve_fit;
use crate::fit::record::FitRecord;
use crate::report::compare::{ComparisonPlot, build_comparison};

/// One fit call.
#[derive(Debug, Clone)]
pub struct FitRequest<'a> {
    pub model: ModelKind,
    /// Fit this sample's PDF instead of the session's.
    pub data: Option<&'a [f64]>,
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    /// Starting point; the model default when `None`.
    pub initial_params: Option<Vec<f64>>,
    /// Solver settings; the session's defaults when `None`.
    pub options: Option<FitOptions>,
}

impl<'a> FitRequest<'a> {
    pub fn new(model: ModelKind) -> Self {
        Self {
            model,
            data: None,
            x_min: None,
            x_max: None,
            initial_params: None,
            options: None,
        }
    }

    /// Resolve a model by name; unknown names are `UnknownModel`.
    pub fn named(name: &str) -> Result<Self, FitError> {
        Ok(Self::new(name.parse()?))
    }

    pub fn data(mut self, data: &'a [f64]) -> Self {
        self.data = Some(data);
        self
    }

    pub fn x_min(mut self, x_min: f64) -> Self {
        self.x_min = Some(x_min);
        self
    }

    pub fn x_max(mut self, x_max: f64) -> Self {
        self.x_max = Some(x_max);
        self
    }

    pub fn initial_params(mut self, params: Vec<f64>) -> Self {
        self.initial_params = Some(params);
        self
    }

    pub fn options(mut self, options: FitOptions) -> Self {
        self.options = Some(options);
        self
    }

    fn bounds(&self) -> Bounds {
        Bounds {
            x_min: self.x_min,
            x_max: self.x_max,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FitSession {
    sample: Option<Vec<f64>>,
    pdf: Option<EmpiricalPdf>,
    history: Vec<FitRecord>,
    options: FitOptions,
}

impl FitSession {
    /// Session without a sample (`NoData`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Session owning `sample` and its empirical PDF.
    ///
    /// A sample with no usable value leaves the session in `NoData`.
    pub fn with_sample(sample: Vec<f64>) -> Self {
        let pdf = EmpiricalPdf::from_sample(&sample);
        Self {
            sample: Some(sample),
            pdf,
            ..Self::default()
        }
    }

    /// Default solver settings for requests that carry none.
    pub fn with_options(mut self, options: FitOptions) -> Self {
        self.options = options;
        self
    }

    pub fn state(&self) -> SessionState {
        if self.pdf.is_some() {
            SessionState::Ready
        } else {
            SessionState::NoData
        }
    }

    pub fn sample(&self) -> Option<&[f64]> {
        self.sample.as_deref()
    }

    pub fn pdf(&self) -> Option<&EmpiricalPdf> {
        self.pdf.as_ref()
    }

    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    pub fn history(&self) -> &[FitRecord] {
        &self.history
    }

    pub fn record(&self, index: usize) -> Option<&FitRecord> {
        self.history.get(index)
    }

    pub fn latest(&self) -> Option<&FitRecord> {
        self.history.last()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Fit one model and append the result to the history.
    pub fn fit(&mut self, request: &FitRequest<'_>) -> Result<&FitRecord, FitError> {
        let model = request.model;

        // Resolve the PDF before anything touches the optimizer.
        let call_pdf;
        let pdf = match request.data {
            Some(data) => {
                call_pdf = EmpiricalPdf::from_sample(data).ok_or(FitError::NoData)?;
                &call_pdf
            }
            None => self.pdf.as_ref().ok_or(FitError::NoData)?,
        };

        let initial_params = match &request.initial_params {
            Some(p) => p.clone(),
            None => model.default_params().to_vec(),
        };
        if initial_params.len() != model.param_len() {
            return Err(FitError::ParameterCount {
                model,
                expected: model.param_len(),
                actual: initial_params.len(),
            });
        }

        let bounds = request.bounds();
        let working = pdf.restrict(bounds);
        if working.is_empty() {
            return Err(FitError::EmptyDomain {
                x_min: bounds.x_min,
                x_max: bounds.x_max,
            });
        }

        let options = request.options.unwrap_or(self.options);
        let xdata = working.support().to_vec();
        let ydata = working.frequencies().to_vec();

        let fit = curve_fit(model, &xdata, &ydata, &initial_params, &options)?;

        tracing::info!(
            %model,
            params = ?fit.params,
            covariance = ?fit.covariance,
            iterations = fit.iterations,
            sse = fit.sse,
            points = xdata.len(),
            "distribution fitted"
        );

        self.history.push(FitRecord {
            model,
            params: fit.params,
            covariance: fit.covariance,
            pdf: working,
            xdata,
            ydata,
            initial_params,
            bounds,
            iterations: fit.iterations,
            sse: fit.sse,
        });
        Ok(&self.history[self.history.len() - 1])
    }

    /// `fit` with the model given by name.
    pub fn fit_named(
        &mut self,
        name: &str,
        x_min: Option<f64>,
        x_max: Option<f64>,
        initial_params: Option<Vec<f64>>,
    ) -> Result<&FitRecord, FitError> {
        let mut request = FitRequest::named(name)?;
        request.x_min = x_min;
        request.x_max = x_max;
        request.initial_params = initial_params;
        self.fit(&request)
    }

    /// Fitted density of the `index`-th record over that record's own x values.
    pub fn fitted_curve(&self, index: usize) -> Option<Series> {
        self.history.get(index).map(FitRecord::curve)
    }

    /// Curves of every recorded fit next to the empirical reference.
    ///
    /// `layout` is `(rows, cols)` for `PlotStyle::Panels`; `None` picks one
    /// from the number of fits.
    pub fn comparison(
        &self,
        style: PlotStyle,
        log_log: bool,
        layout: Option<(usize, usize)>,
    ) -> Result<ComparisonPlot, FitError> {
        build_comparison(self.pdf.as_ref(), &self.history, style, log_log, layout)
    }
}
