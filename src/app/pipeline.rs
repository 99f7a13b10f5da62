//! Fit pipeline shared by `distfit fit` and `distfit synth`:
//! sample -> session -> one fit per requested model -> exports.

use std::path::PathBuf;

use crate::domain::{FitOptions, ModelKind, PlotStyle};
use crate::error::{AppError, FitError};
use crate::fit::session::{FitRequest, FitSession};

/// Everything one run needs, independent of clap.
#[derive(Debug, Clone)]
pub struct FitPlan {
    pub models: Vec<ModelKind>,
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub initial_params: Option<Vec<f64>>,
    pub options: FitOptions,
    pub style: PlotStyle,
    pub log_log: bool,
    pub layout: Option<(usize, usize)>,
    pub export_json: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
    pub export_plot: Option<PathBuf>,
}

impl FitPlan {
    /// Requested models, or the whole catalog when none were named.
    pub fn models(&self) -> &[ModelKind] {
        if self.models.is_empty() {
            &ModelKind::ALL
        } else {
            &self.models
        }
    }
}

/// All computed outputs of a single run.
#[derive(Debug)]
pub struct RunOutput {
    pub session: FitSession,
    /// Models whose fit failed, in request order.
    pub failures: Vec<(ModelKind, FitError)>,
}

/// Fit every planned model against `sample`.
///
/// A failed model is logged and recorded in `failures`; the remaining models
/// still run. The run only fails as a whole when nothing was fitted.
pub fn run_fits(sample: Vec<f64>, plan: &FitPlan) -> Result<RunOutput, AppError> {
    plan.options.validate()?;

    let mut session = FitSession::with_sample(sample).with_options(plan.options);
    let mut failures = Vec::new();

    for &model in plan.models() {
        let mut request = FitRequest::new(model);
        request.x_min = plan.x_min;
        request.x_max = plan.x_max;
        request.initial_params = plan.initial_params.clone();

        if let Err(err) = session.fit(&request) {
            tracing::warn!(model = %model, error = %err, "fit failed");
            failures.push((model, err));
        }
    }

    if session.is_empty() {
        return Err(match failures.pop() {
            Some((_, err)) => err.into(),
            None => AppError::new(2, "No models requested."),
        });
    }

    write_exports(&session, plan)?;

    Ok(RunOutput { session, failures })
}

fn write_exports(session: &FitSession, plan: &FitPlan) -> Result<(), AppError> {
    if let Some(path) = &plan.export_json {
        crate::io::summary::write_summary_json(path, session)?;
        tracing::info!(path = %path.display(), "summary written");
    }
    if let Some(path) = &plan.export_csv {
        crate::io::export::write_results_csv(path, session.history())?;
        tracing::info!(path = %path.display(), "results written");
    }
    if let Some(path) = &plan.export_plot {
        let plot = session.comparison(plan.style, plan.log_log, plan.layout)?;
        let file = std::fs::File::create(path).map_err(|e| {
            AppError::new(
                2,
                format!("Failed to create plot JSON '{}': {e}", path.display()),
            )
        })?;
        serde_json::to_writer_pretty(file, &plot)
            .map_err(|e| AppError::new(2, format!("Failed to write plot JSON: {e}")))?;
        tracing::info!(path = %path.display(), "comparison data written");
    }
    Ok(())
}
