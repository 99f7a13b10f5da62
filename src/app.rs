//! Binary entry point logic behind `src/main.rs`.
//!
//! Loads `.env`, installs the log subscriber, parses arguments, obtains a
//! sample (CSV or synthetic) and prints the fit reports.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, FitArgs, FitOptionsArgs, ShowArgs, SynthArgs};
use crate::data::{SampleConfig, generate_sample};
use crate::domain::FitOptions;
use crate::error::AppError;
use crate::io::ingest::{ColumnSelector, IngestConfig, load_sample};

pub mod pipeline;

use pipeline::{FitPlan, RunOutput};

/// Environment variable holding the log filter (e.g. `debug`, `distfit=trace`).
pub const LOG_ENV: &str = "DISTFIT_LOG";

/// Entry point for the `distfit` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Synth(args) => handle_synth(args),
        Command::Show(args) => handle_show(args),
    }
}

/// Logs go to stderr so stdout stays the report.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    if !args.delimiter.is_ascii() {
        return Err(AppError::new(
            2,
            format!("Delimiter must be a single ASCII character, got '{}'.", args.delimiter),
        ));
    }

    let config = IngestConfig {
        path: args.input.clone(),
        column: ColumnSelector::parse(&args.column),
        delimiter: args.delimiter as u8,
        has_header: !args.no_header,
        positive_only: !args.keep_non_positive,
    };
    let ingested = load_sample(&config)?;
    tracing::info!(
        column = %ingested.column,
        rows = ingested.rows_read,
        used = ingested.values.len(),
        dropped_non_positive = ingested.dropped_non_positive,
        "sample loaded"
    );

    let output = pipeline::run_fits(ingested.values, &fit_plan_from_args(&args.fit))?;
    print_run(&output);
    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let params = if args.params.is_empty() {
        args.dist.default_params().to_vec()
    } else {
        args.params.clone()
    };
    let sample = generate_sample(&SampleConfig {
        model: args.dist,
        params,
        count: args.count,
        seed: args.seed,
        resolution: args.resolution,
    })?;

    let mut plan = fit_plan_from_args(&args.fit);
    if plan.models.is_empty() {
        plan.models = vec![args.dist];
    }

    let output = pipeline::run_fits(sample, &plan)?;
    print_run(&output);
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let summary = crate::io::summary::read_summary_json(&args.summary)?;

    println!(
        "Summary written by {} at {}",
        summary.tool,
        summary.created_at.to_rfc3339()
    );
    for record in &summary.records {
        println!("{}", crate::report::format_fit_record(record));
    }
    println!(
        "{}",
        crate::report::format_session_summary(None, summary.sample_size, &summary.records)
    );
    Ok(())
}

fn print_run(output: &RunOutput) {
    for record in output.session.history() {
        println!("{}", crate::report::format_fit_record(record));
    }
    println!(
        "{}",
        crate::report::format_session_summary(
            output.session.pdf(),
            output.session.sample().map(<[f64]>::len),
            output.session.history()
        )
    );
    for (model, err) in &output.failures {
        eprintln!("{} not fitted: {err}", model.display_name());
    }
}

pub fn fit_plan_from_args(args: &FitOptionsArgs) -> FitPlan {
    FitPlan {
        models: args.models.clone(),
        x_min: args.x_min,
        x_max: args.x_max,
        initial_params: (!args.init.is_empty()).then(|| args.init.clone()),
        options: FitOptions {
            max_iterations: args.max_iterations,
            tolerance: args.tolerance,
        },
        style: args.style,
        log_log: args.log_log,
        layout: args.layout,
        export_json: args.export_json.clone(),
        export_csv: args.export_csv.clone(),
        export_plot: args.export_plot.clone(),
    }
}
