//! Command-line arguments for `distfit`.
//!
//! Only parsing lives here; `app` turns the parsed arguments into a `FitPlan`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{FitOptions, ModelKind, PlotStyle};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "distfit",
    version,
    about = "Fit probability densities to empirical frequency distributions"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit one or more models to a column of a CSV file.
    Fit(FitArgs),
    /// Draw a seeded sample from a catalog model and fit it.
    Synth(SynthArgs),
    /// Print a previously exported summary JSON.
    Show(ShowArgs),
}

/// Options for `distfit fit`.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Delimited file holding the sample.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Column to read: header name, or zero-based index.
    #[arg(short = 'c', long, default_value = "0")]
    pub column: String,

    /// Field delimiter.
    #[arg(short = 'd', long, default_value_t = ',')]
    pub delimiter: char,

    /// The file has no header row.
    #[arg(long)]
    pub no_header: bool,

    /// Keep values <= 0 (dropped by default).
    #[arg(long)]
    pub keep_non_positive: bool,

    #[command(flatten)]
    pub fit: FitOptionsArgs,
}

/// Options for `distfit synth`.
#[derive(Debug, Parser, Clone)]
pub struct SynthArgs {
    /// Model to draw the sample from.
    #[arg(long, value_enum)]
    pub dist: ModelKind,

    /// Generating parameters (comma separated). Defaults to the model's initial guess.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub params: Vec<f64>,

    /// Number of draws.
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub count: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Round draws to a multiple of this value so they repeat.
    #[arg(long)]
    pub resolution: Option<f64>,

    #[command(flatten)]
    pub fit: FitOptionsArgs,
}

/// Options shared by every command that fits.
#[derive(Debug, Args, Clone)]
pub struct FitOptionsArgs {
    /// Model(s) to fit, in order. Repeatable; defaults to the whole catalog.
    #[arg(short = 'm', long = "model", value_enum)]
    pub models: Vec<ModelKind>,

    /// Keep only support points strictly greater than this.
    #[arg(long, allow_hyphen_values = true)]
    pub x_min: Option<f64>,

    /// Keep only support points strictly less than this.
    #[arg(long, allow_hyphen_values = true)]
    pub x_max: Option<f64>,

    /// Initial parameters (comma separated), applied to every requested model.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub init: Vec<f64>,

    /// Optimizer iteration cap.
    #[arg(
        long,
        env = "DISTFIT_MAX_ITERATIONS",
        default_value_t = FitOptions::DEFAULT_MAX_ITERATIONS
    )]
    pub max_iterations: usize,

    /// Relative convergence tolerance.
    #[arg(long, env = "DISTFIT_TOLERANCE", default_value_t = FitOptions::DEFAULT_TOLERANCE)]
    pub tolerance: f64,

    /// Comparison style for `--export-plot`.
    #[arg(long, value_enum, default_value_t = PlotStyle::Panels)]
    pub style: PlotStyle,

    /// Mark the comparison for log-log axes.
    #[arg(long)]
    pub log_log: bool,

    /// Panel grid as ROWSxCOLS (e.g. 2x3).
    #[arg(long, value_parser = parse_layout)]
    pub layout: Option<(usize, usize)>,

    /// Write the session summary (records + covariance) to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,

    /// Write observed vs fitted values to CSV.
    #[arg(long = "export-csv")]
    pub export_csv: Option<PathBuf>,

    /// Write comparison plot data to JSON.
    #[arg(long = "export-plot")]
    pub export_plot: Option<PathBuf>,
}

/// Options for `distfit show`.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Summary JSON produced by `distfit fit --export-json`.
    #[arg(value_name = "JSON")]
    pub summary: PathBuf,
}

/// Parse `ROWSxCOLS`.
pub fn parse_layout(s: &str) -> Result<(usize, usize), String> {
    let (rows, cols) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected ROWSxCOLS, got '{s}'"))?;
    let rows: usize = rows.trim().parse().map_err(|_| format!("invalid row count '{rows}'"))?;
    let cols: usize = cols.trim().parse().map_err(|_| format!("invalid column count '{cols}'"))?;
    if rows == 0 || cols == 0 {
        return Err("layout dimensions must be positive".to_string());
    }
    Ok((rows, cols))
}
