//! Comparison data for plotting fitted curves against the empirical PDF.
//!
//! Nothing here draws. A renderer gets, per panel, the empirical scatter and
//! the fitted curves, plus the grid layout and whether axes are log-log.

use serde::{Deserialize, Serialize};

use crate::data::EmpiricalPdf;
use crate::domain::{PlotStyle, Series};
use crate::error::FitError;
use crate::fit::record::FitRecord;

/// Largest automatic panel grid.
const MAX_AUTO_PANELS: usize = 9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    /// Empirical PDF scatter.
    pub reference: Series,
    pub curves: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPlot {
    pub style: PlotStyle,
    pub log_log: bool,
    /// `(rows, cols)`
    pub layout: (usize, usize),
    pub panels: Vec<Panel>,
    pub y_label: String,
}

/// Grid used when the caller gives none: one row for fewer than three fits,
/// 2×3 up to six, 3×3 beyond that.
pub fn default_layout(n: usize) -> (usize, usize) {
    if n < 3 {
        (1, n.max(1))
    } else if n < 7 {
        (2, 3)
    } else {
        (3, 3)
    }
}

/// Build comparison panels for `history`.
///
/// The reference scatter is `session_pdf` when present, otherwise each
/// record's own working PDF.
pub fn build_comparison(
    session_pdf: Option<&EmpiricalPdf>,
    history: &[FitRecord],
    style: PlotStyle,
    log_log: bool,
    layout: Option<(usize, usize)>,
) -> Result<ComparisonPlot, FitError> {
    if history.is_empty() {
        return Err(FitError::EmptyHistory);
    }

    let reference_for = |record: &FitRecord| -> Series {
        session_pdf.unwrap_or(&record.pdf).to_series("empirical")
    };

    let (layout, panels) = match style {
        PlotStyle::Overlay => {
            let panel = Panel {
                reference: reference_for(&history[0]),
                curves: history.iter().map(FitRecord::curve).collect(),
            };
            ((1, 1), vec![panel])
        }
        PlotStyle::Panels => {
            let n = history.len();
            let layout = match layout {
                Some((rows, cols)) => {
                    if rows == 0 || cols == 0 || rows * cols < n {
                        return Err(FitError::InvalidOptions(format!(
                            "a {rows}x{cols} layout cannot hold {n} panels"
                        )));
                    }
                    (rows, cols)
                }
                None if n > MAX_AUTO_PANELS => {
                    return Err(FitError::InvalidOptions(format!(
                        "{n} fits need an explicit layout \
                         (automatic grids hold at most {MAX_AUTO_PANELS})"
                    )));
                }
                None => default_layout(n),
            };
            let panels = history
                .iter()
                .map(|record| Panel {
                    reference: reference_for(record),
                    curves: vec![record.curve()],
                })
                .collect();
            (layout, panels)
        }
    };

    Ok(ComparisonPlot {
        style,
        log_log,
        layout,
        panels,
        y_label: "Pr".to_string(),
    })
}
