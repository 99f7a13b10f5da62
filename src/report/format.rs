//! Formatted terminal output for fits and sessions.
//!
//! The library never prints. The binary prints these strings to stdout.

use crate::data::EmpiricalPdf;
use crate::domain::Bounds;
use crate::fit::record::FitRecord;

/// Multi-line summary of one fit: parameters, standard errors, covariance.
pub fn format_fit_record(record: &FitRecord) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "------------ {} ({}) ------------\n",
        record.model.display_name(),
        record.model.name()
    ));
    out.push_str(&format!(
        "Points: n={} | support={} | mass={:.4}\n",
        record.xdata.len(),
        fmt_bounds(&record.bounds),
        record.pdf.total_mass()
    ));

    out.push_str("Optimal parameters:\n");
    let std_errors = record.std_errors();
    for ((name, value), se) in record
        .model
        .param_names()
        .iter()
        .zip(record.params.iter())
        .zip(std_errors.iter())
    {
        out.push_str(&format!("  {name:<8} {value:>14.6} ± {}\n", fmt_num(*se)));
    }

    out.push_str("Estimated covariance:\n");
    for row in &record.covariance {
        out.push_str(&format!("  {}\n", fmt_vec(row)));
    }

    out.push_str(&format!(
        "SSE={:.6e} RMSE={:.6e} iterations={} start={}\n",
        record.sse,
        record.rmse(),
        record.iterations,
        fmt_vec(&record.initial_params)
    ));

    out
}

/// Sample overview plus a one-line-per-fit table.
pub fn format_session_summary(
    pdf: Option<&EmpiricalPdf>,
    sample_size: Option<usize>,
    history: &[FitRecord],
) -> String {
    let mut out = String::new();

    out.push_str("=== distfit - distribution fit ===\n");
    match (pdf, sample_size) {
        (Some(pdf), n) => {
            let (lo, hi) = pdf.range().unwrap_or((f64::NAN, f64::NAN));
            out.push_str(&format!(
                "Sample: n={} | distinct={} | range=[{}, {}]\n",
                n.map(|n| n.to_string()).unwrap_or_else(|| "?".to_string()),
                pdf.len(),
                fmt_num(lo),
                fmt_num(hi)
            ));
        }
        (None, Some(n)) => out.push_str(&format!("Sample: n={n}\n")),
        (None, None) => out.push_str("Sample: none\n"),
    }

    if history.is_empty() {
        out.push_str("\nNo fits recorded.\n");
        return out;
    }

    out.push_str("\nFits:\n");
    out.push_str(
        format!(
            "{:>3} {:<22} {:>6} {:>14} {:>8} {}\n",
            "#", "model", "n", "sse", "iter", "params"
        )
        .trim_end(),
    );
    out.push('\n');
    for (i, r) in history.iter().enumerate() {
        out.push_str(
            format!(
                "{:>3} {:<22} {:>6} {:>14.6e} {:>8} {}\n",
                i + 1,
                truncate(r.model.display_name(), 22),
                r.xdata.len(),
                r.sse,
                r.iterations,
                fmt_vec(&r.params)
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_bounds(b: &Bounds) -> String {
    if b.is_unbounded() {
        return "all".to_string();
    }
    let lo = b.x_min.map(fmt_num).unwrap_or_else(|| "-inf".to_string());
    let hi = b.x_max.map(fmt_num).unwrap_or_else(|| "inf".to_string());
    format!("({lo}, {hi})")
}

fn fmt_num(x: f64) -> String {
    if x.is_finite() { format!("{x:.6}") } else { format!("{x}") }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| fmt_num(*x)).collect();
    format!("[{}]", parts.join(", "))
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelKind;

    fn record() -> FitRecord {
        let pdf = EmpiricalPdf::from_sample(&[1.0, 2.0, 2.0, 3.0]).unwrap();
        FitRecord {
            model: ModelKind::Gamma,
            params: vec![2.0, 1.5],
            covariance: vec![vec![0.01, 0.002], vec![0.002, f64::INFINITY]],
            xdata: pdf.support().to_vec(),
            ydata: pdf.frequencies().to_vec(),
            pdf,
            initial_params: vec![1.0, 2.0],
            bounds: Bounds {
                x_min: Some(0.0),
                x_max: None,
            },
            iterations: 7,
            sse: 1e-4,
        }
    }

    #[test]
    fn fit_record_lists_named_parameters() {
        let text = format_fit_record(&record());
        assert!(text.contains("Gamma (gamma)"));
        assert!(text.contains("alpha"));
        assert!(text.contains("± 0.100000"));
        assert!(text.contains("inf"));
        assert!(text.contains("(0.000000, inf)"));
        assert!(text.contains("iterations=7"));
    }

    #[test]
    fn session_summary_has_one_row_per_fit() {
        let r = record();
        let pdf = r.pdf.clone();
        let text = format_session_summary(Some(&pdf), Some(4), &[r.clone(), r]);
        assert!(text.contains("n=4 | distinct=3"));
        let rows = text.lines().filter(|l| l.contains("Gamma")).count();
        assert_eq!(rows, 2);
    }

    #[test]
    fn empty_history_is_stated() {
        let text = format_session_summary(None, None, &[]);
        assert!(text.contains("Sample: none"));
        assert!(text.contains("No fits recorded."));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
