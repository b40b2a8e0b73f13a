//! Fixed-width text tables.
//!
//! Every table trims trailing whitespace per line so output diffs cleanly.

use crate::domain::{Coefficient, ColumnSummary};
use crate::estimate::FirstStageDiagnostics;
use crate::math::LinearFit;

const TERM_WIDTH: usize = 14;

/// Significance stars in the usual R convention.
pub fn stars(p: f64) -> &'static str {
    if !p.is_finite() {
        ""
    } else if p < 0.001 {
        "***"
    } else if p < 0.01 {
        "**"
    } else if p < 0.05 {
        "*"
    } else if p < 0.1 {
        "."
    } else {
        ""
    }
}

/// Header line with an underline of `=`.
pub fn section(title: &str) -> String {
    format!("{title}\n{}\n", "=".repeat(title.chars().count()))
}

pub fn format_coefficients(rows: &[Coefficient]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<w$} {:>10} {:>10} {:>8} {:>9} {:<3}",
            "term",
            "estimate",
            "std.err",
            "t",
            "p",
            "",
            w = TERM_WIDTH
        ),
    );
    push_line(
        &mut out,
        format!(
            "{:-<w$} {:-<10} {:-<10} {:-<8} {:-<9}",
            "",
            "",
            "",
            "",
            "",
            w = TERM_WIDTH
        ),
    );
    for c in rows {
        push_line(
            &mut out,
            format!(
                "{:<w$} {:>10.4} {:>10.4} {:>8.3} {:>9} {:<3}",
                truncate(&c.term, TERM_WIDTH),
                c.estimate,
                c.std_error,
                c.t_value,
                fmt_p(c.p_value),
                stars(c.p_value),
                w = TERM_WIDTH
            ),
        );
    }
    out
}

/// Coefficient table plus one line of fit statistics.
pub fn format_fit(fit: &LinearFit) -> String {
    let mut out = format!("dependent: {}\n", fit.dependent);
    out.push_str(&format_coefficients(&fit.coefficients));
    out.push_str(&format!(
        "n={} df={} R²={:.4} SE={}{}\n",
        fit.n_obs,
        fit.df_resid,
        fit.r_squared,
        fit.covariance.display_name(),
        if fit.covariance.is_robust() { " (robust)" } else { "" }
    ));
    out
}

pub fn format_first_stage(diag: &FirstStageDiagnostics) -> String {
    let verdict = match (diag.stock_yogo_10, diag.passes_stock_yogo_10()) {
        (Some(cv), Some(true)) => format!("above Stock-Yogo 10% ({cv:.2})"),
        (Some(cv), _) => format!("below Stock-Yogo 10% ({cv:.2}): weak"),
        (None, _) => "no Stock-Yogo value tabulated".to_string(),
    };
    format!(
        "first stage [{}]: F={:.2} robust F={:.2} R²={:.4} partial R²={:.4} instruments={} ({verdict})\n",
        diag.endogenous,
        diag.f_stat,
        diag.f_stat_robust,
        diag.r_squared,
        diag.partial_r_squared,
        diag.n_instruments,
    )
}

pub fn format_summary(rows: &[ColumnSummary]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<w$} {:>5} {:>12} {:>12} {:>12} {:>12}",
            "variable",
            "n",
            "mean",
            "sd",
            "min",
            "max",
            w = TERM_WIDTH
        ),
    );
    push_line(
        &mut out,
        format!(
            "{:-<w$} {:-<5} {:-<12} {:-<12} {:-<12} {:-<12}",
            "",
            "",
            "",
            "",
            "",
            "",
            w = TERM_WIDTH
        ),
    );
    for r in rows {
        push_line(
            &mut out,
            format!(
                "{:<w$} {:>5} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
                truncate(&r.name, TERM_WIDTH),
                r.count,
                r.mean,
                r.std_dev,
                r.min,
                r.max,
                w = TERM_WIDTH
            ),
        );
    }
    out
}

fn fmt_p(p: f64) -> String {
    if !p.is_finite() {
        "NA".to_string()
    } else if p < 1e-4 {
        "<1e-4".to_string()
    } else {
        format!("{p:.4}")
    }
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
