//! Rendering of batch results for the terminal

use std::io::Write;

use anyhow::{Context, Result};
use expect_codemod_transform::api::FileReport;
use serde::Serialize;

/// Totals over one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub files: usize,
    pub changed: usize,
    pub failed: usize,
    pub diagnostics: usize,
}

impl Summary {
    pub fn of(reports: &[FileReport]) -> Self {
        Self {
            files: reports.len(),
            changed: reports.iter().filter(|report| report.changed).count(),
            failed: reports.iter().filter(|report| report.is_error()).count(),
            diagnostics: reports.iter().map(|report| report.diagnostics.len()).sum(),
        }
    }
}

/// Shape of the `--json` output
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    summary: Summary,
    files: &'a [FileReport],
}

/// One line per diagnostic (`file:line.col-line.col: message`) and per failed file
pub fn diagnostic_lines(reports: &[FileReport]) -> Vec<String> {
    let mut lines = Vec::new();
    for report in reports {
        if let Some(error) = &report.error {
            lines.push(format!("{}: error: {error}", report.path.display()));
        }
        lines.extend(report.diagnostics.iter().map(ToString::to_string));
    }
    lines
}

/// Write diagnostics and file errors to stderr
pub fn print_diagnostics(reports: &[FileReport]) {
    for line in diagnostic_lines(reports) {
        eprintln!("{line}");
    }
}

/// Serialize the reports with their summary
pub fn render_json(reports: &[FileReport], pretty: bool) -> Result<String> {
    let report = JsonReport {
        summary: Summary::of(reports),
        files: reports,
    };
    let json = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    };
    json.context("Failed to serialize report")
}

/// Print the JSON report to stdout
pub fn print_json(reports: &[FileReport], pretty: bool) -> Result<()> {
    println!("{}", render_json(reports, pretty)?);
    Ok(())
}

/// Write the migrated text of every processed file to stdout, in path order
pub fn print_sources(reports: &[FileReport]) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for source in reports.iter().filter_map(|report| report.output.as_deref()) {
        out.write_all(source.as_bytes())
            .context("Failed to write to stdout")?;
    }
    out.flush().context("Failed to write to stdout")
}

/// Human readable one-line summary for stderr
pub fn summary_line(summary: &Summary, written: bool) -> String {
    let verb = if written { "changed" } else { "would change" };
    let mut line = format!("{} of {} files {verb}", summary.changed, summary.files);
    if summary.diagnostics > 0 {
        line.push_str(&format!(", {} diagnostics", summary.diagnostics));
    }
    if summary.failed > 0 {
        line.push_str(&format!(", {} failed", summary.failed));
    }
    line
}
