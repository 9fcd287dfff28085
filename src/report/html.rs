// src/report/html.rs

//! Minimal self-contained HTML report.

use std::fmt::Write as _;

use anyhow::Result;

use super::ReportEmitter;
use crate::model::{AggregatedReport, ExecutionStatus};

pub const HTML_REPORT_FILE: &str = "test-report.html";

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse;margin-bottom:1.5em}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:left;vertical-align:top}\
th{background:#f0f0f0}\
.passed{color:#1a7f37}.failed,.errored{color:#cf222e}.timedout{color:#9a6700}\
.error{color:#cf222e}.warning{color:#9a6700}.info{color:#0969da}";

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlReportEmitter;

impl ReportEmitter for HtmlReportEmitter {
    fn name(&self) -> &str {
        "html"
    }

    fn file_name(&self) -> &str {
        HTML_REPORT_FILE
    }

    fn render(&self, report: &AggregatedReport) -> Result<Vec<u8>> {
        Ok(render_page(report)?.into_bytes())
    }
}

fn render_page(report: &AggregatedReport) -> std::result::Result<String, std::fmt::Error> {
    let s = &report.execution_summary;
    let mut html = String::new();

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">")?;
    writeln!(html, "<title>Test Report</title>\n<style>{STYLE}</style>\n</head>\n<body>")?;
    writeln!(html, "<h1>Test Report</h1>")?;
    writeln!(
        html,
        "<p>Generated {} &middot; {} ms</p>",
        escape(&s.end_time.to_rfc3339()),
        s.total_duration_ms
    )?;

    writeln!(html, "<h2>Summary</h2>\n<table>")?;
    for (label, value) in [
        ("Discovered", s.discovered_tests.to_string()),
        ("Executed", s.total_tests.to_string()),
        ("Passed", s.passed.to_string()),
        ("Failed", s.failed.to_string()),
        ("Errored", s.errored.to_string()),
        ("Timed out", s.timed_out.to_string()),
        ("Success rate", format!("{}%", s.success_rate_percent)),
    ] {
        writeln!(html, "<tr><th>{label}</th><td>{value}</td></tr>")?;
    }
    writeln!(html, "</table>")?;
    if let Some(reason) = &s.stopped_early {
        writeln!(html, "<p class=\"warning\">Stopped early: {}</p>", escape(&format!("{reason:?}")))?;
    }

    if !report.categories.is_empty() {
        writeln!(html, "<h2>Categories</h2>\n<table>")?;
        writeln!(
            html,
            "<tr><th>Category</th><th>Total</th><th>Passed</th><th>Failed</th><th>Errored</th><th>Timed out</th><th>Rate</th></tr>"
        )?;
        for c in &report.categories {
            writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}%</td></tr>",
                escape(&c.name),
                c.total,
                c.passed,
                c.failed,
                c.errored,
                c.timed_out,
                c.success_rate_percent
            )?;
        }
        writeln!(html, "</table>")?;
    }

    if !report.recommendations.is_empty() {
        writeln!(html, "<h2>Recommendations</h2>\n<ul>")?;
        for r in &report.recommendations {
            write!(
                html,
                "<li class=\"{}\"><strong>{}</strong>: {}",
                r.severity.as_str(),
                escape(&r.title),
                escape(&r.description)
            )?;
            if !r.affected_tests.is_empty() {
                let tests: Vec<_> = r.affected_tests.iter().map(|t| escape(t)).collect();
                write!(html, " <em>({})</em>", tests.join(", "))?;
            }
            writeln!(html, "</li>")?;
        }
        writeln!(html, "</ul>")?;
    }

    writeln!(html, "<h2>Tests</h2>\n<table>")?;
    writeln!(html, "<tr><th>Test</th><th>Status</th><th>Duration (ms)</th><th>Rate</th><th>Errors</th></tr>")?;
    for o in &report.outcomes {
        let rate = o
            .success_rate_percent()
            .map(|r| format!("{r}%"))
            .unwrap_or_default();
        let errors: Vec<_> = o.error_lines.iter().map(|l| escape(l)).collect();
        writeln!(
            html,
            "<tr><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&o.test_file),
            o.status.as_str(),
            status_label(o.status),
            o.duration_ms,
            rate,
            errors.join("<br>")
        )?;
    }
    writeln!(html, "</table>\n</body>\n</html>")?;

    Ok(html)
}

fn status_label(status: ExecutionStatus) -> &'static str {
    match status {
        ExecutionStatus::Passed => "passed",
        ExecutionStatus::Failed => "failed",
        ExecutionStatus::Errored => "errored",
        ExecutionStatus::TimedOut => "timed out",
    }
}

/// Escape text for use in HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
