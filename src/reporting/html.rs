//! # HTML Reporting Module / HTML 报告模块
//!
//! This module renders the matrix report as a standalone HTML page with summary
//! statistics, a per-configuration table and collapsible step output.
//!
//! 此模块将矩阵报告渲染为独立的 HTML 页面，包含汇总统计、
//! 每个配置的表格以及可折叠的步骤输出。

use anyhow::Result;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::path::Path;

use crate::core::models::{ConfigurationReport, MatrixReport, Verdict};
use crate::infra::fs::write_file;
use crate::infra::t;

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = include_str!("assets/report.css");

fn summary_item(count: usize, label: &str, class: &str) -> Markup {
    html! {
        div class="summary-item" {
            span class={ "count " (class) } { (count) }
            span class="label" { (label) }
        }
    }
}

fn configuration_rows(configuration: &ConfigurationReport, locale: &str) -> Markup {
    let duration = configuration
        .duration
        .map(|d| format!("{:.2}s", d.as_secs_f64()))
        .unwrap_or_else(|| "N/A".to_string());
    html! {
        tr {
            td { (configuration.index) }
            td {
                (configuration.label())
                div class="config-id" { (configuration.id) }
            }
            td class=(configuration.outcome.css_class()) { (configuration.outcome.status_str(locale)) }
            td class="duration-cell" { (duration) }
        }
        @if !configuration.steps.is_empty() {
            tr class="steps-row" {
                td colspan="4" {
                    @for step in &configuration.steps {
                        details {
                            summary {
                                span class=(if step.is_success() { "step-ok" } else if step.tolerate_failure { "step-tolerated" } else { "step-failed" }) {
                                    (step.step) ": " (step.status_str(locale))
                                }
                                " " span class="step-duration" { (format!("{:.2}s", step.duration.as_secs_f64())) }
                            }
                            pre class="command" { (step.command) }
                            @if !step.stdout.is_empty() {
                                pre class="stdout" { (step.stdout) }
                            }
                            @if !step.stderr.is_empty() {
                                pre class="stderr" { (step.stderr) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the report as an HTML document.
/// 将报告渲染为 HTML 文档。
pub fn render_html_report(report: &MatrixReport, locale: &str) -> Markup {
    let counts = &report.counts;
    let verdict_class = match report.verdict {
        Verdict::Success => "verdict-success",
        Verdict::Failure => "verdict-failure",
    };
    let verdict_text = if report.interrupted {
        t!("verdict.interrupted", locale = locale).to_string()
    } else if report.is_success() {
        t!("verdict.success", locale = locale).to_string()
    } else {
        t!("verdict.failure", locale = locale).to_string()
    };

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title", locale = locale).to_string()) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.main_header", locale = locale).to_string()) }
                p class={ "verdict " (verdict_class) } { (verdict_text) }
                p class="timestamps" {
                    (report.started_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()) " → "
                    (report.finished_at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                }
                div class="summary-container" {
                    (summary_item(counts.total, &t!("html_report.summary.total", locale = locale), ""))
                    (summary_item(counts.passed, &t!("html_report.summary.passed", locale = locale), "passed-text"))
                    (summary_item(counts.failed, &t!("html_report.summary.failed", locale = locale), "failed-text"))
                    (summary_item(counts.tolerated, &t!("html_report.summary.tolerated", locale = locale), "tolerated-text"))
                    (summary_item(counts.skipped, &t!("html_report.summary.skipped", locale = locale), "skipped-text"))
                }
                table {
                    thead {
                        tr {
                            th { "#" }
                            th { (t!("html_report.table.configuration", locale = locale).to_string()) }
                            th class="status-col" { (t!("html_report.table.status", locale = locale).to_string()) }
                            th class="duration-cell" { (t!("html_report.table.duration", locale = locale).to_string()) }
                        }
                    }
                    tbody {
                        @for configuration in &report.configurations {
                            (configuration_rows(configuration, locale))
                        }
                    }
                }
            }
        }
    }
}

/// Generates the HTML report file at `output_path`.
///
/// # Errors
/// Fails if the file (or its parent directory) cannot be written.
pub fn generate_html_report(report: &MatrixReport, output_path: &Path, locale: &str) -> Result<()> {
    write_file(output_path, &render_html_report(report, locale).into_string())
}
