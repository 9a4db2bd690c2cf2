//! # Reporting Unit Tests / 报告模块单元测试
//!
//! JSON and HTML renderings of a finalized matrix report.
//!
//! 最终矩阵报告的 JSON 与 HTML 渲染。

use matrix_orchestrator::core::aggregator::Aggregator;
use matrix_orchestrator::core::models::{
    Configuration, ConfigurationRun, MatrixReport, RunResult, StepStatus,
};
use matrix_orchestrator::reporting::html::{generate_html_report, render_html_report};
use matrix_orchestrator::reporting::json::{to_json, write_json_report};
use serde_json::Value;
use std::time::Duration;
use tempfile::tempdir;

fn step(name: &str, status: StepStatus, tolerate_failure: bool) -> RunResult {
    RunResult {
        step: name.to_string(),
        step_index: 0,
        command: format!("cargo {name}"),
        exit_code: if status == StepStatus::Succeeded { Some(0) } else { Some(101) },
        status,
        duration: Duration::from_millis(1500),
        tolerate_failure,
        attempts: 1,
        stdout: "running 3 tests".to_string(),
        stderr: "<panicked>".to_string(),
    }
}

fn sample_report() -> MatrixReport {
    let configuration = |toolchain: &str| {
        Configuration::new(vec![
            ("toolchain".to_string(), toolchain.to_string()),
            ("os".to_string(), "linux".to_string()),
        ])
    };
    let mut aggregator = Aggregator::new(
        vec![
            (0, configuration("stable")),
            (1, configuration("beta")),
            (2, configuration("nightly")),
        ],
        false,
    )
    .unwrap();
    aggregator
        .ingest(
            0,
            ConfigurationRun {
                results: vec![step("test", StepStatus::Succeeded, false)],
                cancelled: false,
                duration: Duration::from_secs(2),
            },
        )
        .unwrap();
    aggregator
        .ingest(
            2,
            ConfigurationRun {
                results: vec![
                    step("clippy", StepStatus::Failed, true),
                    step("test", StepStatus::Failed, false),
                ],
                cancelled: false,
                duration: Duration::from_secs(3),
            },
        )
        .unwrap();
    aggregator.finalize(false)
}

#[test]
fn test_json_report_structure() {
    let json: Value = serde_json::from_str(&to_json(&sample_report()).unwrap()).unwrap();

    assert_eq!(json["verdict"], "FAILURE");
    assert_eq!(json["interrupted"], false);
    assert_eq!(json["counts"]["total"], 3);
    assert_eq!(json["counts"]["failed"], 1);
    assert_eq!(json["counts"]["skipped"], 1);

    let configurations = json["configurations"].as_array().unwrap();
    assert_eq!(configurations.len(), 3);
    assert_eq!(configurations[0]["outcome"], "PASS");
    assert_eq!(configurations[0]["configuration"]["toolchain"], "stable");
    assert_eq!(configurations[0]["duration"], 2.0);
    assert_eq!(configurations[1]["outcome"], "SKIPPED");
    assert!(configurations[1]["duration"].is_null());
    assert_eq!(configurations[2]["id"], "toolchain=nightly,os=linux");
    assert_eq!(configurations[2]["outcome"], "FAIL");
    assert_eq!(configurations[2]["steps"][0]["status"]["kind"], "failed");
    assert_eq!(configurations[2]["steps"][0]["tolerate_failure"], true);
    assert_eq!(configurations[2]["steps"][1]["exit_code"], 101);
}

#[test]
fn test_json_report_is_written_to_nested_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("reports").join("matrix.json");

    write_json_report(&sample_report(), &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let json: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["fail_fast"], false);
}

#[test]
fn test_html_report_contains_every_configuration() {
    let html = render_html_report(&sample_report(), "en").into_string();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Matrix Report"));
    assert!(html.contains("MATRIX FAILED"));
    assert!(html.contains("(stable, linux)"));
    assert!(html.contains("(beta, linux)"));
    assert!(html.contains("(nightly, linux)"));
    assert!(html.contains("status-failed"));
    assert!(html.contains("status-skipped"));
    // Captured output is escaped.
    assert!(html.contains("&lt;panicked&gt;"));
}

#[test]
fn test_html_report_is_localized() {
    let html = render_html_report(&sample_report(), "zh-CN").into_string();
    assert!(html.contains("矩阵报告"));
}

#[test]
fn test_html_report_file_is_generated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.html");

    generate_html_report(&sample_report(), &path, "en").unwrap();

    assert!(path.exists());
    assert!(std::fs::read_to_string(&path).unwrap().contains("</html>"));
}
