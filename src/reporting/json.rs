//! # JSON Reporting Module / JSON 报告模块
//!
//! Machine-readable serialization of the matrix report for downstream tooling.
//!
//! 矩阵报告的机器可读序列化，供下游工具使用。

use anyhow::{Context, Result};
use std::path::Path;

use crate::core::models::MatrixReport;
use crate::infra::fs::write_file;

/// Serializes the report as pretty-printed JSON.
pub fn to_json(report: &MatrixReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize matrix report")
}

/// Writes the JSON report to `output_path`.
/// 将 JSON 报告写入 `output_path`。
pub fn write_json_report(report: &MatrixReport, output_path: &Path) -> Result<()> {
    write_file(output_path, &to_json(report)?)
}
