//! # Reporting Module / 报告模块
//!
//! This module handles the display and export of matrix reports: colorful console
//! summaries, machine-readable JSON and standalone HTML pages.
//!
//! 此模块处理矩阵报告的显示和导出：彩色控制台摘要、
//! 机器可读的 JSON 以及独立的 HTML 页面。

pub mod console;
pub mod html;
pub mod json;

// Re-export common reporting functions
pub use console::{print_failure_details, print_plan, print_summary, print_verdict};
pub use html::generate_html_report;
pub use json::write_json_report;
