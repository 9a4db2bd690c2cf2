//! # Matrix Orchestrator Library / Matrix Orchestrator 库
//!
//! This library provides the core functionality for the Matrix Orchestrator tool,
//! which runs a declared matrix of build/test configurations against a project,
//! aggregates their outcomes and reports a single verdict.
//!
//! 此库为 Matrix Orchestrator 工具提供核心功能，
//! 它针对项目运行声明的构建/测试配置矩阵，聚合结果并给出单一结论。
//!
//! ## Modules / 模块
//!
//! - `core` - Matrix declaration, expansion, execution, policy and aggregation
//! - `infra` - Infrastructure services like process execution and file system operations
//! - `reporting` - Console, JSON and HTML reports
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 矩阵声明、展开、执行、策略和聚合
//! - `infra` - 基础设施服务，如进程执行和文件系统操作
//! - `reporting` - 控制台、JSON 和 HTML 报告
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::config;
pub use core::execution;
pub use core::models;

/// Picks the output language without activating it.
///
/// `requested` (from `--lang` or the matrix file) wins when it names an
/// available locale; otherwise `system` is used. Both the full locale
/// (e.g. "zh-CN") and its language part (e.g. "en" from "en-US") are tried,
/// falling back to "en".
pub fn resolve_locale(requested: Option<&str>, system: Option<&str>) -> String {
    let available_locales = rust_i18n::available_locales!();
    let resolve = |locale: &str| -> Option<String> {
        let locale = locale.replace('_', "-");
        if available_locales.iter().any(|available| *available == locale) {
            return Some(locale);
        }
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.iter().any(|available| available == lang_code))
            .map(str::to_string)
    };

    requested
        .and_then(resolve)
        .or_else(|| system.and_then(resolve))
        .unwrap_or_else(|| "en".to_string())
}

/// Selects and activates the output language, consulting the system locale
/// when nothing was requested. Returns the locale that was set.
pub fn init_locale(requested: Option<&str>) -> String {
    let system = sys_locale::get_locale();
    let lang = resolve_locale(requested, system.as_deref());
    rust_i18n::set_locale(&lang);
    lang
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
