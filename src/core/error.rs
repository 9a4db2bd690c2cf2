//! # Error Module / 错误模块
//!
//! Fatal errors of the orchestrator. Step-level problems (a binary that cannot
//! be launched, a step that exceeds its deadline) are not errors here: they are
//! recorded as [`StepStatus`](crate::core::models::StepStatus) values in the
//! report and scoped to their configuration.
//!
//! 编排器的致命错误。步骤级别的问题（无法启动的程序、超时的步骤）不属于此处，
//! 它们作为报告中的步骤状态被记录，并且只影响所属的配置。

use thiserror::Error;

/// Errors that abort a matrix run as a whole.
/// 终止整个矩阵运行的错误。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    /// The matrix declaration is malformed. Raised before anything is executed.
    /// 矩阵声明格式错误。在执行任何操作之前触发。
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The aggregated report became internally inconsistent.
    /// 聚合报告出现内部不一致。
    #[error("aggregation error: {0}")]
    Aggregation(String),
}

impl OrchestratorError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn aggregation(message: impl Into<String>) -> Self {
        Self::Aggregation(message.into())
    }
}

pub type Result<T, E = OrchestratorError> = std::result::Result<T, E>;
