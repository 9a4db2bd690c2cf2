//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the orchestrator:
//! the matrix declaration, expansion and planning, step execution,
//! outcome classification and result aggregation.
//!
//! 此模块包含编排器的核心功能：
//! 矩阵声明、展开与计划、步骤执行、结果分类以及结果聚合。

pub mod aggregator;
pub mod config;
pub mod error;
pub mod execution;
pub mod expander;
pub mod models;
pub mod planner;
pub mod policy;
pub mod scheduler;

// Re-exports
pub use aggregator::Aggregator;
pub use config::MatrixSpec;
pub use error::OrchestratorError;
pub use execution::run_configuration;
pub use expander::expand;
pub use models::{MatrixReport, Outcome, Verdict};
pub use scheduler::run_matrix;
