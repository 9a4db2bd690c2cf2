//! # Execution Planner Module / 执行计划模块
//!
//! This module turns a matrix declaration into an execution plan: it expands
//! the configurations, binds the step list to each of them (resolving `when`
//! conditions and expanding variables in commands) and optionally keeps only
//! the share of configurations assigned to this runner in a distributed setup.
//!
//! 此模块将矩阵声明转换为执行计划：展开配置，将步骤列表绑定到每个配置
//! （解析 `when` 条件并展开命令中的变量），并在分布式环境中
//! 只保留分配给当前运行器的配置。

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::config::{MatrixSpec, StepCommand, StepSpec};
use crate::core::error::{OrchestratorError, Result};
use crate::core::expander;
use crate::core::models::{Configuration, RunStep};

/// A configuration together with the steps it will run.
/// 一个配置及其将要运行的步骤。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedConfiguration {
    /// Position in the full expansion, stable across runners.
    /// 在完整展开结果中的位置，在各运行器之间保持稳定。
    pub index: usize,
    pub configuration: Configuration,
    pub steps: Vec<RunStep>,
}

impl PlannedConfiguration {
    /// Variables derived from the configuration and exported to every step.
    pub fn environment(&self) -> Vec<(String, String)> {
        let mut env = self.configuration.env_vars();
        env.push(("MATRIX_CONFIGURATION".to_string(), self.configuration.id()));
        env.push(("MATRIX_INDEX".to_string(), self.index.to_string()));
        env
    }
}

/// Represents a complete execution plan for a matrix.
/// 表示矩阵的完整执行计划。
#[derive(Debug)]
pub struct ExecutionPlan {
    /// The configurations this runner executes, in expansion order.
    /// 此运行器执行的配置，按展开顺序排列。
    pub configurations: Vec<PlannedConfiguration>,
    /// Size of the full expansion before sharding / 分片前完整展开的数量
    pub total_configurations: usize,
    pub excluded_count: usize,
    pub included_count: usize,
    /// Whether configurations are split across several runners (CI).
    /// 配置是否分布在多个运行器上（CI 环境）。
    pub is_distributed: bool,
}

/// Creates an execution plan for the given matrix.
///
/// # Arguments
/// * `spec` - The validated matrix declaration
/// * `total_runners` - Optional total number of runners for distributed execution
/// * `runner_index` - Optional index of this runner (0-based)
pub fn plan_execution(
    spec: &MatrixSpec,
    total_runners: Option<usize>,
    runner_index: Option<usize>,
) -> Result<ExecutionPlan> {
    let expansion = expander::expand(spec);
    let total_configurations = expansion.configurations.len();

    let shard = match (total_runners, runner_index) {
        (Some(0), Some(_)) => {
            return Err(OrchestratorError::configuration("total runners must be at least 1"));
        }
        (Some(total), Some(index)) => {
            if index >= total {
                return Err(OrchestratorError::configuration(
                    "runner index must be less than total runners",
                ));
            }
            Some((total, index))
        }
        (None, None) => None,
        _ => {
            return Err(OrchestratorError::configuration(
                "both total runners and runner index must be provided",
            ));
        }
    };

    let configurations = expansion
        .configurations
        .into_iter()
        .enumerate()
        .filter(|(i, _)| shard.is_none_or(|(total, index)| i % total == index))
        .map(|(index, configuration)| {
            let steps = bind_steps(spec, index, &configuration)?;
            Ok(PlannedConfiguration {
                index,
                configuration,
                steps,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ExecutionPlan {
        configurations,
        total_configurations,
        excluded_count: expansion.excluded_count,
        included_count: expansion.included_count,
        is_distributed: shard.is_some(),
    })
}

/// Binds the declared steps to one configuration.
/// Steps whose `when` condition does not match are left out.
///
/// 将声明的步骤绑定到一个配置。`when` 条件不匹配的步骤将被略过。
pub fn bind_steps(
    spec: &MatrixSpec,
    index: usize,
    configuration: &Configuration,
) -> Result<Vec<RunStep>> {
    let mut variables: HashMap<String, String> = configuration.env_vars().into_iter().collect();
    variables.insert("MATRIX_CONFIGURATION".to_string(), configuration.id());
    variables.insert("MATRIX_INDEX".to_string(), index.to_string());

    spec.steps
        .iter()
        .filter(|step| configuration.matches(&step.when))
        .map(|step| bind_step(spec, step, &variables))
        .collect()
}

fn bind_step(spec: &MatrixSpec, step: &StepSpec, variables: &HashMap<String, String>) -> Result<RunStep> {
    let outer = |name: &str| -> Option<String> {
        variables.get(name).cloned().or_else(|| std::env::var(name).ok())
    };
    // Step env values see the configuration and process environment only.
    let env: Vec<(String, String)> = step
        .env
        .iter()
        .map(|(k, v)| (k.clone(), shellexpand::env_with_context_no_errors(v, outer).into_owned()))
        .collect();

    let lookup = |name: &str| -> Option<String> {
        variables
            .get(name)
            .cloned()
            .or_else(|| env.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone()))
            .or_else(|| std::env::var(name).ok())
    };
    let expand = |text: &str| shellexpand::env_with_context_no_errors(text, lookup).into_owned();

    let parts = match &step.command {
        StepCommand::Line(line) => {
            let expanded = expand(line);
            shlex::split(&expanded).ok_or_else(|| {
                OrchestratorError::configuration(format!(
                    "step '{}': cannot parse command: {expanded}",
                    step.name
                ))
            })?
        }
        StepCommand::Args(args) => args.iter().map(|arg| expand(arg)).collect(),
    };

    let (program, args) = parts.split_first().ok_or_else(|| {
        OrchestratorError::configuration(format!("step '{}' has an empty command", step.name))
    })?;
    let working_dir = step.working_dir.as_ref().map(|dir| PathBuf::from(expand(&dir.to_string_lossy())));

    Ok(RunStep {
        name: step.name.clone(),
        program: program.clone(),
        args: args.to_vec(),
        working_dir,
        env,
        timeout: step.timeout_secs.or(spec.timeout_secs).map(Duration::from_secs),
        tolerate_failure: step.tolerate_failure,
        retries: step.retries,
    })
}
