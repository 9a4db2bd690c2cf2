//! # Run Executor Module / 运行执行器模块
//!
//! Executes the steps bound to one configuration, in order, with timeouts,
//! retries and cooperative cancellation. A non-tolerated failure halts the
//! remaining steps of the configuration.
//!
//! 按顺序执行绑定到某个配置的步骤，支持超时、重试和协作式取消。
//! 未被容忍的失败会中止该配置的剩余步骤。

use colored::*;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        models::{ConfigurationRun, RunResult, RunStep, StepStatus},
        planner::PlannedConfiguration,
    },
    infra::{
        command::{self, ProcessEnd},
        fs, t,
    },
};

/// Read-only settings shared by every executor.
/// 所有执行器共享的只读设置。
#[derive(Debug, Clone)]
pub struct ExecutorContext {
    /// Directory that relative working directories resolve against.
    pub project_root: PathBuf,
    /// Echo captured stdout/stderr after each step.
    pub verbose: bool,
    pub locale: String,
}

impl ExecutorContext {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            verbose: false,
            locale: rust_i18n::locale().to_string(),
        }
    }
}

/// The main entry point for running a single configuration.
///
/// # Arguments
/// * `planned` - The configuration and its bound steps
/// * `context` - Shared executor settings
/// * `cancel` - Token that stops the configuration cooperatively when cancelled
///
/// # Returns
/// A `ConfigurationRun` holding one `RunResult` per step that was started.
pub async fn run_configuration(
    planned: &PlannedConfiguration,
    context: &ExecutorContext,
    cancel: CancellationToken,
) -> ConfigurationRun {
    let locale = context.locale.as_str();
    let label = planned.configuration.to_string();
    let env = planned.environment();
    let start_time = Instant::now();

    println!(
        "{}",
        t!("run.configuration_started", locale = locale, name = &label).blue()
    );

    let mut results = Vec::with_capacity(planned.steps.len());
    let mut cancelled = false;

    for (index, step) in planned.steps.iter().enumerate() {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        let result = run_step(step, index, &env, context, &cancel).await;
        report_step(&label, &result, context);

        let halt = result.is_blocking_failure();
        cancelled = result.status == StepStatus::Cancelled;
        results.push(result);

        if cancelled || halt {
            break;
        }
    }

    ConfigurationRun {
        results,
        cancelled,
        duration: start_time.elapsed(),
    }
}

/// Runs one step, retrying plain failures up to `step.retries` times.
/// The recorded duration covers every attempt.
async fn run_step(
    step: &RunStep,
    index: usize,
    env: &[(String, String)],
    context: &ExecutorContext,
    cancel: &CancellationToken,
) -> RunResult {
    let max_attempts = step.retries.saturating_add(1);
    let mut attempt = 1;
    let mut elapsed = Duration::ZERO;
    loop {
        let mut result = run_step_once(step, index, env, context, cancel).await;
        elapsed += result.duration;
        result.duration = elapsed;
        result.attempts = attempt;

        if result.status != StepStatus::Failed || attempt >= max_attempts || cancel.is_cancelled() {
            return result;
        }

        println!(
            "{}",
            t!(
                "run.step_retrying",
                locale = context.locale.as_str(),
                name = &step.name,
                attempt = attempt,
                retries = step.retries
            )
            .yellow()
        );
        attempt += 1;
    }
}

/// A single attempt: spawn and wait, bounded by the step deadline and the
/// cancellation token.
async fn run_step_once(
    step: &RunStep,
    index: usize,
    env: &[(String, String)],
    context: &ExecutorContext,
    cancel: &CancellationToken,
) -> RunResult {
    let mut cmd = tokio::process::Command::new(&step.program);
    cmd.args(&step.args)
        .envs(env.iter().map(|(k, v)| (k, v)))
        .envs(step.env.iter().map(|(k, v)| (k, v)))
        .current_dir(fs::resolve_working_dir(
            &context.project_root,
            step.working_dir.as_deref(),
        ));

    let start_time = Instant::now();
    let captured = command::spawn_and_capture(cmd, step.timeout, cancel).await;
    let duration = start_time.elapsed();

    let (status, exit_code) = match captured.end {
        ProcessEnd::Exited(status) if status.success() => (StepStatus::Succeeded, status.code()),
        ProcessEnd::Exited(status) => (StepStatus::Failed, status.code()),
        ProcessEnd::TimedOut => (
            StepStatus::TimedOut {
                limit: step.timeout.unwrap_or(Duration::ZERO),
            },
            None,
        ),
        ProcessEnd::Cancelled => (StepStatus::Cancelled, None),
        ProcessEnd::Failed(e) => (
            StepStatus::LaunchFailed {
                message: e.to_string(),
            },
            None,
        ),
    };

    RunResult {
        step: step.name.clone(),
        step_index: index,
        command: step.command_line(),
        status,
        exit_code,
        duration,
        tolerate_failure: step.tolerate_failure,
        attempts: 1,
        stdout: captured.stdout,
        stderr: captured.stderr,
    }
}

/// Prints one progress line for a finished step.
fn report_step(label: &str, result: &RunResult, context: &ExecutorContext) {
    let locale = context.locale.as_str();
    let line = t!(
        "run.step_finished",
        locale = locale,
        config = label,
        step = &result.step,
        status = result.status_str(locale),
        duration = format!("{:.2}", result.duration.as_secs_f64())
    )
    .to_string();

    let colored_line = if result.is_success() {
        line.green()
    } else if result.status == StepStatus::Cancelled {
        line.dimmed()
    } else if result.tolerate_failure {
        line.yellow()
    } else {
        line.red()
    };
    println!("{colored_line}");

    if context.verbose {
        println!("{} {}", t!("run.command_prefix", locale = locale).blue(), result.command);
        if !result.stdout.trim().is_empty() {
            println!("{}", result.stdout.trim_end());
        }
        if !result.stderr.trim().is_empty() {
            eprintln!("{}", result.stderr.trim_end());
        }
    }
}
