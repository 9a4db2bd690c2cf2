//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which expands the matrix,
//! executes every configuration and reports the verdict.
//!
//! 此模块实现了 `run` 命令：展开矩阵，执行每个配置并报告结论。

use anyhow::{Context, Result};
use colored::*;
use std::{path::PathBuf, process::ExitCode};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config::{self, MatrixSpec},
        execution::ExecutorContext,
        models::MatrixReport,
        planner,
        scheduler::{RunOptions, run_matrix},
    },
    infra::{fs, t},
    reporting::{
        console::{print_failure_details, print_summary, print_verdict},
        html::generate_html_report,
        json::write_json_report,
    },
};

/// Exit status used when the run was stopped with Ctrl-C.
const INTERRUPTED_EXIT_CODE: u8 = 130;

/// Arguments of the `run` command after CLI parsing.
/// 解析 CLI 后 `run` 命令的参数。
#[derive(Debug, Clone)]
pub struct RunArgs {
    /// Number of parallel configurations / 并行配置数量
    pub jobs: Option<usize>,
    /// Path to the matrix file / 矩阵文件路径
    pub config: PathBuf,
    /// Directory that steps run in by default / 步骤默认运行的目录
    pub project_dir: PathBuf,
    pub total_runners: Option<usize>,
    pub runner_index: Option<usize>,
    /// Overrides the matrix file's `fail_fast` / 覆盖矩阵文件中的 `fail_fast`
    pub fail_fast: Option<bool>,
    pub json: Option<PathBuf>,
    pub html: Option<PathBuf>,
    pub verbose: bool,
    /// Language given with `--lang`, wins over the matrix file.
    pub language: Option<String>,
}

/// Executes the run command with the provided arguments.
///
/// # Returns
/// `ExitCode::SUCCESS` for an overall success, 1 for a failure and 130 when
/// interrupted. Configuration and aggregation errors are returned as `Err`.
pub async fn execute(args: RunArgs) -> Result<ExitCode> {
    let (spec, config_path) = setup_and_parse_config(&args.config)?;
    let locale = crate::init_locale(args.language.as_deref().or(spec.language.as_deref()));

    let project_root = fs::absolute_path(&args.project_dir)
        .with_context(|| t!("project_dir_not_found", locale = &locale, path = args.project_dir.display()).to_string())?;

    println!(
        "{}",
        t!("loading_matrix", locale = &locale, path = config_path.display())
    );
    println!(
        "{}",
        t!("project_root_detected", locale = &locale, path = project_root.display())
    );

    let plan = planner::plan_execution(&spec, args.total_runners, args.runner_index)?;

    println!(
        "{}",
        t!(
            "configurations_expanded",
            locale = &locale,
            total = plan.total_configurations,
            excluded = plan.excluded_count,
            included = plan.included_count
        )
        .cyan()
    );

    if let (Some(total), Some(index)) = (args.total_runners, args.runner_index) {
        println!(
            "{}",
            t!(
                "running_as_split_runner",
                locale = &locale,
                index = index + 1,
                total = total,
                count = plan.configurations.len()
            )
            .bold()
        );
    } else {
        println!("{}", t!("running_as_single_runner", locale = &locale).bold());
    }

    if plan.configurations.is_empty() {
        println!("{}", t!("no_configurations_to_run", locale = &locale).green());
        return Ok(ExitCode::SUCCESS);
    }

    let options = run_options(&spec, &args);
    let context = ExecutorContext {
        project_root,
        verbose: args.verbose,
        locale: locale.clone(),
    };
    let stop_token = setup_signal_handler(&locale);

    let report = run_matrix(plan.configurations, &options, &context, stop_token).await?;

    print_summary(&report, &locale);
    print_failure_details(&report, &locale);
    export_reports(&report, &args, &locale);
    print_verdict(&report, &locale);

    Ok(if report.interrupted {
        ExitCode::from(INTERRUPTED_EXIT_CODE)
    } else if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Sets up and parses the matrix file.
fn setup_and_parse_config(config_path_arg: &PathBuf) -> Result<(MatrixSpec, PathBuf)> {
    // The matrix file carries the language, so English is used until it is parsed.
    let locale = "en";
    let config_path = fs::absolute_path(config_path_arg)
        .with_context(|| t!("config_read_failed_path", locale = locale, path = config_path_arg.display()).to_string())?;

    let spec = config::load_matrix_spec(&config_path)
        .with_context(|| t!("config_parse_failed", locale = locale).to_string())?;

    Ok((spec, config_path))
}

/// CLI flags override the matrix file, which overrides the built-in defaults.
/// CLI 参数覆盖矩阵文件，矩阵文件覆盖内置默认值。
pub fn run_options(spec: &MatrixSpec, args: &RunArgs) -> RunOptions {
    let defaults = RunOptions::default();
    RunOptions {
        jobs: args.jobs.or(spec.jobs).unwrap_or(defaults.jobs).max(1),
        fail_fast: args.fail_fast.unwrap_or(spec.fail_fast),
        cancel_in_flight: spec.cancel_in_flight,
    }
}

/// Sets up a signal handler for graceful shutdown.
fn setup_signal_handler(locale: &str) -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();
    let locale = locale.to_string();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("shutdown_signal", locale = &locale).yellow());
            token_clone.cancel();
        }
    });

    token
}

/// Writes the optional JSON and HTML reports. A failed export is reported but
/// does not change the verdict.
fn export_reports(report: &MatrixReport, args: &RunArgs, locale: &str) {
    if let Some(json_path) = &args.json {
        println!("\n{}", t!("writing_json_report", locale = locale, path = json_path.display()));
        if let Err(e) = write_json_report(report, json_path) {
            eprintln!("{} {:#}", t!("json_report_failed", locale = locale).red(), e);
        }
    }
    if let Some(html_path) = &args.html {
        println!("\n{}", t!("writing_html_report", locale = locale, path = html_path.display()));
        if let Err(e) = generate_html_report(report, html_path, locale) {
            eprintln!("{} {:#}", t!("html_report_failed", locale = locale).red(), e);
        }
    }
}
