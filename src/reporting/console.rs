//! # Console Reporting Module / 控制台报告模块
//!
//! This module prints the plan and the final report to the console with
//! colors and internationalization support.
//!
//! 此模块以彩色和国际化的方式在控制台打印执行计划和最终报告。

use colored::*;

use crate::core::models::{ConfigurationReport, MatrixReport, Outcome};
use crate::core::planner::ExecutionPlan;
use crate::infra::command::tail_lines;
use crate::infra::t;

/// Lines of captured output shown for a failing step.
const FAILURE_OUTPUT_LINES: usize = 60;

fn colored_status(outcome: Outcome, locale: &str) -> ColoredString {
    let status = outcome.status_str(locale);
    match outcome {
        Outcome::Pass => status.green(),
        Outcome::Fail => status.red(),
        Outcome::ToleratedFail => status.yellow(),
        Outcome::Skipped => status.dimmed(),
    }
}

/// Prints the expanded configurations and their bound steps without running them.
/// 打印展开后的配置及其绑定的步骤，但不运行它们。
pub fn print_plan(plan: &ExecutionPlan, locale: &str) {
    println!(
        "{}",
        t!(
            "plan.banner",
            locale = locale,
            count = plan.configurations.len(),
            total = plan.total_configurations
        )
        .bold()
    );
    for planned in &plan.configurations {
        println!(
            "  [{:>3}] {} {}",
            planned.index,
            planned.configuration.to_string().cyan(),
            planned.configuration.id().dimmed()
        );
        for step in &planned.steps {
            let marker = if step.tolerate_failure {
                format!(" ({})", t!("plan.tolerated_marker", locale = locale)).yellow()
            } else {
                "".normal()
            };
            println!("        - {}: {}{}", step.name, step.command_line(), marker);
        }
    }
}

/// Prints a formatted summary of the matrix report.
///
/// # Output Format / 输出格式
/// ```text
/// --- Matrix Summary ---
///   - Passed           | (stable, linux)                          |      1.23s  3/3
///   - Failed           | (nightly, linux)                         |      0.45s  1/3
///   - Tolerated Fail   | (stable, macos)                          |      2.10s  2/3
///   - Skipped          | (nightly, macos)                         |        N/A  0/0
/// ```
pub fn print_summary(report: &MatrixReport, locale: &str) {
    println!("\n{}", t!("summary.banner", locale = locale).bold());

    for configuration in &report.configurations {
        let duration_str = configuration
            .duration
            .map(|d| format!("{:.2}s", d.as_secs_f64()))
            .unwrap_or_else(|| "N/A".to_string());
        let succeeded = configuration.steps.iter().filter(|s| s.is_success()).count();

        println!(
            "  - {:<18} | {:<40} | {:>10}  {}/{}",
            colored_status(configuration.outcome, locale),
            configuration.label(),
            duration_str,
            succeeded,
            configuration.steps.len()
        );
    }

    let counts = &report.counts;
    println!(
        "\n{}",
        t!(
            "summary.counts",
            locale = locale,
            total = counts.total,
            passed = counts.passed,
            failed = counts.failed,
            tolerated = counts.tolerated,
            skipped = counts.skipped
        )
    );
}

/// Prints the output of the blocking step of every failed configuration, then
/// itemizes every tolerated step failure so known-flaky checks stay auditable.
///
/// 打印每个失败配置中阻塞步骤的输出，然后逐项列出所有被容忍的步骤失败，
/// 以便审查已知不稳定的检查。
pub fn print_failure_details(report: &MatrixReport, locale: &str) {
    let failures: Vec<&ConfigurationReport> = report.failures().collect();
    if !failures.is_empty() {
        println!("\n{}", t!("details.failure_banner", locale = locale).red().bold());
        println!("{}", "-".repeat(80));

        for (i, configuration) in failures.iter().enumerate() {
            println!(
                "[{}/{}] {} {}",
                i + 1,
                failures.len(),
                t!("details.failed_configuration", locale = locale).red(),
                configuration.label().cyan()
            );
            if let Some(step) = configuration.blocking_failure() {
                println!(
                    "  {} '{}': {}",
                    t!("details.step", locale = locale),
                    step.step,
                    step.status_str(locale)
                );
                println!("  {} {}", t!("run.command_prefix", locale = locale).blue(), step.command);
                print_stream(&t!("details.stdout", locale = locale), &step.stdout);
                print_stream(&t!("details.stderr", locale = locale), &step.stderr);
            }
            println!("{}", "-".repeat(80));
        }
    }

    let tolerated: Vec<_> = report
        .configurations
        .iter()
        .flat_map(|c| c.tolerated_failures().map(move |step| (c, step)))
        .collect();
    if !tolerated.is_empty() {
        println!("\n{}", t!("details.tolerated_banner", locale = locale).yellow().bold());
        for (configuration, step) in tolerated {
            println!(
                "  - {} '{}': {}",
                configuration.label().cyan(),
                step.step,
                step.status_str(locale)
            );
        }
    }
}

fn print_stream(header: &str, output: &str) {
    if output.trim().is_empty() {
        return;
    }
    println!("\n--- {} ---", header.yellow());
    println!("{}", tail_lines(output, FAILURE_OUTPUT_LINES));
}

/// Prints the closing verdict line.
pub fn print_verdict(report: &MatrixReport, locale: &str) {
    if report.interrupted {
        println!("\n{}", t!("verdict.interrupted", locale = locale).yellow().bold());
    } else if report.is_success() {
        println!("\n{}", t!("verdict.success", locale = locale).green().bold());
    } else {
        println!("\n{}", t!("verdict.failure", locale = locale).red().bold());
    }
}
