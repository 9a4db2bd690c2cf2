//! # Scheduler Module / 调度模块
//!
//! Runs the planned configurations concurrently, bounded by the job count,
//! and feeds every result to the [`Aggregator`] from a single consumer loop.
//! Implements fail-fast and user interruption through cancellation tokens.
//!
//! 在作业数量限制下并发运行计划中的配置，并通过单一的消费循环
//! 将每个结果交给 [`Aggregator`]。通过取消令牌实现快速失败和用户中断。

use colored::*;
use futures::{StreamExt, stream};
use tokio_util::sync::CancellationToken;

use crate::core::aggregator::Aggregator;
use crate::core::error::Result;
use crate::core::execution::{ExecutorContext, run_configuration};
use crate::core::models::{MatrixReport, Outcome};
use crate::core::planner::PlannedConfiguration;
use crate::infra::t;

/// Settings of one matrix run.
/// 一次矩阵运行的设置。
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Maximum number of configurations running at once / 同时运行的最大配置数
    pub jobs: usize,
    /// Stop launching configurations after the first failure / 首次失败后停止启动配置
    pub fail_fast: bool,
    /// Also cancel configurations already running on a fail-fast trigger.
    /// 触发快速失败时同时取消已在运行的配置。
    pub cancel_in_flight: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            jobs: num_cpus::get() / 2 + 1,
            fail_fast: true,
            cancel_in_flight: true,
        }
    }
}

/// Runs every planned configuration and returns the finalized report.
///
/// # Arguments
/// * `configurations` - The planned configurations, in expansion order
/// * `options` - Concurrency and termination settings
/// * `context` - Shared executor settings
/// * `stop` - Root token, cancelled on user interruption (Ctrl-C)
///
/// # Errors
/// Only aggregation errors are returned; step failures live in the report.
pub async fn run_matrix(
    configurations: Vec<PlannedConfiguration>,
    options: &RunOptions,
    context: &ExecutorContext,
    stop: CancellationToken,
) -> Result<MatrixReport> {
    let mut aggregator = Aggregator::new(
        configurations
            .iter()
            .map(|planned| (planned.index, planned.configuration.clone()))
            .collect(),
        options.fail_fast,
    )?;

    // Cancelled on the first failure when fail-fast is on, and with `stop`.
    let halt = stop.child_token();
    let locale = context.locale.as_str();

    let mut runs = stream::iter(configurations.into_iter().enumerate().map(|(slot, planned)| {
        let halt = halt.clone();
        let cancel = if options.cancel_in_flight {
            halt.clone()
        } else {
            stop.clone()
        };
        async move {
            if halt.is_cancelled() {
                return (slot, None);
            }
            let run = run_configuration(&planned, context, cancel).await;
            (slot, Some(run))
        }
    }))
    .buffer_unordered(options.jobs.max(1));

    while let Some((slot, run)) = runs.next().await {
        let Some(run) = run else {
            aggregator.skip(slot)?;
            continue;
        };
        let outcome = aggregator.ingest(slot, run)?;
        if outcome == Outcome::Fail && aggregator.should_stop() && !halt.is_cancelled() {
            println!("{}", t!("run.fail_fast_triggered", locale = locale).yellow().bold());
            halt.cancel();
        }
    }

    Ok(aggregator.finalize(stop.is_cancelled()))
}
