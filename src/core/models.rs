//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the orchestrator:
//! concrete configurations, bound steps, step results, outcomes and the final
//! matrix report.
//!
//! 此模块定义了整个编排器中使用的核心数据结构：
//! 具体配置、绑定的步骤、步骤结果、结果分类以及最终的矩阵报告。

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::config::AxisRule;
use crate::infra::t;

/// Name of the environment variable carrying the value of axis `name`.
/// `target-os` becomes `MATRIX_TARGET_OS`.
pub fn axis_env_var(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    format!("MATRIX_{sanitized}")
}

/// One concrete combination of axis values, in axis declaration order.
/// 一个具体的轴取值组合，按轴声明顺序排列。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Configuration {
    assignment: Vec<(String, String)>,
}

impl Configuration {
    pub fn new(assignment: Vec<(String, String)>) -> Self {
        Self { assignment }
    }

    pub fn assignment(&self) -> &[(String, String)] {
        &self.assignment
    }

    pub fn get(&self, axis: &str) -> Option<&str> {
        self.assignment
            .iter()
            .find(|(name, _)| name == axis)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.assignment.is_empty()
    }

    /// Stable identity, e.g. `toolchain=stable,os=linux`.
    pub fn id(&self) -> String {
        self.assignment
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// True when every pair of `rule` is part of this configuration.
    pub fn matches(&self, rule: &AxisRule) -> bool {
        rule.iter().all(|(name, value)| self.get(name) == Some(value.as_str()))
    }

    /// `MATRIX_<AXIS>` variables exported to every step of this configuration.
    pub fn env_vars(&self) -> Vec<(String, String)> {
        self.assignment
            .iter()
            .map(|(name, value)| (axis_env_var(name), value.clone()))
            .collect()
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.assignment.is_empty() {
            return write!(f, "(default)");
        }
        let values: Vec<&str> = self.assignment.iter().map(|(_, v)| v.as_str()).collect();
        write!(f, "({})", values.join(", "))
    }
}

impl Serialize for Configuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.assignment.len()))?;
        for (name, value) in &self.assignment {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A step bound to one configuration, with its command fully expanded.
/// 绑定到某个配置的步骤，其命令已完全展开。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStep {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub tolerate_failure: bool,
    pub retries: u8,
}

impl RunStep {
    /// Printable command line, quoted the way a shell would need it.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| shlex::try_quote(part).map(|q| q.into_owned()).unwrap_or_else(|_| part.to_string()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a single step ended.
/// 单个步骤的结束方式。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepStatus {
    /// Exited with status 0 / 以状态 0 退出
    Succeeded,
    /// Exited non-zero or was killed by a signal / 以非零状态退出或被信号终止
    Failed,
    /// The process could not be started / 进程无法启动
    LaunchFailed { message: String },
    /// Exceeded its deadline and was killed / 超过截止时间并被终止
    TimedOut {
        #[serde(serialize_with = "duration_secs::serialize")]
        limit: Duration,
    },
    /// Stopped by cooperative cancellation / 被协作式取消终止
    Cancelled,
}

/// The immutable record of one completed step.
/// 一个已完成步骤的不可变记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    pub step: String,
    pub step_index: usize,
    pub command: String,
    pub status: StepStatus,
    pub exit_code: Option<i32>,
    #[serde(serialize_with = "duration_secs::serialize")]
    pub duration: Duration,
    pub tolerate_failure: bool,
    pub attempts: u8,
    pub stdout: String,
    pub stderr: String,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.status == StepStatus::Succeeded
    }

    /// Failed, could not launch, or timed out. Cancellation is not a failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self.status,
            StepStatus::Failed | StepStatus::LaunchFailed { .. } | StepStatus::TimedOut { .. }
        )
    }

    /// A failure that is not covered by `tolerate_failure`.
    pub fn is_blocking_failure(&self) -> bool {
        self.is_failure() && !self.tolerate_failure
    }

    pub fn is_tolerated_failure(&self) -> bool {
        self.is_failure() && self.tolerate_failure
    }

    /// Short localized description of the status for display.
    /// 用于显示的状态简短本地化描述。
    pub fn status_str(&self, locale: &str) -> String {
        match &self.status {
            StepStatus::Succeeded => t!("step.succeeded", locale = locale).to_string(),
            StepStatus::Failed => match self.exit_code {
                Some(code) => t!("step.failed_with_code", locale = locale, code = code).to_string(),
                None => t!("step.failed_by_signal", locale = locale).to_string(),
            },
            StepStatus::LaunchFailed { message } => {
                t!("step.launch_failed", locale = locale, message = message).to_string()
            }
            StepStatus::TimedOut { limit } => {
                t!("step.timed_out", locale = locale, secs = limit.as_secs()).to_string()
            }
            StepStatus::Cancelled => t!("step.cancelled", locale = locale).to_string(),
        }
    }
}

/// What an executor hands to the aggregator for one configuration.
/// 执行器为一个配置交给聚合器的内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationRun {
    pub results: Vec<RunResult>,
    /// Cancellation stopped the configuration before it finished.
    pub cancelled: bool,
    pub duration: Duration,
}

/// Classification of one configuration.
/// 单个配置的结果分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "TOLERATED-FAIL")]
    ToleratedFail,
    #[serde(rename = "SKIPPED")]
    Skipped,
}

impl Outcome {
    pub fn status_str(&self, locale: &str) -> String {
        match self {
            Outcome::Pass => t!("report.status_passed", locale = locale).to_string(),
            Outcome::Fail => t!("report.status_failed", locale = locale).to_string(),
            Outcome::ToleratedFail => t!("report.status_tolerated", locale = locale).to_string(),
            Outcome::Skipped => t!("report.status_skipped", locale = locale).to_string(),
        }
    }

    /// CSS class used by the HTML report.
    pub fn css_class(&self) -> &'static str {
        match self {
            Outcome::Pass => "status-passed",
            Outcome::Fail => "status-failed",
            Outcome::ToleratedFail => "status-tolerated",
            Outcome::Skipped => "status-skipped",
        }
    }
}

/// Overall verdict of a matrix run.
/// 矩阵运行的总体结论。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Success,
    Failure,
}

/// Per-configuration entry of the final report.
/// 最终报告中每个配置的条目。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationReport {
    /// Position in the full expansion / 在完整展开结果中的位置
    pub index: usize,
    pub id: String,
    pub configuration: Configuration,
    pub outcome: Outcome,
    #[serde(serialize_with = "duration_secs::serialize_opt")]
    pub duration: Option<Duration>,
    pub steps: Vec<RunResult>,
}

impl ConfigurationReport {
    pub fn label(&self) -> String {
        self.configuration.to_string()
    }

    /// The step that decided a FAIL outcome, if any.
    pub fn blocking_failure(&self) -> Option<&RunResult> {
        self.steps.iter().find(|step| step.is_blocking_failure())
    }

    pub fn tolerated_failures(&self) -> impl Iterator<Item = &RunResult> {
        self.steps.iter().filter(|step| step.is_tolerated_failure())
    }
}

/// Number of configurations per outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub tolerated: usize,
    pub skipped: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Pass => self.passed += 1,
            Outcome::Fail => self.failed += 1,
            Outcome::ToleratedFail => self.tolerated += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }
}

/// The finalized result of a matrix run.
/// 矩阵运行的最终结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub verdict: Verdict,
    pub fail_fast: bool,
    /// The run was stopped by the user (Ctrl-C).
    pub interrupted: bool,
    pub counts: OutcomeCounts,
    pub configurations: Vec<ConfigurationReport>,
}

impl MatrixReport {
    pub fn is_success(&self) -> bool {
        self.verdict == Verdict::Success
    }

    pub fn failures(&self) -> impl Iterator<Item = &ConfigurationReport> {
        self.configurations.iter().filter(|c| c.outcome == Outcome::Fail)
    }

    pub fn find(&self, id: &str) -> Option<&ConfigurationReport> {
        self.configurations.iter().find(|c| c.id == id)
    }
}

/// Durations are written as fractional seconds in machine-readable reports.
pub(crate) mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn serialize_opt<S: Serializer>(
        duration: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }
}
