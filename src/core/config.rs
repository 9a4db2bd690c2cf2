//! # Configuration Module / 配置模块
//!
//! Declarative matrix definition loaded from a TOML file: axes and their
//! values, inclusion/exclusion rules, the step list and global run settings.
//!
//! 从 TOML 文件加载的声明式矩阵定义：轴及其取值、包含/排除规则、
//! 步骤列表以及全局运行设置。

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::error::{OrchestratorError, Result};
use crate::core::models::axis_env_var;

/// Variables every step receives besides the `MATRIX_<AXIS>` ones.
pub const RESERVED_ENV_VARS: [&str; 2] = ["MATRIX_CONFIGURATION", "MATRIX_INDEX"];

/// A partial or complete assignment of axis names to values, as written in
/// `[[include]]` and `[[exclude]]` tables.
pub type AxisRule = BTreeMap<String, String>;

/// One independent dimension of the matrix.
/// 矩阵的一个独立维度。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Axis {
    /// Axis identifier, e.g. `toolchain` / 轴标识符，例如 `toolchain`
    pub name: String,
    /// Ordered, unique values the axis can take / 轴可取的有序且唯一的值
    pub values: Vec<String>,
}

impl Axis {
    pub fn new(name: impl Into<String>, values: &[&str]) -> Self {
        Self {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// The command a step runs: either a shell-like line or an explicit argument list.
/// 步骤运行的命令：类 shell 的命令行或显式的参数列表。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StepCommand {
    /// Split with shell quoting rules after variable expansion.
    Line(String),
    /// Program followed by its arguments, each expanded individually.
    Args(Vec<String>),
}

impl StepCommand {
    fn is_blank(&self) -> bool {
        match self {
            StepCommand::Line(line) => line.trim().is_empty(),
            StepCommand::Args(args) => args.first().is_none_or(|program| program.trim().is_empty()),
        }
    }
}

/// A named step as declared in the matrix file.
/// 矩阵文件中声明的命名步骤。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StepSpec {
    /// Step name shown in reports / 报告中显示的步骤名称
    pub name: String,
    /// Command to execute / 要执行的命令
    pub command: StepCommand,
    /// Working directory, relative paths resolve against the project directory.
    /// 工作目录，相对路径基于项目目录解析。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    /// Per-step timeout in seconds, overrides the matrix-wide default.
    /// 每个步骤的超时时间（秒），覆盖矩阵级默认值。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// A failure of this step is recorded but does not fail the matrix.
    /// 此步骤的失败会被记录，但不会导致矩阵失败。
    #[serde(default)]
    pub tolerate_failure: bool,
    /// How many times a non-zero exit is retried. Timeouts are never retried.
    /// 非零退出时的重试次数。超时不会重试。
    #[serde(default)]
    pub retries: u8,
    /// Extra environment variables for this step / 此步骤的额外环境变量
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    /// Bind the step only to configurations matching every pair.
    /// 仅将此步骤绑定到匹配所有键值对的配置。
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub when: AxisRule,
}

impl StepSpec {
    pub fn new(name: impl Into<String>, command: StepCommand) -> Self {
        Self {
            name: name.into(),
            command,
            working_dir: None,
            timeout_secs: None,
            tolerate_failure: false,
            retries: 0,
            env: BTreeMap::new(),
            when: BTreeMap::new(),
        }
    }
}

/// The complete matrix declaration, loaded from a TOML file.
/// 从 TOML 文件加载的完整矩阵声明。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixSpec {
    /// Language for console output (e.g. "en", "zh-CN"). Unset means the
    /// system locale.
    /// 控制台输出的语言（例如 "en", "zh-CN"）。未设置时使用系统语言。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Stop launching configurations after the first failure.
    /// 首次失败后停止启动新的配置。
    #[serde(default = "default_true")]
    pub fail_fast: bool,

    /// On a fail-fast trigger, cancel configurations that are already running.
    /// 触发快速失败时，取消已在运行的配置。
    #[serde(default = "default_true")]
    pub cancel_in_flight: bool,

    /// Maximum number of configurations running at once.
    /// 同时运行的最大配置数量。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,

    /// Default per-step timeout in seconds.
    /// 默认的每步骤超时时间（秒）。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub axes: Vec<Axis>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<AxisRule>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<AxisRule>,

    pub steps: Vec<StepSpec>,
}

fn default_true() -> bool {
    true
}

impl Default for MatrixSpec {
    fn default() -> Self {
        Self {
            language: None,
            fail_fast: true,
            cancel_in_flight: true,
            jobs: None,
            timeout_secs: None,
            axes: vec![],
            exclude: vec![],
            include: vec![],
            steps: vec![],
        }
    }
}

impl MatrixSpec {
    /// Parses and validates a matrix declaration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let spec: MatrixSpec = toml::from_str(content)
            .map_err(|e| OrchestratorError::configuration(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn axis(&self, name: &str) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.name == name)
    }

    /// Checks every structural invariant of the declaration.
    /// Anything reported here is fatal and aborts before execution.
    ///
    /// 检查声明的所有结构不变量。
    /// 此处报告的任何问题都是致命的，会在执行前终止。
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        let mut env_names = HashSet::new();
        for axis in &self.axes {
            if axis.name.trim().is_empty() {
                return Err(OrchestratorError::configuration("axis name must not be empty"));
            }
            if !names.insert(axis.name.as_str()) {
                return Err(OrchestratorError::configuration(format!(
                    "axis '{}' is declared more than once",
                    axis.name
                )));
            }
            let env_name = axis_env_var(&axis.name);
            if RESERVED_ENV_VARS.contains(&env_name.as_str()) {
                return Err(OrchestratorError::configuration(format!(
                    "axis '{}' maps to the reserved environment variable {env_name}",
                    axis.name
                )));
            }
            if !env_names.insert(env_name) {
                return Err(OrchestratorError::configuration(format!(
                    "axis '{}' maps to the same environment variable as another axis",
                    axis.name
                )));
            }
            if axis.values.is_empty() {
                return Err(OrchestratorError::configuration(format!(
                    "axis '{}' has no values",
                    axis.name
                )));
            }
            let mut seen = HashSet::new();
            for value in &axis.values {
                if !seen.insert(value.as_str()) {
                    return Err(OrchestratorError::configuration(format!(
                        "axis '{}' lists value '{}' more than once",
                        axis.name, value
                    )));
                }
            }
        }

        for rule in &self.exclude {
            if rule.is_empty() {
                return Err(OrchestratorError::configuration("exclude rule must name at least one axis"));
            }
            for (name, value) in rule {
                let axis = self.axis(name).ok_or_else(|| {
                    OrchestratorError::configuration(format!("exclude rule references unknown axis '{name}'"))
                })?;
                if !axis.values.contains(value) {
                    return Err(OrchestratorError::configuration(format!(
                        "exclude rule references unknown value '{value}' of axis '{name}'"
                    )));
                }
            }
        }

        for rule in &self.include {
            for axis in &self.axes {
                if !rule.contains_key(&axis.name) {
                    return Err(OrchestratorError::configuration(format!(
                        "include rule does not assign axis '{}'",
                        axis.name
                    )));
                }
            }
            if let Some(name) = rule.keys().find(|name| self.axis(name).is_none()) {
                return Err(OrchestratorError::configuration(format!(
                    "include rule references unknown axis '{name}'"
                )));
            }
        }

        if self.jobs == Some(0) {
            return Err(OrchestratorError::configuration("jobs must be at least 1"));
        }
        if self.timeout_secs == Some(0) {
            return Err(OrchestratorError::configuration("timeout_secs must be at least 1"));
        }

        if self.steps.is_empty() {
            return Err(OrchestratorError::configuration("no steps declared"));
        }
        for step in &self.steps {
            if step.name.trim().is_empty() {
                return Err(OrchestratorError::configuration("step name must not be empty"));
            }
            if step.command.is_blank() {
                return Err(OrchestratorError::configuration(format!(
                    "step '{}' has an empty command",
                    step.name
                )));
            }
            if step.timeout_secs == Some(0) {
                return Err(OrchestratorError::configuration(format!(
                    "step '{}' has a zero timeout",
                    step.name
                )));
            }
            if let Some(name) = step.when.keys().find(|name| self.axis(name).is_none()) {
                return Err(OrchestratorError::configuration(format!(
                    "step '{}' is conditioned on unknown axis '{name}'",
                    step.name
                )));
            }
        }

        Ok(())
    }
}

/// Reads, parses and validates the matrix file at `path`.
/// 读取、解析并验证 `path` 处的矩阵文件。
pub fn load_matrix_spec(path: &Path) -> Result<MatrixSpec> {
    let content = fs::read_to_string(path).map_err(|e| {
        OrchestratorError::configuration(format!("cannot read {}: {e}", path.display()))
    })?;
    MatrixSpec::from_toml_str(&content).map_err(|e| match e {
        OrchestratorError::Configuration(message) => {
            OrchestratorError::configuration(format!("{}: {message}", path.display()))
        }
        other => other,
    })
}
