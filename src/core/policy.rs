//! # Outcome Policy Module / 结果策略模块
//!
//! Maps the step results of one configuration to a single [`Outcome`].
//!
//! 将一个配置的步骤结果映射为单个 [`Outcome`]。

use crate::core::models::{ConfigurationRun, Outcome, RunResult};

/// Classifies the steps of a configuration that ran to its end.
///
/// * `Fail` if at least one non-tolerated step failed
/// * `ToleratedFail` if every failure present is a tolerated one
/// * `Pass` if every step succeeded
pub fn classify_results(results: &[RunResult]) -> Outcome {
    if results.iter().any(RunResult::is_blocking_failure) {
        Outcome::Fail
    } else if results.iter().any(RunResult::is_tolerated_failure) {
        Outcome::ToleratedFail
    } else {
        Outcome::Pass
    }
}

/// Classifies a configuration run, taking cancellation into account.
/// A blocking failure wins over cancellation; otherwise a cancelled run is `Skipped`.
///
/// 对配置运行进行分类，并考虑取消情况。
/// 阻塞性失败优先于取消；否则被取消的运行记为 `Skipped`。
pub fn classify(run: &ConfigurationRun) -> Outcome {
    match classify_results(&run.results) {
        Outcome::Fail => Outcome::Fail,
        _ if run.cancelled => Outcome::Skipped,
        outcome => outcome,
    }
}
