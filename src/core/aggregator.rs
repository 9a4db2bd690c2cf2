//! # Aggregator Module / 聚合器模块
//!
//! Sole owner of the report under construction. Results are ingested one
//! configuration at a time and stored in expansion order, whatever order they
//! complete in.
//!
//! 构建中报告的唯一所有者。结果按配置逐个摄入，
//! 无论完成顺序如何，都按展开顺序存储。

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::core::error::{OrchestratorError, Result};
use crate::core::models::{
    Configuration, ConfigurationReport, ConfigurationRun, MatrixReport, Outcome, OutcomeCounts,
    Verdict,
};
use crate::core::policy;

#[derive(Debug)]
pub struct Aggregator {
    /// `(expansion index, configuration)` for each slot of the plan.
    entries: Vec<(usize, Configuration)>,
    slots: Vec<Option<ConfigurationReport>>,
    fail_fast: bool,
    failed: bool,
    started_at: DateTime<Utc>,
}

impl Aggregator {
    /// Creates an aggregator for the planned configurations.
    /// Two configurations with the same identity are an aggregation error.
    ///
    /// 为计划中的配置创建聚合器。两个身份相同的配置属于聚合错误。
    pub fn new(entries: Vec<(usize, Configuration)>, fail_fast: bool) -> Result<Self> {
        let mut seen = HashSet::new();
        for (_, configuration) in &entries {
            if !seen.insert(configuration.id()) {
                return Err(OrchestratorError::aggregation(format!(
                    "duplicate configuration {}",
                    configuration
                )));
            }
        }
        let slots = vec![None; entries.len()];
        Ok(Self {
            entries,
            slots,
            fail_fast,
            failed: false,
            started_at: Utc::now(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once a configuration failed and fail-fast is on.
    pub fn should_stop(&self) -> bool {
        self.fail_fast && self.failed
    }

    fn store(&mut self, slot: usize, report: ConfigurationReport) -> Result<()> {
        match self.slots.get_mut(slot) {
            None => Err(OrchestratorError::aggregation(format!(
                "result for unknown configuration slot {slot}"
            ))),
            Some(Some(existing)) => Err(OrchestratorError::aggregation(format!(
                "configuration {} reported twice",
                existing.label()
            ))),
            Some(entry) => {
                *entry = Some(report);
                Ok(())
            }
        }
    }

    fn configuration(&self, slot: usize) -> Result<&(usize, Configuration)> {
        self.entries.get(slot).ok_or_else(|| {
            OrchestratorError::aggregation(format!("result for unknown configuration slot {slot}"))
        })
    }

    /// Records the run of the configuration in `slot` and returns its outcome.
    /// 记录 `slot` 中配置的运行结果并返回其分类。
    pub fn ingest(&mut self, slot: usize, run: ConfigurationRun) -> Result<Outcome> {
        let (index, configuration) = self.configuration(slot)?.clone();
        let outcome = policy::classify(&run);
        self.store(
            slot,
            ConfigurationReport {
                index,
                id: configuration.id(),
                configuration,
                outcome,
                duration: Some(run.duration),
                steps: run.results,
            },
        )?;
        if outcome == Outcome::Fail {
            self.failed = true;
        }
        Ok(outcome)
    }

    /// Records a configuration that was never launched.
    pub fn skip(&mut self, slot: usize) -> Result<()> {
        let (index, configuration) = self.configuration(slot)?.clone();
        self.store(slot, skipped_report(index, configuration))
    }

    /// Closes the report. Slots without a result are marked `Skipped`.
    /// The verdict is `Success` iff nothing failed and the run was not interrupted.
    ///
    /// 完成报告。没有结果的槽位标记为 `Skipped`。
    /// 仅当没有失败且运行未被中断时，结论为 `Success`。
    pub fn finalize(self, interrupted: bool) -> MatrixReport {
        let mut counts = OutcomeCounts::default();
        let configurations: Vec<ConfigurationReport> = self
            .slots
            .into_iter()
            .zip(self.entries)
            .map(|(slot, (index, configuration))| {
                slot.unwrap_or_else(|| skipped_report(index, configuration))
            })
            .inspect(|report| counts.record(report.outcome))
            .collect();

        let verdict = if counts.failed == 0 && !interrupted {
            Verdict::Success
        } else {
            Verdict::Failure
        };

        MatrixReport {
            started_at: self.started_at,
            finished_at: Utc::now(),
            verdict,
            fail_fast: self.fail_fast,
            interrupted,
            counts,
            configurations,
        }
    }
}

fn skipped_report(index: usize, configuration: Configuration) -> ConfigurationReport {
    ConfigurationReport {
        index,
        id: configuration.id(),
        configuration,
        outcome: Outcome::Skipped,
        duration: None,
        steps: vec![],
    }
}
