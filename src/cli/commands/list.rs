//! # List Command Module / 列表命令模块
//!
//! Prints the expanded configurations and their bound steps without running
//! anything.
//!
//! 打印展开后的配置及其绑定的步骤，不运行任何内容。

use anyhow::{Context, Result};
use std::path::Path;

use crate::core::{config, planner};
use crate::infra::t;
use crate::reporting::console::print_plan;

pub fn execute(
    config_path: &Path,
    total_runners: Option<usize>,
    runner_index: Option<usize>,
    language: Option<&str>,
) -> Result<()> {
    let spec = config::load_matrix_spec(config_path)
        .with_context(|| t!("config_parse_failed", locale = "en").to_string())?;
    let locale = crate::init_locale(language.or(spec.language.as_deref()));

    let plan = planner::plan_execution(&spec, total_runners, runner_index)?;
    print_plan(&plan, &locale);
    Ok(())
}
