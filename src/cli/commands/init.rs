//! # Init Command Module / 初始化命令模块
//!
//! This module implements the `init` command, which creates a new matrix file
//! either with defaults or through an interactive command-line wizard.
//!
//! 此模块实现了 `init` 命令，使用默认值或通过交互式命令行向导
//! 创建新的矩阵文件。
//!
//! ## Features / 功能特性
//!
//! - **Interactive Wizard**: Step-by-step guidance for axes and steps
//! - **Step Templates**: Pre-defined steps for common CI checks
//! - **Overwrite Protection**: Confirmation prompts before overwriting existing files
//!
//! - **交互式向导**: 轴和步骤的逐步指导
//! - **步骤模板**: 常见 CI 检查的预定义步骤
//! - **覆盖保护**: 覆盖现有文件前的确认提示

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, MultiSelect, theme::ColorfulTheme};
use std::path::Path;

use crate::core::config::{Axis, MatrixSpec, StepCommand, StepSpec};
use crate::infra::{fs, t};

/// The matrix written by `init --non-interactive`.
/// `init --non-interactive` 写入的矩阵。
pub fn default_matrix(language: &str) -> MatrixSpec {
    MatrixSpec {
        language: Some(language.to_string()),
        timeout_secs: Some(1800),
        axes: vec![
            Axis::new("toolchain", &["stable", "nightly"]),
            Axis::new("features", &["", "--no-default-features"]),
        ],
        steps: vec![
            StepSpec::new(
                "install toolchain",
                StepCommand::Line("rustup toolchain install $MATRIX_TOOLCHAIN --profile minimal".to_string()),
            ),
            StepSpec::new(
                "test debug",
                StepCommand::Line("cargo +$MATRIX_TOOLCHAIN test $MATRIX_FEATURES".to_string()),
            ),
            StepSpec::new(
                "test release",
                StepCommand::Line("cargo +$MATRIX_TOOLCHAIN test --release $MATRIX_FEATURES".to_string()),
            ),
        ],
        ..MatrixSpec::default()
    }
}

fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Runs the wizard (or writes the defaults) and saves the matrix file.
///
/// 运行向导（或写入默认值）并保存矩阵文件。
pub fn run_init_wizard(
    config_path: &Path,
    language: &str,
    non_interactive: bool,
    force: bool,
) -> Result<()> {
    if config_path.exists() && !force {
        if non_interactive {
            println!(
                "{}",
                t!("init_file_exists", locale = language, path = config_path.display()).red()
            );
            println!("{}", t!("init_use_force", locale = language).yellow());
            return Ok(());
        }
        let confirmation = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("init_overwrite_prompt", locale = language, path = config_path.display()))
            .default(false)
            .interact()
            .context(t!("init_user_confirmation_failed", locale = language).to_string())?;
        if !confirmation {
            println!("{}", t!("init_aborted", locale = language));
            return Ok(());
        }
    }

    let matrix = if non_interactive {
        default_matrix(language)
    } else {
        interactive_matrix(language)?
    };

    write_config(config_path, &matrix, language)
}

fn interactive_matrix(language: &str) -> Result<MatrixSpec> {
    let theme = ColorfulTheme::default();
    println!("\n{}", t!("init_wizard_welcome", locale = language).cyan().bold());
    println!("{}", t!("init_wizard_description", locale = language));

    let mut axes = Vec::new();
    let toolchains: String = Input::with_theme(&theme)
        .with_prompt(t!("init_toolchains_prompt", locale = language))
        .default("stable,nightly".to_string())
        .interact_text()?;
    let toolchains = split_list(&toolchains);
    if !toolchains.is_empty() {
        axes.push(Axis {
            name: "toolchain".to_string(),
            values: toolchains,
        });
    }

    let targets: String = Input::with_theme(&theme)
        .with_prompt(t!("init_targets_prompt", locale = language))
        .allow_empty(true)
        .interact_text()?;
    let targets = split_list(&targets);
    if !targets.is_empty() {
        axes.push(Axis {
            name: "target".to_string(),
            values: targets,
        });
    }

    let has_toolchain = axes.iter().any(|axis| axis.name == "toolchain");
    let has_target = axes.iter().any(|axis| axis.name == "target");
    let cargo = |args: &str| {
        let mut line = String::from("cargo");
        if has_toolchain {
            line.push_str(" +$MATRIX_TOOLCHAIN");
        }
        line.push(' ');
        line.push_str(args);
        if has_target {
            line.push_str(" --target $MATRIX_TARGET");
        }
        line
    };

    let options = vec![
        ("test_debug", t!("init_template_test_debug", locale = language)),
        ("test_release", t!("init_template_test_release", locale = language)),
        ("no_default_features", t!("init_template_no_default_features", locale = language)),
        ("audit", t!("init_template_audit", locale = language)),
        ("custom_command", t!("init_template_custom_command", locale = language)),
    ];

    let selections = MultiSelect::with_theme(&theme)
        .with_prompt(t!("init_step_selection_prompt", locale = language))
        .items(&options.iter().map(|o| o.1.clone()).collect::<Vec<_>>())
        .defaults(&[true, true, false, false, false])
        .interact()
        .context(t!("init_user_confirmation_failed", locale = language).to_string())?;

    let mut steps = Vec::new();
    if has_toolchain {
        steps.push(StepSpec::new(
            "install toolchain",
            StepCommand::Line("rustup toolchain install $MATRIX_TOOLCHAIN --profile minimal".to_string()),
        ));
    }
    for i in selections {
        let step = match options[i].0 {
            "test_debug" => StepSpec::new("test debug", StepCommand::Line(cargo("test"))),
            "test_release" => StepSpec::new("test release", StepCommand::Line(cargo("test --release"))),
            "no_default_features" => StepSpec::new(
                "test no-default-features",
                StepCommand::Line(cargo("test --no-default-features")),
            ),
            "audit" => StepSpec {
                tolerate_failure: true,
                when: if has_toolchain {
                    [("toolchain".to_string(), first_value(&axes, "toolchain"))].into()
                } else {
                    Default::default()
                },
                ..StepSpec::new("security audit", StepCommand::Line("cargo audit".to_string()))
            },
            "custom_command" => {
                let command: String = Input::with_theme(&theme)
                    .with_prompt(t!("init_custom_command_prompt", locale = language))
                    .interact_text()?;
                StepSpec::new("custom command", StepCommand::Line(command))
            }
            _ => continue,
        };
        steps.push(step);
    }

    if steps.is_empty() {
        println!("{}", t!("init_no_steps_selected", locale = language).yellow());
        return Ok(default_matrix(language));
    }

    let fail_fast = Confirm::with_theme(&theme)
        .with_prompt(t!("init_fail_fast_prompt", locale = language))
        .default(true)
        .interact()
        .context(t!("init_user_confirmation_failed", locale = language).to_string())?;

    Ok(MatrixSpec {
        language: Some(language.to_string()),
        fail_fast,
        axes,
        steps,
        ..MatrixSpec::default()
    })
}

fn first_value(axes: &[Axis], name: &str) -> String {
    axes.iter()
        .find(|axis| axis.name == name)
        .and_then(|axis| axis.values.first().cloned())
        .unwrap_or_default()
}

fn write_config(path: &Path, matrix: &MatrixSpec, language: &str) -> Result<()> {
    matrix.validate()?;
    let toml_string = toml::to_string_pretty(matrix)
        .context(t!("init_serialize_failed", locale = language).to_string())?;

    fs::write_file(path, &toml_string)?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init_success_created", locale = language, path = path.display()).bold()
    );
    println!("{}", t!("init_usage_hint", locale = language));

    Ok(())
}
