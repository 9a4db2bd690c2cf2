//! # Config Module Unit Tests / Config 模块单元测试
//!
//! Parsing and validation of the matrix declaration.
//!
//! 矩阵声明的解析与验证。

mod common;

use matrix_orchestrator::core::config::{MatrixSpec, StepCommand, load_matrix_spec};
use matrix_orchestrator::core::error::OrchestratorError;

const MINIMAL: &str = r#"
[[steps]]
name = "check"
command = "cargo check"
"#;

fn configuration_error(content: &str) -> String {
    match MatrixSpec::from_toml_str(content) {
        Err(OrchestratorError::Configuration(message)) => message,
        other => panic!("expected a configuration error, got {other:?}"),
    }
}

#[cfg(test)]
mod parsing_tests {
    use super::*;

    #[test]
    fn test_minimal_matrix_uses_defaults() {
        let spec = MatrixSpec::from_toml_str(MINIMAL).unwrap();

        // No language in the file leaves the choice to `--lang` or the system locale.
        assert_eq!(spec.language, None);
        assert!(spec.fail_fast);
        assert!(spec.cancel_in_flight);
        assert_eq!(spec.jobs, None);
        assert_eq!(spec.timeout_secs, None);
        assert!(spec.axes.is_empty());
        assert_eq!(spec.steps.len(), 1);
        assert_eq!(spec.steps[0].command, StepCommand::Line("cargo check".to_string()));
        assert!(!spec.steps[0].tolerate_failure);
        assert_eq!(spec.steps[0].retries, 0);
    }

    #[test]
    fn test_full_matrix_deserialization() {
        let spec = MatrixSpec::from_toml_str(
            r#"
language = "zh-CN"
fail_fast = false
cancel_in_flight = false
jobs = 3
timeout_secs = 600

[[axes]]
name = "toolchain"
values = ["stable", "nightly"]

[[axes]]
name = "os"
values = ["linux", "macos"]

[[exclude]]
toolchain = "nightly"
os = "macos"

[[include]]
toolchain = "beta"
os = "linux"

[[steps]]
name = "build"
command = ["cargo", "build", "--release"]
working_dir = "crates/core"
timeout_secs = 60
retries = 2
env = { RUSTFLAGS = "-D warnings" }

[[steps]]
name = "miri"
command = "cargo miri test"
tolerate_failure = true
when = { toolchain = "nightly" }
"#,
        )
        .unwrap();

        assert_eq!(spec.language.as_deref(), Some("zh-CN"));
        assert!(!spec.fail_fast);
        assert!(!spec.cancel_in_flight);
        assert_eq!(spec.jobs, Some(3));
        assert_eq!(spec.timeout_secs, Some(600));
        assert_eq!(spec.axes.len(), 2);
        assert_eq!(spec.axis("os").unwrap().values, vec!["linux", "macos"]);
        assert_eq!(spec.exclude.len(), 1);
        assert_eq!(spec.include[0].get("toolchain").map(String::as_str), Some("beta"));

        let build = &spec.steps[0];
        assert_eq!(
            build.command,
            StepCommand::Args(vec!["cargo".into(), "build".into(), "--release".into()])
        );
        assert_eq!(build.working_dir.as_deref(), Some(std::path::Path::new("crates/core")));
        assert_eq!(build.timeout_secs, Some(60));
        assert_eq!(build.retries, 2);
        assert_eq!(build.env.get("RUSTFLAGS").map(String::as_str), Some("-D warnings"));

        let miri = &spec.steps[1];
        assert!(miri.tolerate_failure);
        assert_eq!(miri.when.get("toolchain").map(String::as_str), Some("nightly"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let message = configuration_error(
            r#"
unknown_setting = true

[[steps]]
name = "check"
command = "cargo check"
"#,
        );
        assert!(message.contains("unknown_setting"), "message: {message}");
    }

    #[test]
    fn test_invalid_toml_is_a_configuration_error() {
        let (_dir, path) = common::create_invalid_toml();
        let err = load_matrix_spec(&path).unwrap_err();
        assert!(matches!(err, OrchestratorError::Configuration(_)));
        assert!(err.to_string().contains("TestMatrix.toml"));
    }

    #[test]
    fn test_missing_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_matrix_spec(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn test_load_matrix_spec_from_file() {
        let (_dir, path) = common::write_matrix(MINIMAL);
        let spec = load_matrix_spec(&path).unwrap();
        assert_eq!(spec.steps[0].name, "check");
    }

    #[test]
    fn test_serialization_round_trips_through_validation() {
        let spec = common::spec(
            r#"
[[axes]]
name = "toolchain"
values = ["stable"]

[[steps]]
name = "test"
command = "cargo test"
when = { toolchain = "stable" }
"#,
        );
        let text = toml::to_string_pretty(&spec).unwrap();
        assert_eq!(MatrixSpec::from_toml_str(&text).unwrap(), spec);
    }
}

#[cfg(test)]
mod validation_tests {
    use super::*;

    #[test]
    fn test_no_steps_is_rejected() {
        let message = configuration_error(
            r#"
steps = []

[[axes]]
name = "toolchain"
values = ["stable"]
"#,
        );
        assert_eq!(message, "no steps declared");
    }

    #[test]
    fn test_axis_without_values_is_rejected() {
        let message = configuration_error(&format!(
            "{MINIMAL}\n[[axes]]\nname = \"toolchain\"\nvalues = []\n"
        ));
        assert!(message.contains("has no values"), "message: {message}");
    }

    #[test]
    fn test_duplicate_axis_is_rejected() {
        let message = configuration_error(&format!(
            "{MINIMAL}\n[[axes]]\nname = \"os\"\nvalues = [\"linux\"]\n\n[[axes]]\nname = \"os\"\nvalues = [\"macos\"]\n"
        ));
        assert!(message.contains("more than once"), "message: {message}");
    }

    #[test]
    fn test_axes_sharing_an_environment_variable_are_rejected() {
        let message = configuration_error(&format!(
            "{MINIMAL}\n[[axes]]\nname = \"target-os\"\nvalues = [\"linux\"]\n\n[[axes]]\nname = \"target_os\"\nvalues = [\"macos\"]\n"
        ));
        assert!(message.contains("same environment variable"), "message: {message}");
    }

    #[test]
    fn test_axes_shadowing_builtin_variables_are_rejected() {
        for name in ["index", "configuration", "Index"] {
            let message = configuration_error(&format!(
                "{MINIMAL}\n[[axes]]\nname = \"{name}\"\nvalues = [\"alpha\", \"beta\"]\n"
            ));
            assert!(message.contains("reserved environment variable"), "message: {message}");
            assert!(message.contains(&format!("'{name}'")), "message: {message}");
        }
    }

    #[test]
    fn test_duplicate_axis_value_is_rejected() {
        let message = configuration_error(&format!(
            "{MINIMAL}\n[[axes]]\nname = \"os\"\nvalues = [\"linux\", \"linux\"]\n"
        ));
        assert!(message.contains("value 'linux'"), "message: {message}");
    }

    #[test]
    fn test_exclude_must_reference_declared_axes_and_values() {
        let base = format!("{MINIMAL}\n[[axes]]\nname = \"os\"\nvalues = [\"linux\"]\n");

        let message = configuration_error(&format!("{base}\n[[exclude]]\narch = \"x86_64\"\n"));
        assert!(message.contains("unknown axis 'arch'"), "message: {message}");

        let message = configuration_error(&format!("{base}\n[[exclude]]\nos = \"windows\"\n"));
        assert!(message.contains("unknown value 'windows'"), "message: {message}");
    }

    #[test]
    fn test_include_must_assign_every_axis() {
        let base = format!(
            "{MINIMAL}\n[[axes]]\nname = \"os\"\nvalues = [\"linux\"]\n\n[[axes]]\nname = \"toolchain\"\nvalues = [\"stable\"]\n"
        );
        let message = configuration_error(&format!("{base}\n[[include]]\nos = \"windows\"\n"));
        assert!(message.contains("does not assign axis 'toolchain'"), "message: {message}");
    }

    #[test]
    fn test_include_may_use_undeclared_values() {
        let spec = MatrixSpec::from_toml_str(&format!(
            "{MINIMAL}\n[[axes]]\nname = \"os\"\nvalues = [\"linux\"]\n\n[[include]]\nos = \"windows\"\n"
        ));
        assert!(spec.is_ok());
    }

    #[test]
    fn test_zero_jobs_and_timeouts_are_rejected() {
        let message = configuration_error(&format!("jobs = 0\n{MINIMAL}"));
        assert!(message.contains("jobs"), "message: {message}");

        let message = configuration_error(&format!("timeout_secs = 0\n{MINIMAL}"));
        assert!(message.contains("timeout_secs"), "message: {message}");

        let message = configuration_error(
            "[[steps]]\nname = \"slow\"\ncommand = \"sleep 1\"\ntimeout_secs = 0\n",
        );
        assert!(message.contains("zero timeout"), "message: {message}");
    }

    #[test]
    fn test_empty_step_command_is_rejected() {
        let message = configuration_error("[[steps]]\nname = \"blank\"\ncommand = \"  \"\n");
        assert!(message.contains("empty command"), "message: {message}");

        let message = configuration_error("[[steps]]\nname = \"blank\"\ncommand = []\n");
        assert!(message.contains("empty command"), "message: {message}");
    }

    #[test]
    fn test_when_on_unknown_axis_is_rejected() {
        let message = configuration_error(
            "[[steps]]\nname = \"miri\"\ncommand = \"cargo miri test\"\nwhen = { toolchain = \"nightly\" }\n",
        );
        assert!(message.contains("unknown axis 'toolchain'"), "message: {message}");
    }
}

#[cfg(test)]
mod locale_tests {
    use matrix_orchestrator::resolve_locale;

    #[test]
    fn test_requested_language_wins() {
        assert_eq!(resolve_locale(Some("en"), Some("zh-CN")), "en");
        assert_eq!(resolve_locale(Some("zh-CN"), Some("en-US")), "zh-CN");
    }

    #[test]
    fn test_system_locale_is_used_when_nothing_is_requested() {
        assert_eq!(resolve_locale(None, Some("zh-CN")), "zh-CN");
        assert_eq!(resolve_locale(None, Some("zh_CN")), "zh-CN");
        assert_eq!(resolve_locale(None, Some("en-GB")), "en");
    }

    #[test]
    fn test_unknown_languages_fall_back_to_english() {
        assert_eq!(resolve_locale(Some("fr"), None), "en");
        assert_eq!(resolve_locale(None, Some("de-DE")), "en");
        assert_eq!(resolve_locale(None, None), "en");
    }

    #[test]
    fn test_unavailable_request_falls_through_to_the_system_locale() {
        assert_eq!(resolve_locale(Some("fr"), Some("zh-CN")), "zh-CN");
    }
}
