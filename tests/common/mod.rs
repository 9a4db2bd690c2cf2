// Shared test helpers for integration tests
#![allow(dead_code)]

use matrix_orchestrator::core::config::MatrixSpec;
use matrix_orchestrator::core::execution::ExecutorContext;
use matrix_orchestrator::core::planner::{self, PlannedConfiguration};
use std::fs;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

/// Writes `content` as a matrix file inside a fresh temporary directory.
pub fn write_matrix(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let matrix_path = temp_dir.path().join("TestMatrix.toml");
    fs::write(&matrix_path, content).expect("Failed to write matrix file");
    (temp_dir, matrix_path)
}

/// Parses and validates a matrix declaration, panicking on errors.
pub fn spec(content: &str) -> MatrixSpec {
    MatrixSpec::from_toml_str(content).expect("matrix declaration should be valid")
}

/// Plans every configuration of `content` on a single runner.
pub fn plan(content: &str) -> Vec<PlannedConfiguration> {
    planner::plan_execution(&spec(content), None, None)
        .expect("planning should succeed")
        .configurations
}

/// Executor settings rooted in `dir`, with English output.
pub fn context(dir: &TempDir) -> ExecutorContext {
    ExecutorContext {
        project_root: dir.path().to_path_buf(),
        verbose: false,
        locale: "en".to_string(),
    }
}

/// Helper function to create an invalid TOML matrix file
pub fn create_invalid_toml() -> (TempDir, PathBuf) {
    write_matrix(
        r#"
language = "en"
# Invalid TOML - missing closing bracket
[[axes]
name = "toolchain"
values = ["stable"]
"#,
    )
}
