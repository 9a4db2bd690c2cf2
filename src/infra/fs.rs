//! # File System Operations Module / 文件系统操作模块
//!
//! Path resolution for step working directories and writing report files.
//!
//! 步骤工作目录的路径解析以及报告文件的写入。

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolves a step's working directory against the project root.
/// Absolute paths are kept as they are; no directory means the project root.
///
/// # Arguments
/// * `project_root` - Path to the project root directory
/// * `working_dir` - The step's configured working directory, if any
pub fn resolve_working_dir(project_root: &Path, working_dir: Option<&Path>) -> PathBuf {
    match working_dir {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => project_root.join(dir),
        None => project_root.to_path_buf(),
    }
}

/// Gets the absolute path from a potentially relative path.
///
/// # Returns
/// Canonicalized absolute path, or an error if the path doesn't exist
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}

/// Writes `content` to `path`, creating missing parent directories first.
/// 将 `content` 写入 `path`，必要时先创建缺失的父目录。
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    fs::write(path, content).with_context(|| format!("Failed to write file: {}", path.display()))
}
