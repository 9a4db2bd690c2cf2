//! # Matrix Expander Module / 矩阵展开模块
//!
//! Turns the declared axes into the ordered list of concrete configurations.
//! The first declared axis varies slowest, values keep their declaration order,
//! exclusion rules prune product cells and inclusion rules append extra
//! configurations at the end.
//!
//! 将声明的轴转换为有序的具体配置列表。
//! 第一个声明的轴变化最慢，值保持声明顺序，排除规则裁剪乘积单元，
//! 包含规则在末尾追加额外配置。

use std::collections::HashSet;

use crate::core::config::{Axis, AxisRule, MatrixSpec};
use crate::core::models::Configuration;

/// Result of expanding a matrix declaration.
/// 展开矩阵声明的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub configurations: Vec<Configuration>,
    /// Product cells removed by `[[exclude]]` rules / 被排除规则移除的乘积单元数
    pub excluded_count: usize,
    /// Configurations contributed by `[[include]]` rules / 由包含规则添加的配置数
    pub included_count: usize,
}

/// Cartesian product of `axes` in declaration order.
/// Zero axes yield exactly one empty configuration.
pub fn cartesian_product(axes: &[Axis]) -> Vec<Configuration> {
    let mut cells: Vec<Vec<(String, String)>> = vec![Vec::new()];
    for axis in axes {
        let mut next = Vec::with_capacity(cells.len() * axis.values.len());
        for cell in &cells {
            for value in &axis.values {
                let mut extended = cell.clone();
                extended.push((axis.name.clone(), value.clone()));
                next.push(extended);
            }
        }
        cells = next;
    }
    cells.into_iter().map(Configuration::new).collect()
}

/// Builds the configuration described by an `[[include]]` rule, ordered by axis.
fn included_configuration(axes: &[Axis], rule: &AxisRule) -> Configuration {
    Configuration::new(
        axes.iter()
            .filter_map(|axis| {
                rule.get(&axis.name)
                    .map(|value| (axis.name.clone(), value.clone()))
            })
            .collect(),
    )
}

/// Expands a validated matrix declaration into its configurations.
/// The result is deterministic for identical input.
///
/// 将已验证的矩阵声明展开为配置列表。对于相同的输入，结果是确定的。
pub fn expand(spec: &MatrixSpec) -> Expansion {
    let product = cartesian_product(&spec.axes);
    let product_len = product.len();

    let mut configurations: Vec<Configuration> = product
        .into_iter()
        .filter(|configuration| !spec.exclude.iter().any(|rule| configuration.matches(rule)))
        .collect();
    let excluded_count = product_len - configurations.len();

    let mut seen: HashSet<Configuration> = configurations.iter().cloned().collect();
    let mut included_count = 0;
    for rule in &spec.include {
        let configuration = included_configuration(&spec.axes, rule);
        if seen.insert(configuration.clone()) {
            configurations.push(configuration);
            included_count += 1;
        }
    }

    Expansion {
        configurations,
        excluded_count,
        included_count,
    }
}
