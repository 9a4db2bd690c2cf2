//! # Expander Unit Tests / 展开模块单元测试
//!
//! Cartesian expansion, exclusion and inclusion of configurations.
//!
//! 配置的笛卡尔积展开、排除与包含。

mod common;

use matrix_orchestrator::core::config::Axis;
use matrix_orchestrator::core::expander::{cartesian_product, expand};

const STEP: &str = "\n[[steps]]\nname = \"test\"\ncommand = \"cargo test\"\n";

fn ids(content: &str) -> Vec<String> {
    expand(&common::spec(content))
        .configurations
        .iter()
        .map(|c| c.id())
        .collect()
}

#[test]
fn test_product_size_is_the_product_of_axis_lengths() {
    let axes = vec![
        Axis::new("toolchain", &["stable", "beta", "nightly"]),
        Axis::new("os", &["linux", "macos"]),
        Axis::new("features", &["default", "all"]),
    ];
    assert_eq!(cartesian_product(&axes).len(), 12);
}

#[test]
fn test_first_axis_varies_slowest() {
    let axes = vec![
        Axis::new("toolchain", &["stable", "nightly"]),
        Axis::new("os", &["linux", "macos"]),
    ];
    let ids: Vec<String> = cartesian_product(&axes).iter().map(|c| c.id()).collect();
    assert_eq!(
        ids,
        vec![
            "toolchain=stable,os=linux",
            "toolchain=stable,os=macos",
            "toolchain=nightly,os=linux",
            "toolchain=nightly,os=macos",
        ]
    );
}

#[test]
fn test_zero_axes_yield_a_single_empty_configuration() {
    let expansion = expand(&common::spec(STEP));
    assert_eq!(expansion.configurations.len(), 1);
    assert!(expansion.configurations[0].is_empty());
    assert_eq!(expansion.configurations[0].to_string(), "(default)");
}

#[test]
fn test_single_value_axis() {
    let ids = ids(&format!("{STEP}\n[[axes]]\nname = \"os\"\nvalues = [\"linux\"]\n"));
    assert_eq!(ids, vec!["os=linux"]);
}

#[test]
fn test_exclude_removes_matching_cells() {
    let expansion = expand(&common::spec(&format!(
        r#"{STEP}
[[axes]]
name = "toolchain"
values = ["stable", "nightly"]

[[axes]]
name = "os"
values = ["linux", "macos", "windows"]

[[exclude]]
toolchain = "nightly"
os = "windows"

[[exclude]]
os = "macos"
"#
    )));

    let ids: Vec<String> = expansion.configurations.iter().map(|c| c.id()).collect();
    assert_eq!(
        ids,
        vec![
            "toolchain=stable,os=linux",
            "toolchain=stable,os=windows",
            "toolchain=nightly,os=linux",
        ]
    );
    assert_eq!(expansion.excluded_count, 3);
    assert_eq!(expansion.included_count, 0);
}

#[test]
fn test_include_appends_in_axis_order_and_skips_duplicates() {
    let expansion = expand(&common::spec(&format!(
        r#"{STEP}
[[axes]]
name = "toolchain"
values = ["stable"]

[[axes]]
name = "os"
values = ["linux"]

[[include]]
os = "freebsd"
toolchain = "stable"

[[include]]
toolchain = "stable"
os = "linux"

[[include]]
toolchain = "stable"
os = "freebsd"
"#
    )));

    let ids: Vec<String> = expansion.configurations.iter().map(|c| c.id()).collect();
    assert_eq!(ids, vec!["toolchain=stable,os=linux", "toolchain=stable,os=freebsd"]);
    assert_eq!(expansion.included_count, 1);
}

#[test]
fn test_include_survives_a_matching_exclude() {
    let ids = ids(&format!(
        r#"{STEP}
[[axes]]
name = "os"
values = ["linux", "macos"]

[[exclude]]
os = "macos"

[[include]]
os = "macos"
"#
    ));
    assert_eq!(ids, vec!["os=linux", "os=macos"]);
}

#[test]
fn test_expansion_is_deterministic() {
    let content = format!(
        r#"{STEP}
[[axes]]
name = "a"
values = ["1", "2", "3"]

[[axes]]
name = "b"
values = ["x", "y"]

[[exclude]]
a = "2"
"#
    );
    let spec = common::spec(&content);
    assert_eq!(expand(&spec), expand(&spec));
}

#[test]
fn test_configuration_exposes_axis_values() {
    let configuration = &cartesian_product(&[
        Axis::new("toolchain", &["nightly"]),
        Axis::new("target-os", &["linux"]),
    ])[0];

    assert_eq!(configuration.get("toolchain"), Some("nightly"));
    assert_eq!(configuration.get("missing"), None);
    assert_eq!(configuration.to_string(), "(nightly, linux)");
    assert_eq!(
        configuration.env_vars(),
        vec![
            ("MATRIX_TOOLCHAIN".to_string(), "nightly".to_string()),
            ("MATRIX_TARGET_OS".to_string(), "linux".to_string()),
        ]
    );
}
