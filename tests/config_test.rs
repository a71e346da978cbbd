//! Integration tests for Settings loading and settings-driven helpers.
//!
//! Note: These tests run without a global config (temp files only) and do
//! not set MELDTREE_* variables; env overrides live in config_env_test.rs.

use std::fs;

use tempfile::TempDir;

use meldtree::config::Settings;
use meldtree::{render_with_settings, CloneStrategy, DisplayConfig, MeldError, MeldTree, NodeData};

#[test]
fn given_no_overrides_when_using_defaults_then_depth_first_with_full_display() {
    let settings = Settings::default();
    assert_eq!(settings.clone_strategy, CloneStrategy::DepthFirst);
    assert!(settings.display.show_attributes);
    assert!(settings.display.show_text);
}

#[test]
fn given_partial_toml_when_parsing_then_unspecified_fields_keep_defaults() {
    let settings = Settings::from_toml_str(
        r#"
clone_strategy = "breadth_first"

[display]
show_text = false
"#,
    )
    .expect("parse settings");

    assert_eq!(settings.clone_strategy, CloneStrategy::BreadthFirst);
    assert!(settings.display.show_attributes);
    assert!(!settings.display.show_text);
}

#[test]
fn given_unknown_strategy_when_parsing_then_returns_config_error() {
    let err = Settings::from_toml_str(r#"clone_strategy = "sideways""#).unwrap_err();
    assert!(matches!(err, MeldError::Config { .. }));
}

#[test]
fn given_strategy_spellings_when_parsing_toml_then_same_names_as_env_are_accepted() {
    for (name, expected) in [
        ("breadth-first", CloneStrategy::BreadthFirst),
        ("bfs", CloneStrategy::BreadthFirst),
        ("Depth_First", CloneStrategy::DepthFirst),
        ("dfs", CloneStrategy::DepthFirst),
    ] {
        let settings = Settings::from_toml_str(&format!("clone_strategy = \"{}\"", name))
            .expect("parse settings");
        assert_eq!(settings.clone_strategy, expected, "{}", name);
    }
}

#[test]
fn given_local_file_when_loading_then_it_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("meldtree.toml");
    fs::write(
        &path,
        r#"
clone_strategy = "breadth_first"

[display]
show_attributes = false
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(&path)).expect("load settings");

    assert_eq!(settings.clone_strategy, CloneStrategy::BreadthFirst);
    assert!(!settings.display.show_attributes);
    assert!(settings.display.show_text);
}

#[test]
fn given_missing_local_file_when_loading_then_returns_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = Settings::load(Some(&path)).unwrap_err();
    assert!(matches!(err, MeldError::Config { .. }));
}

#[test]
fn given_malformed_local_file_when_loading_then_returns_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("meldtree.toml");
    fs::write(&path, "[display\nshow_text = ").unwrap();

    let err = Settings::load(Some(&path)).unwrap_err();
    assert!(err.to_string().contains("meldtree.toml"));
}

#[test]
fn given_display_settings_when_rendering_then_hidden_parts_are_omitted() {
    let mut tree = MeldTree::new();
    let div = tree
        .insert_node(NodeData::element("div").with_attribute("class", "box"), None)
        .unwrap();
    let span = tree
        .insert_node(
            NodeData::element("span").with_meld_id("x").with_text("hi"),
            Some(div),
        )
        .unwrap();
    tree.inject_content(span, "<b>raw</b>", true).unwrap();

    let full = render_with_settings(&tree, div, &Settings::default())
        .unwrap()
        .to_string();
    assert!(full.contains(r#"div [class="box"]"#));
    assert!(full.contains(r#"span [meld:id="x"]"#));
    assert!(full.contains(r#"<replace> (raw) "<b>raw</b>""#));

    let bare = Settings {
        display: DisplayConfig {
            show_attributes: false,
            show_text: false,
        },
        ..Settings::default()
    };
    let rendered = render_with_settings(&tree, div, &bare).unwrap().to_string();
    assert!(!rendered.contains("class"));
    assert!(!rendered.contains("raw</b>"));
    assert!(rendered.contains("<replace> (raw)"));
}
