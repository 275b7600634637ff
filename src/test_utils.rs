//! Test utilities shared across test modules
//!
//! This module provides common helper functions for testing, avoiding duplication
//! across multiple test suites.

use crate::paths::Paths;
use serde_json::{Value, json};
use std::fs;
use tempfile::TempDir;

/// Create a Paths struct for testing using a temporary directory as `$HOME`
pub fn setup_test_paths(temp_dir: &TempDir) -> Paths {
    Paths::from_home(temp_dir.path())
}

/// A small document with two profiles, the second one selected
pub fn sample_config() -> Value {
    json!({
        "global": { "show_in_menu_bar": true },
        "profiles": [
            {
                "name": "Default",
                "selected": false,
                "simple_modifications": []
            },
            {
                "name": "Work",
                "selected": true,
                "simple_modifications": [
                    { "from": { "key_code": "caps_lock" }, "to": [{ "key_code": "escape" }] }
                ],
                "complex_modifications": {
                    "parameters": { "basic.to_if_alone_timeout_milliseconds": 1000 },
                    "rules": [
                        { "description": "Hyper key", "manipulators": [] },
                        { "description": "Vim arrows", "manipulators": [] }
                    ]
                }
            }
        ]
    })
}

/// Write a document to the config path, creating parent directories
pub fn write_config(paths: &Paths, config: &Value) {
    fs::create_dir_all(&paths.karabiner_dir).unwrap();
    fs::write(
        &paths.config_file,
        serde_json::to_string_pretty(config).unwrap(),
    )
    .unwrap();
}
