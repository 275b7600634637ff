//! Builders and mutators for modification rules.
//!
//! Constructors return fresh JSON fragments. Mutators take a `&mut Value`
//! pointing at a single profile inside a document the caller owns, and edit
//! it in place. Nothing here touches the main config file; only
//! [`save_complex_mod_file`] writes to disk, into the assets directory.

use serde::Serialize;
use serde_json::{Map, Value, json};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::to_json_pretty;
use crate::error::ConfigError;
use crate::paths::Paths;

/// Contents of a standalone file under `assets/complex_modifications`
#[derive(Debug, Clone, Serialize)]
pub struct ComplexModFile<'a> {
    pub title: &'a str,
    pub rules: &'a [Value],
}

/// Return `value` as an object, replacing it with an empty one if it is anything else
fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just made an object"),
    }
}

/// Return `map[key]` as an array, inserting an empty array when missing or mistyped
fn ensure_array<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Vec<Value> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if !slot.is_array() {
        *slot = Value::Array(Vec::new());
    }
    match slot {
        Value::Array(items) => items,
        _ => unreachable!("slot was just made an array"),
    }
}

/// Append a complex modification rule to a profile
///
/// Creates `complex_modifications` (with empty `parameters`) and its `rules`
/// array when missing. Rules with the same description are all kept.
pub fn add_complex_rule(profile: &mut Value, rule: Value) {
    let profile = ensure_object(profile);
    let complex = profile
        .entry("complex_modifications")
        .or_insert_with(|| json!({ "parameters": {}, "rules": [] }));

    ensure_array(ensure_object(complex), "rules").push(rule);
}

fn has_description(rule: &Value, description: &str) -> bool {
    rule.get("description").and_then(Value::as_str) == Some(description)
}

/// Whether the profile has a rule whose description matches exactly
///
/// Rules without a string `description` never match.
pub fn has_complex_rule(profile: &Value, description: &str) -> bool {
    profile
        .pointer("/complex_modifications/rules")
        .and_then(Value::as_array)
        .is_some_and(|rules| rules.iter().any(|rule| has_description(rule, description)))
}

/// Remove the first rule whose description matches exactly
///
/// Returns `true` if a rule was removed.
pub fn remove_complex_rule(profile: &mut Value, description: &str) -> bool {
    let Some(rules) = profile
        .pointer_mut("/complex_modifications/rules")
        .and_then(Value::as_array_mut)
    else {
        return false;
    };

    let position = rules
        .iter()
        .position(|rule| has_description(rule, description));

    match position {
        Some(index) => {
            rules.remove(index);
            debug!(description, index, "removed complex rule");
            true
        }
        None => false,
    }
}

/// Map `from_key` to `to_key`, replacing any existing mapping for `from_key`
pub fn add_simple_modification(profile: &mut Value, from_key: &str, to_key: &str) {
    let mods = ensure_array(ensure_object(profile), "simple_modifications");
    let to = json!([{ "key_code": to_key }]);

    let existing = mods
        .iter_mut()
        .find(|m| m.pointer("/from/key_code").and_then(Value::as_str) == Some(from_key));

    match existing {
        Some(entry) => {
            ensure_object(entry).insert("to".to_string(), to);
        }
        None => mods.push(json!({
            "from": { "key_code": from_key },
            "to": to,
        })),
    }
}

/// Create a complex modification rule
pub fn create_rule(description: &str, manipulators: Vec<Value>) -> Value {
    json!({
        "description": description,
        "manipulators": manipulators,
    })
}

/// Create a `basic` manipulator mapping one key to one key
///
/// Optional parts are only attached when present and non-empty:
/// `from_modifiers` becomes `from.modifiers` (e.g. `{"mandatory": ["command"]}`),
/// `to_modifiers` becomes `to[0].modifiers`, and `conditions` is copied as is.
pub fn create_basic_manipulator(
    from_key: &str,
    to_key: &str,
    from_modifiers: Option<Value>,
    to_modifiers: Option<&[String]>,
    conditions: Option<Vec<Value>>,
) -> Value {
    let mut from = Map::new();
    from.insert("key_code".to_string(), json!(from_key));
    if let Some(modifiers) = from_modifiers.filter(is_present) {
        from.insert("modifiers".to_string(), modifiers);
    }

    let mut to = Map::new();
    to.insert("key_code".to_string(), json!(to_key));
    if let Some(modifiers) = to_modifiers.filter(|m| !m.is_empty()) {
        to.insert("modifiers".to_string(), json!(modifiers));
    }

    let mut manipulator = Map::new();
    manipulator.insert("type".to_string(), json!("basic"));
    manipulator.insert("from".to_string(), Value::Object(from));
    manipulator.insert("to".to_string(), json!([to]));
    if let Some(conditions) = conditions.filter(|c| !c.is_empty()) {
        manipulator.insert("conditions".to_string(), Value::Array(conditions));
    }

    Value::Object(manipulator)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Write rules to `<assets>/<filename>.json`, overwriting any existing file
pub fn save_complex_mod_file(
    paths: &Paths,
    filename: &str,
    title: &str,
    rules: &[Value],
) -> Result<PathBuf, ConfigError> {
    fs::create_dir_all(&paths.complex_mods_dir)
        .map_err(ConfigError::io(&paths.complex_mods_dir))?;

    let path = paths.complex_mod_file(filename);
    let content = to_json_pretty(&ComplexModFile { title, rules })?;
    fs::write(&path, content).map_err(ConfigError::io(&path))?;

    info!(path = %path.display(), rules = rules.len(), "wrote complex modification file");
    Ok(path)
}
