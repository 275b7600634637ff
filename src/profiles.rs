//! Read-only and mutable lookups over a loaded configuration document.
//!
//! Profiles live in the top-level `profiles` array. All lookups are linear
//! scans in document order, and the first match wins. A missing or
//! non-array `profiles` field behaves like an empty list.

use serde_json::Value;

/// Placeholder used when a profile has no `name`
pub const UNNAMED_PROFILE: &str = "Unnamed";

fn profiles(document: &Value) -> &[Value] {
    document
        .get("profiles")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn profiles_mut(document: &mut Value) -> Option<&mut Vec<Value>> {
    document.get_mut("profiles").and_then(Value::as_array_mut)
}

/// JSON truthiness: `false`, `null`, `0`, and empty strings/arrays/objects are falsy
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn is_selected(profile: &Value) -> bool {
    profile.get("selected").is_some_and(is_truthy)
}

fn has_name(profile: &Value, name: &str) -> bool {
    profile.get("name").and_then(Value::as_str) == Some(name)
}

/// Get the currently selected profile
pub fn selected_profile(document: &Value) -> Option<&Value> {
    profiles(document).iter().find(|p| is_selected(p))
}

/// Get the currently selected profile for mutation
pub fn selected_profile_mut(document: &mut Value) -> Option<&mut Value> {
    profiles_mut(document)?.iter_mut().find(|p| is_selected(p))
}

/// Get a profile by exact name
pub fn profile_by_name<'a>(document: &'a Value, name: &str) -> Option<&'a Value> {
    profiles(document).iter().find(|p| has_name(p, name))
}

/// Get a profile by exact name for mutation
pub fn profile_by_name_mut<'a>(document: &'a mut Value, name: &str) -> Option<&'a mut Value> {
    profiles_mut(document)?
        .iter_mut()
        .find(|p| has_name(p, name))
}

/// List all profile names, in document order
pub fn list_profile_names(document: &Value) -> Vec<String> {
    profiles(document)
        .iter()
        .map(|p| {
            p.get("name")
                .and_then(Value::as_str)
                .unwrap_or(UNNAMED_PROFILE)
                .to_string()
        })
        .collect()
}

/// Name of a single profile, `"Unknown"` when it has none
pub fn profile_name(profile: &Value) -> &str {
    profile
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
}

/// Descriptions of the profile's complex modification rules, in order
pub fn rule_descriptions(profile: &Value) -> Vec<String> {
    profile
        .pointer("/complex_modifications/rules")
        .and_then(Value::as_array)
        .map(|rules| {
            rules
                .iter()
                .map(|rule| {
                    rule.get("description")
                        .and_then(Value::as_str)
                        .unwrap_or("No description")
                        .to_string()
                })
                .collect()
        })
        .unwrap_or_default()
}

/// `(from, to)` key codes of the profile's simple modifications
///
/// Multiple `to` events are joined with `+`; missing key codes show as `?`.
pub fn simple_modifications(profile: &Value) -> Vec<(String, String)> {
    let Some(mods) = profile.get("simple_modifications").and_then(Value::as_array) else {
        return Vec::new();
    };

    mods.iter()
        .map(|m| {
            let from = m
                .pointer("/from/key_code")
                .and_then(Value::as_str)
                .unwrap_or("?")
                .to_string();
            let to = m
                .get("to")
                .and_then(Value::as_array)
                .map(|events| {
                    events
                        .iter()
                        .map(|e| e.get("key_code").and_then(Value::as_str).unwrap_or("?"))
                        .collect::<Vec<_>>()
                        .join("+")
                })
                .unwrap_or_else(|| String::from("?"));
            (from, to)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_config;
    use serde_json::json;

    #[test]
    fn test_selected_profile() {
        let config = sample_config();
        let profile = selected_profile(&config).unwrap();
        assert_eq!(profile_name(profile), "Work");
    }

    #[test]
    fn test_first_selected_wins() {
        let config = json!({
            "profiles": [
                { "name": "a", "selected": false },
                { "name": "b", "selected": true },
                { "name": "c", "selected": true }
            ]
        });
        assert_eq!(profile_name(selected_profile(&config).unwrap()), "b");
    }

    #[test]
    fn test_selected_truthiness() {
        let config = json!({ "profiles": [{ "name": "a", "selected": 1 }] });
        assert!(selected_profile(&config).is_some());

        let config = json!({ "profiles": [{ "name": "a", "selected": 0 }, { "name": "b" }] });
        assert!(selected_profile(&config).is_none());
    }

    #[test]
    fn test_no_profiles_field() {
        let config = json!({});
        assert!(selected_profile(&config).is_none());
        assert!(list_profile_names(&config).is_empty());
    }

    #[test]
    fn test_empty_document() {
        let config = json!({ "profiles": [] });
        assert!(list_profile_names(&config).is_empty());
        assert!(selected_profile(&config).is_none());
        assert!(profile_by_name(&config, "Default").is_none());
    }

    #[test]
    fn test_profile_by_name() {
        let config = sample_config();
        let profile = profile_by_name(&config, "Default").unwrap();
        assert_eq!(profile["name"], "Default");

        assert!(profile_by_name(&config, "default").is_none());
        assert!(profile_by_name(&config, "Missing").is_none());
    }

    #[test]
    fn test_profile_by_name_mut() {
        let mut config = sample_config();
        let profile = profile_by_name_mut(&mut config, "Default").unwrap();
        profile["selected"] = json!(true);
        assert_eq!(config["profiles"][0]["selected"], true);
    }

    #[test]
    fn test_selected_profile_mut() {
        let mut config = sample_config();
        selected_profile_mut(&mut config).unwrap()["name"] = json!("Renamed");
        assert_eq!(config["profiles"][1]["name"], "Renamed");
    }

    #[test]
    fn test_list_profile_names_placeholder() {
        let config = json!({ "profiles": [{ "name": "One" }, { "selected": true }] });
        assert_eq!(list_profile_names(&config), vec!["One", UNNAMED_PROFILE]);
    }

    #[test]
    fn test_rule_descriptions() {
        let config = sample_config();
        let profile = selected_profile(&config).unwrap();
        assert_eq!(rule_descriptions(profile), vec!["Hyper key", "Vim arrows"]);

        let bare = json!({ "complex_modifications": { "rules": [{ "manipulators": [] }] } });
        assert_eq!(rule_descriptions(&bare), vec!["No description"]);
        assert!(rule_descriptions(&json!({})).is_empty());
    }

    #[test]
    fn test_simple_modifications() {
        let config = sample_config();
        let profile = selected_profile(&config).unwrap();
        assert_eq!(
            simple_modifications(profile),
            vec![("caps_lock".to_string(), "escape".to_string())]
        );
    }
}
