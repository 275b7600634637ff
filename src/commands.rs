//! High-level command orchestration for the CLI.
//!
//! Each function here corresponds to a subcommand in `main.rs`. A command
//! loads the document once through [`ConfigRepository`], reads or mutates it
//! with `crate::profiles` and `crate::rules`, and either prints the result or
//! saves the whole document back.
//!
//! Mutating commands work on the selected profile unless a profile name is
//! given. A missing target profile is an error; nothing is written.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::config::ConfigRepository;
use crate::profiles::{
    list_profile_names,
    profile_by_name,
    profile_by_name_mut,
    profile_name,
    rule_descriptions,
    selected_profile,
    selected_profile_mut,
    simple_modifications,
};
use crate::rules::{
    add_complex_rule,
    add_simple_modification,
    create_basic_manipulator,
    create_rule,
    has_complex_rule,
    remove_complex_rule,
    save_complex_mod_file,
};
use crate::ui::Ui;

/// Message printed when no profile has `selected: true`
pub const NO_PROFILE_SELECTED: &str = "No profile selected";

/// Options shared by commands that write the config back
#[derive(Debug, Clone, Copy)]
pub struct WriteOptions<'a> {
    /// Target profile by name instead of the selected one
    pub profile: Option<&'a str>,
    /// Copy the on-disk config to the backups directory before saving
    pub backup: bool,
}

/// A basic one-key rule described on the command line
#[derive(Debug, Clone, Default)]
pub struct BasicRuleSpec {
    pub description: String,
    pub from_key: String,
    pub to_key: String,
    pub from_mandatory: Vec<String>,
    pub from_optional: Vec<String>,
    pub to_modifiers: Vec<String>,
}

impl BasicRuleSpec {
    /// Build the rule with a single `basic` manipulator
    pub fn build(&self) -> Value {
        let mut from_modifiers = Map::new();
        if !self.from_mandatory.is_empty() {
            from_modifiers.insert("mandatory".to_string(), json!(self.from_mandatory));
        }
        if !self.from_optional.is_empty() {
            from_modifiers.insert("optional".to_string(), json!(self.from_optional));
        }

        let manipulator = create_basic_manipulator(
            &self.from_key,
            &self.to_key,
            Some(Value::Object(from_modifiers)),
            Some(self.to_modifiers.as_slice()),
            None,
        );
        create_rule(&self.description, vec![manipulator])
    }
}

fn target_profile<'a>(document: &'a Value, name: Option<&str>) -> Result<&'a Value> {
    match name {
        Some(name) => profile_by_name(document, name).with_context(|| {
            format!(
                "Profile '{}' not found.\nHint: Use 'karactl list-profiles' to see available profiles.",
                name
            )
        }),
        None => selected_profile(document).context(NO_PROFILE_SELECTED),
    }
}

fn target_profile_mut<'a>(document: &'a mut Value, name: Option<&str>) -> Result<&'a mut Value> {
    match name {
        Some(name) => profile_by_name_mut(document, name).with_context(|| {
            format!(
                "Profile '{}' not found.\nHint: Use 'karactl list-profiles' to see available profiles.",
                name
            )
        }),
        None => selected_profile_mut(document).context(NO_PROFILE_SELECTED),
    }
}

fn rule_not_found(description: &str, profile: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Rule '{}' not found in profile '{}'.\nHint: Use 'karactl list-rules' to see rule descriptions.",
        description,
        profile
    )
}

/// Reject `--profile` for commands that always look at the whole document
pub fn reject_profile_option(profile: Option<&str>, command: &str) -> Result<()> {
    if let Some(name) = profile {
        bail!(
            "'{}' does not take --profile (got '{}').\nHint: It always reports on the whole config.",
            command,
            name
        );
    }
    Ok(())
}

/// Text for `current-profile`
pub fn current_profile_line(document: &Value) -> String {
    selected_profile(document)
        .map(|p| profile_name(p).to_string())
        .unwrap_or_else(|| NO_PROFILE_SELECTED.to_string())
}

/// Number rule descriptions from 1, as `"<n>. <description>"`
pub fn numbered_lines(descriptions: &[String]) -> Vec<String> {
    descriptions
        .iter()
        .enumerate()
        .map(|(i, d)| format!("{}. {}", i + 1, d))
        .collect()
}

/// Validate the name of a complex modification file
///
/// The name becomes `<name>.json` inside the assets directory, so it must be a
/// single path component.
pub fn validate_filename(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("File name cannot be empty");
    }

    if name == "." || name == ".." || name.contains(['/', '\\']) {
        bail!(
            "Invalid file name '{}'.\nHint: Use a plain name such as 'vim_arrows'; '.json' is added automatically.",
            name
        );
    }

    Ok(())
}

/// Print every profile name, one per line
pub fn list_profiles(repo: &ConfigRepository, ui: &Ui) -> Result<()> {
    let document = repo.load()?;
    for name in list_profile_names(&document) {
        ui.println(name);
    }
    Ok(())
}

/// Print the selected profile's name
pub fn current_profile(repo: &ConfigRepository, ui: &Ui) -> Result<()> {
    let document = repo.load()?;
    ui.println(current_profile_line(&document));
    Ok(())
}

/// Print the complex modification rules of the target profile
///
/// With no profile name and no selected profile this prints nothing.
pub fn list_rules(repo: &ConfigRepository, profile: Option<&str>, ui: &Ui) -> Result<()> {
    let document = repo.load()?;

    let target = match profile {
        Some(_) => Some(target_profile(&document, profile)?),
        None => selected_profile(&document),
    };

    let Some(target) = target else {
        debug!("no selected profile, nothing to list");
        return Ok(());
    };

    for line in numbered_lines(&rule_descriptions(target)) {
        ui.println(line);
    }
    Ok(())
}

/// Show the simple modifications of the target profile as a table
pub fn list_simple(repo: &ConfigRepository, profile: Option<&str>, ui: &Ui) -> Result<()> {
    let document = repo.load()?;
    let target = target_profile(&document, profile)?;
    let mods = simple_modifications(target);

    if mods.is_empty() {
        ui.warn(format!(
            "Profile '{}' has no simple modifications.",
            profile_name(target)
        ));
        ui.println(ui.dim("Add one with: karactl add-simple <from_key> <to_key>"));
        return Ok(());
    }

    let mut table = ui.table();
    table.set_header(vec![ui.header_cell("From"), ui.header_cell("To")]);
    for (from, to) in mods {
        table.add_row(vec![ui.cell(from), ui.cell(to)]);
    }

    ui.println(ui.bold(format!("Simple modifications: {}", profile_name(target))));
    ui.println(table.to_string());
    Ok(())
}

/// Copy the current config into the backups directory
pub fn backup(repo: &ConfigRepository, ui: &Ui) -> Result<()> {
    let path = repo.backup()?;
    ui.println(format!("Backup created: {}", path.display()));
    Ok(())
}

/// Map one key to another in the target profile and save
pub fn add_simple(
    repo: &ConfigRepository,
    opts: WriteOptions<'_>,
    from_key: &str,
    to_key: &str,
    ui: &Ui,
) -> Result<()> {
    let mut document = repo.load()?;
    let profile = target_profile_mut(&mut document, opts.profile)?;

    add_simple_modification(profile, from_key, to_key);
    repo.save(&document, opts.backup)?;

    info!(from_key, to_key, "added simple modification");
    ui.ok(format!("Added: {} {} {}", from_key, ui.arrow(), to_key));
    Ok(())
}

/// Append a basic rule to the target profile and save
pub fn add_rule(
    repo: &ConfigRepository,
    opts: WriteOptions<'_>,
    spec: &BasicRuleSpec,
    ui: &Ui,
) -> Result<()> {
    if spec.description.trim().is_empty() {
        bail!("Rule description cannot be empty");
    }

    let mut document = repo.load()?;
    let profile = target_profile_mut(&mut document, opts.profile)?;
    let name = profile_name(profile).to_string();

    add_complex_rule(profile, spec.build());
    repo.save(&document, opts.backup)?;

    info!(description = %spec.description, profile = %name, "added complex rule");
    ui.ok(format!("Added rule '{}' to profile '{}'", spec.description, name));
    Ok(())
}

/// Remove the first rule with a matching description from the target profile and save
pub fn remove_rule(
    repo: &ConfigRepository,
    opts: WriteOptions<'_>,
    description: &str,
    force: bool,
    ui: &Ui,
) -> Result<()> {
    let mut document = repo.load()?;
    let profile = target_profile_mut(&mut document, opts.profile)?;
    let name = profile_name(profile).to_string();

    if !has_complex_rule(profile, description) {
        return Err(rule_not_found(description, &name));
    }

    if !force {
        let confirm = inquire::Confirm::new(&format!(
            "Remove rule '{}' from profile '{}'?",
            description, name
        ))
        .with_default(false)
        .with_help_message("Only the first rule with this description is removed")
        .prompt()
        .context("Confirmation cancelled")?;

        if !confirm {
            ui.warn("Removal cancelled.");
            return Ok(());
        }
    }

    if !remove_complex_rule(profile, description) {
        return Err(rule_not_found(description, &name));
    }
    repo.save(&document, opts.backup)?;

    info!(description, profile = %name, "removed complex rule");
    ui.ok(format!("Removed rule '{}' from profile '{}'", description, name));
    Ok(())
}

/// Write the target profile's rules to a standalone complex modification file
pub fn export_rules(
    repo: &ConfigRepository,
    profile: Option<&str>,
    filename: &str,
    title: Option<&str>,
    ui: &Ui,
) -> Result<()> {
    validate_filename(filename)?;

    let document = repo.load()?;
    let target = target_profile(&document, profile)?;
    let name = profile_name(target);

    let rules = target
        .pointer("/complex_modifications/rules")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    if rules.is_empty() {
        ui.warn(format!("Profile '{}' has no complex modification rules.", name));
    }

    let default_title = format!("{} rules", name);
    let title = title.unwrap_or(default_title.as_str());
    let path = save_complex_mod_file(repo.paths(), filename, title, rules)?;

    ui.ok(format!("Wrote {} rule(s) to {}", rules.len(), path.display()));
    Ok(())
}
