//! Loading and saving `karabiner.json`.
//!
//! The document is kept as a raw [`serde_json::Value`] so that every field
//! Karabiner writes survives a load/save cycle, including ones this tool
//! never looks at. Saving copies the on-disk file to the backups directory
//! first, then overwrites it in place. There is no locking: two concurrent
//! invocations race and the last writer wins.

use chrono::Local;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::paths::Paths;

/// Timestamp format used in backup file names
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Reads and writes the Karabiner configuration file
#[derive(Debug, Clone)]
pub struct ConfigRepository {
    paths: Paths,
}

impl ConfigRepository {
    pub fn new(paths: Paths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn config_path(&self) -> &Path {
        &self.paths.config_file
    }

    /// Load and parse the configuration document
    pub fn load(&self) -> Result<Value, ConfigError> {
        let path = &self.paths.config_file;
        if !path.exists() {
            return Err(ConfigError::NotFound { path: path.clone() });
        }

        let content = fs::read_to_string(path).map_err(ConfigError::io(path))?;
        let document = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "loaded config");
        Ok(document)
    }

    /// Write the document back, optionally backing up the current file first
    pub fn save(&self, document: &Value, backup: bool) -> Result<(), ConfigError> {
        if backup {
            self.backup()?;
        }

        let content = to_json_pretty(document)?;
        fs::write(&self.paths.config_file, content)
            .map_err(ConfigError::io(&self.paths.config_file))?;

        info!(path = %self.paths.config_file.display(), "saved config");
        Ok(())
    }

    /// Copy the on-disk config into the backups directory and return the copy's path
    pub fn backup(&self) -> Result<PathBuf, ConfigError> {
        if !self.paths.config_file.exists() {
            return Err(ConfigError::NotFound {
                path: self.paths.config_file.clone(),
            });
        }

        let backups_dir = &self.paths.backups_dir;
        fs::create_dir_all(backups_dir).map_err(ConfigError::io(backups_dir))?;

        let timestamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let backup_path = self.paths.backup_file(&timestamp);

        fs::copy(&self.paths.config_file, &backup_path)
            .map_err(ConfigError::io(&self.paths.config_file))?;

        info!(path = %backup_path.display(), "created backup");
        Ok(backup_path)
    }
}

/// Serialize a value as JSON indented with four spaces, the way Karabiner writes it
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String, ConfigError> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
