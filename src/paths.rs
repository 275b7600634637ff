use anyhow::{Context, Result};
use directories::BaseDirs;
use std::path::{Path, PathBuf};

/// Environment variable that replaces `$HOME` as the root for all paths
pub const HOME_OVERRIDE_ENV: &str = "KARACTL_HOME";

/// All computed paths used by karactl
#[derive(Debug, Clone)]
pub struct Paths {
    /// ~/.config/karabiner
    pub karabiner_dir: PathBuf,
    /// ~/.config/karabiner/karabiner.json
    pub config_file: PathBuf,
    /// ~/.config/karabiner/assets/complex_modifications
    pub complex_mods_dir: PathBuf,
    /// ~/.config/karabiner/backups
    pub backups_dir: PathBuf,
}

impl Paths {
    /// Resolve paths from `KARACTL_HOME` if set, otherwise the user's home directory
    pub fn new() -> Result<Self> {
        if let Some(home) = std::env::var_os(HOME_OVERRIDE_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::from_home(Path::new(&home)));
        }

        let base_dirs = BaseDirs::new().context("Failed to determine home directory")?;
        Ok(Self::from_home(base_dirs.home_dir()))
    }

    /// Build the Karabiner layout underneath an arbitrary home directory
    pub fn from_home(home: &Path) -> Self {
        let karabiner_dir = home.join(".config").join("karabiner");
        let config_file = karabiner_dir.join("karabiner.json");
        let complex_mods_dir = karabiner_dir.join("assets").join("complex_modifications");
        let backups_dir = karabiner_dir.join("backups");

        Self {
            karabiner_dir,
            config_file,
            complex_mods_dir,
            backups_dir,
        }
    }

    /// Get the path of a complex modification file in the assets directory
    pub fn complex_mod_file(&self, filename: &str) -> PathBuf {
        self.complex_mods_dir.join(format!("{}.json", filename))
    }

    /// Get the path of a backup taken at the given timestamp (`YYYYMMDD_HHMMSS`)
    pub fn backup_file(&self, timestamp: &str) -> PathBuf {
        self.backups_dir.join(format!("karabiner_{}.json", timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_layout_under_home() {
        let paths = Paths::from_home(Path::new("/home/me"));
        assert_eq!(
            paths.config_file,
            PathBuf::from("/home/me/.config/karabiner/karabiner.json")
        );
        assert_eq!(
            paths.complex_mods_dir,
            PathBuf::from("/home/me/.config/karabiner/assets/complex_modifications")
        );
        assert_eq!(
            paths.backups_dir,
            PathBuf::from("/home/me/.config/karabiner/backups")
        );
    }

    #[test]
    fn test_file_helpers() {
        let paths = Paths::from_home(Path::new("/home/me"));
        assert!(
            paths
                .complex_mod_file("vim_keys")
                .ends_with("assets/complex_modifications/vim_keys.json")
        );
        assert!(
            paths
                .backup_file("20240115_103045")
                .ends_with("backups/karabiner_20240115_103045.json")
        );
    }

    #[test]
    #[serial]
    fn test_home_override() {
        let temp_dir = TempDir::new().unwrap();
        unsafe { std::env::set_var(HOME_OVERRIDE_ENV, temp_dir.path()) };
        let paths = Paths::new();
        unsafe { std::env::remove_var(HOME_OVERRIDE_ENV) };

        let paths = paths.unwrap();
        assert!(paths.config_file.starts_with(temp_dir.path()));
    }
}
