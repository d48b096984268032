use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

const APP_DIR_NAME: &str = "tcord";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_CONFIG: &str = include_str!("../../assets/default-config.toml");

// NOTE: stole this from `gitui`
pub fn get_app_config_path() -> Result<PathBuf> {
    let mut path = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join(".config"))
    } else {
        dirs::config_dir()
    }
    .ok_or_else(|| anyhow!("failed to find os config dir."))?;

    path.push(APP_DIR_NAME);
    fs::create_dir_all(&path)?;
    Ok(path)
}

pub fn get_app_data_path() -> Result<PathBuf> {
    let mut path = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join(".local").join("share"))
    } else {
        dirs::data_local_dir()
    }
    .ok_or_else(|| anyhow!("failed to find os local data dir."))?;

    path.push(APP_DIR_NAME);
    fs::create_dir_all(&path)?;
    Ok(path)
}

/// Where the config file lives. Nothing else is kept between runs.
#[derive(Debug, Clone)]
pub struct FileStorage {
    config_file: PathBuf,
}

impl FileStorage {
    /// Uses `config_file` if given, otherwise `config.toml` in the app's
    /// config dir.
    pub fn init(config_file: Option<PathBuf>) -> Result<Self> {
        let config_file = match config_file {
            Some(path) => path,
            None => get_app_config_path()?.join(CONFIG_FILE_NAME),
        };
        Ok(Self { config_file })
    }

    #[must_use]
    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Reads the config file, writing the default one first if there's
    /// nothing there yet.
    pub fn read_config(&self) -> Result<Config> {
        if !self.config_file.exists() {
            tracing::info!("writing default config to {}", self.config_file.display());
            fs::write(&self.config_file, DEFAULT_CONFIG)
                .with_context(|| format!("Writing {}", self.config_file.display()))?;
        }

        let file = fs::read_to_string(&self.config_file)
            .with_context(|| format!("Reading {}", self.config_file.display()))?;
        Config::read_from_string(&file)
    }
}

#[expect(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tcord-test-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_config_is_created_from_default() {
        let dir = scratch_dir("missing");
        let path = dir.join(CONFIG_FILE_NAME);
        let _ = fs::remove_file(&path);

        let storage = FileStorage::init(Some(path.clone())).unwrap();
        let config = storage.read_config().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
        assert_eq!(config.client.history_limit, 50);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn existing_config_is_read() {
        let dir = scratch_dir("existing");
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, "[client]\nhistory_limit = 10\n").unwrap();

        let config = FileStorage::init(Some(path)).unwrap().read_config().unwrap();

        assert_eq!(config.client.history_limit, 10);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn broken_config_is_an_error() {
        let dir = scratch_dir("broken");
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, "[keys]\nquit = \"not-a-key\"\n").unwrap();

        assert!(FileStorage::init(Some(path)).unwrap().read_config().is_err());
        fs::remove_dir_all(dir).unwrap();
    }
}
