use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::config::ReminderConfig;

pub const WORKSPACE_CONFIG_FILE: &str = ".git-reminder.yml";

pub fn check_config(config: &ReminderConfig) -> Result<()> {
    if config.remote.trim().is_empty() {
        return Err(anyhow::anyhow!("`remote` cannot be empty"));
    }
    if config.sync_timeout_secs == 0 {
        return Err(anyhow::anyhow!("`sync_timeout_secs` must be greater than 0"));
    }
    if config.debounce_ms == 0 {
        return Err(anyhow::anyhow!("`debounce_ms` must be greater than 0"));
    }
    if config.push_prompt_threshold == 0 {
        return Err(anyhow::anyhow!(
            "`push_prompt_threshold` must be greater than 0"
        ));
    }
    Ok(())
}

pub fn load_config(path: &Path) -> Result<ReminderConfig> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Error reading config file {path:?}"))?;

    // an empty file is a valid "all defaults" config
    let mut config: ReminderConfig = if content.trim().is_empty() {
        ReminderConfig::default()
    } else {
        serde_yaml::from_str(&content).with_context(|| "Error parsing YAML configuration file")?
    };

    if let Some(log_file) = config.log_file.take() {
        config.log_file = Some(expand_home(&log_file));
    }

    check_config(&config)?;

    Ok(config)
}

/// Picks the config for `workspace`: an explicit path must exist, otherwise
/// the workspace file, then the user file, then defaults.
pub fn resolve_config(explicit: Option<&Path>, workspace: &Path) -> Result<ReminderConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "Config file `{}` does not exist",
                path.display()
            ));
        }
        return load_config(path);
    }

    let candidates = [Some(workspace.join(WORKSPACE_CONFIG_FILE)), user_config_path()];
    for path in candidates.into_iter().flatten() {
        if path.exists() {
            return load_config(&path);
        }
    }

    Ok(ReminderConfig::default())
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("git-reminder").join("config.yml"))
}

fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
