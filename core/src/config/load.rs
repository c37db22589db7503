use anyhow::Context;
use std::path::{Path, PathBuf};

use super::types::TrackerConfig;
use crate::error::ConfigError;

/// Get the default uptrack data directory: ~/.uptrack
pub fn get_uptrack_data_dir() -> anyhow::Result<PathBuf> {
    let home = dirs::home_dir().context("Cannot determine home directory")?;
    Ok(home.join(".uptrack"))
}

pub fn load_default() -> anyhow::Result<TrackerConfig> {
    // Priority 1: ~/.uptrack/config.toml
    let user_config = get_uptrack_data_dir()
        .map(|dir| dir.join("config.toml"))
        .ok();

    // Priority 2: ./config.toml (current directory)
    let local_config = Path::new("config.toml");

    let mut cfg = match user_config.filter(|p| p.exists()) {
        Some(path) => load_from_path(&path)?,
        None if local_config.exists() => load_from_path(local_config)?,
        None => TrackerConfig::default(),
    };

    apply_env_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_path(path: &Path) -> anyhow::Result<TrackerConfig> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg = toml::from_str::<TrackerConfig>(&s)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Environment variable overrides (highest priority).
pub fn apply_env_overrides<F>(cfg: &mut TrackerConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("UPTRACK_INTERVAL_MS") {
        cfg.processing.interval_ms =
            v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "UPTRACK_INTERVAL_MS",
                value: v.clone(),
            })?;
    }
    if let Some(v) = get("UPTRACK_ALLOW_IMAGES") {
        cfg.validation.allow_images = matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        );
    }
    if let Some(v) = get("UPTRACK_SEED") {
        cfg.processing.seed = Some(v.trim().parse().map_err(|_| ConfigError::InvalidValue {
            field: "UPTRACK_SEED",
            value: v.clone(),
        })?);
    }

    Ok(())
}
