use anyhow::{Context, Result, anyhow};
use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::api::DEFAULT_API_BASE;

pub const DEFAULT_ENV_PATH: &str = ".env";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";
pub const CHANNEL_ID_VAR: &str = "YOUTUBE_CHANNEL_ID";
pub const API_BASE_VAR: &str = "YOUTUBE_API_BASE";
pub const TIMEOUT_VAR: &str = "VIDSIGHTS_TIMEOUT_SECS";

/// Resolved settings for one pipeline run.
#[derive(Clone)]
pub struct Settings {
    pub api_key: String,
    pub channel_id: Option<String>,
    pub api_base: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Values given on the command line. They beat both the process
/// environment and the env file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub api_key: Option<String>,
    pub channel_id: Option<String>,
    pub api_base: Option<String>,
    pub timeout_secs: Option<u64>,
    pub env_path: Option<PathBuf>,
}

pub fn resolve_settings(overrides: SettingsOverrides) -> Result<Settings> {
    let env_path = overrides
        .env_path
        .as_deref()
        .unwrap_or_else(|| Path::new(DEFAULT_ENV_PATH));
    let file_vars = read_env_file(env_path)?;
    build_settings(&file_vars, env_var_string, overrides)
}

fn build_settings(
    file_vars: &HashMap<String, String>,
    env_lookup: impl Fn(&str) -> Option<String>,
    overrides: SettingsOverrides,
) -> Result<Settings> {
    let api_key = non_blank(overrides.api_key)
        .or_else(|| lookup_value(API_KEY_VAR, file_vars, &env_lookup))
        .ok_or_else(|| anyhow!("{API_KEY_VAR} not set"))?;
    let channel_id = non_blank(overrides.channel_id)
        .or_else(|| lookup_value(CHANNEL_ID_VAR, file_vars, &env_lookup));
    let api_base = non_blank(overrides.api_base)
        .or_else(|| lookup_value(API_BASE_VAR, file_vars, &env_lookup))
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
    let timeout_secs = overrides
        .timeout_secs
        .or_else(|| {
            lookup_value(TIMEOUT_VAR, file_vars, &env_lookup)
                .and_then(|value| value.parse::<u64>().ok())
        })
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    Ok(Settings {
        api_key,
        channel_id,
        api_base,
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn env_var_string(key: &str) -> Option<String> {
    non_blank(env::var(key).ok())
}

fn lookup_value(
    key: &str,
    file_vars: &HashMap<String, String>,
    env_lookup: &impl Fn(&str) -> Option<String>,
) -> Option<String> {
    env_lookup(key).or_else(|| non_blank(file_vars.get(key).cloned()))
}

/// Parses a `.env`-style file. A missing file is treated as empty.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    Ok(parse_env(&content))
}

fn parse_env(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_string(), unquote(value.trim()).to_string()))
        })
        .collect()
}

fn unquote(value: &str) -> &str {
    ['"', '\'']
        .iter()
        .find_map(|quote| {
            value
                .strip_prefix(*quote)
                .and_then(|inner| inner.strip_suffix(*quote))
        })
        .unwrap_or(value)
}
