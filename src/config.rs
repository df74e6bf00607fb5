#![forbid(unsafe_code)]

use crate::language::DEFAULT_SECONDARY_LANG;
use crate::subtitles::DEFAULT_SUB_FORMAT;
use crate::ytdlp::DEFAULT_YT_DLP_BIN;
use anyhow::{Context, Result, bail};
use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_ENV_PATH: &str = ".env";
pub const DEFAULT_OUT_DIR: &str = "./subs";

pub const OUT_DIR_KEY: &str = "YT_SUBS_OUT";
pub const SUB_FORMAT_KEY: &str = "YT_SUBS_FORMAT";
pub const SECONDARY_LANG_KEY: &str = "YT_SUBS_SECONDARY_LANG";
pub const YT_DLP_BIN_KEY: &str = "YT_DLP_BIN";
pub const COOKIES_KEY: &str = "YT_SUBS_COOKIES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsSettings {
    pub out_dir: PathBuf,
    pub sub_format: String,
    pub secondary_lang: String,
    pub yt_dlp_bin: PathBuf,
    pub cookies: Option<PathBuf>,
}

/// Values given on the command line. They beat the process environment,
/// which beats the env file.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub out_dir: Option<PathBuf>,
    pub sub_format: Option<String>,
    pub secondary_lang: Option<String>,
    pub yt_dlp_bin: Option<PathBuf>,
    pub cookies: Option<PathBuf>,
    pub env_path: Option<PathBuf>,
}

pub fn resolve_settings(overrides: SettingsOverrides) -> Result<SubsSettings> {
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
) -> Result<SubsSettings> {
    let lookup = |key: &str| lookup_value(key, file_vars, &env_lookup);

    let out_dir = overrides
        .out_dir
        .or_else(|| lookup(OUT_DIR_KEY).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));
    let sub_format = non_blank(overrides.sub_format)
        .or_else(|| lookup(SUB_FORMAT_KEY))
        .unwrap_or_else(|| DEFAULT_SUB_FORMAT.to_string());
    let secondary_lang = non_blank(overrides.secondary_lang)
        .or_else(|| lookup(SECONDARY_LANG_KEY))
        .unwrap_or_else(|| DEFAULT_SECONDARY_LANG.to_string());
    let yt_dlp_bin = overrides
        .yt_dlp_bin
        .or_else(|| lookup(YT_DLP_BIN_KEY).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_YT_DLP_BIN));
    let cookies = overrides
        .cookies
        .or_else(|| lookup(COOKIES_KEY).map(PathBuf::from));

    if secondary_lang.contains(&[',', ' '][..]) {
        bail!("secondary language must be a single language code, got {secondary_lang:?}");
    }

    Ok(SubsSettings {
        out_dir,
        sub_format,
        secondary_lang,
        yt_dlp_bin,
        cookies,
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
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

/// Parses a dotenv-style file. A missing file yields no values.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    if !path.exists() {
        return Ok(vars);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading env file {}", path.display()))?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let line = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        let Some((key, value_raw)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        let value = value_raw.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|value| value.strip_suffix('"'))
            .or_else(|| {
                value
                    .strip_prefix('\'')
                    .and_then(|value| value.strip_suffix('\''))
            })
            .unwrap_or(value);
        vars.insert(key.to_string(), value.to_string());
    }
    Ok(vars)
}
