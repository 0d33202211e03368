//! Environment-driven settings.
//!
//! `.env` is loaded into the process environment by [`load_dotenv`], which
//! `main` calls before any runtime starts. The bundled `assets/config.env`
//! is never written to the environment: it only answers lookups for keys
//! the environment leaves unset.

use crate::error::ConfigurationError;
use crate::types::ModelOption;
use std::env;
use std::path::PathBuf;

/// Bundled defaults shipped with the binary
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

pub const DEFAULT_API_VERSION: &str = "2024-12-01-preview";

#[derive(Clone, Debug)]
pub struct Settings {
    pub api_key: String,
    pub endpoint: String,
    pub api_version: String,
    pub default_model: ModelOption,
    pub store_dir: PathBuf,
    pub session_seed: Option<String>,
}

impl Settings {
    /// Reads the settings from the process environment, falling back to the
    /// bundled defaults. Does not modify the environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(with_bundled_defaults(|key| env::var(key).ok()))
    }

    /// Builds settings from an arbitrary key lookup. Blank values count as
    /// unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| non_blank(lookup(key));

        let api_key = get("AZURE_API_KEY").ok_or(ConfigurationError::MissingApiKey)?;
        let endpoint = get("AZURE_ENDPOINT").ok_or(ConfigurationError::MissingEndpoint)?;
        let api_version =
            get("AZURE_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

        let default_model = match get("PAIRD_DEFAULT_MODEL") {
            Some(label) => ModelOption::from_label(&label).unwrap_or_else(|| {
                tracing::warn!(%label, "unknown PAIRD_DEFAULT_MODEL, using default");
                ModelOption::default()
            }),
            None => ModelOption::default(),
        };

        let store_dir = get("PAIRD_STORE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(env::temp_dir);

        Ok(Self {
            api_key,
            endpoint,
            api_version,
            default_model,
            store_dir,
            session_seed: get("PAIRD_SESSION_SEED"),
        })
    }
}

/// Loads `.env` into the process environment. Must run on the main thread
/// before the async runtime or the UI launches.
#[cfg(not(target_arch = "wasm32"))]
pub fn load_dotenv() {
    // A missing .env is normal outside development
    if let Err(err) = dotenvy::dotenv() {
        tracing::debug!(error = %err, "no .env loaded");
    }
}

#[cfg(target_arch = "wasm32")]
pub fn load_dotenv() {}

/// Wraps `primary` so keys it leaves unset or blank are answered from the
/// bundled config.
pub fn with_bundled_defaults<F>(primary: F) -> impl Fn(&str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    move |key: &str| {
        non_blank(primary(key)).or_else(|| {
            parse_env_lines(BUNDLED_CONFIG)
                .into_iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses `KEY=VALUE` lines, skipping blanks and `#` comments.
fn parse_env_lines(source: &str) -> Vec<(&str, &str)> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}
