//! Application configuration
//!
//! Built once at startup from, in increasing precedence:
//! - built-in defaults
//! - a TOML file (`--config`, `./assistant.toml`, or `<config dir>/agent-router/config.toml`)
//! - command-line overrides
//!
//! The Gemini credential comes from `GEMINI_API_KEY` (a `.env` file is honored).

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::types::{Capabilities, Variant};

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
pub const DEFAULT_TARGET_LANGUAGE: &str = "de";

/// Config file looked up in the working directory
const CONFIG_FILE: &str = "assistant.toml";

/// Directory name within the platform config dir
const CONFIG_SUBDIR: &str = "agent-router";

fn default_timeout_secs() -> u64 { 60 }
fn default_translate_endpoint() -> String { DEFAULT_TRANSLATE_ENDPOINT.to_string() }
fn default_target_language() -> String { DEFAULT_TARGET_LANGUAGE.to_string() }

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set.")]
    MissingApiKey(&'static str),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

// ============================================================================
// Config Structs
// ============================================================================

/// Language model credential; never printed
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// `[translation]` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_translate_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_target_language")]
    pub target_language: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_translate_endpoint(),
            target_language: default_target_language(),
        }
    }
}

/// Raw contents of the TOML file; every key optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub variant: Option<Variant>,
    pub model: Option<String>,
    pub gemini_base_url: Option<String>,
    pub transcript: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub dedupe_overlapping_matches: Option<bool>,
    pub capabilities: Option<Capabilities>,
    #[serde(default)]
    pub translation: TranslationConfig,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub variant: Option<Variant>,
    pub transcript: Option<PathBuf>,
    pub model: Option<String>,
    pub dedupe_overlapping_matches: bool,
}

/// Resolved configuration shared by the router and its collaborators
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: ApiKey,
    pub variant: Variant,
    pub capabilities: Capabilities,
    pub model: String,
    pub gemini_base_url: String,
    pub transcript_path: PathBuf,
    pub request_timeout: Duration,
    pub dedupe_overlapping_matches: bool,
    pub translation: TranslationConfig,
}

impl AppConfig {
    /// Load from the environment, the config file and CLI overrides
    pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let file = match locate_config_file(overrides.config_path.as_deref()) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading config file");
                read_config_file(&path)?
            }
            None => FileConfig::default(),
        };

        let api_key = dotenvy::var(API_KEY_VAR).ok();
        Self::from_sources(api_key, file, overrides)
    }

    /// Merge already-gathered sources
    pub fn from_sources(
        api_key: Option<String>,
        file: FileConfig,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(ApiKey::new)
            .ok_or(ConfigError::MissingApiKey(API_KEY_VAR))?;

        // A variant chosen on the command line brings its own preset
        let (variant, capabilities) = match overrides.variant {
            Some(v) => (v, v.capabilities()),
            None => {
                let v = file.variant.unwrap_or_default();
                (v, file.capabilities.unwrap_or_else(|| v.capabilities()))
            }
        };

        let transcript_path = overrides
            .transcript
            .clone()
            .or(file.transcript)
            .unwrap_or_else(|| PathBuf::from(variant.default_transcript()));

        Ok(Self {
            api_key,
            variant,
            capabilities,
            model: overrides
                .model
                .clone()
                .or(file.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            gemini_base_url: file
                .gemini_base_url
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            transcript_path,
            request_timeout: Duration::from_secs(
                file.request_timeout_secs.unwrap_or_else(default_timeout_secs),
            ),
            dedupe_overlapping_matches: overrides.dedupe_overlapping_matches
                || file.dedupe_overlapping_matches.unwrap_or(false),
            translation: file.translation,
        })
    }
}

// ============================================================================
// File Lookup
// ============================================================================

/// An explicit path is always returned; otherwise the first existing default
fn locate_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_SUBDIR).join("config.toml"))
        .filter(|path| path.exists())
}

fn read_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Tests
// ============================================================================
