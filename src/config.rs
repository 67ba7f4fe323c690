use crate::defaults;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub stt: SttConfig,
}

/// Audio segmentation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub vad_threshold: f32,
    pub silence_duration_ms: u32,
}

/// Remote speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            vad_threshold: defaults::VAD_THRESHOLD,
            silence_duration_ms: defaults::SILENCE_DURATION_MS,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: defaults::DEFAULT_MODEL.to_string(),
            base_url: defaults::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl SttConfig {
    /// Resolve the transcription API key.
    ///
    /// The configuration file wins; the `GROQ_API_KEY` environment variable is
    /// the fallback. Empty strings count as unset.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| {
                std::env::var(defaults::API_KEY_ENV)
                    .ok()
                    .filter(|key| !key.is_empty())
            })
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist
    ///
    /// Only returns defaults if the file is missing; invalid TOML is an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - CALLSCRIBE_MODEL → stt.model
    /// - CALLSCRIBE_BASE_URL → stt.base_url
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = std::env::var("CALLSCRIBE_MODEL")
            && !model.is_empty()
        {
            self.stt.model = model;
        }

        if let Ok(base_url) = std::env::var("CALLSCRIBE_BASE_URL")
            && !base_url.is_empty()
        {
            self.stt.base_url = base_url;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/callscribe/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("callscribe").join("config.toml"))
    }
}

/// Serializes tests (here and in `stt::remote`) that touch environment variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
