//! Simple configuration persistence for Lumivox
//!
//! Stores the audio directory, sample rates, and timing knobs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sample rate of the stored voice notes when unconfigured
pub const DEFAULT_SOURCE_RATE: u32 = 8000;

/// Output sample rate when unconfigured
pub const DEFAULT_OUTPUT_RATE: u32 = 44100;

/// Source rates the recordings may use
const SUPPORTED_SOURCE_RATES: [u32; 2] = [8000, 16000];

/// Errors from reading a config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding the voice notes
    pub audio_dir: Option<PathBuf>,
    /// Sample rate of the stored recordings
    pub source_rate: u32,
    /// Requested output stream rate
    pub output_rate: u32,
    /// Control loop period
    pub poll_interval_ms: u64,
    /// Button debounce window
    pub settle_ms: u64,
    /// Fixed seed for reproducible draws
    pub seed: Option<u64>,
    /// Front panel theme name
    pub theme: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audio_dir: None,
            source_rate: DEFAULT_SOURCE_RATE,
            output_rate: DEFAULT_OUTPUT_RATE,
            poll_interval_ms: 10,
            settle_ms: 50,
            seed: None,
            theme: None,
        }
    }
}

impl Config {
    /// Load config from the default location
    ///
    /// Returns default config if file doesn't exist. Invalid values are
    /// logged and left at their defaults.
    pub fn load() -> Self {
        let path = Self::config_path();
        match fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    /// Load config from a specific path, rejecting invalid values
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse_strict(&content)
    }

    /// Save config to the default location
    pub fn save(&self) -> io::Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = self.serialize();
        fs::write(path, content)
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lumivox")
            .join("config.txt")
    }

    /// Parse leniently: bad values are logged and skipped
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();
        for (key, value) in entries(content) {
            if let Err(e) = config.apply(key, value) {
                tracing::warn!("Ignoring config entry: {}", e);
            }
        }
        config
    }

    /// Parse, failing on the first invalid value
    pub fn parse_strict(content: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for (key, value) in entries(content) {
            config.apply(key, value)?;
        }
        Ok(config)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "audio_dir" => {
                if !value.is_empty() {
                    self.audio_dir = Some(PathBuf::from(value));
                }
            }
            "source_rate" => {
                let rate: u32 = value.parse().map_err(|_| invalid())?;
                if !SUPPORTED_SOURCE_RATES.contains(&rate) {
                    return Err(invalid());
                }
                self.source_rate = rate;
            }
            "output_rate" => {
                let rate: u32 = value.parse().map_err(|_| invalid())?;
                if rate == 0 {
                    return Err(invalid());
                }
                self.output_rate = rate;
            }
            "poll_interval_ms" => {
                let ms: u64 = value.parse().map_err(|_| invalid())?;
                if ms == 0 {
                    return Err(invalid());
                }
                self.poll_interval_ms = ms;
            }
            "settle_ms" => self.settle_ms = value.parse().map_err(|_| invalid())?,
            "seed" => {
                if !value.is_empty() {
                    self.seed = Some(value.parse().map_err(|_| invalid())?);
                }
            }
            "theme" => {
                if !value.is_empty() {
                    self.theme = Some(value.to_string());
                }
            }
            _ => {} // Ignore unknown keys
        }
        Ok(())
    }

    /// Serialize config to simple key=value format
    fn serialize(&self) -> String {
        let mut lines = Vec::new();
        lines.push("# Lumivox Configuration".to_string());

        if let Some(ref dir) = self.audio_dir {
            lines.push(format!("audio_dir={}", dir.display()));
        }
        lines.push(format!("source_rate={}", self.source_rate));
        lines.push(format!("output_rate={}", self.output_rate));
        lines.push(format!("poll_interval_ms={}", self.poll_interval_ms));
        lines.push(format!("settle_ms={}", self.settle_ms));
        if let Some(seed) = self.seed {
            lines.push(format!("seed={}", seed));
        }
        if let Some(ref theme) = self.theme {
            lines.push(format!("theme={}", theme));
        }

        lines.join("\n")
    }
}

/// Non-comment `key=value` pairs, trimmed
fn entries(content: &str) -> impl Iterator<Item = (&str, &str)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let config = Config::parse("");
        assert_eq!(config, Config::default());
        assert_eq!(config.source_rate, 8000);
        assert_eq!(config.output_rate, 44100);
    }

    #[test]
    fn test_parse_with_comments() {
        let content = "# Comment\naudio_dir=/sd\nsource_rate=16000\n# Another comment";
        let config = Config::parse(content);
        assert_eq!(config.audio_dir, Some(PathBuf::from("/sd")));
        assert_eq!(config.source_rate, 16000);
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let config = Config::parse_strict("volume=11\nsettle_ms=30").unwrap();
        assert_eq!(config.settle_ms, 30);
    }

    #[test]
    fn test_parse_strict_rejects_unsupported_rate() {
        let err = Config::parse_strict("source_rate=22050").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "source_rate"));
    }

    #[test]
    fn test_parse_lenient_keeps_default_on_bad_value() {
        let config = Config::parse("poll_interval_ms=fast\nseed=99");
        assert_eq!(config.poll_interval_ms, 10);
        assert_eq!(config.seed, Some(99));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = Config {
            audio_dir: Some(PathBuf::from("/test/path")),
            source_rate: 16000,
            output_rate: 48000,
            poll_interval_ms: 5,
            settle_ms: 40,
            seed: Some(1234),
            theme: Some("amber".into()),
        };

        let parsed = Config::parse_strict(&config.serialize()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_save_and_load_from_file() {
        let path = std::env::temp_dir()
            .join(format!("lumivox-config-{}", std::process::id()))
            .join("config.txt");
        let config = Config {
            seed: Some(7),
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir_all(parent);
        }
    }
}
