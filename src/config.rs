// config.rs - Bot configuration
// Reads KEY=VALUE pairs from botconfig.txt (searched in a few locations),
// overlays the process environment, and deserializes the result into `Config`.
//
// Used by: main.rs (startup), commands (prefix, bot name, display options)

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

const CONFIG_PATHS: [&str; 4] = [
    "botconfig.txt",
    "../botconfig.txt",
    "../../botconfig.txt",
    "src/botconfig.txt",
];

const DEFAULT_MODEL_DIR: &str = "model";

const PLACEHOLDER_TOKEN: &str = "YOUR_BOT_TOKEN_HERE";

/// Every key this bot understands; anything else in the environment is ignored.
const KNOWN_KEYS: [&str; 10] = [
    "DISCORD_TOKEN",
    "DISCORD_BOT_TOKEN",
    "PREFIX",
    "BOT_NAME",
    "MODEL_BASE_DIRECTORY",
    "MODEL_FILE",
    "LABELS_FILE",
    "CONFIDENCE_AS_PERCENT",
    "MAX_DOWNLOAD_BYTES",
    "INFERENCE_THREADS",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("DISCORD_TOKEN not found in botconfig.txt or the environment")]
    MissingToken,
    #[error("DISCORD_TOKEN is set to a placeholder value")]
    PlaceholderToken,
    #[error("invalid configuration: {0}")]
    Invalid(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "DISCORD_TOKEN", default)]
    pub discord_token: String,
    #[serde(rename = "PREFIX", default = "default_prefix")]
    pub prefix: String,
    #[serde(rename = "BOT_NAME", default = "default_bot_name")]
    pub bot_name: String,
    /// Directory holding the model and labels; `None` means the relative fallback is used.
    #[serde(rename = "MODEL_BASE_DIRECTORY", default)]
    pub model_base_dir: Option<PathBuf>,
    #[serde(rename = "MODEL_FILE", default = "default_model_file")]
    pub model_file: String,
    #[serde(rename = "LABELS_FILE", default = "default_labels_file")]
    pub labels_file: String,
    /// Multiply confidences by 100 before printing them with a `%` sign.
    #[serde(rename = "CONFIDENCE_AS_PERCENT", default, deserialize_with = "flag")]
    pub confidence_as_percent: bool,
    #[serde(rename = "MAX_DOWNLOAD_BYTES", default = "default_max_download", deserialize_with = "number")]
    pub max_download_bytes: usize,
    /// ONNX Runtime intra-op threads; 0 lets the runtime decide.
    #[serde(rename = "INFERENCE_THREADS", default, deserialize_with = "number")]
    pub inference_threads: usize,
}

fn default_prefix() -> String {
    "$".to_string()
}

fn default_bot_name() -> String {
    "Heteras".to_string()
}

fn default_model_file() -> String {
    "keras_model.onnx".to_string()
}

fn default_labels_file() -> String {
    "labels.txt".to_string()
}

fn default_max_download() -> usize {
    10 * 1024 * 1024
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!("expected a boolean, got '{}'", other))),
    }
}

fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.trim().parse().map_err(serde::de::Error::custom)
}

impl Config {
    /// Loads botconfig.txt (if any) and the environment, environment taking precedence.
    pub fn load() -> Result<Self, ConfigError> {
        let values = match read_config_file() {
            Some((path, values)) => {
                println!("✅ Configuration loaded from {}", path);
                values
            }
            None => {
                log::warn!("[CONFIG] No botconfig.txt found (., .., ../.., src/); using environment only");
                HashMap::new()
            }
        };

        let environment = KNOWN_KEYS
            .iter()
            .filter_map(|key| env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect();

        Self::from_map(overlay(values, environment))
    }

    /// Builds a config from raw key/value pairs.
    pub fn from_map(values: HashMap<String, String>) -> Result<Self, ConfigError> {
        let values = resolve_token_alias(values);
        let config: Config = serde_json::from_value(serde_json::to_value(values)?)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let token = self.discord_token.trim();
        if token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if token == PLACEHOLDER_TOKEN {
            return Err(ConfigError::PlaceholderToken);
        }
        Ok(())
    }

    pub fn model_dir(&self) -> PathBuf {
        self.model_base_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR))
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_dir().join(&self.model_file)
    }

    pub fn labels_path(&self) -> PathBuf {
        self.model_dir().join(&self.labels_file)
    }
}

/// Folds `DISCORD_BOT_TOKEN` into `DISCORD_TOKEN` unless the latter is already set.
fn resolve_token_alias(mut values: HashMap<String, String>) -> HashMap<String, String> {
    if let Some(token) = values.remove("DISCORD_BOT_TOKEN") {
        values.entry("DISCORD_TOKEN".to_string()).or_insert(token);
    }
    values
}

/// Layers environment values over file values. Aliases are resolved per layer,
/// so a token from the environment wins under either name.
fn overlay(file: HashMap<String, String>, environment: HashMap<String, String>) -> HashMap<String, String> {
    let mut values = resolve_token_alias(file);
    values.extend(resolve_token_alias(environment));
    values
}

fn read_config_file() -> Option<(&'static str, HashMap<String, String>)> {
    CONFIG_PATHS.iter().find_map(|path| {
        fs::read_to_string(path)
            .ok()
            .map(|content| (*path, parse_key_values(&content)))
    })
}

/// Parses `KEY=VALUE` lines, skipping blanks and `#` comments.
fn parse_key_values(content: &str) -> HashMap<String, String> {
    // Remove BOM if present
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_map(map(&[("DISCORD_TOKEN", "abc")])).unwrap();
        assert_eq!(config.prefix, "$");
        assert_eq!(config.bot_name, "Heteras");
        assert!(config.model_base_dir.is_none());
        assert_eq!(config.model_path(), PathBuf::from("model").join("keras_model.onnx"));
        assert_eq!(config.labels_path(), PathBuf::from("model").join("labels.txt"));
        assert!(!config.confidence_as_percent);
        assert_eq!(config.max_download_bytes, 10 * 1024 * 1024);
        assert_eq!(config.inference_threads, 0);
    }

    #[test]
    fn test_overrides_and_alias() {
        let config = Config::from_map(map(&[
            ("DISCORD_BOT_TOKEN", "tok"),
            ("PREFIX", "!"),
            ("MODEL_BASE_DIRECTORY", "/srv/models"),
            ("CONFIDENCE_AS_PERCENT", "yes"),
            ("MAX_DOWNLOAD_BYTES", "2048"),
            ("UNRELATED", "ignored"),
        ]))
        .unwrap();
        assert_eq!(config.discord_token, "tok");
        assert_eq!(config.prefix, "!");
        assert_eq!(config.model_path(), PathBuf::from("/srv/models/keras_model.onnx"));
        assert!(config.confidence_as_percent);
        assert_eq!(config.max_download_bytes, 2048);
    }

    #[test]
    fn test_primary_token_wins_over_alias() {
        let config = Config::from_map(map(&[("DISCORD_TOKEN", "a"), ("DISCORD_BOT_TOKEN", "b")])).unwrap();
        assert_eq!(config.discord_token, "a");
    }

    #[test]
    fn test_environment_alias_overrides_file_token() {
        let values = overlay(
            map(&[("DISCORD_TOKEN", "from-file"), ("PREFIX", "!")]),
            map(&[("DISCORD_BOT_TOKEN", "from-env")]),
        );
        let config = Config::from_map(values).unwrap();
        assert_eq!(config.discord_token, "from-env");
        assert_eq!(config.prefix, "!");
    }

    #[test]
    fn test_file_alias_yields_to_environment_token() {
        let values = overlay(
            map(&[("DISCORD_BOT_TOKEN", "from-file")]),
            map(&[("DISCORD_TOKEN", "from-env")]),
        );
        assert_eq!(Config::from_map(values).unwrap().discord_token, "from-env");
    }

    #[test]
    fn test_missing_or_placeholder_token_is_fatal() {
        assert!(matches!(Config::from_map(HashMap::new()), Err(ConfigError::MissingToken)));
        assert!(matches!(
            Config::from_map(map(&[("DISCORD_TOKEN", "YOUR_BOT_TOKEN_HERE")])),
            Err(ConfigError::PlaceholderToken)
        ));
    }

    #[test]
    fn test_bad_flag_is_rejected() {
        let result = Config::from_map(map(&[("DISCORD_TOKEN", "a"), ("CONFIDENCE_AS_PERCENT", "maybe")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_key_values() {
        let parsed = parse_key_values("\u{feff}# comment\nDISCORD_TOKEN = abc=def \n\nPREFIX=$\nnonsense\n");
        assert_eq!(parsed.get("DISCORD_TOKEN").map(String::as_str), Some("abc=def"));
        assert_eq!(parsed.get("PREFIX").map(String::as_str), Some("$"));
        assert_eq!(parsed.len(), 2);
    }
}
