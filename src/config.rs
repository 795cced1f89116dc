use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::models::HarmBlockThreshold;

/// Main configuration structure for writing-coach
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Never written back out.
    #[serde(skip_serializing)]
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    /// Applied to the harassment and hate-speech categories.
    pub safety_threshold: HarmBlockThreshold,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            safety_threshold: HarmBlockThreshold::BlockMediumAndAbove,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub ttl_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { ttl_ms: 5000 }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides.
    /// Never fails: unreadable or invalid files fall back to defaults.
    pub fn load() -> Self {
        for path in ["../.env", ".env"] {
            if dotenvy::from_path(path).is_ok() {
                tracing::info!("Loaded .env from: {}", path);
                break;
            }
        }

        let config_path =
            env::var("WRITING_COACH_CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
        let mut config = Self::from_file(Path::new(&config_path));

        config.apply_env_overrides(|key| env::var(key).ok());

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    fn from_file(path: &Path) -> Self {
        if !path.exists() {
            tracing::warn!("Config file not found at {} - using defaults", path.display());
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_yaml(&contents).unwrap_or_else(|e| {
                tracing::error!(
                    "Failed to parse config file {}: {} - using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }),
            Err(e) => {
                tracing::error!(
                    "Failed to read config file {}: {} - using defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        let config = serde_yaml::from_str::<Config>(contents)?;
        tracing::info!("Loaded configuration from YAML");
        Ok(config)
    }

    /// Apply environment variable overrides, reading through `lookup`.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // The browser build of this app used the VITE_ prefix
        if let Some(api_key) = lookup("GEMINI_API_KEY").or_else(|| lookup("VITE_GEMINI_API_KEY")) {
            self.gemini.api_key = api_key;
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(base) = lookup("GEMINI_API_BASE") {
            self.gemini.api_base = base;
        }
        if let Some(threshold) = lookup("GEMINI_SAFETY_THRESHOLD") {
            match serde_yaml::from_str::<HarmBlockThreshold>(&threshold) {
                Ok(t) => self.gemini.safety_threshold = t,
                Err(e) => tracing::warn!("Ignoring GEMINI_SAFETY_THRESHOLD={}: {}", threshold, e),
            }
        }
        if let Some(ttl) = lookup("WRITING_COACH_TOAST_TTL_MS") {
            if let Ok(ms) = ttl.parse() {
                self.notifications.ttl_ms = ms;
            }
        }
    }

    fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.gemini.api_key.is_empty() {
            return Err("GEMINI_API_KEY environment variable must be set".into());
        }
        if self.gemini.model.is_empty() {
            return Err("gemini.model cannot be empty".into());
        }
        if self.notifications.ttl_ms == 0 {
            return Err("notifications.ttl_ms cannot be 0".into());
        }
        Ok(())
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notifications.ttl_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.gemini.model, "gemini-1.5-flash");
        assert_eq!(cfg.gemini.safety_threshold, HarmBlockThreshold::BlockMediumAndAbove);
        assert_eq!(cfg.notification_ttl(), Duration::from_secs(5));
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let cfg = Config::from_yaml(
            "gemini:\n  model: gemini-1.5-pro\n  api_base: http://localhost:8080\n  safety_threshold: BLOCK_ONLY_HIGH\n",
        )
        .unwrap();
        assert_eq!(cfg.gemini.model, "gemini-1.5-pro");
        assert_eq!(cfg.gemini.safety_threshold, HarmBlockThreshold::BlockOnlyHigh);
        assert_eq!(cfg.notifications.ttl_ms, 5000);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("VITE_GEMINI_API_KEY", "vite-key"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("GEMINI_SAFETY_THRESHOLD", "BLOCK_LOW_AND_ABOVE"),
            ("WRITING_COACH_TOAST_TTL_MS", "2500"),
        ]);
        let mut cfg = Config::default();
        cfg.apply_env_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.gemini.api_key, "vite-key");
        assert_eq!(cfg.gemini.model, "gemini-2.0-flash");
        assert_eq!(cfg.gemini.safety_threshold, HarmBlockThreshold::BlockLowAndAbove);
        assert_eq!(cfg.notification_ttl(), Duration::from_millis(2500));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_primary_key_wins_and_bad_values_are_ignored() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GEMINI_API_KEY", "primary"),
            ("VITE_GEMINI_API_KEY", "fallback"),
            ("GEMINI_SAFETY_THRESHOLD", "BLOCK_EVERYTHING"),
            ("WRITING_COACH_TOAST_TTL_MS", "soon"),
        ]);
        let mut cfg = Config::default();
        cfg.apply_env_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.gemini.api_key, "primary");
        assert_eq!(cfg.gemini.safety_threshold, HarmBlockThreshold::BlockMediumAndAbove);
        assert_eq!(cfg.notifications.ttl_ms, 5000);
    }
}
