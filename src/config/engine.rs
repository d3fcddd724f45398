// src/config/engine.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::analyze::weights::Weights;
use crate::error::ConfigError;

pub const ENV_ENGINE_CONFIG_PATH: &str = "MEDIA_SCAN_CONFIG_PATH";
pub const DEFAULT_ENGINE_CONFIG_TOML: &str = "config/engine.toml";
pub const DEFAULT_ENGINE_CONFIG_JSON: &str = "config/engine.json";

/// Engine tuning. Every field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Trailing span (days) used for ranking and spike baselines.
    pub window_days: u32,
    /// Optional trailing span for trends/themes; `None` = whole snapshot.
    pub analytics_window_days: Option<u32>,
    pub spike_sigma_multiplier: f64,
    pub inactivity_threshold_days: u32,
    pub weights: Weights,
    /// Denominator of the diversity component.
    pub theme_catalog_size: usize,
    /// When non-empty, labels outside this list are rejected at ingestion.
    pub theme_taxonomy: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_days: 23,
            analytics_window_days: None,
            spike_sigma_multiplier: 3.0,
            inactivity_threshold_days: 7,
            weights: Weights::default(),
            theme_catalog_size: 7,
            theme_taxonomy: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_days == 0 {
            return Err(ConfigError::NonPositiveWindow);
        }
        if self.analytics_window_days == Some(0) {
            return Err(ConfigError::NonPositiveAnalyticsWindow);
        }
        if !self.spike_sigma_multiplier.is_finite() || self.spike_sigma_multiplier < 0.0 {
            return Err(ConfigError::InvalidSigmaMultiplier(
                self.spike_sigma_multiplier,
            ));
        }
        self.weights.validate()?;
        if self.theme_catalog_size == 0 {
            return Err(ConfigError::EmptyThemeCatalog);
        }
        let listed = distinct_count(&self.theme_taxonomy);
        if listed > self.theme_catalog_size {
            return Err(ConfigError::TaxonomyExceedsCatalog {
                listed,
                size: self.theme_catalog_size,
            });
        }
        Ok(())
    }

    pub fn is_known_theme(&self, theme: &str) -> bool {
        self.theme_taxonomy.is_empty() || self.theme_taxonomy.iter().any(|t| t == theme)
    }
}

fn distinct_count(items: &[String]) -> usize {
    items
        .iter()
        .map(String::as_str)
        .collect::<std::collections::BTreeSet<_>>()
        .len()
}

/// Load and validate a config from an explicit path. Supports TOML or JSON.
pub fn load_engine_config_from(path: &Path) -> Result<EngineConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading engine config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let cfg = parse_engine_config(&content, ext.as_str())
        .with_context(|| format!("parsing engine config {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validating engine config {}", path.display()))?;
    Ok(cfg)
}

/// Load using env var + fallbacks:
/// 1) $MEDIA_SCAN_CONFIG_PATH (must exist)
/// 2) config/engine.toml
/// 3) config/engine.json
/// 4) built-in defaults
pub fn load_engine_config_default() -> Result<EngineConfig> {
    if let Ok(p) = std::env::var(ENV_ENGINE_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_engine_config_from(&pb);
        } else {
            return Err(anyhow!(
                "{ENV_ENGINE_CONFIG_PATH} points to non-existent path {}",
                pb.display()
            ));
        }
    }
    let toml_p = PathBuf::from(DEFAULT_ENGINE_CONFIG_TOML);
    if toml_p.exists() {
        return load_engine_config_from(&toml_p);
    }
    let json_p = PathBuf::from(DEFAULT_ENGINE_CONFIG_JSON);
    if json_p.exists() {
        return load_engine_config_from(&json_p);
    }
    Ok(EngineConfig::default())
}

fn parse_engine_config(s: &str, hint_ext: &str) -> Result<EngineConfig> {
    match hint_ext {
        "json" => Ok(serde_json::from_str(s)?),
        "toml" => Ok(toml::from_str(s)?),
        _ => {
            if let Ok(cfg) = toml::from_str(s) {
                return Ok(cfg);
            }
            serde_json::from_str(s).map_err(|e| anyhow!("unsupported engine config format: {e}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn defaults_validate() {
        let cfg = EngineConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.window_days, 23);
        assert_eq!(cfg.inactivity_threshold_days, 7);
        assert_eq!(cfg.spike_sigma_multiplier, 3.0);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = parse_engine_config(
            r#"
            window_days = 14
            analytics_window_days = 60

            [weights]
            audience = 0.25
            engagement = 0.25
            regularity = 0.25
            diversity = 0.25
            "#,
            "toml",
        )
        .unwrap();
        assert_eq!(cfg.window_days, 14);
        assert_eq!(cfg.analytics_window_days, Some(60));
        assert_eq!(cfg.theme_catalog_size, 7);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn json_without_extension_hint_is_accepted() {
        let cfg = parse_engine_config(r#"{"spike_sigma_multiplier": 2.5}"#, "").unwrap();
        assert_eq!(cfg.spike_sigma_multiplier, 2.5);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_engine_config("windowdays = 3", "toml").is_err());
    }

    #[test]
    fn validation_failures() {
        let mut cfg = EngineConfig {
            window_days: 0,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NonPositiveWindow));

        cfg.window_days = 23;
        cfg.spike_sigma_multiplier = f64::INFINITY;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidSigmaMultiplier(_))
        ));

        cfg.spike_sigma_multiplier = 3.0;
        cfg.analytics_window_days = Some(0);
        assert_eq!(cfg.validate(), Err(ConfigError::NonPositiveAnalyticsWindow));

        cfg.analytics_window_days = None;
        cfg.theme_catalog_size = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyThemeCatalog));

        cfg.theme_catalog_size = 2;
        cfg.theme_taxonomy = vec!["Sport".into(), "Culture".into(), "Santé".into()];
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::TaxonomyExceedsCatalog { listed: 3, size: 2 })
        );
    }

    #[serial_test::serial]
    #[test]
    fn engine_config_path_resolution_order() {
        // Run from an empty directory so config/engine.toml starts absent.
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_ENGINE_CONFIG_PATH);

        // No files → defaults
        let cfg = load_engine_config_default().unwrap();
        assert_eq!(cfg, EngineConfig::default());

        // config/engine.toml picked up
        fs::create_dir_all("config").unwrap();
        fs::write(DEFAULT_ENGINE_CONFIG_TOML, "window_days = 10\n").unwrap();
        assert_eq!(load_engine_config_default().unwrap().window_days, 10);

        // Env wins
        let p_json = tmp.path().join("custom.json");
        fs::write(&p_json, r#"{"window_days": 5}"#).unwrap();
        env::set_var(ENV_ENGINE_CONFIG_PATH, p_json.display().to_string());
        assert_eq!(load_engine_config_default().unwrap().window_days, 5);

        // Env pointing nowhere is an error, not a silent fallback
        env::set_var(ENV_ENGINE_CONFIG_PATH, tmp.path().join("missing.toml"));
        assert!(load_engine_config_default().is_err());

        // Invalid values fail fast
        env::set_var(ENV_ENGINE_CONFIG_PATH, p_json.display().to_string());
        fs::write(&p_json, r#"{"window_days": 0}"#).unwrap();
        assert!(load_engine_config_default().is_err());

        env::remove_var(ENV_ENGINE_CONFIG_PATH);
        env::set_current_dir(&old).unwrap();
    }
}
