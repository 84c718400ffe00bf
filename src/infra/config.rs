//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument
//! 2. COCO_CONFIG environment variable
//! 3. Default: config/coco.toml
//!
//! Every section is optional. A missing or unreadable file falls back to
//! the built-in room catalog, connectors and tour URLs.

use crate::services::stay_resolver::{
    RoomCatalog, StayIdResolver, DEFAULT_CONNECTORS, DEFAULT_NAMED_ROOMS, DEFAULT_NUMBERED_ROOMS,
};
use crate::services::tour::{
    TourUrls, BEACH_TOUR_URL, DEFAULT_TOUR_URL, JUNGLE_TOUR_URL, NEW_TOUR_URL,
};
use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;

pub const CONFIG_ENV_VAR: &str = "COCO_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/coco.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct RoomsConfig {
    /// Numbered rooms in catalog order (e.g. "A4")
    #[serde(default = "default_numbered_rooms")]
    pub numbered: Vec<String>,
    /// Multi-word rooms, sorted after the numbered ones
    #[serde(default = "default_named_rooms")]
    pub named: Vec<String>,
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self { numbered: default_numbered_rooms(), named: default_named_rooms() }
    }
}

fn default_numbered_rooms() -> Vec<String> {
    DEFAULT_NUMBERED_ROOMS.iter().map(|r| r.to_string()).collect()
}

fn default_named_rooms() -> Vec<String> {
    DEFAULT_NAMED_ROOMS.iter().map(|r| r.to_string()).collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SurnameConfig {
    /// Particles kept lowercase in canonical surnames
    #[serde(default = "default_connectors")]
    pub connectors: Vec<String>,
}

impl Default for SurnameConfig {
    fn default() -> Self {
        Self { connectors: default_connectors() }
    }
}

fn default_connectors() -> Vec<String> {
    DEFAULT_CONNECTORS.iter().map(|c| c.to_string()).collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TourConfig {
    #[serde(default = "default_tour_url")]
    pub default_url: String,
    #[serde(default = "default_beach_url")]
    pub beach_url: String,
    #[serde(default = "default_jungle_url")]
    pub jungle_url: String,
    #[serde(default = "default_new_url")]
    pub new_url: String,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            default_url: default_tour_url(),
            beach_url: default_beach_url(),
            jungle_url: default_jungle_url(),
            new_url: default_new_url(),
        }
    }
}

fn default_tour_url() -> String {
    DEFAULT_TOUR_URL.to_string()
}

fn default_beach_url() -> String {
    BEACH_TOUR_URL.to_string()
}

fn default_jungle_url() -> String {
    JUNGLE_TOUR_URL.to_string()
}

fn default_new_url() -> String {
    NEW_TOUR_URL.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntakeConfig {
    /// Value of the `source` column when the intake names none
    #[serde(default = "default_intake_source")]
    pub source: String,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self { source: default_intake_source() }
    }
}

fn default_intake_source() -> String {
    "mrz_batch".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub rooms: RoomsConfig,
    #[serde(default)]
    pub surname: SurnameConfig,
    #[serde(default)]
    pub tour: TourConfig,
    #[serde(default)]
    pub intake: IntakeConfig,
}

/// Main configuration struct used by the CLI
#[derive(Debug, Clone)]
pub struct Config {
    numbered_rooms: Vec<String>,
    named_rooms: Vec<String>,
    connectors: Vec<String>,
    tour_urls: TourUrls,
    intake_source: String,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_toml(TomlConfig::default(), "default")
    }
}

impl Config {
    /// Config path: explicit `--config`, else `COCO_CONFIG`, else the default
    pub fn resolve_config_path(explicit: Option<&str>) -> String {
        if let Some(path) = explicit {
            return path.to_string();
        }

        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return path;
        }

        DEFAULT_CONFIG_PATH.to_string()
    }

    fn from_toml(toml_config: TomlConfig, config_file: &str) -> Self {
        Self {
            numbered_rooms: toml_config.rooms.numbered,
            named_rooms: toml_config.rooms.named,
            connectors: toml_config.surname.connectors,
            tour_urls: TourUrls {
                default_url: toml_config.tour.default_url,
                beach_url: toml_config.tour.beach_url,
                jungle_url: toml_config.tour.jungle_url,
                new_url: toml_config.tour.new_url,
            },
            intake_source: toml_config.intake.source,
            config_file: config_file.to_string(),
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(Self::from_toml(toml_config, &path.display().to_string()))
    }

    /// Load configuration - tries TOML file first, falls back to defaults
    pub fn load_from_path(config_path: &str) -> Self {
        match Self::from_file(config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "config_fallback_to_defaults");
                Self::default()
            }
        }
    }

    pub fn room_catalog(&self) -> RoomCatalog {
        RoomCatalog::new(&self.numbered_rooms, &self.named_rooms)
    }

    /// Resolver over the configured catalog and connectors
    pub fn resolver(&self) -> StayIdResolver {
        StayIdResolver::new(self.room_catalog(), &self.connectors)
    }

    pub fn numbered_rooms(&self) -> &[String] {
        &self.numbered_rooms
    }

    pub fn named_rooms(&self) -> &[String] {
        &self.named_rooms
    }

    pub fn connectors(&self) -> &[String] {
        &self.connectors
    }

    pub fn tour_urls(&self) -> &TourUrls {
        &self.tour_urls
    }

    pub fn intake_source(&self) -> &str {
        &self.intake_source
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method for tests to replace the named rooms
    #[cfg(test)]
    pub fn with_named_rooms(mut self, named: &[&str]) -> Self {
        self.named_rooms = named.iter().map(|r| r.to_string()).collect();
        self
    }

    /// Builder method for tests to replace the connectors
    #[cfg(test)]
    pub fn with_connectors(mut self, connectors: &[&str]) -> Self {
        self.connectors = connectors.iter().map(|c| c.to_string()).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.numbered_rooms().len(), 11);
        assert_eq!(config.named_rooms()[0], "Double House");
        assert!(config.connectors().iter().any(|c| c == "van"));
        assert_eq!(config.tour_urls(), &TourUrls::default());
        assert_eq!(config.intake_source(), "mrz_batch");
        assert_eq!(config.config_file(), "default");
    }

    #[test]
    fn test_default_resolver_matches_builtin() {
        let resolver = Config::default().resolver();
        assert_eq!(resolver.resolve("a4 van der berg").stay_id, "A4_vanderBerg");
        assert_eq!(resolver.catalog().len(), 15);
    }

    #[test]
    fn test_custom_rooms_and_connectors() {
        let resolver = Config::default()
            .with_named_rooms(&["Sunset Villa"])
            .with_connectors(&["ten"])
            .resolver();
        assert_eq!(resolver.resolve("Sunset Villa ten Bosch").stay_id, "Sunset_Villa_tenBosch");
        assert_eq!(resolver.resolve("New House Smith").stay_id, "NewHouseSmith");
        assert_eq!(resolver.resolve("van Dijk").stay_id, "VanDijk");
    }

    #[test]
    fn test_explicit_config_path_wins() {
        assert_eq!(Config::resolve_config_path(Some("config/test.toml")), "config/test.toml");
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = Config::load_from_path("does/not/exist.toml");
        assert_eq!(config.config_file(), "default");
        assert_eq!(config.numbered_rooms().len(), 11);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let parsed: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(parsed.rooms.named.len(), 4);
        assert_eq!(parsed.tour.beach_url, BEACH_TOUR_URL);
        assert_eq!(parsed.intake.source, "mrz_batch");
    }
}
