use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use contentclass_core::path::{APPS_PREFIX, LIBS_PREFIX};
use contentclass_core::{ContentClassification, Severity};
use contentclass_map::WhitelistPatterns;

use crate::error::{RootError, RootResult};

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "contentclass.toml";

/// Top-level configuration for the `contentclass` binary.
///
/// ```toml
/// maps = ["maps/6.5.0.map", "maps/cloud.map"]
/// default_severity = "ERROR"
/// whitelist = ["/libs/foundation/components/parsys"]
///
/// [severities]
/// INTERNAL_CHILD = "WARN"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RootConfig {
    /// Map locations, relative to the configuration file. The first one is the
    /// base all others are merged into.
    #[serde(default)]
    pub maps: Vec<String>,

    /// Severity of violations without an override in `severities`.
    #[serde(default)]
    pub default_severity: Severity,

    /// Severity overrides keyed by classification name.
    #[serde(default)]
    pub severities: BTreeMap<String, Severity>,

    /// Regular expressions of resource paths without any restriction.
    #[serde(default)]
    pub whitelist: Vec<String>,

    /// Area whose paths overlay paths in `base_prefix`.
    #[serde(default = "default_overlay_prefix")]
    pub overlay_prefix: String,

    #[serde(default = "default_base_prefix")]
    pub base_prefix: String,
}

fn default_overlay_prefix() -> String {
    APPS_PREFIX.to_string()
}

fn default_base_prefix() -> String {
    LIBS_PREFIX.to_string()
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            maps: Vec::new(),
            default_severity: Severity::default(),
            severities: BTreeMap::new(),
            whitelist: Vec::new(),
            overlay_prefix: default_overlay_prefix(),
            base_prefix: default_base_prefix(),
        }
    }
}

impl RootConfig {
    /// Load configuration from a TOML file. If the file does not exist,
    /// returns a default configuration.
    pub fn load(path: &Path) -> RootResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path).map_err(RootError::Io)?;
        let config: RootConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> RootResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| RootError::Config(format!("TOML serialize error: {}", e)))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(RootError::Io)?;
        }
        std::fs::write(path, contents).map_err(RootError::Io)?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> RootResult<()> {
        for (name, prefix) in [
            ("overlay_prefix", &self.overlay_prefix),
            ("base_prefix", &self.base_prefix),
        ] {
            if !prefix.starts_with('/') || !prefix.ends_with('/') {
                return Err(RootError::Config(format!(
                    "{name} must start and end with '/', got '{prefix}'"
                )));
            }
        }
        if self.overlay_prefix == self.base_prefix {
            return Err(RootError::Config(
                "overlay_prefix and base_prefix must differ".into(),
            ));
        }
        if let Some(blank) = self.maps.iter().find(|m| m.trim().is_empty()) {
            return Err(RootError::Config(format!(
                "map locations must not be blank, got '{blank}'"
            )));
        }
        self.severity_overrides()?;
        self.whitelist_patterns()?;
        Ok(())
    }

    /// `severities` with parsed classification keys.
    pub fn severity_overrides(&self) -> RootResult<BTreeMap<ContentClassification, Severity>> {
        self.severities
            .iter()
            .map(|(name, severity)| {
                ContentClassification::from_str(name)
                    .map(|classification| (classification, *severity))
                    .map_err(|e| RootError::Config(format!("severities: {e}")))
            })
            .collect()
    }

    pub fn whitelist_patterns(&self) -> RootResult<WhitelistPatterns> {
        WhitelistPatterns::new(&self.whitelist)
            .map_err(|e| RootError::Config(format!("whitelist: {e}")))
    }

    /// Return the path to the default config file location.
    pub fn default_config_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RootConfig::default();
        assert!(config.maps.is_empty());
        assert_eq!(config.default_severity, Severity::Error);
        assert_eq!(config.overlay_prefix, "/apps/");
        assert_eq!(config.base_prefix, "/libs/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
maps = ["maps/6.5.0.map", "file:maps/cloud.map"]
default_severity = "WARN"
whitelist = ["/libs/foundation/components/parsys", "/libs/wcm/.*"]

[severities]
INTERNAL_CHILD = "INFO"
FINAL = "ERROR"
"#;
        let config: RootConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.maps, vec!["maps/6.5.0.map", "file:maps/cloud.map"]);
        assert_eq!(config.default_severity, Severity::Warn);
        assert_eq!(config.overlay_prefix, "/apps/");
        assert_eq!(
            config.severity_overrides().unwrap(),
            BTreeMap::from([
                (ContentClassification::InternalChild, Severity::Info),
                (ContentClassification::Final, Severity::Error),
            ])
        );
        assert_eq!(config.whitelist_patterns().unwrap().len(), 2);
    }

    #[test]
    fn test_config_validate_bad_prefix() {
        let mut config = RootConfig::default();
        config.overlay_prefix = "/apps".into();
        assert!(config.validate().is_err());

        let mut config = RootConfig::default();
        config.base_prefix = "/apps/".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate_unknown_classification() {
        let mut config = RootConfig::default();
        config.severities.insert("SECRET".into(), Severity::Info);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("SECRET"));
    }

    #[test]
    fn test_config_validate_bad_whitelist() {
        let mut config = RootConfig::default();
        config.whitelist.push("libs/relative".into());
        assert!(matches!(config.validate(), Err(RootError::Config(_))));
    }

    #[test]
    fn test_config_validate_blank_map() {
        let mut config = RootConfig::default();
        config.maps.push(" ".into());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_unknown_severity_rejected() {
        let err = toml::from_str::<RootConfig>(r#"default_severity = "FATAL""#).unwrap_err();
        assert!(err.to_string().contains("FATAL"));
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = RootConfig::load(Path::new("/nonexistent/contentclass.toml")).unwrap();
        assert_eq!(config, RootConfig::default());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(DEFAULT_CONFIG_FILE);

        let config = RootConfig {
            maps: vec!["a.map".into(), "b.map".into()],
            default_severity: Severity::Warn,
            severities: BTreeMap::from([("ABSTRACT".to_string(), Severity::Debug)]),
            whitelist: vec!["/libs/x".into()],
            overlay_prefix: "/overlays/".into(),
            base_prefix: "/libs/".into(),
        };

        config.save(&path).unwrap();
        let loaded = RootConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
