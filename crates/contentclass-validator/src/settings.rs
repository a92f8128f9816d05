//! Setting up a validator from a flat option map, as handed over by a
//! content package validation framework.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use contentclass_core::{ContentClassification, Severity};
use contentclass_map::{merge, read_index, ClassificationIndex, WhitelistPatterns};
use tracing::{debug, info, warn};

use crate::error::{ValidatorError, ValidatorResult};
use crate::validator::ContentClassificationValidator;

pub const VALIDATOR_ID: &str = "content-classification";

/// Comma-separated locations of the maps to check against. Mandatory.
pub const OPTION_MAPS: &str = "maps";
/// Comma-separated regular expressions of resource paths without restrictions.
pub const OPTION_WHITELISTED_RESOURCE_PATH_PATTERNS: &str = "whitelistedResourcePathPatterns";
const OPTION_WHITELISTED_RESOURCE_PATH_PATTERNS_LEGACY: &str = "whitelistedResourcePathsPatterns";
/// Comma-separated `CLASSIFICATION=SEVERITY` pairs.
pub const OPTION_SEVERITIES_PER_CLASSIFICATION: &str = "severitiesPerClassification";

// ---------------------------------------------------------------------------
// MapSource
// ---------------------------------------------------------------------------

/// Opens serialized classification maps by location.
pub trait MapSource {
    fn open(&self, location: &str) -> io::Result<Box<dyn Read>>;
}

/// Reads maps from the local file system. Locations may carry a `file:`
/// scheme; relative locations are resolved against the base directory.
#[derive(Debug, Clone, Default)]
pub struct FileSystemMapSource {
    base_dir: Option<PathBuf>,
}

impl FileSystemMapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    pub fn resolve(&self, location: &str) -> PathBuf {
        let stripped = location
            .strip_prefix("file://")
            .or_else(|| location.strip_prefix("file:"))
            .unwrap_or(location);
        let path = Path::new(stripped);
        match &self.base_dir {
            Some(base_dir) if path.is_relative() => base_dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl MapSource for FileSystemMapSource {
    fn open(&self, location: &str) -> io::Result<Box<dyn Read>> {
        let file = File::open(self.resolve(location))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

// ---------------------------------------------------------------------------
// ValidatorSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorSettings {
    pub default_severity: Severity,
    pub options: BTreeMap<String, String>,
}

impl ValidatorSettings {
    pub fn new(default_severity: Severity) -> Self {
        Self {
            default_severity,
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Map locations in order. The first one is the base all others are
    /// merged into.
    pub fn map_locations(&self) -> ValidatorResult<Vec<&str>> {
        let locations: Vec<&str> = self
            .option(OPTION_MAPS)
            .map(split_list)
            .unwrap_or_default();
        if locations.is_empty() {
            return Err(ValidatorError::MissingOption(OPTION_MAPS.to_string()));
        }
        Ok(locations)
    }

    pub fn whitelist(&self) -> ValidatorResult<WhitelistPatterns> {
        let mut value = None;
        if let Some(legacy) = self.option(OPTION_WHITELISTED_RESOURCE_PATH_PATTERNS_LEGACY) {
            warn!(
                deprecated = OPTION_WHITELISTED_RESOURCE_PATH_PATTERNS_LEGACY,
                replacement = OPTION_WHITELISTED_RESOURCE_PATH_PATTERNS,
                "deprecated option detected, please switch to the new key"
            );
            value = Some(legacy);
        }
        if let Some(current) = self.option(OPTION_WHITELISTED_RESOURCE_PATH_PATTERNS) {
            value = Some(current);
        }
        let patterns = value.map(split_list).unwrap_or_default();
        WhitelistPatterns::new(patterns).map_err(|e| ValidatorError::InvalidOption {
            option: OPTION_WHITELISTED_RESOURCE_PATH_PATTERNS.to_string(),
            reason: e.to_string(),
        })
    }

    pub fn severities(&self) -> ValidatorResult<BTreeMap<ContentClassification, Severity>> {
        match self.option(OPTION_SEVERITIES_PER_CLASSIFICATION) {
            None => Ok(BTreeMap::new()),
            Some(value) if value.trim().is_empty() => Ok(BTreeMap::new()),
            Some(value) => parse_severities(value),
        }
    }
}

fn split_list(value: &str) -> Vec<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

fn parse_severities(value: &str) -> ValidatorResult<BTreeMap<ContentClassification, Severity>> {
    let invalid = |reason: String| ValidatorError::InvalidOption {
        option: OPTION_SEVERITIES_PER_CLASSIFICATION.to_string(),
        reason,
    };
    let mut severities = BTreeMap::new();
    for pair in value.split(',') {
        let (classification, severity) = pair
            .split_once('=')
            .filter(|(c, s)| !c.trim().is_empty() && !s.trim().is_empty() && !s.contains('='))
            .ok_or_else(|| {
                invalid(format!(
                    "must be given as comma-separated 'classification=severity' pairs, but contains '{pair}'"
                ))
            })?;
        let classification =
            ContentClassification::from_str(classification).map_err(|e| invalid(e.to_string()))?;
        let severity = Severity::from_str(severity).map_err(|e| invalid(e.to_string()))?;
        if severities.insert(classification, severity).is_some() {
            return Err(invalid(format!("duplicate entry for {classification}")));
        }
    }
    Ok(severities)
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

/// Reads the maps at `locations` and merges them, in order, into one index.
pub fn load_maps(locations: &[&str], source: &dyn MapSource) -> ValidatorResult<ClassificationIndex> {
    let mut merged: Option<ClassificationIndex> = None;
    for &location in locations {
        let reader = source
            .open(location)
            .map_err(|err| ValidatorError::MapSource {
                location: location.to_string(),
                source: err,
            })?;
        let index = read_index(reader, location)?;
        info!(
            location,
            label = index.label(),
            entries = index.len(),
            "loaded classification map"
        );
        merged = Some(match merged {
            None => index,
            Some(base) => {
                debug!(location, "merging another map");
                merge(&base, &index)?
            }
        });
    }
    merged.ok_or_else(|| ValidatorError::MissingOption(OPTION_MAPS.to_string()))
}

/// Builds a validator from `settings`, reading maps through `source`.
pub fn build_validator(
    settings: &ValidatorSettings,
    source: &dyn MapSource,
) -> ValidatorResult<ContentClassificationValidator> {
    let locations = settings.map_locations()?;
    let whitelist = settings.whitelist()?;
    let severities = settings.severities()?;
    let index = load_maps(&locations, source)?;
    Ok(ContentClassificationValidator::new(
        Arc::new(index),
        whitelist,
        settings.default_severity,
        severities,
    ))
}
