//! Content Classification Root Library
//!
//! Wires the classification maps and the validator together for the
//! `contentclass` binary: configuration, map loading and merging, and
//! scanning files of a content tree on disk.
//!
//! # Architecture
//!
//! The binary is a thin shell. Every command loads the configured maps into
//! one merged index, builds a validator on top of it and feeds it usages. The
//! only state carried between usages is the [`ValidationRun`] of a command.

pub mod config;
pub mod error;

pub use config::RootConfig;
pub use error::{RootError, RootResult};

use contentclass_core::ContentClassification;
use contentclass_map::{write_index, ClassificationIndex, Resolution};
use contentclass_validator::settings::load_maps;
use contentclass_validator::{
    ContentClassificationValidator, FileSystemMapSource, ValidationRun, Violation,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Component, Path};
use std::sync::Arc;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Reads all configured maps, relative to `base_dir`, and merges them in order.
pub fn load_index(config: &RootConfig, base_dir: &Path) -> RootResult<ClassificationIndex> {
    if config.maps.is_empty() {
        return Err(RootError::Config("no classification maps configured".into()));
    }
    let locations: Vec<&str> = config.maps.iter().map(String::as_str).collect();
    let source = FileSystemMapSource::with_base_dir(base_dir);
    let index = load_maps(&locations, &source)?;
    info!(
        label = index.label(),
        entries = index.len(),
        maps = locations.len(),
        "classification maps ready"
    );
    Ok(index)
}

/// Builds a validator from `config` on top of an already loaded index.
pub fn build_validator(
    config: &RootConfig,
    index: ClassificationIndex,
) -> RootResult<ContentClassificationValidator> {
    let validator = ContentClassificationValidator::new(
        Arc::new(index),
        config.whitelist_patterns()?,
        config.default_severity,
        config.severity_overrides()?,
    )
    .with_overlay_areas(config.overlay_prefix.clone(), config.base_prefix.clone());
    Ok(validator)
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Result of looking up a single resource path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupReport {
    pub path: String,
    pub classification: ContentClassification,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl LookupReport {
    fn new(path: &str, resolution: Resolution) -> Self {
        Self {
            path: path.to_string(),
            classification: resolution.classification,
            label: resolution.classification.label().to_string(),
            remark: resolution.remark,
        }
    }
}

pub fn lookup(validator: &ContentClassificationValidator, resource_path: &str) -> RootResult<LookupReport> {
    let resolution = validator.resolve(resource_path)?;
    Ok(LookupReport::new(resource_path, resolution))
}

// ---------------------------------------------------------------------------
// Scanning files
// ---------------------------------------------------------------------------

/// Repository path of `file`.
///
/// With a `root` (e.g. the `jcr_root` directory of a content package) the path
/// is taken relative to it; without one `file` must already be absolute.
pub fn repository_path(root: Option<&Path>, file: &Path) -> RootResult<String> {
    let relative = match root {
        Some(root) => file.strip_prefix(root).map_err(|_| {
            RootError::Config(format!(
                "'{}' is not located below '{}'",
                file.display(),
                root.display()
            ))
        })?,
        None => file,
    };
    let mut repository_path = String::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                repository_path.push('/');
                repository_path.push_str(&segment.to_string_lossy());
            }
            Component::RootDir => {}
            _ if root.is_none() => {
                return Err(RootError::Config(format!(
                    "'{}' must be an absolute path without '.' or '..'",
                    file.display()
                )))
            }
            _ => {
                return Err(RootError::Config(format!(
                    "'{}' must not contain '.' or '..'",
                    file.display()
                )))
            }
        }
    }
    if root.is_none() && !file.has_root() {
        return Err(RootError::Config(format!(
            "'{}' is not absolute, pass the content root to scan relative files",
            file.display()
        )));
    }
    if repository_path.is_empty() {
        repository_path.push('/');
    }
    Ok(repository_path)
}

/// Checks one file on disk: overlaying by its mere existence at
/// `repository_path`, and included resource types if it is a script.
pub fn scan_file(
    validator: &ContentClassificationValidator,
    run: &mut ValidationRun,
    file: &Path,
    repository_path: &str,
) -> RootResult<Vec<Violation>> {
    let mut violations = Vec::new();
    violations.extend(validator.validate_file(run, repository_path)?);
    if validator.is_script(repository_path) {
        // undecodable bytes become U+FFFD, the rest of the script is still scanned
        let bytes = std::fs::read(file)?;
        let content = String::from_utf8_lossy(&bytes);
        violations.extend(validator.validate_script(run, repository_path, &content)?);
    }
    debug!(
        file = %file.display(),
        repository_path,
        violations = violations.len(),
        "scanned file"
    );
    Ok(violations)
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Writes `index` to `output` in the classification map format.
pub fn write_merged(index: &ClassificationIndex, output: &Path) -> RootResult<()> {
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(output)?);
    write_index(index, &mut writer)?;
    writer.flush()?;
    info!(
        output = %output.display(),
        label = index.label(),
        entries = index.len(),
        "wrote merged classification map"
    );
    Ok(())
}
