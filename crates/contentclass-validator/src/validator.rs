use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use contentclass_core::path::{self, APPS_PREFIX, LIBS_PREFIX};
use contentclass_core::{ContentClassification, ContentUsage, Severity};
use contentclass_map::{ClassificationMap, Resolution, WhitelistPatterns};
use tracing::debug;

use crate::error::ValidatorResult;
use crate::script::{self, ScriptKind};
use crate::violation::{UsageSubject, Violation};

// ---------------------------------------------------------------------------
// ValidationRun
// ---------------------------------------------------------------------------

/// State of one validation pass over one content tree.
///
/// Remembers the node paths already reported as overlay violations, so a file
/// pass and a structured content pass over the same tree report each overlay
/// once. Use a fresh run per pass; runs are not meant to be shared.
#[derive(Debug, Default)]
pub struct ValidationRun {
    overlaid_paths: HashSet<String>,
}

impl ValidationRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if `node_path` was already reported.
    fn record_overlay(&mut self, node_path: &str) -> bool {
        self.overlaid_paths.insert(node_path.to_string())
    }

    pub fn reported_overlays(&self) -> usize {
        self.overlaid_paths.len()
    }
}

// ---------------------------------------------------------------------------
// ContentNode
// ---------------------------------------------------------------------------

/// A structured content element and the resource paths it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentNode {
    /// Absolute repository path of the node itself.
    pub path: String,
    /// Label used in messages, usually the last path segment.
    pub name: String,
    pub resource_type: Option<String>,
    pub resource_super_type: Option<String>,
}

impl ContentNode {
    /// A node named after the last segment of `path`.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path
            .rsplit(path::SEPARATOR)
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            path,
            name,
            resource_type: None,
            resource_super_type: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn with_resource_super_type(mut self, resource_super_type: impl Into<String>) -> Self {
        self.resource_super_type = Some(resource_super_type.into());
        self
    }
}

// ---------------------------------------------------------------------------
// ContentClassificationValidator
// ---------------------------------------------------------------------------

/// Checks usages of resource paths against a classification map.
///
/// The validator itself is immutable and may be shared between threads. All
/// per-pass state lives in the [`ValidationRun`] handed to each call.
#[derive(Debug, Clone)]
pub struct ContentClassificationValidator {
    map: Arc<dyn ClassificationMap>,
    whitelist: WhitelistPatterns,
    default_severity: Severity,
    severities: BTreeMap<ContentClassification, Severity>,
    overlay_prefix: String,
    base_prefix: String,
}

impl ContentClassificationValidator {
    pub fn new(
        map: Arc<dyn ClassificationMap>,
        whitelist: WhitelistPatterns,
        default_severity: Severity,
        severities: BTreeMap<ContentClassification, Severity>,
    ) -> Self {
        Self {
            map,
            whitelist,
            default_severity,
            severities,
            overlay_prefix: APPS_PREFIX.to_string(),
            base_prefix: LIBS_PREFIX.to_string(),
        }
    }

    /// Replaces the overlay area (default `/apps/`) and the base area it
    /// shadows (default `/libs/`).
    pub fn with_overlay_areas(
        mut self,
        overlay_prefix: impl Into<String>,
        base_prefix: impl Into<String>,
    ) -> Self {
        self.overlay_prefix = overlay_prefix.into();
        self.base_prefix = base_prefix.into();
        self
    }

    pub fn map(&self) -> &Arc<dyn ClassificationMap> {
        &self.map
    }

    pub fn default_severity(&self) -> Severity {
        self.default_severity
    }

    /// Effective classification of `resource_path`, honoring the whitelist.
    pub fn resolve(&self, resource_path: &str) -> ValidatorResult<Resolution> {
        Ok(self.map.resolve(resource_path, &self.whitelist)?)
    }

    pub fn severity_for(&self, classification: ContentClassification) -> Severity {
        self.severities
            .get(&classification)
            .copied()
            .unwrap_or(self.default_severity)
    }

    /// Checks a single usage of `resource_path`.
    ///
    /// Returns `None` when there is nothing to check or the usage is allowed.
    /// A path with a trailing separator is reported at the default severity.
    /// For [`ContentUsage::Overlay`], `resource_path` is the overlaying node's
    /// own path; only paths in the overlay area are checked, against the path
    /// they shadow in the base area.
    pub fn evaluate(
        &self,
        run: &mut ValidationRun,
        resource_path: Option<&str>,
        usage: ContentUsage,
        subject: &UsageSubject,
    ) -> ValidatorResult<Option<Violation>> {
        let Some(resource_path) = resource_path else {
            return Ok(None);
        };
        if path::has_trailing_separator(resource_path) {
            return Ok(Some(Violation::malformed_path(
                self.default_severity,
                subject,
                resource_path,
            )));
        }

        let target = match usage {
            ContentUsage::Overlay => match self.overlaid_path(resource_path) {
                Some(overlaid) => Cow::Owned(overlaid),
                None => return Ok(None),
            },
            ContentUsage::Inherit | ContentUsage::Reference => Cow::Borrowed(resource_path),
        };

        let resolution = self.map.resolve(&target, &self.whitelist)?;
        if resolution.classification.is_allowed(usage) {
            return Ok(None);
        }
        if usage == ContentUsage::Overlay && !run.record_overlay(resource_path) {
            debug!(path = resource_path, "overlay violation already reported");
            return Ok(None);
        }

        Ok(Some(Violation::usage(
            self.severity_for(resolution.classification),
            subject,
            usage,
            &target,
            resolution.classification,
            resolution.remark.as_deref(),
        )))
    }

    /// Checks the resource type (REFERENCE), the resource super type (INHERIT)
    /// and the node's own path (OVERLAY) of a structured content node.
    pub fn validate_node(
        &self,
        run: &mut ValidationRun,
        node: &ContentNode,
    ) -> ValidatorResult<Vec<Violation>> {
        let subject = UsageSubject::element(node.name.as_str());
        let checks = [
            (node.resource_type.as_deref(), ContentUsage::Reference),
            (node.resource_super_type.as_deref(), ContentUsage::Inherit),
            (Some(node.path.as_str()), ContentUsage::Overlay),
        ];
        let mut violations = Vec::new();
        for (resource_path, usage) in checks {
            if let Some(violation) = self.evaluate(run, resource_path, usage, &subject)? {
                violations.push(violation);
            }
        }
        Ok(violations)
    }

    /// Checks a plain file for overlaying a protected path.
    pub fn validate_file(
        &self,
        run: &mut ValidationRun,
        node_path: &str,
    ) -> ValidatorResult<Option<Violation>> {
        self.evaluate(run, Some(node_path), ContentUsage::Overlay, &UsageSubject::File)
    }

    /// Whether [`validate_script`](Self::validate_script) scans the file.
    pub fn is_script(&self, file_path: &str) -> bool {
        ScriptKind::from_path(file_path).is_some()
    }

    /// Checks the resource types an HTL or JSP script includes by literal.
    /// Other files yield no violations.
    pub fn validate_script(
        &self,
        run: &mut ValidationRun,
        file_path: &str,
        content: &str,
    ) -> ValidatorResult<Vec<Violation>> {
        let Some(kind) = ScriptKind::from_path(file_path) else {
            debug!(file = file_path, "not a script, skipping");
            return Ok(Vec::new());
        };
        let mut violations = Vec::new();
        for found in script::resource_types(kind, content) {
            debug!(
                file = file_path,
                line = found.line,
                resource_type = found.resource_type,
                "found included resource type"
            );
            if let Some(violation) = self.evaluate(
                run,
                Some(found.resource_type),
                ContentUsage::Reference,
                &UsageSubject::File,
            )? {
                violations.push(violation);
            }
        }
        Ok(violations)
    }

    /// Informational message naming the map checked against.
    pub fn summary(&self) -> Violation {
        Violation::info(format!(
            "Successfully checked against classification maps: {} ({} entries)",
            self.map.label(),
            self.map.len()
        ))
    }

    /// Path in the base area shadowed by `node_path`, if it lies in the
    /// overlay area.
    fn overlaid_path(&self, node_path: &str) -> Option<String> {
        node_path
            .strip_prefix(self.overlay_prefix.as_str())
            .map(|relative| format!("{}{}", self.base_prefix, relative))
    }
}
