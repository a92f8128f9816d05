use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ops::Bound;

use contentclass_core::path::{self, LIBS_PREFIX};
use contentclass_core::ContentClassification;
use tracing::debug;

use crate::error::{MapError, MapResult};
use crate::map::{ClassificationMap, Resolution};
use crate::whitelist::WhitelistPatterns;

// ---------------------------------------------------------------------------
// IndexEntry
// ---------------------------------------------------------------------------

/// Explicit classification stored for one absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub classification: ContentClassification,
    /// Never `Some("")`: an empty remark is stored as absent.
    pub remark: Option<String>,
}

impl IndexEntry {
    pub fn new(classification: ContentClassification, remark: Option<&str>) -> Self {
        Self {
            classification,
            remark: remark.filter(|r| !r.is_empty()).map(str::to_string),
        }
    }
}

// ---------------------------------------------------------------------------
// ClassificationIndex
// ---------------------------------------------------------------------------

/// Classifications per absolute repository path, ordered by path.
///
/// A path without an entry inherits the child classification of its nearest
/// ancestor with an entry, so every usable index carries an entry for `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationIndex {
    entries: BTreeMap<String, IndexEntry>,
    label: String,
}

impl ClassificationIndex {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            entries: BTreeMap::new(),
            label: label.into(),
        }
    }

    /// An index whose root is `PUBLIC`, the usual starting point when
    /// extracting classifications from a repository.
    pub fn with_public_root(label: impl Into<String>) -> Self {
        let mut index = Self::new(label);
        index.insert(
            path::ROOT.to_string(),
            IndexEntry::new(ContentClassification::Public, None),
        );
        index
    }

    /// Stores the classification of `resource_path`, replacing any existing
    /// entry for the same path. Empty remarks are treated as absent.
    pub fn put(
        &mut self,
        resource_path: &str,
        classification: ContentClassification,
        remark: Option<&str>,
    ) -> MapResult<()> {
        if !path::is_absolute(resource_path) {
            return Err(MapError::InvalidPath(resource_path.to_string()));
        }
        self.insert(
            resource_path.to_string(),
            IndexEntry::new(classification, remark),
        );
        Ok(())
    }

    pub(crate) fn insert(&mut self, resource_path: String, entry: IndexEntry) {
        self.entries.insert(resource_path, entry);
    }

    /// Exact entry for `resource_path`, without inheritance.
    pub fn get(&self, resource_path: &str) -> Option<&IndexEntry> {
        self.entries.get(resource_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexEntry)> {
        self.entries
            .iter()
            .map(|(resource_path, entry)| (resource_path.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    /// Removes every entry whose key starts with `prefix` and which is less
    /// strict than `classification`. Returns the removed keys.
    pub(crate) fn prune_less_strict(
        &mut self,
        prefix: &str,
        classification: ContentClassification,
    ) -> Vec<String> {
        // keys sharing a string prefix are contiguous in a BTreeMap
        let pruned: Vec<String> = self
            .entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .filter(|(_, entry)| classification.is_stricter_than(entry.classification))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &pruned {
            self.entries.remove(key);
        }
        pruned
    }

    fn resolve_absolute(&self, resource_path: &str) -> MapResult<Resolution> {
        if let Some(entry) = self.entries.get(resource_path) {
            debug!(
                path = resource_path,
                classification = entry.classification.label(),
                "found exact match for classification"
            );
            return Ok(Resolution::new(entry.classification, entry.remark.clone()));
        }

        for ancestor in path::ancestors(resource_path) {
            if let Some(entry) = self.entries.get(ancestor) {
                let classification = entry.classification.child_node_classification();
                debug!(
                    path = resource_path,
                    ancestor,
                    classification = classification.label(),
                    "found inexact match for classification"
                );
                return Ok(Resolution::new(classification, entry.remark.clone()));
            }
        }

        Err(MapError::NoClassificationFound(resource_path.to_string()))
    }
}

/// Resolves a resource path as given by content to an absolute path.
///
/// Returns `None` for blank paths, which carry no restriction.
pub(crate) fn normalize(resource_path: &str) -> MapResult<Option<Cow<'_, str>>> {
    if resource_path.trim().is_empty() {
        return Ok(None);
    }
    let absolute = if path::is_absolute(resource_path) {
        Cow::Borrowed(resource_path)
    } else {
        // /libs is always part of the resource resolver's search path
        Cow::Owned(format!("{LIBS_PREFIX}{resource_path}"))
    };
    if path::has_trailing_separator(&absolute) {
        return Err(MapError::MalformedPath(absolute.into_owned()));
    }
    Ok(Some(absolute))
}

impl ClassificationMap for ClassificationIndex {
    fn resolve(&self, resource_path: &str, whitelist: &WhitelistPatterns) -> MapResult<Resolution> {
        let Some(absolute) = normalize(resource_path)? else {
            return Ok(Resolution::unrestricted());
        };
        if whitelist.is_whitelisted(&absolute) {
            debug!(
                path = %absolute,
                "resource path is explicitly whitelisted and therefore has no restrictions"
            );
            return Ok(Resolution::unrestricted());
        }
        self.resolve_absolute(&absolute)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn label(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.label)
    }
}
