use std::borrow::Cow;
use std::fmt;

use contentclass_core::ContentClassification;

use crate::error::MapResult;
use crate::whitelist::WhitelistPatterns;

/// Effective classification of a path together with the remark of the entry
/// it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub classification: ContentClassification,
    pub remark: Option<String>,
}

impl Resolution {
    pub fn new(classification: ContentClassification, remark: Option<String>) -> Self {
        Self {
            classification,
            remark,
        }
    }

    /// `PUBLIC` without a remark, used for blank and whitelisted paths.
    pub fn unrestricted() -> Self {
        Self::new(ContentClassification::Public, None)
    }
}

/// Read-only view on classifications per resource path.
///
/// Implementations are immutable once handed out and may be shared between
/// threads.
pub trait ClassificationMap: fmt::Debug + Send + Sync {
    /// Effective classification for `resource_path`.
    ///
    /// Blank paths are unrestricted, relative paths are resolved beneath
    /// `/libs/`, and paths matching one of `whitelist` are always `PUBLIC`.
    fn resolve(&self, resource_path: &str, whitelist: &WhitelistPatterns) -> MapResult<Resolution>;

    /// Number of entries. Diagnostic only.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Provenance of the map, e.g. the product version it was extracted from.
    fn label(&self) -> Cow<'_, str>;
}
