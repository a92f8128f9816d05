use contentclass_core::ContentClassification;
use tracing::debug;

use crate::error::{MapError, MapResult};
use crate::index::ClassificationIndex;
use crate::map::ClassificationMap;
use crate::whitelist::WhitelistPatterns;

/// Records that `resource_path` carries a deprecation annotation.
///
/// A path already disallowing every usage keeps its classification, only the
/// remark changes. Anything else becomes `INTERNAL_DEPRECATED_ANNOTATION`.
/// Returns the classification stored.
pub fn mark_deprecated(
    index: &mut ClassificationIndex,
    resource_path: &str,
    since: &str,
    reason: &str,
) -> MapResult<ContentClassification> {
    let current = match index.resolve(resource_path, &WhitelistPatterns::empty()) {
        Ok(resolution) => Some(resolution.classification),
        Err(MapError::NoClassificationFound(_)) => None,
        Err(e) => return Err(e),
    };
    let classification = match current {
        Some(current) if current.disallows_everything() => current,
        _ => ContentClassification::InternalDeprecatedAnnotation,
    };
    let remark = format!("Deprecated since {since}: {reason}");
    debug!(
        path = resource_path,
        previous = ?current,
        classification = %classification,
        "marking resource as deprecated"
    );
    index.put(resource_path, classification, Some(&remark))?;
    Ok(classification)
}
