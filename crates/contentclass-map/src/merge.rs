//! Combining two classification indices into one.

use tracing::debug;

use crate::error::{MapError, MapResult};
use crate::index::{ClassificationIndex, IndexEntry};
use crate::map::ClassificationMap;
use crate::whitelist::WhitelistPatterns;

/// Merges `overlay` into a copy of `base` and returns the result.
///
/// An overlay entry is only taken over when it is stricter than the effective
/// classification `base` reports for its path. Taking it over first removes
/// every base entry below that path (string prefix) which is less strict.
/// Effective classifications are always resolved against the pruned base, never
/// against overlay entries accepted earlier in the same merge.
pub fn merge(base: &ClassificationIndex, overlay: &ClassificationIndex) -> MapResult<ClassificationIndex> {
    let no_whitelist = WhitelistPatterns::empty();
    let mut merged = base.clone();
    let mut accepted: Vec<(&str, &IndexEntry)> = Vec::new();

    for (resource_path, entry) in overlay.iter() {
        let current = match merged.resolve(resource_path, &no_whitelist) {
            Ok(resolution) => Some(resolution.classification),
            Err(MapError::NoClassificationFound(_)) => None,
            Err(e) => return Err(e),
        };
        if let Some(current) = current {
            if !entry.classification.is_stricter_than(current) {
                debug!(
                    path = resource_path,
                    current = %current,
                    overlay = %entry.classification,
                    "skipping overlay entry not stricter than base"
                );
                continue;
            }
        }
        let pruned = merged.prune_less_strict(resource_path, entry.classification);
        if !pruned.is_empty() {
            debug!(
                path = resource_path,
                classification = %entry.classification,
                pruned = ?pruned,
                "removed less strict entries below overlay entry"
            );
        }
        accepted.push((resource_path, entry));
    }

    for (resource_path, entry) in accepted {
        merged.insert(resource_path.to_string(), entry.clone());
    }
    merged.set_label(merged_label(base.label(), overlay.label()));
    Ok(merged)
}

fn merged_label(base: &str, overlay: &str) -> String {
    match (base.is_empty(), overlay.is_empty()) {
        (_, true) => base.to_string(),
        (true, false) => overlay.to_string(),
        (false, false) if base == overlay => base.to_string(),
        (false, false) => format!("{base}, {overlay}"),
    }
}
