use std::borrow::Cow;
use std::sync::Arc;

use tracing::debug;

use crate::error::{MapError, MapResult};
use crate::map::{ClassificationMap, Resolution};
use crate::whitelist::WhitelistPatterns;

/// Several maps presented as one, always answering with the strictest
/// classification any of them reports.
///
/// Strictness outranks match specificity: an inherited `INTERNAL` from one
/// map beats an exact `FINAL` entry from another.
#[derive(Debug, Clone)]
pub struct CompositeClassificationMap {
    maps: Vec<Arc<dyn ClassificationMap>>,
}

impl CompositeClassificationMap {
    pub fn new(maps: Vec<Arc<dyn ClassificationMap>>) -> MapResult<Self> {
        if maps.is_empty() {
            return Err(MapError::EmptyComposite);
        }
        Ok(Self { maps })
    }

    pub fn maps(&self) -> &[Arc<dyn ClassificationMap>] {
        &self.maps
    }
}

impl ClassificationMap for CompositeClassificationMap {
    fn resolve(&self, resource_path: &str, whitelist: &WhitelistPatterns) -> MapResult<Resolution> {
        let mut strictest: Option<(Resolution, &Arc<dyn ClassificationMap>)> = None;
        for map in &self.maps {
            let resolution = map.resolve(resource_path, whitelist)?;
            // on a tie the earlier map is kept
            let replace = match &strictest {
                None => true,
                Some((current, _)) => resolution
                    .classification
                    .is_stricter_than(current.classification),
            };
            if replace {
                strictest = Some((resolution, map));
            }
        }
        let (resolution, map) = strictest.ok_or(MapError::EmptyComposite)?;
        debug!(
            path = resource_path,
            classification = %resolution.classification,
            map = %map.label(),
            "found strictest classification"
        );
        Ok(resolution)
    }

    /// Sum of all constituent sizes; overlapping paths are counted repeatedly.
    fn len(&self) -> usize {
        self.maps.iter().map(|map| map.len()).sum()
    }

    fn label(&self) -> Cow<'_, str> {
        let labels: Vec<Cow<'_, str>> = self.maps.iter().map(|map| map.label()).collect();
        Cow::Owned(format!("Composite Map of {}", labels.join(", ")))
    }
}
