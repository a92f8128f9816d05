use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// ContentUsage: the ways content can use a resource path
// ---------------------------------------------------------------------------

/// How a piece of content uses a resource path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentUsage {
    /// Shadowing the path from within the overlay area.
    Overlay,
    /// Extending the path through a resource super type.
    Inherit,
    /// Any other reference or inclusion.
    Reference,
}

impl ContentUsage {
    pub const ALL: [ContentUsage; 3] = [
        ContentUsage::Overlay,
        ContentUsage::Inherit,
        ContentUsage::Reference,
    ];

    /// Verb used in rendered violation messages.
    pub fn label(self) -> &'static str {
        match self {
            ContentUsage::Overlay => "overlays",
            ContentUsage::Inherit => "inherits from",
            ContentUsage::Reference => "references",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ContentUsage::Overlay => "OVERLAY",
            ContentUsage::Inherit => "INHERIT",
            ContentUsage::Reference => "REFERENCE",
        }
    }
}

impl fmt::Display for ContentUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContentUsage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ContentUsage::ALL
            .into_iter()
            .find(|usage| usage.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CoreError::UnknownUsage(trimmed.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ContentClassification: the fixed, linearly ordered lattice
// ---------------------------------------------------------------------------

/// Classification level of a resource path.
///
/// Declaration order is significant: variants are listed from the most
/// restricted to the least restricted, and the ordinal derived from that order
/// drives every precedence decision. A smaller ordinal is stricter and wins.
///
/// Exhaustive (no `#[non_exhaustive]`) so a new level forces review of the
/// static table below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentClassification {
    Internal,
    /// Descendants of a `Final` area. There is no mixin carrying this level.
    InternalChild,
    /// Derived from a `cq:deprecated` annotation on an area which is not internal yet.
    InternalDeprecatedAnnotation,
    /// Derived from deprecation of an area which is not internal yet.
    InternalDeprecated,
    Final,
    Abstract,
    Public,
}

/// Per-level behavior, indexed by ordinal.
struct LevelSpec {
    name: &'static str,
    label: &'static str,
    label_is_mixin: bool,
    child_override: Option<ContentClassification>,
    disallowed: &'static [ContentUsage],
}

const ALL_USAGES: &[ContentUsage] = &[
    ContentUsage::Overlay,
    ContentUsage::Inherit,
    ContentUsage::Reference,
];

const LEVELS: [LevelSpec; 7] = [
    LevelSpec {
        name: "INTERNAL",
        label: "granite:InternalArea",
        label_is_mixin: true,
        child_override: None,
        disallowed: ALL_USAGES,
    },
    LevelSpec {
        name: "INTERNAL_CHILD",
        label: "granite:InternalArea (derived from parent content classification)",
        label_is_mixin: false,
        child_override: None,
        disallowed: ALL_USAGES,
    },
    LevelSpec {
        name: "INTERNAL_DEPRECATED_ANNOTATION",
        label: "granite:InternalArea (derived from cq:deprecated property)",
        label_is_mixin: false,
        child_override: None,
        disallowed: ALL_USAGES,
    },
    LevelSpec {
        name: "INTERNAL_DEPRECATED",
        label: "granite:InternalArea (derived from deprecation)",
        label_is_mixin: false,
        child_override: None,
        disallowed: ALL_USAGES,
    },
    LevelSpec {
        name: "FINAL",
        label: "granite:FinalArea",
        label_is_mixin: true,
        child_override: Some(ContentClassification::InternalChild),
        disallowed: &[ContentUsage::Overlay, ContentUsage::Inherit],
    },
    LevelSpec {
        name: "ABSTRACT",
        label: "granite:AbstractArea",
        label_is_mixin: true,
        child_override: None,
        disallowed: &[ContentUsage::Reference],
    },
    LevelSpec {
        name: "PUBLIC",
        label: "granite:PublicArea",
        label_is_mixin: true,
        child_override: None,
        disallowed: &[],
    },
];

impl ContentClassification {
    /// All levels, strictest first.
    pub const ALL: [ContentClassification; 7] = [
        ContentClassification::Internal,
        ContentClassification::InternalChild,
        ContentClassification::InternalDeprecatedAnnotation,
        ContentClassification::InternalDeprecated,
        ContentClassification::Final,
        ContentClassification::Abstract,
        ContentClassification::Public,
    ];

    /// Position in the lattice. 0 is the strictest level.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    fn spec(self) -> &'static LevelSpec {
        &LEVELS[self as usize]
    }

    /// Stable identifier used in serialized maps and option strings.
    pub fn name(self) -> &'static str {
        self.spec().name
    }

    /// Human readable label. For levels where [`Self::is_label_mixin`] holds
    /// this is the node type marker found on classified content.
    pub fn label(self) -> &'static str {
        self.spec().label
    }

    pub fn is_label_mixin(self) -> bool {
        self.spec().label_is_mixin
    }

    pub fn disallowed_usages(self) -> &'static [ContentUsage] {
        self.spec().disallowed
    }

    /// Classification reported for paths beneath a node carrying this level
    /// when no more specific entry exists.
    pub fn child_node_classification(self) -> ContentClassification {
        self.spec().child_override.unwrap_or(self)
    }

    pub fn is_allowed(self, usage: ContentUsage) -> bool {
        !self.disallowed_usages().contains(&usage)
    }

    /// Returns `true` only if every given usage is allowed.
    pub fn is_allowed_all<I>(self, usages: I) -> bool
    where
        I: IntoIterator<Item = ContentUsage>,
    {
        usages.into_iter().all(|usage| self.is_allowed(usage))
    }

    /// Returns `true` if no usage at all is allowed.
    pub fn disallows_everything(self) -> bool {
        !ContentUsage::ALL.into_iter().any(|usage| self.is_allowed(usage))
    }

    pub fn is_stricter_than(self, other: ContentClassification) -> bool {
        self.ordinal() < other.ordinal()
    }

    /// The stricter of both levels. Ties return `self`.
    pub fn strictest(self, other: ContentClassification) -> ContentClassification {
        if other.is_stricter_than(self) {
            other
        } else {
            self
        }
    }
}

impl PartialOrd for ContentClassification {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// `Less` means stricter.
impl Ord for ContentClassification {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl fmt::Display for ContentClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContentClassification {
    type Err = CoreError;

    /// Parses the exact identifier (e.g. `FINAL`), surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ContentClassification::ALL
            .into_iter()
            .find(|level| level.name() == trimmed)
            .ok_or_else(|| CoreError::UnknownClassification(trimmed.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity of a validation message. Ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Debug,
    Info,
    Warn,
    #[default]
    Error,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Severity::ALL
            .into_iter()
            .find(|severity| severity.name() == trimmed)
            .ok_or_else(|| CoreError::UnknownSeverity(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_declaration_order() {
        for (index, level) in ContentClassification::ALL.into_iter().enumerate() {
            assert_eq!(level.ordinal() as usize, index);
            assert_eq!(level.name().parse::<ContentClassification>().unwrap(), level);
        }
    }

    #[test]
    fn test_is_allowed_matches_disallowed_set() {
        for level in ContentClassification::ALL {
            for usage in ContentUsage::ALL {
                assert_eq!(
                    level.is_allowed(usage),
                    !level.disallowed_usages().contains(&usage),
                    "{level} / {usage}"
                );
            }
        }
    }

    #[test]
    fn test_disallowed_usages_per_level() {
        assert!(ContentClassification::Internal.disallows_everything());
        assert!(ContentClassification::InternalChild.disallows_everything());
        assert!(ContentClassification::InternalDeprecatedAnnotation.disallows_everything());
        assert!(ContentClassification::InternalDeprecated.disallows_everything());

        let final_level = ContentClassification::Final;
        assert!(!final_level.is_allowed(ContentUsage::Overlay));
        assert!(!final_level.is_allowed(ContentUsage::Inherit));
        assert!(final_level.is_allowed(ContentUsage::Reference));

        let abstract_level = ContentClassification::Abstract;
        assert!(abstract_level.is_allowed(ContentUsage::Overlay));
        assert!(abstract_level.is_allowed(ContentUsage::Inherit));
        assert!(!abstract_level.is_allowed(ContentUsage::Reference));

        assert!(ContentClassification::Public.is_allowed_all(ContentUsage::ALL));
    }

    #[test]
    fn test_is_allowed_all_requires_every_usage() {
        let level = ContentClassification::Final;
        assert!(level.is_allowed_all([ContentUsage::Reference]));
        assert!(!level.is_allowed_all([ContentUsage::Reference, ContentUsage::Inherit]));
        assert!(level.is_allowed_all([]));
    }

    #[test]
    fn test_child_node_classification() {
        assert_eq!(
            ContentClassification::Final.child_node_classification(),
            ContentClassification::InternalChild
        );
        for level in ContentClassification::ALL {
            if level != ContentClassification::Final {
                assert_eq!(level.child_node_classification(), level);
            }
        }
    }

    #[test]
    fn test_strictness_ordering() {
        assert!(ContentClassification::Internal < ContentClassification::Public);
        assert!(ContentClassification::Internal.is_stricter_than(ContentClassification::Final));
        assert!(!ContentClassification::Public.is_stricter_than(ContentClassification::Public));
        assert_eq!(
            ContentClassification::Abstract.strictest(ContentClassification::Final),
            ContentClassification::Final
        );
    }

    #[test]
    fn test_mixin_labels() {
        assert_eq!(ContentClassification::Internal.label(), "granite:InternalArea");
        assert!(ContentClassification::Internal.is_label_mixin());
        assert!(!ContentClassification::InternalChild.is_label_mixin());
        let mixins: Vec<_> = ContentClassification::ALL
            .into_iter()
            .filter(|level| level.is_label_mixin())
            .collect();
        assert_eq!(mixins.len(), 4);
    }

    #[test]
    fn test_unknown_classification() {
        let err = "SECRET".parse::<ContentClassification>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownClassification(ref v) if v == "SECRET"));
        // identifiers are case sensitive
        assert!("final".parse::<ContentClassification>().is_err());
    }

    #[test]
    fn test_serde_uses_identifiers() {
        let json = serde_json::to_string(&ContentClassification::InternalDeprecatedAnnotation).unwrap();
        assert_eq!(json, "\"INTERNAL_DEPRECATED_ANNOTATION\"");
        let level: ContentClassification = serde_json::from_str("\"FINAL\"").unwrap();
        assert_eq!(level, ContentClassification::Final);
        let severity: Severity = serde_json::from_str("\"WARN\"").unwrap();
        assert_eq!(severity, Severity::Warn);
    }

    #[test]
    fn test_usage_labels_and_parse() {
        assert_eq!(ContentUsage::Overlay.label(), "overlays");
        assert_eq!(ContentUsage::Inherit.label(), "inherits from");
        assert_eq!(ContentUsage::Reference.label(), "references");
        assert_eq!("reference".parse::<ContentUsage>().unwrap(), ContentUsage::Reference);
        assert!("include".parse::<ContentUsage>().is_err());
    }

    #[test]
    fn test_severity_parse_and_order() {
        assert_eq!(" ERROR ".parse::<Severity>().unwrap(), Severity::Error);
        assert!("FATAL".parse::<Severity>().is_err());
        assert!(Severity::Info < Severity::Error);
        assert_eq!(Severity::default(), Severity::Error);
    }
}
