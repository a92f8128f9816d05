//! Extraction of literal resource types from HTL and JSP scripts.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// `data-sly-resource="${'path' @ resourceType='some/type'}"` with the
/// resource type given as a string literal in single or double quotes.
const HTL_RESOURCE_TYPE: &str =
    r#"data-sly-resource\s*=[^@]*.*?resourceType\s*=\s*(?:"|')([^'"]*)(?:"|')"#;

/// `<cq:include ... resourceType="some/type" ... />` and the same for
/// `<sling:include>`.
const JSP_RESOURCE_TYPE: &str = r#"(?:<cq:|<sling:)include\b[^>]*?\bresourceType\s*=\s*"([^"]*)""#;

static HTL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(HTL_RESOURCE_TYPE).expect("HTL resource type regex is valid"));

static JSP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(JSP_RESOURCE_TYPE).expect("JSP resource type regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Htl,
    Jsp,
}

impl ScriptKind {
    /// Kind of the script at `path`, `None` for files which are not scanned.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("html") => Some(ScriptKind::Htl),
            Some("jsp") => Some(ScriptKind::Jsp),
            _ => None,
        }
    }
}

/// A resource type found in a script, with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptResourceType<'a> {
    pub line: usize,
    pub resource_type: &'a str,
}

/// All literal resource types in `content`, line by line. Matches never
/// span lines.
pub(crate) fn resource_types(
    kind: ScriptKind,
    content: &str,
) -> impl Iterator<Item = ScriptResourceType<'_>> + '_ {
    let pattern: &'static Regex = match kind {
        ScriptKind::Htl => &*HTL_REGEX,
        ScriptKind::Jsp => &*JSP_REGEX,
    };
    content.lines().enumerate().flat_map(move |(index, line)| {
        pattern
            .captures_iter(line)
            .filter_map(|captures| captures.get(1))
            .map(move |found| ScriptResourceType {
                line: index + 1,
                resource_type: found.as_str(),
            })
    })
}
