//! Validating a content package against on-disk classification maps.
//!
//! The story:
//!
//! 1. A product map and a cloud map are written to disk
//! 2. A validator is set up from the framework's option map, merging both maps
//! 3. The package's plain files are checked for overlays
//! 4. The package's structured content is checked; overlays seen in step 3 stay quiet
//! 5. The package's scripts are checked for included resource types
//! 6. A second, independent run reports the same overlays again

use std::fs;
use std::path::Path;

use contentclass_core::{ContentClassification, Severity};
use contentclass_validator::settings::{
    OPTION_MAPS, OPTION_SEVERITIES_PER_CLASSIFICATION, OPTION_WHITELISTED_RESOURCE_PATH_PATTERNS,
};
use contentclass_validator::{
    build_validator, ContentClassificationValidator, ContentNode, FileSystemMapSource,
    ValidationRun, ValidatorError, ValidatorSettings,
};

const PRODUCT_MAP: &str = "# 6.5.0\r\n\
/,PUBLIC\r\n\
/libs/cq/gui/components/authoring,INTERNAL,\"Internal authoring UI, do not use\"\r\n\
/libs/foundation/components/page,ABSTRACT\r\n\
/libs/foundation/components/text,FINAL,Use core components\r\n\
/libs/wcm/core/components/teaser,PUBLIC\r\n";

const CLOUD_MAP: &str = "# cloud\r\n\
/libs/wcm/core/components/teaser,FINAL,Teaser may only be referenced\r\n\
/libs/foundation/components/text,ABSTRACT,looser than the product map\r\n";

fn write_maps(dir: &Path) {
    fs::write(dir.join("product.map"), PRODUCT_MAP).unwrap();
    fs::write(dir.join("cloud.map"), CLOUD_MAP).unwrap();
}

fn setup(dir: &Path) -> ContentClassificationValidator {
    write_maps(dir);
    let settings = ValidatorSettings::new(Severity::Error)
        .with_option(OPTION_MAPS, "file:product.map,file:cloud.map")
        .with_option(
            OPTION_WHITELISTED_RESOURCE_PATH_PATTERNS,
            "/libs/cq/gui/components/authoring/dialog",
        )
        .with_option(OPTION_SEVERITIES_PER_CLASSIFICATION, "INTERNAL_CHILD=WARN");
    build_validator(&settings, &FileSystemMapSource::with_base_dir(dir)).unwrap()
}

// ============================================================================
// Chapter 1: Setup merges the maps
// ============================================================================

#[test]
fn chapter_1_setup_merges_maps() {
    let dir = tempfile::tempdir().unwrap();
    let validator = setup(dir.path());

    // the looser cloud entry for text did not weaken the product map
    let summary = validator.summary();
    assert_eq!(summary.severity, Severity::Info);
    assert_eq!(
        summary.message,
        "Successfully checked against classification maps: 6.5.0, cloud (5 entries)"
    );
    assert_eq!(validator.severity_for(ContentClassification::InternalChild), Severity::Warn);
}

// ============================================================================
// Chapter 2: Plain files overlaying protected paths
// ============================================================================

#[test]
fn chapter_2_file_pass_then_docview_pass() {
    let dir = tempfile::tempdir().unwrap();
    let validator = setup(dir.path());
    let mut run = ValidationRun::new();

    let files = [
        "/apps/foundation/components/text/text.jsp",
        "/apps/foundation/components/page/page.jsp",
        "/apps/my-site/components/hero/hero.html",
    ];
    let violations: Vec<_> = files
        .iter()
        .filter_map(|file| validator.validate_file(&mut run, file).unwrap())
        .collect();

    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].severity, Severity::Warn);
    assert_eq!(
        violations[0].message,
        "This file overlays resource '/libs/foundation/components/text/text.jsp' which is marked \
         as 'granite:InternalArea (derived from parent content classification)'. It therefore \
         violates the content classification! Remark: Use core components"
    );

    // structured pass over the same tree: the overlay was already reported
    let node = ContentNode::new("/apps/foundation/components/text/text.jsp");
    assert!(validator.validate_node(&mut run, &node).unwrap().is_empty());

    // but a new overlay still is
    let node = ContentNode::new("/apps/foundation/components/text")
        .with_resource_super_type("wcm/core/components/teaser");
    let violations = validator.validate_node(&mut run, &node).unwrap();
    let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].starts_with(
        "Element with name \"text\" inherits from resource 'wcm/core/components/teaser' which is marked as 'granite:FinalArea'"
    ));
    assert!(messages[0].ends_with("Remark: Teaser may only be referenced"));
    assert!(messages[1].starts_with(
        "Element with name \"text\" overlays resource '/libs/foundation/components/text'"
    ));
}

// ============================================================================
// Chapter 3: Structured content references
// ============================================================================

#[test]
fn chapter_3_references_in_content() {
    let dir = tempfile::tempdir().unwrap();
    let validator = setup(dir.path());
    let mut run = ValidationRun::new();

    let nodes = [
        ContentNode::new("/content/site/en/jcr:content/par/dialog")
            .with_resource_type("cq/gui/components/authoring/dialog"),
        ContentNode::new("/content/site/en/jcr:content/par/editor")
            .with_resource_type("cq/gui/components/authoring/editor"),
        ContentNode::new("/content/site/en/jcr:content/par/teaser")
            .with_resource_type("wcm/core/components/teaser"),
        ContentNode::new("/content/site/en/jcr:content")
            .with_resource_type("foundation/components/page"),
        ContentNode::new("/content/site/en/jcr:content/par/broken")
            .with_resource_type("wcm/core/components/teaser/"),
    ];
    let mut found = Vec::new();
    for node in &nodes {
        found.extend(validator.validate_node(&mut run, node).unwrap());
    }

    // whitelisted dialog, referencable teaser: only the editor, the abstract
    // page and the malformed path are reported
    assert_eq!(found.len(), 3);
    assert_eq!(found[0].element.as_deref(), Some("editor"));
    assert!(found[0].message.contains("'granite:InternalArea'"));
    assert!(found[0].message.ends_with("Remark: Internal authoring UI, do not use"));
    assert_eq!(found[1].element.as_deref(), Some("jcr:content"));
    assert!(found[1].message.contains("'granite:AbstractArea'"));
    assert_eq!(
        found[2].message,
        "Resource path must not end with '/' but is 'wcm/core/components/teaser/'"
    );
    assert_eq!(found[2].severity, Severity::Error);
}

// ============================================================================
// Chapter 4: Scripts
// ============================================================================

#[test]
fn chapter_4_scripts() {
    let dir = tempfile::tempdir().unwrap();
    let validator = setup(dir.path());
    let mut run = ValidationRun::new();

    let htl = r#"<div class="page">
    <sly data-sly-resource="${'header' @ resourceType='foundation/components/page'}"></sly>
    <sly data-sly-resource="${'teaser' @ resourceType='wcm/core/components/teaser'}"></sly>
</div>
"#;
    let violations = validator
        .validate_script(&mut run, "/apps/my-site/components/page/page.html", htl)
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert!(violations[0].message.starts_with(
        "This file references resource 'foundation/components/page' which is marked as 'granite:AbstractArea'"
    ));
    assert!(violations[0].element.is_none());

    let jsp = r#"<%@include file="/libs/foundation/global.jsp"%>
<cq:include path="editor" resourceType="/libs/cq/gui/components/authoring/editor"/>
<sling:include path="par" resourceType="wcm/core/components/teaser"/>
"#;
    let violations = validator
        .validate_script(&mut run, "/apps/my-site/components/page/body.jsp", jsp)
        .unwrap();
    assert_eq!(violations.len(), 1);
    assert!(violations[0].message.contains("/libs/cq/gui/components/authoring/editor"));
}

// ============================================================================
// Chapter 5: Every run starts fresh
// ============================================================================

#[test]
fn chapter_5_runs_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let validator = setup(dir.path());

    let mut first = ValidationRun::new();
    let mut second = ValidationRun::new();
    let path = "/apps/cq/gui/components/authoring/editor";
    assert!(validator.validate_file(&mut first, path).unwrap().is_some());
    assert!(validator.validate_file(&mut first, path).unwrap().is_none());
    assert!(validator.validate_file(&mut second, path).unwrap().is_some());
    assert_eq!(first.reported_overlays(), 1);
    assert_eq!(second.reported_overlays(), 1);
}

// ============================================================================
// Chapter 6: Broken setups fail loudly
// ============================================================================

#[test]
fn chapter_6_broken_setups() {
    let dir = tempfile::tempdir().unwrap();
    write_maps(dir.path());
    let source = FileSystemMapSource::with_base_dir(dir.path());

    let missing = ValidatorSettings::new(Severity::Error);
    assert!(matches!(
        build_validator(&missing, &source),
        Err(ValidatorError::MissingOption(_))
    ));

    let unreadable =
        ValidatorSettings::new(Severity::Error).with_option(OPTION_MAPS, "file:does-not-exist.map");
    assert!(matches!(
        build_validator(&unreadable, &source),
        Err(ValidatorError::MapSource { .. })
    ));

    fs::write(dir.path().join("broken.map"), "# broken\r\n/,PUBLIC\r\n/libs/x,SECRET\r\n").unwrap();
    let broken = ValidatorSettings::new(Severity::Error).with_option(OPTION_MAPS, "broken.map");
    let err = build_validator(&broken, &source).unwrap_err();
    assert!(err.to_string().contains("line 3"), "{err}");
}
