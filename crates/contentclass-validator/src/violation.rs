use contentclass_core::{ContentClassification, ContentUsage, Severity};
use serde::Serialize;

/// Who uses a resource path, as named in violation messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageSubject {
    /// A structured content element, named by its label.
    Element(String),
    /// A file as a whole, e.g. a script or a file below the overlay area.
    File,
}

impl UsageSubject {
    pub fn element(name: impl Into<String>) -> Self {
        UsageSubject::Element(name.into())
    }

    fn phrase(&self) -> String {
        match self {
            UsageSubject::Element(name) => format!("Element with name \"{name}\""),
            UsageSubject::File => "This file".to_string(),
        }
    }

    fn element_name(&self) -> Option<String> {
        match self {
            UsageSubject::Element(name) => Some(name.clone()),
            UsageSubject::File => None,
        }
    }
}

/// A message produced while validating content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub severity: Severity,
    pub message: String,
    /// Label of the element the message was raised against, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
}

impl Violation {
    pub(crate) fn usage(
        severity: Severity,
        subject: &UsageSubject,
        usage: ContentUsage,
        resource_path: &str,
        classification: ContentClassification,
        remark: Option<&str>,
    ) -> Self {
        let mut message = format!(
            "{} {} resource '{}' which is marked as '{}'. It therefore violates the content classification!",
            subject.phrase(),
            usage.label(),
            resource_path,
            classification.label()
        );
        if let Some(remark) = remark.filter(|r| !r.trim().is_empty()) {
            message.push_str(" Remark: ");
            message.push_str(remark);
        }
        Self {
            severity,
            message,
            element: subject.element_name(),
        }
    }

    pub(crate) fn malformed_path(severity: Severity, subject: &UsageSubject, resource_path: &str) -> Self {
        Self {
            severity,
            message: format!("Resource path must not end with '/' but is '{resource_path}'"),
            element: subject.element_name(),
        }
    }

    pub(crate) fn info(message: String) -> Self {
        Self {
            severity: Severity::Info,
            message,
            element: None,
        }
    }
}
