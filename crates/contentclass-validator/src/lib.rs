//! Content Classification Validator
//!
//! Checks how content uses resource paths against a classification map:
//! referencing a resource type, inheriting from a resource super type, and
//! overlaying a library path from the overlay area. Disallowed usages are
//! reported as [`Violation`]s with a severity per classification.
//!
//! Key features:
//! - Single usage checks via [`ContentClassificationValidator::evaluate`]
//! - Structured content nodes, plain files and HTL/JSP scripts as inputs
//! - Overlay violations reported once per [`ValidationRun`]
//! - Setup from a flat option map via [`settings::build_validator`]

pub mod error;
pub mod script;
pub mod settings;
pub mod validator;
pub mod violation;

// Re-export primary types for convenience
pub use error::{ValidatorError, ValidatorResult};
pub use script::ScriptKind;
pub use settings::{build_validator, FileSystemMapSource, MapSource, ValidatorSettings};
pub use validator::{ContentClassificationValidator, ContentNode, ValidationRun};
pub use violation::{UsageSubject, Violation};
