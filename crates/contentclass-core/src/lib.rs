//! Content classification vocabulary.
//!
//! The fixed, linearly ordered set of [`ContentClassification`] levels with
//! their disallowed usages and child overrides, the three [`ContentUsage`]
//! kinds, message [`Severity`] and helpers for repository paths.

pub mod error;
pub mod path;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use types::{ContentClassification, ContentUsage, Severity};
