//! Content Classification Maps
//!
//! Hierarchical classification of repository paths. Every path resolves to a
//! [`ContentClassification`](contentclass_core::ContentClassification), either
//! from an explicit entry or inherited from its nearest classified ancestor.
//!
//! Key features:
//! - Nearest-ancestor lookup with child overrides (children of a FINAL area are INTERNAL_CHILD)
//! - Whitelist patterns that force individual paths to PUBLIC
//! - Composite maps answering with the strictest classification of all members
//! - Pure merge of two indices, pruning looser entries below stricter ones
//! - CSV wire format with a label comment line

pub mod codec;
pub mod composite;
pub mod deprecation;
pub mod error;
pub mod index;
pub mod map;
pub mod merge;
pub mod whitelist;

// Re-export primary types for convenience
pub use codec::{read_index, write_index};
pub use composite::CompositeClassificationMap;
pub use deprecation::mark_deprecated;
pub use error::{MapError, MapResult};
pub use index::{ClassificationIndex, IndexEntry};
pub use map::{ClassificationMap, Resolution};
pub use merge::merge;
pub use whitelist::WhitelistPatterns;
