use contentclass_core::CoreError;
use thiserror::Error;

/// Errors raised while building, parsing or querying classification maps.
///
/// Lookups fail only for caller errors (malformed paths) and for maps missing
/// their mandatory root entry. Everything else is a setup-time failure.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("only absolute resource paths are supported, but resource path given is '{0}'")]
    InvalidPath(String),

    #[error("resource path must not end with '/' but is '{0}'")]
    MalformedPath(String),

    #[error("could not find a classification for resource path '{0}'")]
    NoClassificationFound(String),

    #[error("a composite map must consist of at least one map")]
    EmptyComposite,

    #[error("invalid whitelist pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("error in line {line} of '{origin}': {message}")]
    Parse {
        origin: String,
        line: u64,
        message: String,
    },

    #[error("classification map is not 7-bit clean: {0}")]
    Encoding(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MapResult<T> = Result<T, MapError>;
