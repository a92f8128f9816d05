use contentclass_map::MapError;
use thiserror::Error;

/// Errors raised while setting up or running a validator.
#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("mandatory option '{0}' missing")]
    MissingOption(String),

    #[error("invalid value for option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    #[error("could not read classification map from '{location}': {source}")]
    MapSource {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Map(#[from] MapError),
}

pub type ValidatorResult<T> = Result<T, ValidatorError>;
