use thiserror::Error;

/// Error type of the `contentclass` binary, aggregating errors from all
/// workspace crates.
#[derive(Debug, Error)]
pub enum RootError {
    #[error("classification error: {0}")]
    Core(#[from] contentclass_core::CoreError),

    #[error("map error: {0}")]
    Map(#[from] contentclass_map::MapError),

    #[error("validator error: {0}")]
    Validator(#[from] contentclass_validator::ValidatorError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for RootError {
    fn from(e: serde_json::Error) -> Self {
        RootError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for RootError {
    fn from(e: toml::de::Error) -> Self {
        RootError::Config(format!("TOML parse error: {}", e))
    }
}

pub type RootResult<T> = Result<T, RootError>;
