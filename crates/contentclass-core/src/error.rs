use thiserror::Error;

/// Errors raised while interpreting identifiers of the fixed vocabularies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("unknown content classification: '{0}'")]
    UnknownClassification(String),

    #[error("unknown content usage: '{0}'")]
    UnknownUsage(String),

    #[error("unknown severity: '{0}'")]
    UnknownSeverity(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
