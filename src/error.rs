use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaticaError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("inconsistent state: {0}")]
    Inconsistent(String),
    #[error("model not found: {0}")]
    ModelNotFound(String),
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("mail error: {0}")]
    Mail(String),
}

impl PlaticaError {
    /// Stable machine-readable kind surfaced to API clients alongside the
    /// human-readable message.
    pub fn kind(&self) -> &'static str {
        match self {
            PlaticaError::Unauthenticated(_) => "UNAUTHENTICATED",
            PlaticaError::Forbidden(_) => "FORBIDDEN",
            PlaticaError::NotFound(_) => "NOT_FOUND",
            PlaticaError::InvalidArgument(_) => "INVALID_ARGUMENT",
            PlaticaError::Conflict(_) => "CONFLICT",
            PlaticaError::Inconsistent(_) => "INTERNAL_INCONSISTENCY",
            PlaticaError::ModelNotFound(_) => "MODEL_NOT_FOUND",
            PlaticaError::BackendUnavailable(_) => "BACKEND_UNAVAILABLE",
            PlaticaError::Config(_) => "CONFIG_ERROR",
            PlaticaError::Storage(_) => "STORAGE_ERROR",
            PlaticaError::Serialization(_) => "SERIALIZATION_ERROR",
            PlaticaError::Mail(_) => "MAIL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, PlaticaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_stable() {
        let err = PlaticaError::Inconsistent("chat link failed".to_string());
        assert_eq!(err.kind(), "INTERNAL_INCONSISTENCY");
        assert!(format!("{err}").contains("inconsistent state"));

        let err = PlaticaError::InvalidArgument("limit (0) must be between 1-100".to_string());
        assert_eq!(err.kind(), "INVALID_ARGUMENT");
    }
}
