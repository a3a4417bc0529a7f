use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LigeroError {
    #[error("Malformed input: {details}")]
    FormatError { details: String },

    #[error("Witness does not satisfy constraint {index}")]
    UnsatisfiedConstraint { index: usize },

    #[error("Parameter validation failed: {constraint}")]
    InvalidParameters { constraint: String },

    #[error("Protocol error during {phase}: {details}")]
    ProtocolError { phase: String, details: String },

    #[error("Merkle tree operation failed: {operation} - {details}")]
    MerkleError { operation: String, details: String },

    #[error("Evaluation domain error: {details}")]
    DomainError { details: String },

    #[error("Serialization error: {details}")]
    SerializationError { details: String },
}

impl LigeroError {
    pub fn format_error(details: &str) -> Self {
        LigeroError::FormatError {
            details: details.to_string(),
        }
    }

    pub fn unsatisfied(index: usize) -> Self {
        LigeroError::UnsatisfiedConstraint { index }
    }

    pub fn invalid_parameters(constraint: &str) -> Self {
        LigeroError::InvalidParameters {
            constraint: constraint.to_string(),
        }
    }

    pub fn protocol_error(phase: &str, details: &str) -> Self {
        LigeroError::ProtocolError {
            phase: phase.to_string(),
            details: details.to_string(),
        }
    }

    pub fn merkle_error(operation: &str, details: &str) -> Self {
        LigeroError::MerkleError {
            operation: operation.to_string(),
            details: details.to_string(),
        }
    }

    pub fn domain_error(details: &str) -> Self {
        LigeroError::DomainError {
            details: details.to_string(),
        }
    }

    pub fn serialization_error(details: &str) -> Self {
        LigeroError::SerializationError {
            details: details.to_string(),
        }
    }

    /// True for failures caused by the caller's input rather than by the protocol run.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            LigeroError::FormatError { .. }
                | LigeroError::InvalidParameters { .. }
                | LigeroError::UnsatisfiedConstraint { .. }
        )
    }
}

/// Result type alias for convenience
pub type LigeroResult<T> = Result<T, LigeroError>;

impl From<bincode::Error> for LigeroError {
    fn from(err: bincode::Error) -> Self {
        LigeroError::FormatError {
            details: format!("bincode: {err}"),
        }
    }
}

impl From<serde_json::Error> for LigeroError {
    fn from(err: serde_json::Error) -> Self {
        LigeroError::FormatError {
            details: format!("json: {err}"),
        }
    }
}

impl From<std::io::Error> for LigeroError {
    fn from(err: std::io::Error) -> Self {
        LigeroError::FormatError {
            details: format!("io: {err}"),
        }
    }
}
