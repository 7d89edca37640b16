use shared::{
    domain::{Stage, SubmissionId},
    error::{ApiError, ErrorCode},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid service url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed {endpoint} response: {reason}")]
    Malformed {
        endpoint: &'static str,
        reason: String,
    },
}

impl ServiceError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::InvalidUrl { .. } | ServiceError::ClientBuild(_) => ErrorCode::Internal,
            ServiceError::Transport { .. } => ErrorCode::Transport,
            ServiceError::Status { .. } => ErrorCode::Status,
            ServiceError::Malformed { .. } => ErrorCode::Malformed,
        }
    }
}

impl From<&ServiceError> for ApiError {
    fn from(value: &ServiceError) -> Self {
        ApiError::new(value.code(), value.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        ApiError::from(&value)
    }
}

/// Rejected intake operations. A rejected operation never changes session state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntakeError {
    #[error("{operation} is not available in the {stage} stage")]
    WrongStage {
        operation: &'static str,
        stage: Stage,
    },
    #[error("a name is required before continuing")]
    IdentityRequired,
    #[error("symptom catalog is not available")]
    CatalogUnavailable,
    #[error("'{0}' is not a recognized symptom")]
    UnknownSymptom(String),
    #[error("submission {0} is still awaiting a diagnosis")]
    SubmissionInFlight(SubmissionId),
}
