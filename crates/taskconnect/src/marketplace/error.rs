use std::fmt;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::domain::{ApplicationId, JobId, ProfessionalBodyId};
use super::lifecycle::ApplicationStatus;
use super::repository::RepositoryError;
use crate::auth::{CredentialError, Role};

/// Why an access check refused the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDenied {
    RoleMismatch { required: Role, actual: Role },
    NotOwner { job: JobId, owner: ProfessionalBodyId },
    SelfOwnedJob { job: JobId },
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessDenied::RoleMismatch { required, actual } => {
                write!(f, "requires role {required}, caller is {actual}")
            }
            AccessDenied::NotOwner { job, owner } => {
                write!(f, "job {job} is owned by professional body {owner}")
            }
            AccessDenied::SelfOwnedJob { job } => {
                write!(f, "job {job} was posted by the caller")
            }
        }
    }
}

/// Every guard failure the marketplace reports. Nothing is swallowed or retried.
#[derive(Debug, thiserror::Error)]
pub enum MarketplaceError {
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },
    #[error("access denied: {0}")]
    AccessDenied(AccessDenied),
    #[error("duplicate {resource}: {detail}")]
    Duplicate {
        resource: &'static str,
        detail: String,
    },
    #[error("application {application} has already been {current}")]
    InvalidTransition {
        application: ApplicationId,
        current: ApplicationStatus,
    },
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("authentication failed: {0}")]
    Unauthenticated(CredentialError),
    #[error("{collaborator} unavailable: {reason}")]
    UpstreamUnavailable {
        collaborator: &'static str,
        reason: String,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Stable classification of [`MarketplaceError`] used for status codes and payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AccessDenied,
    Duplicate,
    InvalidTransition,
    ValidationFailed,
    Unauthenticated,
    UpstreamUnavailable,
    Storage,
}

impl ErrorKind {
    pub const fn label(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::AccessDenied => "access_denied",
            ErrorKind::Duplicate => "duplicate",
            ErrorKind::InvalidTransition => "invalid_transition",
            ErrorKind::ValidationFailed => "validation_failed",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::UpstreamUnavailable => "upstream_unavailable",
            ErrorKind::Storage => "storage",
        }
    }
}

impl MarketplaceError {
    pub fn not_found(resource: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn email_taken(email: &str) -> Self {
        Self::Duplicate {
            resource: "email",
            detail: format!("{} is already registered", email.trim()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MarketplaceError::NotFound { .. } => ErrorKind::NotFound,
            MarketplaceError::AccessDenied(_) => ErrorKind::AccessDenied,
            MarketplaceError::Duplicate { .. } => ErrorKind::Duplicate,
            MarketplaceError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            MarketplaceError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            MarketplaceError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            MarketplaceError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            MarketplaceError::Repository(_) => ErrorKind::Storage,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            MarketplaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            MarketplaceError::AccessDenied(_) => StatusCode::FORBIDDEN,
            MarketplaceError::Duplicate { .. } | MarketplaceError::InvalidTransition { .. } => {
                StatusCode::CONFLICT
            }
            MarketplaceError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            MarketplaceError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            MarketplaceError::UpstreamUnavailable { .. } => StatusCode::BAD_GATEWAY,
            MarketplaceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            MarketplaceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            MarketplaceError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<AccessDenied> for MarketplaceError {
    fn from(value: AccessDenied) -> Self {
        Self::AccessDenied(value)
    }
}

impl From<CredentialError> for MarketplaceError {
    fn from(value: CredentialError) -> Self {
        match value {
            CredentialError::Signing(reason) | CredentialError::Hashing(reason) => {
                Self::UpstreamUnavailable {
                    collaborator: "credential service",
                    reason,
                }
            }
            other => Self::Unauthenticated(other),
        }
    }
}

impl From<JsonRejection> for MarketplaceError {
    fn from(value: JsonRejection) -> Self {
        Self::ValidationFailed(value.body_text())
    }
}

impl IntoResponse for MarketplaceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "marketplace request failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind().label(),
        }));
        (status, body).into_response()
    }
}
