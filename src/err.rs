use crate::annotations::{AnnotationKey, ResourceId};

pub type DirectiveResult<T> = Result<T, DirectiveError>;
pub type ResolverResult<T> = Result<T, ResolverError>;
pub type OperatorResult<T> = Result<T, OperatorError>;

/// Failure of a single lookup against cluster state.
///
/// `NotFound` is kept apart from the other variants: a directive treats a
/// missing object as a configuration mistake, anything else as a lookup
/// that may succeed on the next attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolverError {
    #[error("{kind} {namespace}/{name} was not found")]
    NotFound {
        kind: &'static str,
        namespace: String,
        name: String,
    },
    #[error("Cluster state cache is not synced yet")]
    NotSynced,
    #[error("Lookup failed: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    #[error("Ingress missing required annotation: {key}")]
    MissingAnnotation { key: String },
    #[error("Failed to parse annotation {key}={value:?}: {reason}")]
    InvalidFormat {
        key: String,
        value: String,
        reason: String,
    },
    #[error("Lookup for annotation {key} failed: {source}")]
    ResolverLookupFailed { key: String, source: ResolverError },
    #[error("Annotation {key} is invalid: {reason}")]
    ValidationFailed { key: String, reason: String },
}

impl DirectiveError {
    pub fn missing(key: &AnnotationKey) -> Self {
        Self::MissingAnnotation {
            key: key.to_string(),
        }
    }

    pub fn invalid_format(key: &AnnotationKey, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn validation(key: &AnnotationKey, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Classifies a resolver failure for the directive stored under `key`.
    pub fn from_lookup(key: &AnnotationKey, err: ResolverError) -> Self {
        match err {
            ResolverError::NotFound { .. } => Self::ValidationFailed {
                key: key.to_string(),
                reason: err.to_string(),
            },
            other => Self::ResolverLookupFailed {
                key: key.to_string(),
                source: other,
            },
        }
    }

    /// Full annotation key the error was raised for.
    pub fn key(&self) -> &str {
        match self {
            Self::MissingAnnotation { key }
            | Self::InvalidFormat { key, .. }
            | Self::ResolverLookupFailed { key, .. }
            | Self::ValidationFailed { key, .. } => key,
        }
    }
}

/// A required directive failed, so no record was assembled for the resource.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Ingress {resource} cannot be configured: {source}")]
pub struct EvaluationError {
    pub resource: ResourceId,
    pub source: DirectiveError,
}

#[derive(Debug, thiserror::Error)]
pub enum OperatorError {
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),
    #[error(transparent)]
    EvaluationError(#[from] EvaluationError),
    #[error("{resource}: {directive} was evaluated before the resolver caches synced")]
    CacheNotSynced {
        resource: ResourceId,
        directive: &'static str,
    },
    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}
