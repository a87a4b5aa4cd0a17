use std::fmt;

/// A single failed check on a request field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldIssue {
    /// Dotted path of the offending field, e.g. `guardian.phone` or `given[1]`.
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("validation failed: {}", join_issues(.0))]
    Validation(Vec<FieldIssue>),

    #[error("{resource_type}/{id} not found")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("resource store is unavailable")]
    StoreUnavailable,

    #[error("invalid identifier: {0}")]
    InvalidId(#[from] paeds_uuid::UuidError),

    #[error("FHIR error: {0}")]
    Fhir(#[from] fhir::FhirError),

    #[error("stored {resource_type} is malformed: {detail}")]
    Corrupt {
        resource_type: &'static str,
        detail: String,
    },
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl CoreError {
    pub fn not_found(resource_type: &'static str, id: impl fmt::Display) -> Self {
        CoreError::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    pub fn corrupt(resource_type: &'static str, detail: impl Into<String>) -> Self {
        CoreError::Corrupt {
            resource_type,
            detail: detail.into(),
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
