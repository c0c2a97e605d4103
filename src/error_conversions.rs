//! Error conversion glue between the domain and persistence layers.
//!
//! Value objects only know about [`TypeConstraintError`]; the service layer
//! conversion lives next to `ServiceError` because it needs the `server`
//! feature.

use crate::domain::types::TypeConstraintError;
use crate::repository::errors::RepositoryError;

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(val: serde_json::Error) -> Self {
        RepositoryError::ValidationError(format!("Invalid JSON column: {val}"))
    }
}
