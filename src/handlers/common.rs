use axum::extract::rejection::{JsonRejection, QueryRejection};

use crate::errors::ServiceError;

/// Message used for bodies that cannot be read as the expected schema.
pub const INVALID_REQUEST_DATA: &str = "Invalid request data";

/// Malformed or mistyped JSON bodies become a 400 listing the parse problem.
pub fn json_rejection(rejection: JsonRejection) -> ServiceError {
    ServiceError::ValidationError(vec![rejection.body_text()])
}

pub fn query_rejection(rejection: QueryRejection) -> ServiceError {
    ServiceError::ValidationError(vec![rejection.body_text()])
}
