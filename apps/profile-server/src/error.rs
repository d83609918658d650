// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Boundary error type.
//!
//! Every layer has its own error enum. They all convert into [`ApiError`],
//! which renders the failure envelope `{"success": false, "message": ...}`.
//! Messages are fixed per variant; store and upstream details are logged,
//! never returned.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{IdentityError, OwnershipError};
use crate::models::AddressType;
use crate::storage::StoreError;
use crate::validation::ValidationError;

const AUTH_FAILED: &str = "Authentication failed. Please login again.";
const INTERNAL: &str = "Internal server error. Please contact support.";

#[derive(Debug)]
pub enum ApiError {
    MissingToken,
    InvalidToken,
    /// The authority could not be reached or answered 5xx.
    AuthorityUnavailable(String),
    UnexpectedResponse(String),
    ValidationFailed(ValidationError),
    DuplicateAddressType(AddressType),
    InvalidCardBrand(String),
    CardLimitExceeded(usize),
    MalformedBody(String),
    NotFound(&'static str),
    /// The identity authority returned an identity this service cannot use.
    MalformedIdentity(String),
    Internal(String),
}

/// Failure envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    pub message: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingToken
            | ApiError::InvalidToken
            | ApiError::AuthorityUnavailable(_)
            | ApiError::UnexpectedResponse(_) => StatusCode::UNAUTHORIZED,
            ApiError::ValidationFailed(_)
            | ApiError::DuplicateAddressType(_)
            | ApiError::InvalidCardBrand(_)
            | ApiError::CardLimitExceeded(_)
            | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MalformedIdentity(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the client.
    pub fn message(&self) -> String {
        match self {
            ApiError::MissingToken => "Authorization token is missing.".to_string(),
            ApiError::InvalidToken
            | ApiError::AuthorityUnavailable(_)
            | ApiError::UnexpectedResponse(_) => AUTH_FAILED.to_string(),
            ApiError::ValidationFailed(error) => error.to_string(),
            ApiError::DuplicateAddressType(address_type) => {
                format!("An address of type '{address_type}' already exists.")
            }
            ApiError::InvalidCardBrand(message) => message.clone(),
            ApiError::CardLimitExceeded(limit) => {
                format!("Maximum {limit} cards allowed per user.")
            }
            ApiError::MalformedBody(_) => "Invalid input. Please check your data.".to_string(),
            ApiError::NotFound(resource) => format!("{} not found.", capitalize(resource)),
            ApiError::MalformedIdentity(_) | ApiError::Internal(_) => INTERNAL.to_string(),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::AuthorityUnavailable(detail) | ApiError::UnexpectedResponse(detail) => {
                tracing::warn!(detail = %detail, "Identity authority failure")
            }
            ApiError::MalformedBody(detail) => {
                tracing::debug!(detail = %detail, "Rejected request body")
            }
            ApiError::MalformedIdentity(detail) => {
                tracing::error!(detail = %detail, "Identity authority returned an unusable identity")
            }
            ApiError::Internal(detail) => tracing::error!(detail = %detail, "Internal error"),
            _ => {}
        }

        let body = Json(ErrorBody {
            success: false,
            message: self.message(),
        });
        (status, body).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::MissingToken => ApiError::MissingToken,
            IdentityError::InvalidToken => ApiError::InvalidToken,
            IdentityError::AuthorityUnavailable(reason) => {
                ApiError::AuthorityUnavailable(reason.to_string())
            }
            IdentityError::UnexpectedResponse(detail) => ApiError::UnexpectedResponse(detail),
            IdentityError::MalformedIdentity(detail) => ApiError::MalformedIdentity(detail),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { resource, .. } => ApiError::NotFound(resource),
            StoreError::DuplicateAddressType { address_type, .. } => {
                ApiError::DuplicateAddressType(address_type)
            }
            StoreError::CardLimitExceeded { limit, .. } => ApiError::CardLimitExceeded(limit),
            StoreError::InvalidCardBrand { card_type, brand } => ApiError::InvalidCardBrand(
                ValidationError::CardBrand { card_type, brand }.to_string(),
            ),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::CardBrand { .. } => ApiError::InvalidCardBrand(error.to_string()),
            ValidationError::Field { .. } => ApiError::ValidationFailed(error),
        }
    }
}

impl From<OwnershipError> for ApiError {
    fn from(error: OwnershipError) -> Self {
        match error {
            OwnershipError::Store(store) => store.into(),
            other => ApiError::MalformedIdentity(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

/// Non-integer or out-of-range ids in the path match no record.
impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::NotFound("resource")
    }
}
