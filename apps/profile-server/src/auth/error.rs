// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

/// Why the identity authority could not answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unavailable {
    #[error("HTTP {0}")]
    Status(u16),
    #[error("timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
}

/// Failure to resolve a bearer token into an [`super::Identity`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// No bearer token on the request. No upstream call was made.
    #[error("authorization token is missing")]
    MissingToken,

    /// The authority answered 401.
    #[error("identity authority rejected the token")]
    InvalidToken,

    /// 5xx, timeout or connection failure, after retries.
    #[error("identity authority unavailable: {0}")]
    AuthorityUnavailable(Unavailable),

    /// Any other status, or a 200 without a usable `data` object.
    #[error("unexpected identity authority response: {0}")]
    UnexpectedResponse(String),

    /// The identity lacks fields this service relies on.
    #[error("malformed identity: {0}")]
    MalformedIdentity(String),
}

impl IdentityError {
    /// Only server-side failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            IdentityError::AuthorityUnavailable(Unavailable::Status(status)) if *status >= 500
        )
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
