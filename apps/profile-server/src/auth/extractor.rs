// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated callers.
//!
//! ```rust,ignore
//! async fn whoami(Auth(identity): Auth) -> impl IntoResponse {
//!     // identity was resolved by the identity authority
//! }
//!
//! async fn my_cards(owner: Owner, State(state): State<AppState>) -> ... {
//!     // owner.person_id() scopes every query
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{ensure_profile, Identity, IdentityError};
use crate::error::ApiError;
use crate::state::AppState;
use crate::storage::Profile;

/// Extract the bearer token from the `Authorization` header.
///
/// A missing header, a non-`Bearer` scheme and an empty token all count as
/// no token.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, IdentityError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(IdentityError::MissingToken)
}

/// Extractor for a resolved [`Identity`].
///
/// The identity is cached in request extensions, so extracting it twice in
/// one request calls the authority once.
pub struct Auth(pub Identity);

impl FromRequestParts<AppState> for Auth {
    type Rejection = IdentityError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>().cloned() {
            return Ok(Auth(identity));
        }

        let token = bearer_token(&parts.headers)?;
        let identity = state.identity.resolve(token).await.inspect_err(|error| {
            tracing::warn!(error = %error, path = %parts.uri.path(), "Identity resolution failed");
        })?;

        parts.extensions.insert(identity.clone());
        Ok(Auth(identity))
    }
}

/// Extractor for the caller's own profile, created on first access.
///
/// Every handler that touches profile data takes an `Owner`; the store
/// queries it issues are keyed by [`Owner::person_id`].
pub struct Owner {
    pub identity: Identity,
    pub profile: Profile,
}

impl Owner {
    pub fn person_id(&self) -> i64 {
        self.profile.person_id
    }
}

impl FromRequestParts<AppState> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(identity) = Auth::from_request_parts(parts, state).await?;
        let profile = ensure_profile(&state.db, &identity)?;
        Ok(Owner { identity, profile })
    }
}
