// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::Json;

use crate::auth::{Auth, Identity};
use crate::models::ApiResponse;

/// Echo the identity the authority reports for the caller's token.
///
/// Connectivity check between this service and the identity authority.
/// Does not create a profile.
#[utoipa::path(
    get,
    path = "/test-auth/",
    tag = "Identity",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ApiResponse<Identity>),
        (status = 401, body = crate::error::ErrorBody)
    )
)]
pub async fn test_auth(Auth(identity): Auth) -> Json<ApiResponse<Identity>> {
    Json(ApiResponse::new(identity))
}
