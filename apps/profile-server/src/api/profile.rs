// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use super::extract::JsonBody;
use crate::{
    auth::Owner,
    error::{ApiError, ErrorBody},
    models::ApiResponse,
    state::AppState,
    storage::{Profile, ProfileRepository},
    validation::UpdateProfileRequest,
};

/// Fetch the caller's profile, creating it on first access.
#[utoipa::path(
    get,
    path = "/profile/",
    tag = "Profile",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ApiResponse<Profile>),
        (status = 401, body = ErrorBody)
    )
)]
pub async fn get_profile(owner: Owner) -> Json<ApiResponse<Profile>> {
    Json(ApiResponse::new(owner.profile))
}

/// Partially update the caller's profile.
///
/// `person_id` and `email` are ignored if present in the body.
#[utoipa::path(
    put,
    path = "/profile/",
    tag = "Profile",
    security(("bearer" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, body = ApiResponse<Profile>),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody)
    )
)]
pub async fn update_profile(
    owner: Owner,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<Profile>>, ApiError> {
    let changes = request.validate()?;
    let profile = ProfileRepository::new(&state.db).update(owner.person_id(), changes)?;
    Ok(Json(ApiResponse::new(profile)))
}
