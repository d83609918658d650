// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};

use super::extract::{IdPath, JsonBody};
use crate::{
    auth::Owner,
    error::{ApiError, ErrorBody},
    models::ApiResponse,
    state::AppState,
    storage::{Address, AddressRepository},
    validation::{CreateAddressRequest, UpdateAddressRequest},
};

#[utoipa::path(
    get,
    path = "/addresses/",
    tag = "Addresses",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ApiResponse<Vec<Address>>),
        (status = 401, body = ErrorBody)
    )
)]
pub async fn list_addresses(
    owner: Owner,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Address>>>, ApiError> {
    let addresses = AddressRepository::new(&state.db).list(owner.person_id())?;
    Ok(Json(ApiResponse::new(addresses)))
}

/// Create an address. A profile holds at most one address per type.
#[utoipa::path(
    post,
    path = "/addresses/",
    tag = "Addresses",
    security(("bearer" = [])),
    request_body = CreateAddressRequest,
    responses(
        (status = 201, body = ApiResponse<Address>),
        (status = 400, description = "Invalid payload or duplicate address type", body = ErrorBody),
        (status = 401, body = ErrorBody)
    )
)]
pub async fn create_address(
    owner: Owner,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateAddressRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Address>>), ApiError> {
    let new = request.validate()?;
    let address = AddressRepository::new(&state.db).create(owner.person_id(), new)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(address))))
}

#[utoipa::path(
    get,
    path = "/addresses/{address_id}/",
    tag = "Addresses",
    security(("bearer" = [])),
    params(("address_id" = u64, Path, description = "Address identifier")),
    responses(
        (status = 200, body = ApiResponse<Address>),
        (status = 401, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn get_address(
    owner: Owner,
    State(state): State<AppState>,
    IdPath(address_id): IdPath<u64>,
) -> Result<Json<ApiResponse<Address>>, ApiError> {
    let address = AddressRepository::new(&state.db).get(owner.person_id(), address_id)?;
    Ok(Json(ApiResponse::new(address)))
}

/// Partially update an address. Only supplied fields are validated.
#[utoipa::path(
    put,
    path = "/addresses/{address_id}/",
    tag = "Addresses",
    security(("bearer" = [])),
    params(("address_id" = u64, Path, description = "Address identifier")),
    request_body = UpdateAddressRequest,
    responses(
        (status = 200, body = ApiResponse<Address>),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn update_address(
    owner: Owner,
    State(state): State<AppState>,
    IdPath(address_id): IdPath<u64>,
    JsonBody(request): JsonBody<UpdateAddressRequest>,
) -> Result<Json<ApiResponse<Address>>, ApiError> {
    let repo = AddressRepository::new(&state.db);
    // A foreign id is 404 even when the body is invalid.
    repo.get(owner.person_id(), address_id)?;
    let changes = request.validate()?;
    let address = repo.update(owner.person_id(), address_id, changes)?;
    Ok(Json(ApiResponse::new(address)))
}

#[utoipa::path(
    delete,
    path = "/addresses/{address_id}/",
    tag = "Addresses",
    security(("bearer" = [])),
    params(("address_id" = u64, Path, description = "Address identifier")),
    responses(
        (status = 204),
        (status = 401, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn delete_address(
    owner: Owner,
    State(state): State<AppState>,
    IdPath(address_id): IdPath<u64>,
) -> Result<StatusCode, ApiError> {
    AddressRepository::new(&state.db).delete(owner.person_id(), address_id)?;
    Ok(StatusCode::NO_CONTENT)
}
