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
    storage::{Card, CardRepository, MAX_CARDS_PER_PROFILE},
    validation::{CreateCardRequest, UpdateCardRequest},
};

#[utoipa::path(
    get,
    path = "/cards/",
    tag = "Cards",
    security(("bearer" = [])),
    responses(
        (status = 200, body = ApiResponse<Vec<Card>>),
        (status = 401, body = ErrorBody)
    )
)]
pub async fn list_cards(
    owner: Owner,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Card>>>, ApiError> {
    let cards = CardRepository::new(&state.db).list(owner.person_id())?;
    Ok(Json(ApiResponse::new(cards)))
}

/// Add a card. At most four cards per profile; the brand must match the
/// card type.
#[utoipa::path(
    post,
    path = "/cards/",
    tag = "Cards",
    security(("bearer" = [])),
    request_body = CreateCardRequest,
    responses(
        (status = 201, body = ApiResponse<Card>),
        (status = 400, description = "Invalid payload, mismatched brand or card limit reached", body = ErrorBody),
        (status = 401, body = ErrorBody)
    )
)]
pub async fn create_card(
    owner: Owner,
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateCardRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Card>>), ApiError> {
    let repo = CardRepository::new(&state.db);
    if repo.count(owner.person_id())? >= MAX_CARDS_PER_PROFILE {
        return Err(ApiError::CardLimitExceeded(MAX_CARDS_PER_PROFILE));
    }

    let new = request.validate()?;
    let card = repo.create(owner.person_id(), new)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(card))))
}

#[utoipa::path(
    get,
    path = "/cards/{card_id}/",
    tag = "Cards",
    security(("bearer" = [])),
    params(("card_id" = u64, Path, description = "Card identifier")),
    responses(
        (status = 200, body = ApiResponse<Card>),
        (status = 401, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn get_card(
    owner: Owner,
    State(state): State<AppState>,
    IdPath(card_id): IdPath<u64>,
) -> Result<Json<ApiResponse<Card>>, ApiError> {
    let card = CardRepository::new(&state.db).get(owner.person_id(), card_id)?;
    Ok(Json(ApiResponse::new(card)))
}

/// Partially update a card. The merged type/brand pair must still match.
#[utoipa::path(
    put,
    path = "/cards/{card_id}/",
    tag = "Cards",
    security(("bearer" = [])),
    params(("card_id" = u64, Path, description = "Card identifier")),
    request_body = UpdateCardRequest,
    responses(
        (status = 200, body = ApiResponse<Card>),
        (status = 400, body = ErrorBody),
        (status = 401, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn update_card(
    owner: Owner,
    State(state): State<AppState>,
    IdPath(card_id): IdPath<u64>,
    JsonBody(request): JsonBody<UpdateCardRequest>,
) -> Result<Json<ApiResponse<Card>>, ApiError> {
    let repo = CardRepository::new(&state.db);
    let current = repo.get(owner.person_id(), card_id)?;
    let changes = request.validate(&current)?;
    let card = repo.update(owner.person_id(), card_id, changes)?;
    Ok(Json(ApiResponse::new(card)))
}

#[utoipa::path(
    delete,
    path = "/cards/{card_id}/",
    tag = "Cards",
    security(("bearer" = [])),
    params(("card_id" = u64, Path, description = "Card identifier")),
    responses(
        (status = 204),
        (status = 401, body = ErrorBody),
        (status = 404, body = ErrorBody)
    )
)]
pub async fn delete_card(
    owner: Owner,
    State(state): State<AppState>,
    IdPath(card_id): IdPath<u64>,
) -> Result<StatusCode, ApiError> {
    CardRepository::new(&state.db).delete(owner.person_id(), card_id)?;
    Ok(StatusCode::NO_CONTENT)
}
