// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::Identity,
    error::{ApiError, ErrorBody},
    state::AppState,
    storage::{Address, Card, Profile},
    validation::{
        CreateAddressRequest, CreateCardRequest, UpdateAddressRequest, UpdateCardRequest,
        UpdateProfileRequest,
    },
};

pub mod addresses;
pub mod cards;
pub mod extract;
pub mod health;
pub mod identity;
pub mod profile;

pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health/", get(health::liveness))
        .route("/health/ready/", get(health::readiness))
        .route("/test-auth/", get(identity::test_auth))
        .route(
            "/profile/",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route(
            "/addresses/",
            get(addresses::list_addresses).post(addresses::create_address),
        )
        .route(
            "/addresses/{address_id}/",
            get(addresses::get_address)
                .put(addresses::update_address)
                .delete(addresses::delete_address),
        )
        .route(
            "/cards/",
            get(cards::list_cards).post(cards::create_card),
        )
        .route(
            "/cards/{card_id}/",
            get(cards::get_card)
                .put(cards::update_card)
                .delete(cards::delete_card),
        )
        .fallback(unknown_route)
        .with_state(state);

    routes
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

async fn unknown_route() -> ApiError {
    ApiError::NotFound("resource")
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Profile Service",
        description = "User profiles, addresses and payment cards"
    ),
    paths(
        health::liveness,
        health::readiness,
        identity::test_auth,
        profile::get_profile,
        profile::update_profile,
        addresses::list_addresses,
        addresses::create_address,
        addresses::get_address,
        addresses::update_address,
        addresses::delete_address,
        cards::list_cards,
        cards::create_card,
        cards::get_card,
        cards::update_card,
        cards::delete_card
    ),
    components(
        schemas(
            Profile,
            Address,
            Card,
            Identity,
            ErrorBody,
            UpdateProfileRequest,
            CreateAddressRequest,
            UpdateAddressRequest,
            CreateCardRequest,
            UpdateCardRequest,
            health::HealthResponse,
            health::ReadyResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Identity", description = "Identity authority connectivity"),
        (name = "Profile", description = "The caller's own profile"),
        (name = "Addresses", description = "Addresses owned by the caller"),
        (name = "Cards", description = "Payment cards owned by the caller")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{IdentityError, Unavailable};
    use crate::storage::ProfileRepository;
    use crate::testing::{test_state, FakeAuthority};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    const ANN: &str = "ann-token";
    const BOB: &str = "bob-token";

    fn app() -> (Router, AppState, tempfile::TempDir) {
        let authority = FakeAuthority::new()
            .with_user(ANN, 1, "ann@example.com")
            .with_user(BOB, 2, "bob@example.com")
            .with_answer(
                "down-token",
                Err(IdentityError::AuthorityUnavailable(Unavailable::Status(503))),
            );
        let (state, dir) = test_state(authority);
        (router(state.clone()), state, dir)
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn health_needs_no_token() {
        let (app, _state, _dir) = app();
        let (status, body) = call(&app, Method::GET, "/health/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, _) = call(&app, Method::GET, "/health/ready/", None, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn missing_token_is_401_and_store_untouched() {
        let (app, state, _dir) = app();
        for uri in ["/profile/", "/addresses/", "/cards/", "/test-auth/"] {
            let (status, body) = call(&app, Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], "Authorization token is missing.");
        }
        assert!(ProfileRepository::new(&state.db).get(1).unwrap().is_none());
    }

    #[tokio::test]
    async fn authority_outage_is_401() {
        let (app, _state, _dir) = app();
        let (down_status, down) =
            call(&app, Method::GET, "/profile/", Some("down-token"), None).await;
        let (bad_status, bad) = call(&app, Method::GET, "/profile/", Some("nope"), None).await;

        assert_eq!(down_status, StatusCode::UNAUTHORIZED);
        assert_eq!(bad_status, StatusCode::UNAUTHORIZED);
        assert_eq!(down, bad);
    }

    #[tokio::test]
    async fn test_auth_echoes_identity() {
        let (app, state, _dir) = app();
        let (status, body) = call(&app, Method::GET, "/test-auth/", Some(ANN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["person_id"], 1);
        assert!(ProfileRepository::new(&state.db).get(1).unwrap().is_none());
    }

    #[tokio::test]
    async fn profile_is_created_and_updated() {
        let (app, _state, _dir) = app();

        let (status, body) = call(&app, Method::GET, "/profile/", Some(ANN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["person_id"], 1);
        assert_eq!(body["data"]["email"], "ann@example.com");
        assert_eq!(body["data"]["primary_country_code"], "+91");

        let (status, body) = call(
            &app,
            Method::PUT,
            "/profile/",
            Some(ANN),
            Some(r#"{"person_id": 2, "email": "x@example.com", "first_name": "Ann"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["person_id"], 1);
        assert_eq!(body["data"]["email"], "ann@example.com");
        assert_eq!(body["data"]["first_name"], "Ann");

        let (status, body) = call(
            &app,
            Method::PUT,
            "/profile/",
            Some(ANN),
            Some(r#"{"primary_phone": "12345"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "primary_phone: Phone number must be 10 digits.");
    }

    #[tokio::test]
    async fn malformed_json_is_400_envelope() {
        let (app, _state, _dir) = app();
        let (status, body) =
            call(&app, Method::POST, "/addresses/", Some(ANN), Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!({"success": false, "message": "Invalid input. Please check your data."})
        );
    }

    #[tokio::test]
    async fn address_lifecycle_and_isolation() {
        let (app, _state, _dir) = app();
        let home = r#"{"address_type": "home", "line1": "1 Main St"}"#;

        let (status, created) = call(&app, Method::POST, "/addresses/", Some(ANN), Some(home)).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["data"]["id"].as_u64().unwrap();
        assert_eq!(created["data"]["country"], "IN");

        let (status, duplicate) =
            call(&app, Method::POST, "/addresses/", Some(ANN), Some(home)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(duplicate["success"], false);

        let (status, list) = call(&app, Method::GET, "/addresses/", Some(ANN), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["data"].as_array().unwrap().len(), 1);

        // Bob cannot tell Ann's address from one that does not exist.
        let foreign = call(&app, Method::GET, &format!("/addresses/{id}/"), Some(BOB), None).await;
        let missing = call(&app, Method::GET, "/addresses/9999/", Some(BOB), None).await;
        assert_eq!(foreign.0, StatusCode::NOT_FOUND);
        assert_eq!(foreign, missing);

        let (status, _) = call(&app, Method::GET, "/addresses/abc/", Some(ANN), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, updated) = call(
            &app,
            Method::PUT,
            &format!("/addresses/{id}/"),
            Some(ANN),
            Some(r#"{"city": "BLR", "state": "KA"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["city"], "BLR");
        assert_eq!(updated["data"]["line1"], "1 Main St");

        let (status, body) =
            call(&app, Method::DELETE, &format!("/addresses/{id}/"), Some(ANN), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, serde_json::Value::Null);

        let (status, _) =
            call(&app, Method::DELETE, &format!("/addresses/{id}/"), Some(ANN), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn card_limit_and_brand_rules() {
        let (app, _state, _dir) = app();
        let card = |card_type: &str, brand: &str| {
            format!(
                r#"{{"card_type": "{card_type}", "card_brand": "{brand}", "card_number": "4111111111111111",
                    "card_holder_name": "Ann", "expiry_month": 1, "expiry_year": 2030}}"#
            )
        };

        let (status, body) = call(
            &app,
            Method::POST,
            "/cards/",
            Some(ANN),
            Some(card("credit", "maestro").as_str()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid credit card brand.");

        for _ in 0..4 {
            let (status, _) =
                call(&app, Method::POST, "/cards/", Some(ANN), Some(card("debit", "rupay").as_str())).await;
            assert_eq!(status, StatusCode::CREATED);
        }
        let (status, body) =
            call(&app, Method::POST, "/cards/", Some(ANN), Some(card("debit", "rupay").as_str())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Maximum 4 cards allowed per user.");

        let (_, list) = call(&app, Method::GET, "/cards/", Some(ANN), None).await;
        assert_eq!(list["data"].as_array().unwrap().len(), 4);
        let (_, list) = call(&app, Method::GET, "/cards/", Some(BOB), None).await;
        assert!(list["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_route_is_404_envelope() {
        let (app, _state, _dir) = app();
        let (status, body) = call(&app, Method::GET, "/wallets/", Some(ANN), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[test]
    fn openapi_documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health/",
            "/health/ready/",
            "/test-auth/",
            "/profile/",
            "/addresses/",
            "/addresses/{address_id}/",
            "/cards/",
            "/cards/{card_id}/",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
