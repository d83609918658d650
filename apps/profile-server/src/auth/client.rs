// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity authority client.
//!
//! Every protected request resolves its bearer token with
//! `GET {base}/me/`. Nothing is cached between requests.
//!
//! ## Failure Mapping
//!
//! | Upstream | Result |
//! |----------|--------|
//! | 200 with `data` object | [`Identity`] |
//! | 200 without `data`, non-JSON body | `UnexpectedResponse` |
//! | 401 | `InvalidToken` |
//! | 5xx (after retries), timeout, connection error | `AuthorityUnavailable` |
//! | anything else | `UnexpectedResponse` |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use super::{decode_me, Identity, IdentityError, RetryPolicy, Unavailable};
use crate::config::AuthorityConfig;

/// Resolves a bearer token into the caller's identity.
///
/// Held as `Arc<dyn IdentityResolver>` in application state so tests can
/// substitute an in-process fake.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Identity, IdentityError>;
}

/// HTTP client for the identity authority.
#[derive(Clone)]
pub struct AuthorityClient {
    me_url: Url,
    timeout: Duration,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl AuthorityClient {
    pub fn new(config: &AuthorityConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            me_url: config.me_url.clone(),
            timeout: config.timeout,
            retry: config.retry.clone(),
            client,
        })
    }

    pub fn me_url(&self) -> &Url {
        &self.me_url
    }

    /// One `GET /me/` attempt.
    async fn fetch(&self, token: &str) -> Result<Identity, IdentityError> {
        let response = self
            .client
            .get(self.me_url.clone())
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let body = response.bytes().await.map_err(transport_error)?;
                decode_me(&body)
            }
            StatusCode::UNAUTHORIZED => Err(IdentityError::InvalidToken),
            status if status.is_server_error() => Err(IdentityError::AuthorityUnavailable(
                Unavailable::Status(status.as_u16()),
            )),
            status => Err(IdentityError::UnexpectedResponse(format!("HTTP {status}"))),
        }
    }
}

fn transport_error(error: reqwest::Error) -> IdentityError {
    if error.is_timeout() {
        IdentityError::AuthorityUnavailable(Unavailable::Timeout)
    } else {
        IdentityError::AuthorityUnavailable(Unavailable::Connect(error.to_string()))
    }
}

#[async_trait]
impl IdentityResolver for AuthorityClient {
    async fn resolve(&self, token: &str) -> Result<Identity, IdentityError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(IdentityError::MissingToken);
        }

        let lookup = self.retry.execute("identity_me", || self.fetch(token));
        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(result) => result,
            Err(_) => Err(IdentityError::AuthorityUnavailable(Unavailable::Timeout)),
        }
    }
}
