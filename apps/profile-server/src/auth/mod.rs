// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Callers are authenticated by an external identity authority.
//!
//! ## Auth Flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. Profile service calls `GET {AUTH_MS_BASE_URL}/me/` with the same token
//! 3. The authority answers `{"data": {"person_id": ..., "email": ...}}`
//! 4. `person_id` selects (or lazily creates) the caller's profile
//!
//! ## Security
//!
//! - All endpoints except health and docs require a bearer token
//! - Tokens are forwarded, never stored or logged
//! - Every upstream failure surfaces to the client as a plain 401

pub mod client;
pub mod error;
pub mod extractor;
pub mod identity;
pub mod owner;
pub mod retry;

pub use client::{AuthorityClient, IdentityResolver};
pub use error::{IdentityError, Unavailable};
pub use extractor::{bearer_token, Auth, Owner};
pub use identity::{decode_me, Identity};
pub use owner::{ensure_profile, OwnershipError};
pub use retry::RetryPolicy;
