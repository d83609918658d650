// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Profile Service - user profiles, addresses and payment cards
//!
//! Callers authenticate with a bearer token issued by an external identity
//! authority. Each caller owns exactly one profile, keyed by the authority's
//! `person_id`, and every address or card belongs to that profile.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Identity authority client and extractors
//! - `config` - Environment configuration
//! - `storage` - Embedded redb store
//! - `validation` - Request payload validation

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;
