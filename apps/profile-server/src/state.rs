// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::IdentityResolver;
use crate::storage::ProfileDatabase;

/// Shared application state.
///
/// The database is the only shared mutable resource; the identity resolver
/// is injected so tests can replace the HTTP client.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<ProfileDatabase>,
    pub identity: Arc<dyn IdentityResolver>,
}

impl AppState {
    pub fn new(db: ProfileDatabase, identity: Arc<dyn IdentityResolver>) -> Self {
        Self {
            db: Arc::new(db),
            identity,
        }
    }
}
