// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Test doubles shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::auth::{Identity, IdentityError, IdentityResolver};
use crate::state::AppState;
use crate::storage::ProfileDatabase;

/// In-process identity authority. Unknown tokens are rejected as invalid.
#[derive(Clone, Default)]
pub struct FakeAuthority {
    answers: Arc<Mutex<HashMap<String, Result<Identity, IdentityError>>>>,
    calls: Arc<AtomicUsize>,
}

impl FakeAuthority {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, token: &str, person_id: i64, email: &str) -> Self {
        self.with_answer(
            token,
            Ok(Identity {
                person_id: Some(person_id),
                email: Some(email.to_string()),
                username: None,
            }),
        )
    }

    pub fn with_answer(self, token: &str, answer: Result<Identity, IdentityError>) -> Self {
        self.answers
            .lock()
            .unwrap()
            .insert(token.to_string(), answer);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityResolver for FakeAuthority {
    async fn resolve(&self, token: &str) -> Result<Identity, IdentityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answers
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .unwrap_or(Err(IdentityError::InvalidToken))
    }
}

/// Application state over a throwaway database.
pub fn test_state(authority: FakeAuthority) -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = ProfileDatabase::open(&dir.path().join("profiles.redb")).unwrap();
    (AppState::new(db, Arc::new(authority)), dir)
}
