// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Mapping an identity onto its local profile.

use super::Identity;
use crate::storage::{Profile, ProfileDatabase, ProfileRepository, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum OwnershipError {
    #[error("identity has no person_id")]
    MissingPersonId,

    #[error("identity for person {0} has no email to create a profile with")]
    MissingEmail(i64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Return the caller's profile, creating it on first access.
///
/// `person_id` is always required. `email` is only required when the
/// profile does not exist yet; an existing profile keeps its stored email.
pub fn ensure_profile(db: &ProfileDatabase, identity: &Identity) -> Result<Profile, OwnershipError> {
    let person_id = identity.person_id.ok_or(OwnershipError::MissingPersonId)?;
    let repo = ProfileRepository::new(db);

    if let Some(profile) = repo.get(person_id)? {
        return Ok(profile);
    }

    let email = identity
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .ok_or(OwnershipError::MissingEmail(person_id))?;
    let (profile, _created) = repo.get_or_create(person_id, email)?;
    Ok(profile)
}
