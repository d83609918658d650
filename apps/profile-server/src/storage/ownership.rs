// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for child records.
//!
//! Addresses and cards are stored under their owner's `person_id`, so a
//! lookup for another profile's id finds nothing. The checks here are the
//! second half of that contract: anything loaded is re-verified against the
//! requesting profile, and every failure is reported as "not found" so the
//! existence of other users' records never leaks.

use super::{StoreError, StoreResult};

/// Trait for resources that belong to exactly one profile.
pub trait OwnedResource {
    /// Resource name used in not-found errors.
    const RESOURCE: &'static str;

    /// The owning profile's person id.
    fn owner_person_id(&self) -> i64;

    /// Identifier of this resource.
    fn resource_id(&self) -> u64;
}

/// Extension trait turning a lookup result into an owned resource.
pub trait OwnershipCheck<T> {
    /// Return the resource if `person_id` owns it, otherwise `NotFound`.
    fn verify_owner(self, person_id: i64, id: u64) -> StoreResult<T>;
}

impl<T: OwnedResource> OwnershipCheck<T> for Option<T> {
    fn verify_owner(self, person_id: i64, id: u64) -> StoreResult<T> {
        match self {
            Some(resource) if resource.owner_person_id() == person_id => Ok(resource),
            Some(resource) => {
                tracing::warn!(
                    resource = T::RESOURCE,
                    id = resource.resource_id(),
                    owner = resource.owner_person_id(),
                    requested_by = person_id,
                    "Owner mismatch on scoped lookup"
                );
                Err(StoreError::not_found(T::RESOURCE, id))
            }
            None => Err(StoreError::not_found(T::RESOURCE, id)),
        }
    }
}
