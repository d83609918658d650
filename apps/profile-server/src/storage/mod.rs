// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent storage for profiles, addresses and cards in a single embedded
//! redb database (`{DATA_DIR}/profiles.redb`).
//!
//! ## Layout
//!
//! ```text
//! database.rs      # Tables, StoreError, row helpers
//! ownership.rs     # Owner checks for child records
//! repository/
//!   profiles.rs    # get_or_create, update, cascading delete
//!   addresses.rs   # One address per type per profile
//!   cards.rs       # At most four cards per profile
//! ```
//!
//! Every repository method that touches a child record takes the owner's
//! `person_id`. There is no unscoped lookup.

pub mod database;
pub mod ownership;
pub mod repository;

pub use database::{ProfileDatabase, StoreError, StoreResult};
pub use ownership::{OwnedResource, OwnershipCheck};
pub use repository::{
    Address, AddressChanges, AddressRepository, Card, CardChanges, CardRepository, NewAddress,
    NewCard, Profile, ProfileChanges, ProfileRepository, MAX_CARDS_PER_PROFILE,
};
