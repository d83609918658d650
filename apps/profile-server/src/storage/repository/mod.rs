// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the profile database.

pub mod addresses;
pub mod cards;
pub mod profiles;

pub use addresses::{Address, AddressChanges, AddressRepository, NewAddress};
pub use cards::{Card, CardChanges, CardRepository, NewCard, MAX_CARDS_PER_PROFILE};
pub use profiles::{Profile, ProfileChanges, ProfileRepository};
