// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Address repository.
//!
//! Addresses are keyed by `(person_id, address_id)`. The `address_types`
//! index holds one entry per `(person_id, address_type)` and is updated in
//! the same write transaction as the row, which makes the one-address-per-type
//! rule hold under concurrent writers.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{
    decode, encode, next_id, owned_rows, ProfileDatabase, StoreError, StoreResult, ADDRESSES,
    ADDRESS_TYPES, PROFILES,
};
use super::super::{OwnedResource, OwnershipCheck};
use crate::models::{AddressType, Choice, City, Country, State};

/// A postal address owned by a profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Address {
    pub id: u64,
    /// Person id of the owning profile.
    pub owner_person_id: i64,
    pub address_type: AddressType,
    pub line1: String,
    pub line2: String,
    pub country: Country,
    pub state: State,
    pub city: City,
    pub zip_code: String,
    /// Ten digit phone number.
    pub phone_number: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Address {
    const RESOURCE: &'static str = "address";

    fn owner_person_id(&self) -> i64 {
        self.owner_person_id
    }

    fn resource_id(&self) -> u64 {
        self.id
    }
}

/// Validated fields of an address to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddress {
    pub address_type: AddressType,
    pub line1: String,
    pub line2: String,
    pub country: Country,
    pub state: State,
    pub city: City,
    pub zip_code: String,
    pub phone_number: Option<String>,
    pub is_default: bool,
}

impl NewAddress {
    /// An address with the given type and first line and defaults elsewhere.
    pub fn new(address_type: AddressType, line1: impl Into<String>) -> Self {
        Self {
            address_type,
            line1: line1.into(),
            line2: String::new(),
            country: Country::default(),
            state: State::default(),
            city: City::default(),
            zip_code: String::new(),
            phone_number: None,
            is_default: false,
        }
    }
}

/// Validated partial update of an address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressChanges {
    pub address_type: Option<AddressType>,
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub country: Option<Country>,
    pub state: Option<State>,
    pub city: Option<City>,
    pub zip_code: Option<String>,
    pub phone_number: Option<Option<String>>,
    pub is_default: Option<bool>,
}

impl AddressChanges {
    fn apply(self, address: &mut Address) {
        if let Some(value) = self.address_type {
            address.address_type = value;
        }
        if let Some(value) = self.line1 {
            address.line1 = value;
        }
        if let Some(value) = self.line2 {
            address.line2 = value;
        }
        if let Some(value) = self.country {
            address.country = value;
        }
        if let Some(value) = self.state {
            address.state = value;
        }
        if let Some(value) = self.city {
            address.city = value;
        }
        if let Some(value) = self.zip_code {
            address.zip_code = value;
        }
        if let Some(value) = self.phone_number {
            address.phone_number = value;
        }
        if let Some(value) = self.is_default {
            address.is_default = value;
        }
    }
}

/// Repository for address operations, always scoped to one owner.
pub struct AddressRepository<'a> {
    db: &'a ProfileDatabase,
}

impl<'a> AddressRepository<'a> {
    pub fn new(db: &'a ProfileDatabase) -> Self {
        Self { db }
    }

    /// List all addresses owned by a profile, oldest first.
    pub fn list(&self, person_id: i64) -> StoreResult<Vec<Address>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(ADDRESSES)?;
        owned_rows(&table, person_id)
    }

    /// Get one address owned by a profile.
    pub fn get(&self, person_id: i64, address_id: u64) -> StoreResult<Address> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(ADDRESSES)?;
        let found: Option<Address> = match table.get((person_id, address_id))? {
            Some(value) => Some(decode(value.value())?),
            None => None,
        };
        found.verify_owner(person_id, address_id)
    }

    /// Create an address for a profile.
    ///
    /// # Errors
    /// `DuplicateAddressType` if the profile already has an address of the
    /// same type; nothing is written in that case.
    pub fn create(&self, person_id: i64, new: NewAddress) -> StoreResult<Address> {
        let write_txn = self.db.inner().begin_write()?;
        let address = {
            ensure_profile_exists(&write_txn, person_id)?;

            let mut types = write_txn.open_table(ADDRESS_TYPES)?;
            if types
                .get((person_id, new.address_type.as_str()))?
                .is_some()
            {
                return Err(StoreError::DuplicateAddressType {
                    person_id,
                    address_type: new.address_type,
                });
            }

            let now = Utc::now();
            let address = Address {
                id: next_id(&write_txn, "addresses")?,
                owner_person_id: person_id,
                address_type: new.address_type,
                line1: new.line1,
                line2: new.line2,
                country: new.country,
                state: new.state,
                city: new.city,
                zip_code: new.zip_code,
                phone_number: new.phone_number,
                is_default: new.is_default,
                created_at: now,
                updated_at: now,
            };

            let mut rows = write_txn.open_table(ADDRESSES)?;
            rows.insert((person_id, address.id), encode(&address)?.as_slice())?;
            types.insert((person_id, address.address_type.as_str()), address.id)?;
            address
        };
        write_txn.commit()?;

        tracing::info!(
            person_id,
            address_id = address.id,
            address_type = %address.address_type,
            "Address created"
        );
        Ok(address)
    }

    /// Apply a partial update to an owned address.
    ///
    /// Changing `address_type` to one the profile already uses fails with
    /// `DuplicateAddressType`.
    pub fn update(
        &self,
        person_id: i64,
        address_id: u64,
        changes: AddressChanges,
    ) -> StoreResult<Address> {
        let write_txn = self.db.inner().begin_write()?;
        let address = {
            let mut rows = write_txn.open_table(ADDRESSES)?;
            let mut address: Address = {
                let found: Option<Address> = match rows.get((person_id, address_id))? {
                    Some(value) => Some(decode(value.value())?),
                    None => None,
                };
                found.verify_owner(person_id, address_id)?
            };

            let previous_type = address.address_type;
            changes.apply(&mut address);

            if address.address_type != previous_type {
                let mut types = write_txn.open_table(ADDRESS_TYPES)?;
                if types
                    .get((person_id, address.address_type.as_str()))?
                    .is_some()
                {
                    return Err(StoreError::DuplicateAddressType {
                        person_id,
                        address_type: address.address_type,
                    });
                }
                types.remove((person_id, previous_type.as_str()))?;
                types.insert((person_id, address.address_type.as_str()), address_id)?;
            }

            address.updated_at = Utc::now();
            rows.insert((person_id, address_id), encode(&address)?.as_slice())?;
            address
        };
        write_txn.commit()?;
        Ok(address)
    }

    /// Delete an owned address.
    pub fn delete(&self, person_id: i64, address_id: u64) -> StoreResult<()> {
        let write_txn = self.db.inner().begin_write()?;
        {
            let mut rows = write_txn.open_table(ADDRESSES)?;
            let address: Address = {
                let found: Option<Address> = match rows.remove((person_id, address_id))? {
                    Some(value) => Some(decode(value.value())?),
                    None => None,
                };
                found.verify_owner(person_id, address_id)?
            };

            let mut types = write_txn.open_table(ADDRESS_TYPES)?;
            types.remove((person_id, address.address_type.as_str()))?;
        }
        write_txn.commit()?;

        tracing::info!(person_id, address_id, "Address deleted");
        Ok(())
    }
}

/// Foreign-key check: child rows may only be written under a stored profile.
pub(super) fn ensure_profile_exists(write_txn: &WriteTransaction, person_id: i64) -> StoreResult<()> {
    let profiles = write_txn.open_table(PROFILES)?;
    if profiles.get(person_id)?.is_none() {
        return Err(StoreError::not_found("profile", person_id));
    }
    Ok(())
}
