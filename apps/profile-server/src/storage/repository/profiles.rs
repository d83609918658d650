// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Profile repository.
//!
//! A profile is keyed by the identity authority's `person_id`. Its email is
//! held unique through the `profile_emails` index.

use chrono::{DateTime, NaiveDate, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{
    decode, encode, owned_ids, ProfileDatabase, StoreError, StoreResult, ADDRESSES,
    ADDRESS_TYPES, CARDS, PROFILES, PROFILE_EMAILS,
};
use crate::models::{AddressType, Choice, CountryCode, Gender};

/// Local record of an authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Profile {
    /// Identifier issued by the identity authority. Immutable.
    pub person_id: i64,
    /// Primary email, copied from the identity authority. Immutable.
    pub email: String,
    pub alternate_email: Option<String>,
    /// Ten digit phone number.
    pub primary_phone: Option<String>,
    /// Ten digit phone number.
    pub alternate_phone: Option<String>,
    pub primary_country_code: CountryCode,
    pub alternate_country_code: CountryCode,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// A fresh profile with only the identity fields populated.
    pub fn new(person_id: i64, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            person_id,
            email: email.into(),
            alternate_email: None,
            primary_phone: None,
            alternate_phone: None,
            primary_country_code: CountryCode::default(),
            alternate_country_code: CountryCode::default(),
            first_name: String::new(),
            last_name: String::new(),
            date_of_birth: None,
            gender: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated partial update of a profile.
///
/// `None` leaves a field untouched. For nullable fields `Some(None)` clears
/// the stored value. `person_id` and `email` cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    pub alternate_email: Option<Option<String>>,
    pub primary_phone: Option<Option<String>>,
    pub alternate_phone: Option<Option<String>>,
    pub primary_country_code: Option<CountryCode>,
    pub alternate_country_code: Option<CountryCode>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub gender: Option<Option<Gender>>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, profile: &mut Profile) {
        if let Some(value) = self.alternate_email {
            profile.alternate_email = value;
        }
        if let Some(value) = self.primary_phone {
            profile.primary_phone = value;
        }
        if let Some(value) = self.alternate_phone {
            profile.alternate_phone = value;
        }
        if let Some(value) = self.primary_country_code {
            profile.primary_country_code = value;
        }
        if let Some(value) = self.alternate_country_code {
            profile.alternate_country_code = value;
        }
        if let Some(value) = self.first_name {
            profile.first_name = value;
        }
        if let Some(value) = self.last_name {
            profile.last_name = value;
        }
        if let Some(value) = self.date_of_birth {
            profile.date_of_birth = value;
        }
        if let Some(value) = self.gender {
            profile.gender = value;
        }
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Repository for profile operations.
pub struct ProfileRepository<'a> {
    db: &'a ProfileDatabase,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(db: &'a ProfileDatabase) -> Self {
        Self { db }
    }

    /// Get a profile by person id.
    pub fn get(&self, person_id: i64) -> StoreResult<Option<Profile>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(PROFILES)?;
        match table.get(person_id)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    /// Return the profile for `person_id`, creating it if absent.
    ///
    /// Lookup and insert share one write transaction, so concurrent first
    /// accesses for the same person resolve to a single row. The boolean is
    /// `true` when this call created the profile.
    pub fn get_or_create(&self, person_id: i64, email: &str) -> StoreResult<(Profile, bool)> {
        if let Some(profile) = self.get(person_id)? {
            return Ok((profile, false));
        }

        let write_txn = self.db.inner().begin_write()?;
        let profile = {
            let mut profiles = write_txn.open_table(PROFILES)?;
            if let Some(existing) = profiles.get(person_id)? {
                let profile: Profile = decode(existing.value())?;
                return Ok((profile, false));
            }

            let key = email_key(email);
            let mut emails = write_txn.open_table(PROFILE_EMAILS)?;
            if let Some(owner) = emails.get(key.as_str())? {
                return Err(StoreError::EmailInUse {
                    email: key,
                    owner: owner.value(),
                });
            }

            let profile = Profile::new(person_id, email.trim());
            profiles.insert(person_id, encode(&profile)?.as_slice())?;
            emails.insert(key.as_str(), person_id)?;
            profile
        };
        write_txn.commit()?;

        tracing::info!(person_id, "Profile created");
        Ok((profile, true))
    }

    /// Apply a partial update and return the stored result.
    pub fn update(&self, person_id: i64, changes: ProfileChanges) -> StoreResult<Profile> {
        let write_txn = self.db.inner().begin_write()?;
        let profile = {
            let mut profiles = write_txn.open_table(PROFILES)?;

            // Read existing value and deserialize before mutating
            let mut profile: Profile = {
                let existing = profiles
                    .get(person_id)?
                    .ok_or_else(|| StoreError::not_found("profile", person_id))?;
                decode(existing.value())?
            };

            if changes.is_empty() {
                return Ok(profile);
            }

            changes.apply(&mut profile);
            profile.updated_at = Utc::now();
            profiles.insert(person_id, encode(&profile)?.as_slice())?;
            profile
        };
        write_txn.commit()?;
        Ok(profile)
    }

    /// Delete a profile together with every address and card it owns.
    ///
    /// Not exposed over HTTP.
    pub fn delete(&self, person_id: i64) -> StoreResult<()> {
        let write_txn = self.db.inner().begin_write()?;
        {
            let mut profiles = write_txn.open_table(PROFILES)?;
            let profile: Profile = {
                let existing = profiles
                    .remove(person_id)?
                    .ok_or_else(|| StoreError::not_found("profile", person_id))?;
                decode(existing.value())?
            };

            let mut emails = write_txn.open_table(PROFILE_EMAILS)?;
            emails.remove(email_key(&profile.email).as_str())?;

            let mut addresses = write_txn.open_table(ADDRESSES)?;
            for id in owned_ids(&addresses, person_id)? {
                addresses.remove((person_id, id))?;
            }

            let mut address_types = write_txn.open_table(ADDRESS_TYPES)?;
            for address_type in AddressType::ALL {
                address_types.remove((person_id, address_type.as_str()))?;
            }

            let mut cards = write_txn.open_table(CARDS)?;
            for id in owned_ids(&cards, person_id)? {
                cards.remove((person_id, id))?;
            }
        }
        write_txn.commit()?;

        tracing::info!(person_id, "Profile deleted with owned addresses and cards");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CardBrand, CardType};
    use crate::storage::repository::{AddressRepository, CardRepository, NewAddress, NewCard};

    fn temp_db() -> (ProfileDatabase, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = ProfileDatabase::open(&dir.path().join("test.redb")).unwrap();
        (db, dir)
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let (db, _dir) = temp_db();
        let repo = ProfileRepository::new(&db);

        let (first, created) = repo.get_or_create(42, "ann@example.com").unwrap();
        assert!(created);
        assert_eq!(first.person_id, 42);
        assert_eq!(first.email, "ann@example.com");
        assert_eq!(first.primary_country_code, CountryCode::India);
        assert!(first.first_name.is_empty());

        let (second, created) = repo.get_or_create(42, "ann@example.com").unwrap();
        assert!(!created);
        assert_eq!(second, first);
    }

    #[test]
    fn existing_profile_keeps_original_email() {
        let (db, _dir) = temp_db();
        let repo = ProfileRepository::new(&db);

        repo.get_or_create(42, "ann@example.com").unwrap();
        let (profile, _) = repo.get_or_create(42, "changed@example.com").unwrap();
        assert_eq!(profile.email, "ann@example.com");
    }

    #[test]
    fn email_is_unique_across_profiles() {
        let (db, _dir) = temp_db();
        let repo = ProfileRepository::new(&db);

        repo.get_or_create(1, "shared@example.com").unwrap();
        let result = repo.get_or_create(2, "Shared@Example.com");
        assert!(matches!(result, Err(StoreError::EmailInUse { owner: 1, .. })));
        assert!(repo.get(2).unwrap().is_none());
    }

    #[test]
    fn concurrent_first_access_creates_one_profile() {
        let (db, _dir) = temp_db();
        let db = std::sync::Arc::new(db);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                std::thread::spawn(move || {
                    ProfileRepository::new(&db)
                        .get_or_create(7, "race@example.com")
                        .unwrap()
                        .1
                })
            })
            .collect();

        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|created| *created)
            .count();
        assert_eq!(created, 1);
    }

    #[test]
    fn update_applies_only_supplied_fields() {
        let (db, _dir) = temp_db();
        let repo = ProfileRepository::new(&db);
        repo.get_or_create(42, "ann@example.com").unwrap();

        let updated = repo
            .update(
                42,
                ProfileChanges {
                    first_name: Some("Ann".to_string()),
                    primary_phone: Some(Some("9876543210".to_string())),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.first_name, "Ann");
        assert_eq!(updated.primary_phone.as_deref(), Some("9876543210"));

        let cleared = repo
            .update(
                42,
                ProfileChanges {
                    primary_phone: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(cleared.first_name, "Ann");
        assert_eq!(cleared.primary_phone, None);
        assert_eq!(cleared.email, "ann@example.com");
    }

    #[test]
    fn update_missing_profile_is_not_found() {
        let (db, _dir) = temp_db();
        let repo = ProfileRepository::new(&db);
        let result = repo.update(9, ProfileChanges::default());
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn delete_cascades_to_owned_rows() {
        let (db, _dir) = temp_db();
        let profiles = ProfileRepository::new(&db);
        profiles.get_or_create(1, "one@example.com").unwrap();
        profiles.get_or_create(2, "two@example.com").unwrap();

        let addresses = AddressRepository::new(&db);
        let cards = CardRepository::new(&db);
        for owner in [1, 2] {
            addresses
                .create(owner, NewAddress::new(AddressType::Home, "1 Main St"))
                .unwrap();
            cards
                .create(
                    owner,
                    NewCard::new(CardType::Debit, CardBrand::Rupay, "4111111111111111"),
                )
                .unwrap();
        }

        profiles.delete(1).unwrap();

        assert!(profiles.get(1).unwrap().is_none());
        assert!(addresses.list(1).unwrap().is_empty());
        assert!(cards.list(1).unwrap().is_empty());
        assert_eq!(addresses.list(2).unwrap().len(), 1);
        assert_eq!(cards.list(2).unwrap().len(), 1);

        // The email and address type are free again.
        profiles.get_or_create(3, "one@example.com").unwrap();
        profiles.get_or_create(1, "one-again@example.com").unwrap();
        addresses
            .create(1, NewAddress::new(AddressType::Home, "2 Main St"))
            .unwrap();
    }
}
