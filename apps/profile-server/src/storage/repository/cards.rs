// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Card repository.
//!
//! Cards are keyed by `(person_id, card_id)`. The per-profile card limit and
//! the type/brand pairing are checked inside the write transaction that
//! stores the card, so they hold under concurrent requests.

use chrono::{DateTime, Utc};
use redb::{ReadableDatabase, ReadableTable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::super::database::{
    decode, encode, next_id, owned_ids, owned_rows, ProfileDatabase, StoreError, StoreResult,
    CARDS,
};
use super::super::{OwnedResource, OwnershipCheck};
use super::addresses::ensure_profile_exists;
use crate::models::{CardBrand, CardType};

/// Maximum number of cards a single profile may hold.
pub const MAX_CARDS_PER_PROFILE: usize = 4;

/// A payment card owned by a profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Card {
    pub id: u64,
    /// Person id of the owning profile.
    pub owner_person_id: i64,
    pub card_type: CardType,
    pub card_brand: CardBrand,
    /// 12 to 16 digits, returned as stored.
    pub card_number: String,
    pub card_holder_name: String,
    pub expiry_month: u8,
    pub expiry_year: u16,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedResource for Card {
    const RESOURCE: &'static str = "card";

    fn owner_person_id(&self) -> i64 {
        self.owner_person_id
    }

    fn resource_id(&self) -> u64 {
        self.id
    }
}

/// Validated fields of a card to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    pub card_type: CardType,
    pub card_brand: CardBrand,
    pub card_number: String,
    pub card_holder_name: String,
    pub expiry_month: u8,
    pub expiry_year: u16,
    pub is_default: bool,
}

impl NewCard {
    pub fn new(card_type: CardType, card_brand: CardBrand, card_number: impl Into<String>) -> Self {
        Self {
            card_type,
            card_brand,
            card_number: card_number.into(),
            card_holder_name: "Card Holder".to_string(),
            expiry_month: 12,
            expiry_year: 2030,
            is_default: false,
        }
    }
}

/// Validated partial update of a card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardChanges {
    pub card_type: Option<CardType>,
    pub card_brand: Option<CardBrand>,
    pub card_number: Option<String>,
    pub card_holder_name: Option<String>,
    pub expiry_month: Option<u8>,
    pub expiry_year: Option<u16>,
    pub is_default: Option<bool>,
}

impl CardChanges {
    fn apply(self, card: &mut Card) {
        if let Some(value) = self.card_type {
            card.card_type = value;
        }
        if let Some(value) = self.card_brand {
            card.card_brand = value;
        }
        if let Some(value) = self.card_number {
            card.card_number = value;
        }
        if let Some(value) = self.card_holder_name {
            card.card_holder_name = value;
        }
        if let Some(value) = self.expiry_month {
            card.expiry_month = value;
        }
        if let Some(value) = self.expiry_year {
            card.expiry_year = value;
        }
        if let Some(value) = self.is_default {
            card.is_default = value;
        }
    }
}

fn check_brand(card_type: CardType, brand: CardBrand) -> StoreResult<()> {
    if card_type.accepts(brand) {
        Ok(())
    } else {
        Err(StoreError::InvalidCardBrand { card_type, brand })
    }
}

/// Repository for card operations, always scoped to one owner.
pub struct CardRepository<'a> {
    db: &'a ProfileDatabase,
}

impl<'a> CardRepository<'a> {
    pub fn new(db: &'a ProfileDatabase) -> Self {
        Self { db }
    }

    /// List all cards owned by a profile, oldest first.
    pub fn list(&self, person_id: i64) -> StoreResult<Vec<Card>> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(CARDS)?;
        owned_rows(&table, person_id)
    }

    /// Number of cards owned by a profile.
    pub fn count(&self, person_id: i64) -> StoreResult<usize> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(CARDS)?;
        Ok(owned_ids(&table, person_id)?.len())
    }

    /// Get one card owned by a profile.
    pub fn get(&self, person_id: i64, card_id: u64) -> StoreResult<Card> {
        let read_txn = self.db.inner().begin_read()?;
        let table = read_txn.open_table(CARDS)?;
        let found: Option<Card> = match table.get((person_id, card_id))? {
            Some(value) => Some(decode(value.value())?),
            None => None,
        };
        found.verify_owner(person_id, card_id)
    }

    /// Create a card for a profile.
    ///
    /// # Errors
    /// - `CardLimitExceeded` if the profile already holds
    ///   [`MAX_CARDS_PER_PROFILE`] cards
    /// - `InvalidCardBrand` if the brand is not issued as the card type
    pub fn create(&self, person_id: i64, new: NewCard) -> StoreResult<Card> {
        check_brand(new.card_type, new.card_brand)?;

        let write_txn = self.db.inner().begin_write()?;
        let card = {
            ensure_profile_exists(&write_txn, person_id)?;

            let mut rows = write_txn.open_table(CARDS)?;
            if owned_ids(&rows, person_id)?.len() >= MAX_CARDS_PER_PROFILE {
                return Err(StoreError::CardLimitExceeded {
                    person_id,
                    limit: MAX_CARDS_PER_PROFILE,
                });
            }

            let now = Utc::now();
            let card = Card {
                id: next_id(&write_txn, "cards")?,
                owner_person_id: person_id,
                card_type: new.card_type,
                card_brand: new.card_brand,
                card_number: new.card_number,
                card_holder_name: new.card_holder_name,
                expiry_month: new.expiry_month,
                expiry_year: new.expiry_year,
                is_default: new.is_default,
                created_at: now,
                updated_at: now,
            };
            rows.insert((person_id, card.id), encode(&card)?.as_slice())?;
            card
        };
        write_txn.commit()?;

        tracing::info!(
            person_id,
            card_id = card.id,
            card_type = %card.card_type,
            card_brand = %card.card_brand,
            "Card created"
        );
        Ok(card)
    }

    /// Apply a partial update to an owned card.
    ///
    /// The brand is re-checked against the card type after merging, so
    /// changing only one of the two cannot produce a mismatched pair.
    pub fn update(&self, person_id: i64, card_id: u64, changes: CardChanges) -> StoreResult<Card> {
        let write_txn = self.db.inner().begin_write()?;
        let card = {
            let mut rows = write_txn.open_table(CARDS)?;
            let mut card: Card = {
                let found: Option<Card> = match rows.get((person_id, card_id))? {
                    Some(value) => Some(decode(value.value())?),
                    None => None,
                };
                found.verify_owner(person_id, card_id)?
            };

            changes.apply(&mut card);
            check_brand(card.card_type, card.card_brand)?;

            card.updated_at = Utc::now();
            rows.insert((person_id, card_id), encode(&card)?.as_slice())?;
            card
        };
        write_txn.commit()?;
        Ok(card)
    }

    /// Delete an owned card.
    pub fn delete(&self, person_id: i64, card_id: u64) -> StoreResult<()> {
        let write_txn = self.db.inner().begin_write()?;
        {
            let mut rows = write_txn.open_table(CARDS)?;
            let removed = rows.remove((person_id, card_id))?.is_some();
            if !removed {
                return Err(StoreError::not_found(Card::RESOURCE, card_id));
            }
        }
        write_txn.commit()?;

        tracing::info!(person_id, card_id, "Card deleted");
        Ok(())
    }
}
