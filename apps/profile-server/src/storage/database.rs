// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded profile database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `profiles`: person_id → serialized Profile
//! - `profile_emails`: lowercase email → person_id (uniqueness index)
//! - `addresses`: (person_id, address_id) → serialized Address
//! - `address_types`: (person_id, address_type) → address_id (uniqueness index)
//! - `cards`: (person_id, card_id) → serialized Card
//! - `sequences`: sequence name → last issued id
//!
//! Child rows are keyed by their owner first, so every lookup names the
//! owning profile and a foreign id simply does not resolve.
//!
//! redb serializes write transactions. Checks made inside a write
//! transaction (address type taken, card count) therefore hold until commit.

use std::ops::RangeInclusive;
use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::{de::DeserializeOwned, Serialize};

use crate::models::{AddressType, CardBrand, CardType};

// =============================================================================
// Table Definitions
// =============================================================================

pub(super) const PROFILES: TableDefinition<i64, &[u8]> = TableDefinition::new("profiles");

pub(super) const PROFILE_EMAILS: TableDefinition<&str, i64> =
    TableDefinition::new("profile_emails");

pub(super) const ADDRESSES: TableDefinition<(i64, u64), &[u8]> =
    TableDefinition::new("addresses");

pub(super) const ADDRESS_TYPES: TableDefinition<(i64, &str), u64> =
    TableDefinition::new("address_types");

pub(super) const CARDS: TableDefinition<(i64, u64), &[u8]> = TableDefinition::new("cards");

const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{resource} {id} not found")]
    NotFound { resource: &'static str, id: String },

    #[error("profile {person_id} already has a {address_type} address")]
    DuplicateAddressType {
        person_id: i64,
        address_type: AddressType,
    },

    #[error("profile {person_id} already holds {limit} cards")]
    CardLimitExceeded { person_id: i64, limit: usize },

    #[error("{brand} is not a {card_type} card brand")]
    InvalidCardBrand { card_type: CardType, brand: CardBrand },

    #[error("email {email} is already bound to profile {owner}")]
    EmailInUse { email: String, owner: i64 },
}

impl StoreError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// ProfileDatabase
// =============================================================================

/// Embedded ACID store for profiles, addresses and cards.
pub struct ProfileDatabase {
    db: Database,
}

impl ProfileDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PROFILES)?;
            let _ = write_txn.open_table(PROFILE_EMAILS)?;
            let _ = write_txn.open_table(ADDRESSES)?;
            let _ = write_txn.open_table(ADDRESS_TYPES)?;
            let _ = write_txn.open_table(CARDS)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        tracing::info!(path = %path.display(), "Profile database opened");
        Ok(Self { db })
    }

    pub(super) fn inner(&self) -> &Database {
        &self.db
    }

    /// Cheap read probe used by the readiness endpoint.
    pub fn check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SEQUENCES)?;
        let _ = table.get("profiles")?;
        Ok(())
    }
}

// =============================================================================
// Row Helpers
// =============================================================================

pub(super) fn encode<T: Serialize>(row: &T) -> StoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(row)?)
}

pub(super) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Key range covering every child row owned by `person_id`.
pub(super) fn owned_range(person_id: i64) -> RangeInclusive<(i64, u64)> {
    (person_id, u64::MIN)..=(person_id, u64::MAX)
}

/// Decode every child row owned by `person_id`, in id order.
pub(super) fn owned_rows<T, R>(table: &R, person_id: i64) -> StoreResult<Vec<T>>
where
    T: DeserializeOwned,
    R: ReadableTable<(i64, u64), &'static [u8]>,
{
    let mut rows = Vec::new();
    for entry in table.range(owned_range(person_id))? {
        let (_, value) = entry?;
        rows.push(decode(value.value())?);
    }
    Ok(rows)
}

/// Ids of every child row owned by `person_id`, in id order.
pub(super) fn owned_ids<R>(table: &R, person_id: i64) -> StoreResult<Vec<u64>>
where
    R: ReadableTable<(i64, u64), &'static [u8]>,
{
    let mut ids = Vec::new();
    for entry in table.range(owned_range(person_id))? {
        let (key, _) = entry?;
        ids.push(key.value().1);
    }
    Ok(ids)
}

/// Issue the next id of a named sequence inside an open write transaction.
///
/// Ids start at 1 and are never reused.
pub(super) fn next_id(write_txn: &WriteTransaction, sequence: &str) -> StoreResult<u64> {
    let mut table = write_txn.open_table(SEQUENCES)?;
    let last = table.get(sequence)?.map(|v| v.value()).unwrap_or(0);
    let next = last + 1;
    table.insert(sequence, next)?;
    Ok(next)
}
