// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Request Validation
//!
//! Request payloads are decoded into `*Request` structs holding raw values.
//! Each request validates itself into the typed change set the storage layer
//! accepts ([`crate::storage::ProfileChanges`], [`crate::storage::NewAddress`],
//! ...). The first failing field is reported.
//!
//! Nullable fields use [`nullable`] so that an absent key (`None`) and an
//! explicit `null` (`Some(None)`) stay distinguishable.

pub mod address;
pub mod card;
pub mod profile;

use serde::{Deserialize, Deserializer};

use crate::models::{CardBrand, CardType, Choice};

pub use address::{CreateAddressRequest, UpdateAddressRequest};
pub use card::{CreateCardRequest, UpdateCardRequest};
pub use profile::UpdateProfileRequest;

/// Payload validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    Field {
        field: &'static str,
        message: String,
    },

    #[error("Invalid {card_type} card brand.")]
    CardBrand {
        card_type: CardType,
        brand: CardBrand,
    },
}

impl ValidationError {
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field,
            message: message.into(),
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Deserialize a present key into `Some(value)`, keeping `null` as `Some(None)`.
///
/// Pair with `#[serde(default)]` so a missing key stays `None`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(crate) fn required<T>(field: &'static str, value: Option<T>) -> ValidationResult<T> {
    value.ok_or_else(|| ValidationError::field(field, "This field is required."))
}

/// Trim and bound a free-text field. Empty is allowed.
pub(crate) fn text(field: &'static str, value: String, max: usize) -> ValidationResult<String> {
    let value = value.trim().to_string();
    if value.chars().count() > max {
        return Err(ValidationError::field(
            field,
            format!("Ensure this field has no more than {max} characters."),
        ));
    }
    Ok(value)
}

/// Like [`text`], but the trimmed value must not be empty.
pub(crate) fn non_blank(field: &'static str, value: String, max: usize) -> ValidationResult<String> {
    let value = text(field, value, max)?;
    if value.is_empty() {
        return Err(ValidationError::field(field, "This field may not be blank."));
    }
    Ok(value)
}

/// Exactly ten ASCII digits.
pub(crate) fn phone(field: &'static str, value: String) -> ValidationResult<String> {
    let value = value.trim().to_string();
    if value.len() == 10 && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(value)
    } else {
        Err(ValidationError::field(field, "Phone number must be 10 digits."))
    }
}

/// A nullable phone. An empty string clears the value like `null` does.
pub(crate) fn optional_phone(
    field: &'static str,
    value: Option<String>,
) -> ValidationResult<Option<String>> {
    match value {
        Some(value) if !value.trim().is_empty() => phone(field, value).map(Some),
        _ => Ok(None),
    }
}

/// Minimal shape check: `local@domain.tld`, no whitespace.
pub(crate) fn email(field: &'static str, value: String) -> ValidationResult<String> {
    let value = value.trim().to_string();
    let invalid = || ValidationError::field(field, "Enter a valid email address.");

    if value.len() > 254 || value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    let domain_ok = domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains('@');
    if local.is_empty() || !domain_ok {
        return Err(invalid());
    }
    Ok(value)
}

/// Parse a wire code into a choice enum.
pub(crate) fn choice<C: Choice>(field: &'static str, value: &str) -> ValidationResult<C> {
    C::parse(value).ok_or_else(|| {
        ValidationError::field(
            field,
            format!(
                "\"{value}\" is not a valid choice. Expected one of: {}.",
                C::expected()
            ),
        )
    })
}

/// Check an integer lies in `min..=max` and narrow it to `T`.
pub(crate) fn in_range<T>(field: &'static str, value: i64, min: T, max: T) -> ValidationResult<T>
where
    T: TryFrom<i64> + Into<i64> + Copy + std::fmt::Display,
{
    let out_of_range = || {
        ValidationError::field(
            field,
            format!("Ensure this value is between {min} and {max}."),
        )
    };
    if value < min.into() || value > max.into() {
        return Err(out_of_range());
    }
    T::try_from(value).map_err(|_| out_of_range())
}
