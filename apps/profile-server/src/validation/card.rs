// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Card payloads.
//!
//! The type/brand pairing is checked here as a fast path. The card
//! repository repeats the check inside its write transaction.

use serde::Deserialize;
use utoipa::ToSchema;

use super::{choice, in_range, non_blank, required, ValidationError, ValidationResult};
use crate::models::{CardBrand, CardType};
use crate::storage::{Card, CardChanges, NewCard};

const HOLDER_MAX: usize = 150;

/// Body of `POST /cards/`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateCardRequest {
    /// `credit` or `debit`.
    #[schema(example = "credit")]
    pub card_type: Option<String>,
    /// Must be a brand of `card_type`.
    #[schema(example = "visa")]
    pub card_brand: Option<String>,
    /// 12 to 16 digits.
    #[schema(example = "4111111111111111")]
    pub card_number: Option<String>,
    pub card_holder_name: Option<String>,
    #[schema(example = 12)]
    pub expiry_month: Option<i64>,
    #[schema(example = 2030)]
    pub expiry_year: Option<i64>,
    pub is_default: Option<bool>,
}

impl CreateCardRequest {
    pub fn validate(self) -> ValidationResult<NewCard> {
        let card_type = choice("card_type", &required("card_type", self.card_type)?)?;
        let card_brand = choice("card_brand", &required("card_brand", self.card_brand)?)?;
        check_brand(card_type, card_brand)?;

        Ok(NewCard {
            card_type,
            card_brand,
            card_number: card_number(required("card_number", self.card_number)?)?,
            card_holder_name: non_blank(
                "card_holder_name",
                required("card_holder_name", self.card_holder_name)?,
                HOLDER_MAX,
            )?,
            expiry_month: expiry_month(required("expiry_month", self.expiry_month)?)?,
            expiry_year: expiry_year(required("expiry_year", self.expiry_year)?)?,
            is_default: self.is_default.unwrap_or(false),
        })
    }
}

/// Body of `PUT /cards/{card_id}/`. Only supplied fields change.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCardRequest {
    pub card_type: Option<String>,
    pub card_brand: Option<String>,
    pub card_number: Option<String>,
    pub card_holder_name: Option<String>,
    pub expiry_month: Option<i64>,
    pub expiry_year: Option<i64>,
    pub is_default: Option<bool>,
}

impl UpdateCardRequest {
    /// Validate against the card being updated.
    ///
    /// The type/brand pair is checked after merging with `current`.
    pub fn validate(self, current: &Card) -> ValidationResult<CardChanges> {
        let changes = CardChanges {
            card_type: self
                .card_type
                .map(|value| choice("card_type", &value))
                .transpose()?,
            card_brand: self
                .card_brand
                .map(|value| choice("card_brand", &value))
                .transpose()?,
            card_number: self.card_number.map(card_number).transpose()?,
            card_holder_name: self
                .card_holder_name
                .map(|value| non_blank("card_holder_name", value, HOLDER_MAX))
                .transpose()?,
            expiry_month: self.expiry_month.map(expiry_month).transpose()?,
            expiry_year: self.expiry_year.map(expiry_year).transpose()?,
            is_default: self.is_default,
        };

        check_brand(
            changes.card_type.unwrap_or(current.card_type),
            changes.card_brand.unwrap_or(current.card_brand),
        )?;
        Ok(changes)
    }
}

fn check_brand(card_type: CardType, brand: CardBrand) -> ValidationResult<()> {
    if card_type.accepts(brand) {
        Ok(())
    } else {
        Err(ValidationError::CardBrand { card_type, brand })
    }
}

fn card_number(value: String) -> ValidationResult<String> {
    let value = value.trim().to_string();
    if (12..=16).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(value)
    } else {
        Err(ValidationError::field(
            "card_number",
            "Card number must be 12 to 16 digits.",
        ))
    }
}

fn expiry_month(value: i64) -> ValidationResult<u8> {
    in_range("expiry_month", value, 1u8, 12u8)
}

fn expiry_year(value: i64) -> ValidationResult<u16> {
    in_range("expiry_year", value, 2000u16, 9999u16)
}
