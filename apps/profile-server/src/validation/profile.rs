// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Profile update payload.

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

use super::{choice, email, nullable, optional_phone, text, ValidationError, ValidationResult};
use crate::storage::ProfileChanges;

const NAME_MAX: usize = 150;

/// Body of `PUT /profile/`.
///
/// Every field is optional. `person_id` and `email` are not part of the
/// payload and are ignored if sent.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, example = "ann.alt@example.com")]
    pub alternate_email: Option<Option<String>>,
    /// Ten digit phone number.
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, example = "9876543210")]
    pub primary_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub alternate_phone: Option<Option<String>>,
    #[schema(example = "+91")]
    pub primary_country_code: Option<String>,
    pub alternate_country_code: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, example = "1990-04-01")]
    pub date_of_birth: Option<Option<String>>,
    /// `M`, `F` or `O`.
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub gender: Option<Option<String>>,
}

impl UpdateProfileRequest {
    pub fn validate(self) -> ValidationResult<ProfileChanges> {
        Ok(ProfileChanges {
            alternate_email: self
                .alternate_email
                .map(|value| match value {
                    Some(value) if !value.trim().is_empty() => {
                        email("alternate_email", value).map(Some)
                    }
                    _ => Ok(None),
                })
                .transpose()?,
            primary_phone: self
                .primary_phone
                .map(|value| optional_phone("primary_phone", value))
                .transpose()?,
            alternate_phone: self
                .alternate_phone
                .map(|value| optional_phone("alternate_phone", value))
                .transpose()?,
            primary_country_code: self
                .primary_country_code
                .map(|value| choice("primary_country_code", &value))
                .transpose()?,
            alternate_country_code: self
                .alternate_country_code
                .map(|value| choice("alternate_country_code", &value))
                .transpose()?,
            first_name: self
                .first_name
                .map(|value| text("first_name", value, NAME_MAX))
                .transpose()?,
            last_name: self
                .last_name
                .map(|value| text("last_name", value, NAME_MAX))
                .transpose()?,
            date_of_birth: self
                .date_of_birth
                .map(|value| value.map(parse_date).transpose())
                .transpose()?,
            gender: self
                .gender
                .map(|value| match value {
                    Some(value) if !value.is_empty() => choice("gender", &value).map(Some),
                    _ => Ok(None),
                })
                .transpose()?,
        })
    }
}

fn parse_date(value: String) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::field(
            "date_of_birth",
            "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.",
        )
    })
}
