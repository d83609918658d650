// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Address payloads.

use serde::Deserialize;
use utoipa::ToSchema;

use super::{choice, non_blank, nullable, optional_phone, required, text, ValidationResult};
use crate::models::{City, Country, State};
use crate::storage::{AddressChanges, NewAddress};

const LINE_MAX: usize = 255;
const ZIP_MAX: usize = 20;

/// Body of `POST /addresses/`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateAddressRequest {
    /// `home`, `work`, `friend` or `other`. Required.
    #[schema(example = "home")]
    pub address_type: Option<String>,
    /// Required.
    #[schema(example = "221B Baker Street")]
    pub line1: Option<String>,
    pub line2: Option<String>,
    /// Defaults to `IN`.
    pub country: Option<String>,
    /// Defaults to `MH`.
    pub state: Option<String>,
    /// Defaults to `MUM`.
    pub city: Option<String>,
    pub zip_code: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, example = "9876543210")]
    pub phone_number: Option<Option<String>>,
    pub is_default: Option<bool>,
}

impl CreateAddressRequest {
    pub fn validate(self) -> ValidationResult<NewAddress> {
        let address_type = choice("address_type", &required("address_type", self.address_type)?)?;
        let line1 = non_blank("line1", required("line1", self.line1)?, LINE_MAX)?;

        let mut address = NewAddress::new(address_type, line1);
        if let Some(line2) = self.line2 {
            address.line2 = text("line2", line2, LINE_MAX)?;
        }
        if let Some(country) = self.country {
            address.country = choice::<Country>("country", &country)?;
        }
        if let Some(state) = self.state {
            address.state = choice::<State>("state", &state)?;
        }
        if let Some(city) = self.city {
            address.city = choice::<City>("city", &city)?;
        }
        if let Some(zip_code) = self.zip_code {
            address.zip_code = text("zip_code", zip_code, ZIP_MAX)?;
        }
        address.phone_number = optional_phone("phone_number", self.phone_number.flatten())?;
        address.is_default = self.is_default.unwrap_or(false);
        Ok(address)
    }
}

/// Body of `PUT /addresses/{address_id}/`. Only supplied fields change.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateAddressRequest {
    pub address_type: Option<String>,
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub phone_number: Option<Option<String>>,
    pub is_default: Option<bool>,
}

impl UpdateAddressRequest {
    pub fn validate(self) -> ValidationResult<AddressChanges> {
        Ok(AddressChanges {
            address_type: self
                .address_type
                .map(|value| choice("address_type", &value))
                .transpose()?,
            line1: self
                .line1
                .map(|value| non_blank("line1", value, LINE_MAX))
                .transpose()?,
            line2: self
                .line2
                .map(|value| text("line2", value, LINE_MAX))
                .transpose()?,
            country: self
                .country
                .map(|value| choice("country", &value))
                .transpose()?,
            state: self
                .state
                .map(|value| choice("state", &value))
                .transpose()?,
            city: self
                .city
                .map(|value| choice("city", &value))
                .transpose()?,
            zip_code: self
                .zip_code
                .map(|value| text("zip_code", value, ZIP_MAX))
                .transpose()?,
            phone_number: self
                .phone_number
                .map(|value| optional_phone("phone_number", value))
                .transpose()?,
            is_default: self.is_default,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AddressType;
    use crate::validation::ValidationError;

    #[test]
    fn create_applies_defaults() {
        let request: CreateAddressRequest = serde_json::from_value(serde_json::json!({
            "address_type": "work",
            "line1": "  Tower A  "
        }))
        .unwrap();
        let address = request.validate().unwrap();

        assert_eq!(address.address_type, AddressType::Work);
        assert_eq!(address.line1, "Tower A");
        assert_eq!(address.country, Country::India);
        assert_eq!(address.state, State::Maharashtra);
        assert_eq!(address.city, City::Mumbai);
        assert_eq!(address.phone_number, None);
        assert!(!address.is_default);
    }

    #[test]
    fn create_requires_type_and_line1() {
        let missing_type: CreateAddressRequest =
            serde_json::from_value(serde_json::json!({"line1": "x"})).unwrap();
        assert_eq!(
            missing_type.validate().unwrap_err(),
            ValidationError::field("address_type", "This field is required.")
        );

        let blank_line: CreateAddressRequest =
            serde_json::from_value(serde_json::json!({"address_type": "home", "line1": " "}))
                .unwrap();
        assert!(matches!(
            blank_line.validate(),
            Err(ValidationError::Field { field: "line1", .. })
        ));
    }

    #[test]
    fn create_rejects_unknown_codes_and_bad_phone() {
        for (body, field) in [
            (serde_json::json!({"address_type": "castle", "line1": "x"}), "address_type"),
            (serde_json::json!({"address_type": "home", "line1": "x", "country": "FR"}), "country"),
            (serde_json::json!({"address_type": "home", "line1": "x", "city": "PAR"}), "city"),
            (serde_json::json!({"address_type": "home", "line1": "x", "phone_number": "123"}), "phone_number"),
            (serde_json::json!({"address_type": "home", "line1": "x", "zip_code": "1".repeat(21)}), "zip_code"),
        ] {
            let request: CreateAddressRequest = serde_json::from_value(body).unwrap();
            match request.validate() {
                Err(ValidationError::Field { field: got, .. }) => assert_eq!(got, field),
                other => panic!("expected {field} error, got {other:?}"),
            }
        }
    }

    #[test]
    fn update_is_partial() {
        let request: UpdateAddressRequest = serde_json::from_value(serde_json::json!({
            "city": "BLR",
            "phone_number": null
        }))
        .unwrap();
        let changes = request.validate().unwrap();
        assert_eq!(
            changes,
            AddressChanges {
                city: Some(City::Bangalore),
                phone_number: Some(None),
                ..Default::default()
            }
        );
    }
}
