// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The caller as described by the identity authority.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::IdentityError;

/// Identity attributes reported by `GET {base}/me/`.
///
/// Fields are optional at decode time. Whether a missing `person_id` or
/// `email` is fatal depends on the caller (see [`super::ensure_profile`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    #[serde(default)]
    #[schema(example = 42)]
    pub person_id: Option<i64>,
    #[serde(default)]
    #[schema(example = "ann@example.com")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Deserialize)]
struct MeEnvelope {
    data: Option<serde_json::Value>,
}

/// Decode a `200` body of the form `{"data": {...}}`.
///
/// A body that is not JSON or has no `data` object is an unexpected
/// response. A `data` object whose fields have the wrong types is a
/// malformed identity.
pub fn decode_me(body: &[u8]) -> Result<Identity, IdentityError> {
    let envelope: MeEnvelope = serde_json::from_slice(body)
        .map_err(|e| IdentityError::UnexpectedResponse(format!("invalid JSON body: {e}")))?;

    match envelope.data {
        Some(data @ serde_json::Value::Object(_)) => serde_json::from_value(data)
            .map_err(|e| IdentityError::MalformedIdentity(e.to_string())),
        Some(_) => Err(IdentityError::UnexpectedResponse(
            "`data` is not an object".to_string(),
        )),
        None => Err(IdentityError::UnexpectedResponse(
            "response has no `data`".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_data_object() {
        let identity = decode_me(
            br#"{"data": {"person_id": 42, "email": "ann@example.com", "username": "ann", "roles": []}}"#,
        )
        .unwrap();
        assert_eq!(
            identity,
            Identity {
                person_id: Some(42),
                email: Some("ann@example.com".into()),
                username: Some("ann".into()),
            }
        );
    }

    #[test]
    fn absent_fields_decode_as_none() {
        let identity = decode_me(br#"{"data": {"id": 42}}"#).unwrap();
        assert_eq!(identity.person_id, None);
        assert_eq!(identity.email, None);
    }

    #[test]
    fn missing_data_is_unexpected() {
        for body in [&br#"{"person_id": 42}"#[..], br#"{"data": null}"#, br#"{"data": 5}"#, b"<html>"] {
            assert!(matches!(
                decode_me(body),
                Err(IdentityError::UnexpectedResponse(_))
            ));
        }
    }

    #[test]
    fn wrong_types_are_malformed() {
        assert!(matches!(
            decode_me(br#"{"data": {"person_id": "42"}}"#),
            Err(IdentityError::MalformedIdentity(_))
        ));
    }
}
