// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Closed choice sets used by profiles, addresses and cards, plus the
//! success envelope every handler wraps its payload in.
//!
//! ## Choice Sets
//!
//! Each choice set is a Rust enum whose wire form is the short code the
//! clients send (`"+91"`, `"home"`, `"visa_debit"`, ...). Request payloads
//! carry raw strings; the validators in [`crate::validation`] parse them
//! through [`Choice::parse`] so an unknown value is reported against the
//! offending field instead of failing JSON decoding as a whole.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A closed set of wire codes.
pub trait Choice: Copy + Sized + 'static {
    /// Every member of the set, in declaration order.
    const ALL: &'static [Self];

    /// Wire code of this member.
    fn as_str(&self) -> &'static str;

    /// Parse a wire code. Matching is exact (case-sensitive).
    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|choice| choice.as_str() == value)
    }

    /// Comma separated list of accepted wire codes, for error messages.
    fn expected() -> String {
        Self::ALL
            .iter()
            .map(Self::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

macro_rules! choices {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:tt ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant ),+
        }

        impl Choice for $name {
            const ALL: &'static [Self] = &[$( $name::$variant ),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// =============================================================================
// Profile Choices
// =============================================================================

choices! {
    /// International dialling prefix attached to a profile phone number.
    CountryCode {
        India => "+91",
        Usa => "+1",
        Uk => "+44",
        Australia => "+61",
        Japan => "+81",
        Germany => "+49",
        China => "+86",
        France => "+33",
        Russia => "+7",
        Uae => "+971",
    }
}

impl Default for CountryCode {
    fn default() -> Self {
        CountryCode::India
    }
}

choices! {
    Gender {
        Male => "M",
        Female => "F",
        Other => "O",
    }
}

// =============================================================================
// Address Choices
// =============================================================================

choices! {
    /// Role of an address. A profile holds at most one address per type.
    AddressType {
        Home => "home",
        Work => "work",
        Friend => "friend",
        Other => "other",
    }
}

choices! {
    Country {
        India => "IN",
        Usa => "US",
        Uk => "UK",
        Australia => "AU",
        Japan => "JP",
    }
}

impl Default for Country {
    fn default() -> Self {
        Country::India
    }
}

choices! {
    State {
        Maharashtra => "MH",
        Delhi => "DL",
        Karnataka => "KA",
        California => "CA",
    }
}

impl Default for State {
    fn default() -> Self {
        State::Maharashtra
    }
}

choices! {
    City {
        Mumbai => "MUM",
        Bangalore => "BLR",
        Delhi => "DEL",
        LosAngeles => "LA",
    }
}

impl Default for City {
    fn default() -> Self {
        City::Mumbai
    }
}

// =============================================================================
// Card Choices
// =============================================================================

choices! {
    CardType {
        Credit => "credit",
        Debit => "debit",
    }
}

choices! {
    /// Card network. Each brand belongs to exactly one [`CardType`].
    CardBrand {
        Visa => "visa",
        Mastercard => "mastercard",
        Amex => "amex",
        Discover => "discover",
        VisaDebit => "visa_debit",
        MasterDebit => "master_debit",
        Maestro => "maestro",
        Rupay => "rupay",
    }
}

impl CardType {
    /// Brands that may be issued as this card type.
    pub fn brands(&self) -> &'static [CardBrand] {
        match self {
            CardType::Credit => &[
                CardBrand::Visa,
                CardBrand::Mastercard,
                CardBrand::Amex,
                CardBrand::Discover,
            ],
            CardType::Debit => &[
                CardBrand::VisaDebit,
                CardBrand::MasterDebit,
                CardBrand::Maestro,
                CardBrand::Rupay,
            ],
        }
    }

    pub fn accepts(&self, brand: CardBrand) -> bool {
        self.brands().contains(&brand)
    }
}

// =============================================================================
// Response Envelope
// =============================================================================

/// Success envelope: `{"success": true, "data": ...}`.
///
/// Failures use the matching `{"success": false, "message": ...}` shape
/// produced by [`crate::error::ApiError`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ApiResponse<T> {
    /// Always `true` for this envelope.
    pub success: bool,
    /// Response payload.
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_round_trip_wire_codes() {
        assert_eq!(CountryCode::parse("+971"), Some(CountryCode::Uae));
        assert_eq!(AddressType::parse("friend"), Some(AddressType::Friend));
        assert_eq!(City::parse("LA"), Some(City::LosAngeles));
        assert_eq!(CardBrand::parse("visa_debit"), Some(CardBrand::VisaDebit));
    }

    #[test]
    fn choice_parsing_is_exact() {
        assert_eq!(AddressType::parse("Home"), None);
        assert_eq!(Country::parse("in"), None);
        assert_eq!(CountryCode::parse("91"), None);
        assert_eq!(Gender::parse(""), None);
    }

    #[test]
    fn serde_uses_wire_codes() {
        let json = serde_json::to_string(&CountryCode::Usa).unwrap();
        assert_eq!(json, r#""+1""#);

        let brand: CardBrand = serde_json::from_str(r#""master_debit""#).unwrap();
        assert_eq!(brand, CardBrand::MasterDebit);
    }

    #[test]
    fn brand_sets_are_disjoint() {
        for brand in CardBrand::ALL {
            let credit = CardType::Credit.accepts(*brand);
            let debit = CardType::Debit.accepts(*brand);
            assert!(credit ^ debit, "{brand} must belong to exactly one card type");
        }
        assert!(!CardType::Credit.accepts(CardBrand::Maestro));
        assert!(CardType::Debit.accepts(CardBrand::Rupay));
    }

    #[test]
    fn expected_lists_every_code() {
        assert_eq!(CardType::expected(), "credit, debit");
        assert_eq!(Gender::expected(), "M, F, O");
    }

    #[test]
    fn envelope_serializes_success_flag() {
        let body = serde_json::to_value(ApiResponse::new(7)).unwrap();
        assert_eq!(body, serde_json::json!({"success": true, "data": 7}));
    }
}
