//! Core value types for the Aviary record store.
//!
//! Everything a loader validates before it reaches an entity manager lives
//! here, so that both the store and its collaborators agree on one canonical
//! parse and one canonical re-serialization per atomic field:
//!
//! - **Packed temporal values**: [`Date`] and [`DateTime`] fit in one integer
//!   and compare chronologically as plain integers
//! - **Codes and identifiers**: fixed-width ASCII codes and numeric ids with
//!   their textual prefixes stripped
//! - **Enumerations**: sex, account status and breakfast inclusion
//! - **Errors**: the two disjoint error classes (resource exhaustion vs. data
//!   validity) shared by every crate in the workspace
//!
//! Every type implements [`core::str::FromStr`] for validated construction
//! and [`core::fmt::Display`] for its canonical form.

#![warn(missing_docs)]

use core::fmt;
use core::str::FromStr;

pub mod codes;
pub mod config;
pub mod date;
pub mod error;
pub mod ids;

pub use codes::{validate_email, AirportCode, CountryCode};
pub use config::StoreConfig;
pub use date::{Date, DateTime};
pub use error::{
    ConfigError, LoadError, ParseError, QueryError, Rejection, StoreError, ValueError,
};
pub use ids::{parse_non_negative, parse_positive, FlightId, HotelId, ReservationId};

/// Sex of a user.
///
/// `#[repr(u8)]` keeps the field one byte wide inside pooled entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Sex {
    /// `M`
    #[default]
    Male = 0,
    /// `F`
    Female = 1,
}

impl FromStr for Sex {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(Sex::Male),
            "F" => Ok(Sex::Female),
            _ => Err(ValueError::Malformed { kind: "sex" }),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sex::Male => "M",
            Sex::Female => "F",
        })
    }
}

/// Whether a user account is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum AccountStatus {
    /// `active` (any letter case).
    #[default]
    Active = 0,
    /// `inactive` (any letter case).
    Inactive = 1,
}

impl FromStr for AccountStatus {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("active") {
            Ok(AccountStatus::Active)
        } else if s.eq_ignore_ascii_case("inactive") {
            Ok(AccountStatus::Inactive)
        } else {
            Err(ValueError::Malformed {
                kind: "account status",
            })
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
        })
    }
}

/// Whether breakfast is included in a hotel reservation.
///
/// The original spelling is lost once parsed: `""`, `0`, `f` and `false`
/// all become [`IncludesBreakfast::Excluded`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum IncludesBreakfast {
    /// Printed as `False`.
    #[default]
    Excluded = 0,
    /// Printed as `True`.
    Included = 1,
}

impl IncludesBreakfast {
    /// Returns `true` when breakfast is included.
    #[inline(always)]
    pub const fn is_included(self) -> bool {
        matches!(self, IncludesBreakfast::Included)
    }
}

impl FromStr for IncludesBreakfast {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const EXCLUDED: [&str; 4] = ["", "0", "f", "false"];
        const INCLUDED: [&str; 3] = ["1", "t", "true"];

        if EXCLUDED.iter().any(|v| s.eq_ignore_ascii_case(v)) {
            Ok(IncludesBreakfast::Excluded)
        } else if INCLUDED.iter().any(|v| s.eq_ignore_ascii_case(v)) {
            Ok(IncludesBreakfast::Included)
        } else {
            Err(ValueError::Malformed {
                kind: "breakfast inclusion",
            })
        }
    }
}

impl fmt::Display for IncludesBreakfast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.is_included() { "True" } else { "False" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sex_is_exact_match() {
        assert_eq!("M".parse::<Sex>(), Ok(Sex::Male));
        assert_eq!("F".parse::<Sex>(), Ok(Sex::Female));
        assert!("m".parse::<Sex>().is_err());
        assert!("".parse::<Sex>().is_err());
        assert_eq!(Sex::Female.to_string(), "F");
    }

    #[test]
    fn account_status_ignores_case() {
        assert_eq!("AcTiVe".parse::<AccountStatus>(), Ok(AccountStatus::Active));
        assert_eq!(
            "INACTIVE".parse::<AccountStatus>(),
            Ok(AccountStatus::Inactive)
        );
        assert!("activ".parse::<AccountStatus>().is_err());
    }

    #[test]
    fn breakfast_table() {
        let cases = [
            ("", Some(false)),
            ("0", Some(false)),
            ("1", Some(true)),
            ("t", Some(true)),
            ("f", Some(false)),
            ("true", Some(true)),
            ("false", Some(false)),
            ("False", Some(false)),
            ("tRue", Some(true)),
            ("abcd", None),
            ("T", Some(true)),
        ];
        for (input, expected) in cases {
            let parsed = input.parse::<IncludesBreakfast>().ok().map(|b| b.is_included());
            assert_eq!(parsed, expected, "input {input:?}");
        }
        assert_eq!(IncludesBreakfast::Included.to_string(), "True");
        assert_eq!(IncludesBreakfast::Excluded.to_string(), "False");
    }

    #[test]
    fn enums_are_one_byte() {
        assert_eq!(size_of::<Sex>(), 1);
        assert_eq!(size_of::<AccountStatus>(), 1);
        assert_eq!(size_of::<IncludesBreakfast>(), 1);
    }
}
