//! Numeric identifiers with their textual prefixes stripped.
//!
//! Flight and reservation identifiers arrive as text (`0000000042`,
//! `Book0000000042`) but are stored as plain integers. Leading zeros are not
//! preserved; [`Display`](core::fmt::Display) prints the canonical padded
//! form.

use core::fmt;
use core::str::FromStr;

use crate::error::ValueError;

/// Parses a run of decimal digits into a `u64`.
///
/// Signs, spaces and empty input are all rejected.
pub fn parse_non_negative(s: &str, kind: &'static str) -> Result<u64, ValueError> {
    if s.is_empty() {
        return Err(ValueError::Malformed { kind });
    }
    s.bytes().try_fold(0u64, |acc, b| {
        if !b.is_ascii_digit() {
            return Err(ValueError::Malformed { kind });
        }
        acc.checked_mul(10)
            .and_then(|v| v.checked_add((b - b'0') as u64))
            .ok_or(ValueError::OutOfRange { kind })
    })
}

/// Like [`parse_non_negative`], but zero is out of range.
pub fn parse_positive(s: &str, kind: &'static str) -> Result<u64, ValueError> {
    match parse_non_negative(s, kind)? {
        0 => Err(ValueError::OutOfRange { kind }),
        n => Ok(n),
    }
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, prefix = $prefix:literal, kind = $kind:literal, width = $width:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        #[repr(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the numeric value.
            #[inline(always)]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = ValueError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s
                    .strip_prefix($prefix)
                    .ok_or(ValueError::Malformed { kind: $kind })?;
                parse_non_negative(digits, $kind).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{:0", $width, "}"), self.0)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

numeric_id!(
    /// Flight identifier, printed as ten zero-padded digits.
    FlightId, prefix = "", kind = "flight id", width = 10
);

numeric_id!(
    /// Reservation identifier, `Book` followed by ten zero-padded digits.
    ReservationId, prefix = "Book", kind = "reservation id", width = 10
);

numeric_id!(
    /// Hotel identifier, `HTL` followed by the number.
    HotelId, prefix = "HTL", kind = "hotel id", width = 1
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers() {
        assert_eq!(parse_non_negative("0", "n"), Ok(0));
        assert_eq!(parse_non_negative("0042", "n"), Ok(42));
        assert!(parse_non_negative("", "n").is_err());
        assert!(parse_non_negative("-1", "n").is_err());
        assert!(parse_non_negative("+1", "n").is_err());
        assert!(parse_non_negative("1.5", "n").is_err());
        assert_eq!(
            parse_non_negative("99999999999999999999999", "n"),
            Err(ValueError::OutOfRange { kind: "n" })
        );
        assert_eq!(parse_positive("0", "n"), Err(ValueError::OutOfRange { kind: "n" }));
        assert_eq!(parse_positive("7", "n"), Ok(7));
    }

    #[test]
    fn flight_ids_are_zero_padded() {
        let id: FlightId = "0000000042".parse().unwrap();
        assert_eq!(id, FlightId(42));
        assert_eq!(id.to_string(), "0000000042");
        assert_eq!("42".parse::<FlightId>().unwrap().to_string(), "0000000042");
        assert!("F42".parse::<FlightId>().is_err());
    }

    #[test]
    fn reservation_ids_need_their_prefix() {
        let id: ReservationId = "Book0000000003".parse().unwrap();
        assert_eq!(id.get(), 3);
        assert_eq!(id.to_string(), "Book0000000003");
        assert!("0000000003".parse::<ReservationId>().is_err());
        assert!("book0000000003".parse::<ReservationId>().is_err());
        assert!("Book".parse::<ReservationId>().is_err());
    }

    #[test]
    fn hotel_ids() {
        let id: HotelId = "HTL1001".parse().unwrap();
        assert_eq!(id.get(), 1001);
        assert_eq!(id.to_string(), "HTL1001");
        assert!("1001".parse::<HotelId>().is_err());
    }
}
