//! Fixed-width ASCII codes and e-mail validation.

use core::fmt;
use core::str::FromStr;

use crate::error::ValueError;

/// Two-letter country code, stored exactly as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CountryCode([u8; 2]);

impl CountryCode {
    /// Raw bytes of the code.
    #[inline(always)]
    pub const fn as_bytes(&self) -> [u8; 2] {
        self.0
    }
}

impl FromStr for CountryCode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match *s.as_bytes() {
            [a, b] if a.is_ascii_alphabetic() && b.is_ascii_alphabetic() => Ok(Self([a, b])),
            _ => Err(ValueError::Malformed {
                kind: "country code",
            }),
        }
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ascii(f, &self.0)
    }
}

/// Three-letter airport code, canonicalized to upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AirportCode([u8; 3]);

impl AirportCode {
    /// Raw (upper-case) bytes of the code.
    #[inline(always)]
    pub const fn as_bytes(&self) -> [u8; 3] {
        self.0
    }
}

impl FromStr for AirportCode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match *s.as_bytes() {
            [a, b, c] if [a, b, c].iter().all(u8::is_ascii_alphabetic) => Ok(Self([
                a.to_ascii_uppercase(),
                b.to_ascii_uppercase(),
                c.to_ascii_uppercase(),
            ])),
            _ => Err(ValueError::Malformed {
                kind: "airport code",
            }),
        }
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_ascii(f, &self.0)
    }
}

fn write_ascii(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    bytes
        .iter()
        .try_for_each(|&b| fmt::Write::write_char(f, b as char))
}

/// Checks that `s` looks like `user@domain.tld`.
///
/// There must be exactly one `@`, a non-empty user part, and a host part whose
/// last `.` separates a non-empty domain from a top-level domain of at least
/// two characters.
pub fn validate_email(s: &str) -> Result<(), ValueError> {
    const MALFORMED: ValueError = ValueError::Malformed { kind: "email" };

    let (user, host) = s.split_once('@').ok_or(MALFORMED)?;
    if user.is_empty() || host.contains('@') {
        return Err(MALFORMED);
    }
    let (domain, tld) = host.rsplit_once('.').ok_or(MALFORMED)?;
    if domain.is_empty() || tld.len() < 2 {
        return Err(MALFORMED);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_codes() {
        let code: CountryCode = "PT".parse().unwrap();
        assert_eq!(code.to_string(), "PT");
        assert_eq!("pt".parse::<CountryCode>().unwrap().to_string(), "pt");
        for bad in ["", "P", "PRT", "P1", "ç1"] {
            assert!(bad.parse::<CountryCode>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn airport_codes_are_uppercased() {
        let code: AirportCode = "opo".parse().unwrap();
        assert_eq!(code.to_string(), "OPO");
        assert_eq!(code, "OPO".parse().unwrap());
        for bad in ["", "OP", "OPOR", "OP0"] {
            assert!(bad.parse::<AirportCode>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn emails() {
        for good in ["a@b.cc", "john.doe@mail.example.com", "x@y.pt"] {
            assert!(validate_email(good).is_ok(), "rejected {good:?}");
        }
        for bad in [
            "", "plain", "@b.cc", "a@.cc", "a@b.c", "a@bcc", "a@b@c.cc", "a@b.",
        ] {
            assert!(validate_email(bad).is_err(), "accepted {bad:?}");
        }
    }
}
