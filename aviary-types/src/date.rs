//! Packed calendar dates and timestamps.
//!
//! Both types are stored as a single integer built with explicit shifts and
//! masks, so the encoding does not depend on struct layout or endianness:
//!
//! ```text
//! Date     (u32): [ year: 16 | month: 4 | day: 5 ]
//! DateTime (u64): [ date: 30 | hour: 5 | minute: 6 | second: 6 ]
//! ```
//!
//! Because the most significant fields sit in the highest bits, comparing two
//! packed values as integers compares them chronologically.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValueError;

const DAY_BITS: u32 = 5;
const MONTH_BITS: u32 = 4;
const DAY_MASK: u32 = (1 << DAY_BITS) - 1;
const MONTH_MASK: u32 = (1 << MONTH_BITS) - 1;
const YEAR_SHIFT: u32 = DAY_BITS + MONTH_BITS;

const SECOND_BITS: u32 = 6;
const MINUTE_BITS: u32 = 6;
const HOUR_BITS: u32 = 5;
const SECOND_MASK: u64 = (1 << SECOND_BITS) - 1;
const MINUTE_MASK: u64 = (1 << MINUTE_BITS) - 1;
const HOUR_MASK: u64 = (1 << HOUR_BITS) - 1;
const TIME_BITS: u32 = SECOND_BITS + MINUTE_BITS + HOUR_BITS;

const DAYS_PER_MONTH: i64 = 31;
const DAYS_PER_YEAR: i64 = 12 * DAYS_PER_MONTH;
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// A calendar date in the `YYYY/MM/DD` format.
///
/// Validation is per component (`1..=9999`, `1..=12`, `1..=31`); the day is
/// not checked against the length of its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Date(u32);

impl Date {
    /// `0001/01/01`.
    pub const MIN: Date = Date::pack(1, 1, 1);

    /// Builds a date from its components.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::OutOfRange`] if any component is out of bounds.
    pub fn new(year: u16, month: u8, day: u8) -> Result<Self, ValueError> {
        if !(1..=9999).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day)
        {
            return Err(ValueError::OutOfRange { kind: "date" });
        }
        Ok(Self::pack(year, month, day))
    }

    #[inline(always)]
    const fn pack(year: u16, month: u8, day: u8) -> Self {
        Self(((year as u32) << YEAR_SHIFT) | ((month as u32) << DAY_BITS) | day as u32)
    }

    /// Year component.
    #[inline(always)]
    pub const fn year(self) -> u16 {
        (self.0 >> YEAR_SHIFT) as u16
    }

    /// Month component (`1..=12`).
    #[inline(always)]
    pub const fn month(self) -> u8 {
        ((self.0 >> DAY_BITS) & MONTH_MASK) as u8
    }

    /// Day component (`1..=31`).
    #[inline(always)]
    pub const fn day(self) -> u8 {
        (self.0 & DAY_MASK) as u8
    }

    /// Returns the packed representation.
    #[inline(always)]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Number of days from `earlier` to `self`, counting every month as 31
    /// days. Negative when `self` precedes `earlier`.
    pub fn days_since(self, earlier: Date) -> i64 {
        self.day_number() - earlier.day_number()
    }

    #[inline(always)]
    fn day_number(self) -> i64 {
        self.year() as i64 * DAYS_PER_YEAR + self.month() as i64 * DAYS_PER_MONTH + self.day() as i64
    }

    /// Whole years elapsed between `self` (a birth date) and `today`.
    pub fn years_until(self, today: Date) -> i32 {
        let mut years = today.year() as i32 - self.year() as i32;
        if (today.month(), today.day()) < (self.month(), self.day()) {
            years -= 1;
        }
        years
    }
}

impl Default for Date {
    fn default() -> Self {
        Self::MIN
    }
}

impl FromStr for Date {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b = s.as_bytes();
        if b.len() != 10 || b[4] != b'/' || b[7] != b'/' {
            return Err(ValueError::Malformed { kind: "date" });
        }
        let year = digits(&b[0..4], "date")?;
        let month = digits(&b[5..7], "date")?;
        let day = digits(&b[8..10], "date")?;
        Date::new(year as u16, month as u8, day as u8)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year(), self.month(), self.day())
    }
}

/// A date and a time of day, `YYYY/MM/DD HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct DateTime(u64);

impl DateTime {
    /// Builds a timestamp from a date and a time of day.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::OutOfRange`] for an hour above 23 or a minute or
    /// second above 59.
    pub fn new(date: Date, hour: u8, minute: u8, second: u8) -> Result<Self, ValueError> {
        if hour > 23 || minute > 59 || second > 59 {
            return Err(ValueError::OutOfRange { kind: "time" });
        }
        Ok(Self(
            ((date.as_u32() as u64) << TIME_BITS)
                | ((hour as u64) << (MINUTE_BITS + SECOND_BITS))
                | ((minute as u64) << SECOND_BITS)
                | second as u64,
        ))
    }

    /// Date component.
    #[inline(always)]
    pub const fn date(self) -> Date {
        Date((self.0 >> TIME_BITS) as u32)
    }

    /// Hour component (`0..=23`).
    #[inline(always)]
    pub const fn hour(self) -> u8 {
        ((self.0 >> (MINUTE_BITS + SECOND_BITS)) & HOUR_MASK) as u8
    }

    /// Minute component (`0..=59`).
    #[inline(always)]
    pub const fn minute(self) -> u8 {
        ((self.0 >> SECOND_BITS) & MINUTE_MASK) as u8
    }

    /// Second component (`0..=59`).
    #[inline(always)]
    pub const fn second(self) -> u8 {
        (self.0 & SECOND_MASK) as u8
    }

    /// Seconds from `earlier` to `self`, with the same 31-day-month
    /// approximation as [`Date::days_since`].
    pub fn seconds_since(self, earlier: DateTime) -> i64 {
        self.date().days_since(earlier.date()) * SECONDS_PER_DAY + self.second_of_day()
            - earlier.second_of_day()
    }

    #[inline(always)]
    fn second_of_day(self) -> i64 {
        self.hour() as i64 * 3600 + self.minute() as i64 * 60 + self.second() as i64
    }
}

impl FromStr for DateTime {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b = s.as_bytes();
        if b.len() != 19 || b[10] != b' ' || b[13] != b':' || b[16] != b':' {
            return Err(ValueError::Malformed { kind: "date and time" });
        }
        // Byte 10 is ASCII, so both halves are on char boundaries.
        let date: Date = s[..10].parse()?;
        let hour = digits(&b[11..13], "time")?;
        let minute = digits(&b[14..16], "time")?;
        let second = digits(&b[17..19], "time")?;
        DateTime::new(date, hour as u8, minute as u8, second as u8)
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}:{:02}:{:02}",
            self.date(),
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

/// Parses a fixed-width run of ASCII digits.
fn digits(bytes: &[u8], kind: &'static str) -> Result<u32, ValueError> {
    bytes.iter().try_fold(0u32, |acc, &b| {
        if b.is_ascii_digit() {
            Ok(acc * 10 + (b - b'0') as u32)
        } else {
            Err(ValueError::Malformed { kind })
        }
    })
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
