//! Release date with a single textual form, `DD.MM.YYYY`.
//!
//! The same form is used on the wire, in query parameters and when decoding
//! text columns, so [`ReleaseDate::parse`] and the `Display` impl are exact
//! inverses. Anything else (`2021-03-17`, `1.3.2021`, trailing spaces) is
//! rejected with [`LibraryError::InvalidDate`].

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{LibraryError, Result};

/// `chrono` format string matching the textual form.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Calendar date without a time component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReleaseDate(NaiveDate);

impl ReleaseDate {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build from calendar components, `None` if the date does not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse the strict `DD.MM.YYYY` form.
    ///
    /// `chrono` alone accepts unpadded fields, so the shape is checked first.
    pub fn parse(input: &str) -> Result<Self> {
        if !has_date_shape(input) {
            return Err(LibraryError::InvalidDate(input.to_string()));
        }

        NaiveDate::parse_from_str(input, DATE_FORMAT)
            .map(Self)
            .map_err(|_| LibraryError::InvalidDate(input.to_string()))
    }

    pub fn as_naive_date(&self) -> NaiveDate {
        self.0
    }
}

fn has_date_shape(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'.',
            _ => b.is_ascii_digit(),
        })
}

impl From<NaiveDate> for ReleaseDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<ReleaseDate> for NaiveDate {
    fn from(date: ReleaseDate) -> Self {
        date.0
    }
}

impl fmt::Display for ReleaseDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for ReleaseDate {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ReleaseDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReleaseDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
