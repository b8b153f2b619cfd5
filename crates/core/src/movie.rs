//! Movie domain rules: runtime representation, sortable columns and field
//! validation.

use std::fmt;
use std::str::FromStr;

use chrono::Datelike;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::validator::{unique, Validator};

/// Sort keys accepted by the movie listing.
pub const MOVIES_SORT_SAFELIST: &[&str] = &[
    "id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime",
];

/// Earliest release year accepted (the first motion pictures).
pub const MIN_YEAR: i32 = 1888;

/// Maximum title length in bytes.
pub const MAX_TITLE_BYTES: usize = 500;

/// Maximum number of genres on one movie.
pub const MAX_GENRES: usize = 5;

#[derive(Debug, thiserror::Error)]
#[error("invalid runtime format")]
pub struct InvalidRuntimeFormat;

/// Movie length in minutes.
///
/// Stored as a plain integer; serialized as `"<n> mins"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Runtime(i32);

impl Runtime {
    pub fn new(minutes: i32) -> Self {
        Self(minutes)
    }

    pub fn minutes(self) -> i32 {
        self.0
    }
}

impl From<i32> for Runtime {
    fn from(minutes: i32) -> Self {
        Self(minutes)
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mins", self.0)
    }
}

impl FromStr for Runtime {
    type Err = InvalidRuntimeFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let minutes = s
            .strip_suffix(" mins")
            .ok_or(InvalidRuntimeFormat)?
            .parse::<i32>()
            .map_err(|_| InvalidRuntimeFormat)?;
        Ok(Self(minutes))
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Check the user-editable fields of a movie.
pub fn validate_movie(
    v: &mut Validator,
    title: &str,
    year: i32,
    runtime: Runtime,
    genres: &[String],
) {
    v.check(!title.is_empty(), "title", "must be provided");
    v.check(
        title.len() <= MAX_TITLE_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );

    v.check(year != 0, "year", "must be provided");
    v.check(year >= MIN_YEAR, "year", "must be greater than 1888");
    v.check(
        year <= chrono::Utc::now().year(),
        "year",
        "must not be in the future",
    );

    v.check(runtime.minutes() != 0, "runtime", "must be provided");
    v.check(runtime.minutes() > 0, "runtime", "must be a positive integer");

    v.check(!genres.is_empty(), "genres", "must contain at least 1 genre");
    v.check(
        genres.len() <= MAX_GENRES,
        "genres",
        "must not contain more than 5 genres",
    );
    v.check(
        genres.iter().all(|g| !g.is_empty()),
        "genres",
        "must not contain empty values",
    );
    v.check(unique(genres), "genres", "must not contain duplicate values");
}
