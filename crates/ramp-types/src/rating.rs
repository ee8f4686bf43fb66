//! Star ratings on the shared zero-to-five scale.
//!
//! Reach, impact, confidence and effort all use the same scale, so the
//! range check lives in one place. Zero is a legal value and means "not
//! yet rated"; any factor at zero drives the RICE product to zero.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Highest star value on the rating scale.
pub const MAX_STARS: u8 = 5;

/// A value outside the zero-to-five rating scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rating must be between 0 and {MAX_STARS}, got {0}")]
pub struct RatingOutOfRange(pub u8);

/// A star rating in `0..=5`.
///
/// Construction goes through [`Rating::new`] (or serde, which applies
/// the same check), so a held value is always in range.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(pub(crate) u8);

impl Rating {
    /// The unrated zero value.
    pub const ZERO: Rating = Rating(0);
    /// The maximum five-star value.
    pub const MAX: Rating = Rating(MAX_STARS);

    pub fn new(value: u8) -> Result<Self, RatingOutOfRange> {
        if value > MAX_STARS {
            Err(RatingOutOfRange(value))
        } else {
            Ok(Self(value))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Renders the rating as filled and hollow stars, e.g. `★★★☆☆`
    /// for three.
    pub fn stars(&self) -> String {
        let filled = self.0 as usize;
        let mut out = String::new();
        for _ in 0..filled {
            out.push('★');
        }
        for _ in filled..MAX_STARS as usize {
            out.push('☆');
        }
        out
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Rating::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> u8 {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Rating {
    type Err = RatingOutOfRange;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s.trim().parse().map_err(|_| RatingOutOfRange(u8::MAX))?;
        Rating::new(value)
    }
}
