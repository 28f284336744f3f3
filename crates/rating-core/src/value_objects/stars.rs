//! Star ratings and the curve that turns them into score contributions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::{IntErrorKind, ParseIntError};

use crate::error::DomainError;

/// A validated star rating in `1..=5`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stars(u8);

impl Stars {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// Validate a raw rating
    pub fn new(value: u8) -> Result<Self, DomainError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidStars(i64::from(value)))
        }
    }

    /// Parse a rating typed by an actor ("4", " 5 ")
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed = input.trim();
        let value: i64 = trimmed.parse().map_err(|e: ParseIntError| match e.kind() {
            // Still a number, just far out of range
            IntErrorKind::PosOverflow => DomainError::InvalidStars(i64::MAX),
            IntErrorKind::NegOverflow => DomainError::InvalidStars(i64::MIN),
            _ => DomainError::ValidationError(format!("not a star rating: {trimmed}")),
        })?;
        u8::try_from(value)
            .map_err(|_| DomainError::InvalidStars(value))
            .and_then(Self::new)
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Score contribution of this rating
    #[inline]
    pub fn weight(self) -> i64 {
        RatingCurve::delta(self)
    }
}

impl TryFrom<u8> for Stars {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i16> for Stars {
    type Error = DomainError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| DomainError::InvalidStars(i64::from(value)))
            .and_then(Self::new)
    }
}

impl From<Stars> for u8 {
    fn from(stars: Stars) -> Self {
        stars.0
    }
}

impl fmt::Display for Stars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

/// Fixed mapping from stars to score delta
///
/// | stars | delta |
/// |-------|-------|
/// | 1     | -5    |
/// | 2     | -2    |
/// | 3     | 0     |
/// | 4     | +2    |
/// | 5     | +5    |
pub struct RatingCurve;

impl RatingCurve {
    const WEIGHTS: [i64; 5] = [-5, -2, 0, 2, 5];

    /// Contribution of a single review with the given rating
    #[inline]
    pub fn delta(stars: Stars) -> i64 {
        Self::WEIGHTS[usize::from(stars.0 - Stars::MIN)]
    }

    /// Delta produced when a review moves from `before` to `after`
    #[inline]
    pub fn edit_delta(before: Stars, after: Stars) -> i64 {
        Self::delta(after) - Self::delta(before)
    }
}
