//! Money amount type with fixed-point precision.
//!
//! Amounts are stored in minor units (cents) internally so that ledger
//! arithmetic is exact. All arithmetic operations are overflow-safe.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CoreError, MINOR_PER_MAJOR};

/// A money amount in a single currency.
///
/// Internally stored as minor units (1 major unit = 100 minor units) to
/// avoid floating-point issues in ledger arithmetic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    /// Zero amount constant.
    pub const ZERO: Self = Self(0);

    /// Maximum possible amount.
    pub const MAX: Self = Self(u64::MAX);

    /// Creates an amount from minor units (cents).
    #[must_use]
    pub const fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Creates an amount from whole major units.
    #[must_use]
    pub const fn from_major(major: u64) -> Self {
        Self(major * MINOR_PER_MAJOR)
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn as_minor(self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Saturating addition.
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Multiplies by an integer quantity, checking for overflow.
    #[must_use]
    pub const fn checked_mul(self, quantity: u64) -> Option<Self> {
        match self.0.checked_mul(quantity) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Takes a basis-point fraction of the amount (1 bp = 0.01%).
    ///
    /// Uses u128 intermediates so the product cannot overflow; the result
    /// is rounded half-up to the minor unit.
    #[must_use]
    pub const fn basis_points(self, bps: u32) -> Self {
        let scaled = self.0 as u128 * bps as u128;
        let rounded = (scaled + 5_000) / 10_000;
        if rounded > u64::MAX as u128 {
            Self::MAX
        } else {
            Self(rounded as u64)
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / MINOR_PER_MAJOR, self.0 % MINOR_PER_MAJOR)
    }
}

impl FromStr for Amount {
    type Err = CoreError;

    /// Parses `"123.45"` or `"123"` into an amount.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidAmount(format!("cannot parse {s:?}"));

        let (major_str, minor_str) = match s.split_once('.') {
            Some((maj, min)) => (maj, min),
            None => (s, ""),
        };

        let major: u64 = major_str.parse().map_err(|_| invalid())?;
        let minor: u64 = match minor_str.len() {
            0 => 0,
            1 => minor_str.parse::<u64>().map_err(|_| invalid())? * 10,
            2 => minor_str.parse().map_err(|_| invalid())?,
            _ => return Err(invalid()),
        };

        major
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|m| m.checked_add(minor))
            .map(Self)
            .ok_or_else(|| CoreError::InvalidAmount(format!("{s:?} overflows")))
    }
}

impl From<u64> for Amount {
    fn from(minor: u64) -> Self {
        Self::from_minor(minor)
    }
}
