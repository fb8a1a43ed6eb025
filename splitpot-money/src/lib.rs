#![warn(clippy::uninlined_format_args)]

pub mod format;

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Div, Neg, Sub, SubAssign},
};

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use thiserror::Error;

pub use format::{Currency, format_currency, format_number};

/// Scale factor shared by every scaled type: four implied decimal digits.
pub const SCALE_FACTOR: i64 = 10_000;

/// Number of implied decimal digits behind [`SCALE_FACTOR`].
pub const SCALE_DIGITS: u32 = 4;

/// Decimal digits used for display; storage always keeps all four.
pub const DISPLAY_DIGITS: u32 = 2;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScaleError {
    #[error("value does not fit the scaled 64-bit range")]
    OutOfRange,
}

/// A monetary amount as an integer number of 0.0001 currency units.
///
/// Arithmetic on monetary values happens exclusively on this type; a
/// floating-point amount can only enter through [`Money::from_decimal`] and
/// only leave through [`Money::to_decimal`] (display/debug use).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

/// An exchange rate at four-decimal scaled precision.
///
/// A distinct type so an amount can never be passed where a rate is expected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rate(i64);

/// A percentage at four-decimal scaled precision (33.3333% is exact).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Percent(i64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub fn zero() -> Self {
        Self(0)
    }

    /// Wraps a raw scaled integer (0.0001-unit count).
    pub const fn from_scaled(value: i64) -> Self {
        Self(value)
    }

    /// Whole currency units, e.g. `from_major(90)` is 90.00.
    pub fn from_major(units: i64) -> Self {
        Self(units * SCALE_FACTOR)
    }

    /// Converts a decimal amount to the scaled representation, rounding
    /// half away from zero at the fourth decimal digit.
    pub fn from_decimal(value: Decimal) -> Result<Self, ScaleError> {
        scale_decimal(value).map(Self)
    }

    /// The scaled integer magnitude. Authoritative; never reconstructed
    /// from a decimal round trip.
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Decimal view for display and debugging only.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, SCALE_DIGITS)
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn signum(self) -> i64 {
        self.0.signum()
    }

    /// Applies an exchange rate: `(amount * rate) / 10_000` in 128-bit
    /// intermediate arithmetic, truncating toward zero on the final
    /// division. `None` when the converted amount leaves the 64-bit range.
    pub fn checked_mul_rate(self, rate: Rate) -> Option<Self> {
        mul_div(self.0, rate.0, SCALE_FACTOR).map(Self)
    }

    /// The given percentage of this amount, truncated toward zero.
    ///
    /// The percentage must already be range-checked to 0..=100; under that
    /// contract the result magnitude never exceeds the input and the
    /// narrowing below is lossless.
    pub fn percent_of(self, percent: Percent) -> Self {
        debug_assert!((0..=Percent::ONE_HUNDRED.raw()).contains(&percent.raw()));
        let wide = i128::from(self.0) * i128::from(percent.0) / i128::from(SCALE_FACTOR * 100);
        Self(wide as i64)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .to_decimal()
            .round_dp_with_strategy(DISPLAY_DIGITS, RoundingStrategy::MidpointNearestEven);
        write!(f, "{rounded:.2}")
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

/// Integer division truncating toward zero: `-5 / 2` is `-2`, not `-3`.
impl Div<i64> for Money {
    type Output = Self;

    fn div(self, rhs: i64) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Rate {
    /// The 1:1 rate used when an expense is already in the main currency.
    pub const IDENTITY: Self = Self(SCALE_FACTOR);

    pub const fn from_scaled(value: i64) -> Self {
        Self(value)
    }

    pub fn from_decimal(value: Decimal) -> Result<Self, ScaleError> {
        scale_decimal(value).map(Self)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, SCALE_DIGITS)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal().normalize())
    }
}

impl Percent {
    pub const ZERO: Self = Self(0);
    pub const ONE_HUNDRED: Self = Self(100 * SCALE_FACTOR);

    pub const fn from_scaled(value: i64) -> Self {
        Self(value)
    }

    /// Rounds to four decimal digits half away from zero, so 12.34556
    /// becomes 12.3456.
    pub fn from_decimal(value: Decimal) -> Result<Self, ScaleError> {
        scale_decimal(value).map(Self)
    }

    pub const fn raw(self) -> i64 {
        self.0
    }

    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, SCALE_DIGITS)
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.to_decimal().normalize())
    }
}

impl Add for Percent {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Percent {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sum for Percent {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

fn scale_decimal(value: Decimal) -> Result<i64, ScaleError> {
    let scaled = value
        .checked_mul(Decimal::from(SCALE_FACTOR))
        .ok_or(ScaleError::OutOfRange)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    scaled.to_i64().ok_or(ScaleError::OutOfRange)
}

fn mul_div(value: i64, factor: i64, divisor: i64) -> Option<i64> {
    let wide = i128::from(value) * i128::from(factor) / i128::from(divisor);
    i64::try_from(wide).ok()
}
