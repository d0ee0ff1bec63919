use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::op;

pub const CURRENCY_SYMBOL: &str = "£";

//--------------------------------------       Money         ---------------------------------------------------------
/// An amount of money in integer pence. All prices and totals in the shop are carried as `Money` so that sums and
/// comparisons are exact; conversion to pounds only happens at display time.
#[derive(Debug, Clone, Copy, Default, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        Self::from(self.value() * i64::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in pence: {0}")]
pub struct MoneyConversionError(String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl TryFrom<u64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {} is too large to convert to Money", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let pence = self.0.abs();
        write!(f, "{sign}{CURRENCY_SYMBOL}{}.{:02}", pence / 100, pence % 100)
    }
}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub const fn from_pence(pence: i64) -> Self {
        Self(pence)
    }

    pub const fn from_pounds(pounds: i64) -> Self {
        Self(pounds * 100)
    }

    /// The amount in fractional pounds. Only for display-formatting; arithmetic stays in pence.
    pub fn as_pounds(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// `percent` percent of this amount, rounded down to the nearest penny.
    pub fn percent_of(&self, percent: i64) -> Self {
        Self(self.0 * percent / 100)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_formats_pounds_and_pence() {
        assert_eq!(Money::from_pence(26900).to_string(), "£269.00");
        assert_eq!(Money::from_pence(499).to_string(), "£4.99");
        assert_eq!(Money::from_pence(5).to_string(), "£0.05");
        assert_eq!(Money::from_pence(-1250).to_string(), "-£12.50");
    }

    #[test]
    fn arithmetic_is_exact_in_pence() {
        let a = Money::from_pence(499);
        let b = Money::from_pence(1);
        assert_eq!(a + b, Money::from_pounds(5));
        assert_eq!(Money::from_pounds(5) - b, a);
        assert_eq!(a * 3i64, Money::from_pence(1497));
        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total, Money::from_pence(501));
    }

    #[test]
    fn percent_of_rounds_down() {
        assert_eq!(Money::from_pence(26900).percent_of(10), Money::from_pence(2690));
        assert_eq!(Money::from_pence(999).percent_of(10), Money::from_pence(99));
    }
}
