//! Integer currency amounts
//!
//! Rent is charged and collected in whole currency units, so amounts are
//! carried as `i64` rather than decimals. A ledger runs in a single implicit
//! currency; the label used when rendering receipts is configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A whole-unit monetary amount
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Creates a new amount
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Creates a zero amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Returns the raw value
    pub const fn value(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checked addition, `None` on overflow
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction, `None` on overflow
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Saturating addition, clamped to `i64::MAX`
    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    /// Sums `amounts`, `None` if the total does not fit
    pub fn checked_sum(amounts: impl IntoIterator<Item = Amount>) -> Option<Amount> {
        amounts.into_iter().try_fold(Amount::zero(), Amount::checked_add)
    }

    /// What is still owed on `self` once `paid` has been received.
    ///
    /// Never negative: paying more than is due leaves a zero balance.
    pub fn balance_after(self, paid: Amount) -> Amount {
        Amount(self.0.saturating_sub(paid.0).max(0))
    }

    /// Renders the amount with a currency label, e.g. `KES 3500`
    pub fn display_with(&self, label: &str) -> String {
        format!("{} {}", label, self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Amount> for i64 {
    fn from(amount: Amount) -> i64 {
        amount.0
    }
}

impl Add for Amount {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Amount {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Saturates instead of overflowing; use [`Amount::checked_sum`] where an
/// overflow must be reported.
impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), Amount::saturating_add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_arithmetic() {
        let a = Amount::new(3500);
        let b = Amount::new(2000);

        assert_eq!(a + b, Amount::new(5500));
        assert_eq!(a - b, Amount::new(1500));
    }

    #[test]
    fn test_balance_after_floors_at_zero() {
        let due = Amount::new(3500);

        assert_eq!(due.balance_after(Amount::new(2000)), Amount::new(1500));
        assert_eq!(due.balance_after(Amount::new(3500)), Amount::zero());
        assert_eq!(due.balance_after(Amount::new(9000)), Amount::zero());
    }

    #[test]
    fn test_display_with_label() {
        assert_eq!(Amount::new(3500).display_with("KES"), "KES 3500");
    }

    #[test]
    fn test_sum() {
        let parts = vec![Amount::new(1), Amount::new(2), Amount::new(3)];
        let total: Amount = parts.iter().sum();
        assert_eq!(total, Amount::new(6));
    }

    #[test]
    fn test_sum_does_not_overflow() {
        let parts = [Amount::new(i64::MAX / 2), Amount::new(i64::MAX / 2), Amount::new(10)];

        assert_eq!(Amount::checked_sum(parts), None);
        assert_eq!(parts.iter().sum::<Amount>(), Amount::new(i64::MAX));
        assert_eq!(Amount::checked_sum(parts[..2].iter().copied()), Some(Amount::new(i64::MAX - 1)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn balance_after_is_never_negative(
            due in 0i64..1_000_000i64,
            paid in 0i64..2_000_000i64
        ) {
            let balance = Amount::new(due).balance_after(Amount::new(paid));
            prop_assert!(!balance.is_negative());
            prop_assert!(balance <= Amount::new(due));
        }

        #[test]
        fn balance_plus_paid_covers_due(
            due in 0i64..1_000_000i64,
            paid in 0i64..1_000_000i64
        ) {
            let due = Amount::new(due);
            let paid = Amount::new(paid);
            prop_assert!(due.balance_after(paid) + paid >= due);
        }
    }
}
