use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;

/// A strictly positive amount of money in minor units (cents).
///
/// Every amount that enters a payment record, whether the expected amount set
/// at creation or the amount a payee reports having received, goes through
/// this type, so a zero or negative amount is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct AmountCents(i64);

impl AmountCents {
    pub fn new(cents: i64) -> Result<Self, PaymentError> {
        if cents > 0 {
            Ok(Self(cents))
        } else {
            Err(PaymentError::ValidationError(format!(
                "Amount must be a positive number of cents, got {cents}"
            )))
        }
    }

    /// Converts a decimal amount in currency units (e.g. `25.00`) to cents.
    ///
    /// Rejects fractions of a cent instead of rounding them away.
    pub fn from_decimal(value: Decimal) -> Result<Self, PaymentError> {
        let cents = value * Decimal::ONE_HUNDRED;
        if !cents.fract().is_zero() {
            return Err(PaymentError::ValidationError(format!(
                "Amount {value} has more than two decimal places"
            )));
        }
        let cents = i64::try_from(cents).map_err(|_| {
            PaymentError::ValidationError(format!("Amount {value} is out of range"))
        })?;
        Self::new(cents)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl TryFrom<i64> for AmountCents {
    type Error = PaymentError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AmountCents> for i64 {
    fn from(amount: AmountCents) -> Self {
        amount.0
    }
}

impl fmt::Display for AmountCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

/// Signed difference between two amounts, in cents.
impl Sub for AmountCents {
    type Output = i64;

    fn sub(self, rhs: Self) -> Self::Output {
        // Both operands are positive, so the difference cannot overflow.
        self.0 - rhs.0
    }
}
