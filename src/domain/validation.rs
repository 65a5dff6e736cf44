use super::money::AmountCents;
use crate::config::EngineConfig;
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;

/// Sanitizes caller-supplied text and enforces amount bounds.
#[derive(Debug, Clone)]
pub struct InputValidator {
    amount_ceiling_cents: i64,
    note_max_chars: usize,
    reference_max_chars: usize,
}

impl InputValidator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            amount_ceiling_cents: config.amount_ceiling_cents,
            note_max_chars: config.note_max_chars,
            reference_max_chars: config.reference_max_chars,
        }
    }

    /// Validates the expected amount of a payment being created.
    pub fn creation_amount(&self, cents: i64) -> Result<AmountCents> {
        let amount = AmountCents::new(cents)?;
        if amount.value() > self.amount_ceiling_cents {
            return Err(PaymentError::ValidationError(format!(
                "Amount {amount} exceeds the limit of {}",
                Decimal::new(self.amount_ceiling_cents, 2)
            )));
        }
        Ok(amount)
    }

    /// Re-checks an amount reported by a payee. The creation ceiling does not apply.
    pub fn confirmed_amount(&self, cents: i64) -> Result<AmountCents> {
        AmountCents::new(cents)
    }

    pub fn note(&self, raw: &str) -> Result<String> {
        sanitize(raw, self.note_max_chars, "Note")
    }

    /// Sanitizes an optional provider handle or transaction reference.
    /// Blank input is treated as absent.
    pub fn reference(&self, raw: Option<&str>, field: &str) -> Result<Option<String>> {
        match raw {
            None => Ok(None),
            Some(raw) => {
                let clean = sanitize(raw, self.reference_max_chars, field)?;
                Ok((!clean.is_empty()).then_some(clean))
            }
        }
    }
}

impl Default for InputValidator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

/// Drops control characters, collapses whitespace runs and trims.
fn sanitize(raw: &str, max_chars: usize, field: &str) -> Result<String> {
    let clean = raw
        .split_whitespace()
        .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let len = clean.chars().count();
    if len > max_chars {
        return Err(PaymentError::ValidationError(format!(
            "{field} is {len} characters long, the limit is {max_chars}"
        )));
    }
    Ok(clean)
}
