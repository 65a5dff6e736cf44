use super::money::AmountCents;
use super::payment::PaymentRecord;

/// Fields written when a payee confirms receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPayload {
    pub confirmed_amount_cents: AmountCents,
    /// `confirmed - expected`; negative when the payee received less.
    pub discrepancy_cents: i64,
    pub discrepancy_flag: bool,
}

/// Reconciles the amount the payee reports against the amount expected.
///
/// Pure, so the transactional confirmation and read-only previews agree on
/// the numbers.
pub fn build_confirmation(
    record: &PaymentRecord,
    confirmed_amount_cents: AmountCents,
) -> ConfirmationPayload {
    let discrepancy_cents = confirmed_amount_cents - record.expected_amount_cents;
    ConfirmationPayload {
        confirmed_amount_cents,
        discrepancy_cents,
        discrepancy_flag: discrepancy_cents != 0,
    }
}
