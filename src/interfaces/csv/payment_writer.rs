use crate::domain::payment::{DisputeReason, PaymentRecord, PaymentStatus, Provider};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct PaymentRow<'a> {
    payment: &'a str,
    payer: &'a str,
    payee: &'a str,
    provider: Provider,
    status: PaymentStatus,
    expected: Decimal,
    confirmed: Option<Decimal>,
    discrepancy: Option<Decimal>,
    flagged: Option<bool>,
    reason: Option<DisputeReason>,
}

impl<'a> From<&'a PaymentRecord> for PaymentRow<'a> {
    fn from(record: &'a PaymentRecord) -> Self {
        let confirmation = record.confirmation();
        Self {
            payment: record.id.as_str(),
            payer: record.payer_id.as_str(),
            payee: record.payee_id.as_str(),
            provider: record.provider,
            status: record.status(),
            expected: record.expected_amount_cents.to_decimal(),
            confirmed: confirmation.map(|c| c.confirmed_amount_cents.to_decimal()),
            discrepancy: confirmation.map(|c| Decimal::new(c.discrepancy_cents, 2)),
            flagged: confirmation.map(|c| c.discrepancy_flag),
            reason: record.dispute().map(|d| d.reason),
        }
    }
}

/// Writes the final state of payments as CSV, one row per payment, with money
/// in currency units.
pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(sink),
        }
    }

    pub fn write_payments<'a>(
        &mut self,
        payments: impl IntoIterator<Item = &'a PaymentRecord>,
    ) -> Result<()> {
        self.writer.write_record([
            "payment",
            "payer",
            "payee",
            "provider",
            "status",
            "expected",
            "confirmed",
            "discrepancy",
            "flagged",
            "reason",
        ])?;
        for record in payments {
            self.writer.serialize(PaymentRow::from(record))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
