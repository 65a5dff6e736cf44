use super::payment::{ActorId, DisputeReason, PaymentId, PaymentRecord};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationKind {
    /// The payer says the money is on its way.
    PaymentSent,
    ReceiptConfirmed {
        confirmed_amount_cents: i64,
        discrepancy_cents: i64,
    },
    DisputeFiled { reason: DisputeReason },
}

/// A message for the counterpart of a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationEvent {
    pub payment_id: PaymentId,
    pub recipient: ActorId,
    #[serde(flatten)]
    pub kind: NotificationKind,
}

impl NotificationEvent {
    pub fn payment_sent(record: &PaymentRecord) -> Self {
        Self {
            payment_id: record.id.clone(),
            recipient: record.payee_id.clone(),
            kind: NotificationKind::PaymentSent,
        }
    }

    pub fn receipt_confirmed(record: &PaymentRecord) -> Option<Self> {
        let confirmation = record.confirmation()?;
        Some(Self {
            payment_id: record.id.clone(),
            recipient: record.payer_id.clone(),
            kind: NotificationKind::ReceiptConfirmed {
                confirmed_amount_cents: confirmation.confirmed_amount_cents.value(),
                discrepancy_cents: confirmation.discrepancy_cents,
            },
        })
    }

    pub fn dispute_filed(record: &PaymentRecord) -> Option<Self> {
        let dispute = record.dispute()?;
        Some(Self {
            payment_id: record.id.clone(),
            recipient: record.payer_id.clone(),
            kind: NotificationKind::DisputeFiled {
                reason: dispute.reason,
            },
        })
    }
}
