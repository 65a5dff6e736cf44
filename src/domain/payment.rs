use super::money::AmountCents;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of a payment record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a party (payer or payee), as supplied by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// External payment rails a transfer can be made through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Provider {
    #[serde(alias = "paypal")]
    Paypal,
    #[serde(alias = "venmo")]
    Venmo,
    #[serde(alias = "cashapp")]
    Cashapp,
    #[serde(alias = "zelle")]
    Zelle,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Paypal => "PAYPAL",
            Provider::Venmo => "VENMO",
            Provider::Cashapp => "CASHAPP",
            Provider::Zelle => "ZELLE",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Created,
    Sent,
    Confirmed,
    Disputed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PaymentStatus::Created => "CREATED",
            PaymentStatus::Sent => "SENT",
            PaymentStatus::Confirmed => "CONFIRMED",
            PaymentStatus::Disputed => "DISPUTED",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeReason {
    #[serde(alias = "never_received")]
    NeverReceived,
    #[serde(alias = "wrong_amount")]
    WrongAmount,
}

impl fmt::Display for DisputeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisputeReason::NeverReceived => f.write_str("NEVER_RECEIVED"),
            DisputeReason::WrongAmount => f.write_str("WRONG_AMOUNT"),
        }
    }
}

/// Link to the item request a payment is fulfilling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemContext {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// What the payer attested when marking the payment as sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentAttestation {
    pub sent_at: DateTime<Utc>,
    pub provider_handle: Option<String>,
    pub provider_txn_reference: Option<String>,
}

/// What the payee attested when confirming receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub confirmed_at: DateTime<Utc>,
    pub confirmed_amount_cents: AmountCents,
    pub discrepancy_cents: i64,
    pub discrepancy_flag: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    pub disputed_at: DateTime<Utc>,
    pub reason: DisputeReason,
}

/// Lifecycle position of a payment together with the data each step recorded.
///
/// Fields only exist on the variants that set them: a disputed payment has no
/// confirmed amount and a confirmed one has no dispute reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    Created,
    Sent(SentAttestation),
    Confirmed {
        sent: SentAttestation,
        confirmation: Confirmation,
    },
    Disputed {
        sent: SentAttestation,
        dispute: Dispute,
    },
}

impl PaymentState {
    pub fn status(&self) -> PaymentStatus {
        match self {
            PaymentState::Created => PaymentStatus::Created,
            PaymentState::Sent(_) => PaymentStatus::Sent,
            PaymentState::Confirmed { .. } => PaymentStatus::Confirmed,
            PaymentState::Disputed { .. } => PaymentStatus::Disputed,
        }
    }

    pub fn sent(&self) -> Option<&SentAttestation> {
        match self {
            PaymentState::Created => None,
            PaymentState::Sent(sent)
            | PaymentState::Confirmed { sent, .. }
            | PaymentState::Disputed { sent, .. } => Some(sent),
        }
    }
}

/// A manual, out-of-band transfer from `payer_id` to `payee_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: PaymentId,
    pub payer_id: ActorId,
    pub payee_id: ActorId,
    pub provider: Provider,
    pub expected_amount_cents: AmountCents,
    pub note: String,
    pub item: Option<ItemContext>,
    pub created_at: DateTime<Utc>,
    pub state: PaymentState,
}

impl PaymentRecord {
    pub fn status(&self) -> PaymentStatus {
        self.state.status()
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.state.sent().map(|sent| sent.sent_at)
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        match &self.state {
            PaymentState::Confirmed { confirmation, .. } => Some(confirmation),
            _ => None,
        }
    }

    pub fn dispute(&self) -> Option<&Dispute> {
        match &self.state {
            PaymentState::Disputed { dispute, .. } => Some(dispute),
            _ => None,
        }
    }

    /// Timestamp of the most recent transition, used to keep timestamps ordered.
    pub fn last_transition_at(&self) -> DateTime<Utc> {
        match &self.state {
            PaymentState::Created => self.created_at,
            PaymentState::Sent(sent) => sent.sent_at,
            PaymentState::Confirmed { confirmation, .. } => confirmation.confirmed_at,
            PaymentState::Disputed { dispute, .. } => dispute.disputed_at,
        }
    }
}
