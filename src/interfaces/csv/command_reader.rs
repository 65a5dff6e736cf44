use crate::application::executor::SentDetails;
use crate::application::registration::NewPayment;
use crate::domain::money::AmountCents;
use crate::domain::payment::{ActorId, DisputeReason, PaymentId, Provider};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Create,
    Sent,
    Confirm,
    Dispute,
}

/// One raw CSV row. Which optional columns matter depends on `op`.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CommandRow {
    pub op: CommandKind,
    pub payment: String,
    pub actor: String,
    #[serde(default)]
    pub counterparty: Option<String>,
    #[serde(default)]
    pub provider: Option<Provider>,
    /// Currency units, e.g. `25.00`.
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub reason: Option<DisputeReason>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// A command ready to run against the executor, issued by `actor`.
#[derive(Debug, Clone)]
pub enum Command {
    Create(NewPayment),
    AttestSent {
        payment: PaymentId,
        actor: ActorId,
        details: SentDetails,
    },
    Confirm {
        payment: PaymentId,
        actor: ActorId,
        amount_cents: Option<i64>,
    },
    Dispute {
        payment: PaymentId,
        actor: ActorId,
        reason: DisputeReason,
    },
}

fn missing(field: &str, op: CommandKind) -> PaymentError {
    PaymentError::ValidationError(format!("{op:?} command requires `{field}`"))
}

impl TryFrom<CommandRow> for Command {
    type Error = PaymentError;

    fn try_from(row: CommandRow) -> Result<Self> {
        let payment = PaymentId::new(row.payment);
        let actor = ActorId::new(row.actor);
        let amount_cents = row
            .amount
            .map(|amount| AmountCents::from_decimal(amount).map(|cents| cents.value()))
            .transpose()?;

        match row.op {
            CommandKind::Create => Ok(Command::Create(NewPayment {
                id: Some(payment),
                payee_id: ActorId::new(
                    row.counterparty
                        .ok_or_else(|| missing("counterparty", row.op))?,
                ),
                payer_id: actor,
                provider: row.provider.ok_or_else(|| missing("provider", row.op))?,
                expected_amount_cents: amount_cents.ok_or_else(|| missing("amount", row.op))?,
                note: row.note.unwrap_or_default(),
                item: None,
            })),
            CommandKind::Sent => Ok(Command::AttestSent {
                payment,
                actor,
                details: SentDetails {
                    provider_handle: row.counterparty,
                    provider_txn_reference: row.reference,
                },
            }),
            CommandKind::Confirm => Ok(Command::Confirm {
                payment,
                actor,
                amount_cents,
            }),
            CommandKind::Dispute => Ok(Command::Dispute {
                payment,
                actor,
                reason: row.reason.ok_or_else(|| missing("reason", row.op))?,
            }),
        }
    }
}

/// Reads attestation commands from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Command>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads, deserializes and converts commands.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize::<CommandRow>()
            .map(|result| result.map_err(PaymentError::from).and_then(Command::try_from))
    }
}
