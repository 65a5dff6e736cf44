//! Status transition guard.
//!
//! These predicates are the only place that decides which transition is legal
//! for a given status. Caller-facing code uses them to decide what to offer,
//! and the executor evaluates them again inside every transaction before it
//! writes.

use super::payment::{ActorId, PaymentRecord, PaymentStatus};
use std::fmt;

/// A transition a party can attempt on a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    AttestSent,
    ConfirmReceipt,
    FileDispute,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::AttestSent => f.write_str("attest sent"),
            Action::ConfirmReceipt => f.write_str("confirm receipt"),
            Action::FileDispute => f.write_str("file dispute"),
        }
    }
}

pub fn can_attest_sent(status: PaymentStatus) -> bool {
    status == PaymentStatus::Created
}

pub fn can_confirm(status: PaymentStatus) -> bool {
    status == PaymentStatus::Sent
}

pub fn can_dispute(status: PaymentStatus) -> bool {
    status == PaymentStatus::Sent
}

impl Action {
    /// Whether the status allows this action.
    pub fn permitted_in(&self, status: PaymentStatus) -> bool {
        match self {
            Action::AttestSent => can_attest_sent(status),
            Action::ConfirmReceipt => can_confirm(status),
            Action::FileDispute => can_dispute(status),
        }
    }

    /// Whether `actor` is the party entitled to perform this action.
    pub fn authorized_for(&self, record: &PaymentRecord, actor: &ActorId) -> bool {
        match self {
            Action::AttestSent => *actor == record.payer_id,
            Action::ConfirmReceipt | Action::FileDispute => *actor == record.payee_id,
        }
    }
}

/// Actions `actor` may attempt on `record` right now.
pub fn allowed_actions(record: &PaymentRecord, actor: &ActorId) -> Vec<Action> {
    [Action::AttestSent, Action::ConfirmReceipt, Action::FileDispute]
        .into_iter()
        .filter(|action| action.authorized_for(record, actor) && action.permitted_in(record.status()))
        .collect()
}
