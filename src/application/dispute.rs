//! Dispute transition.
//!
//! Unlike confirmation, filing a dispute twice is an error: the second call
//! fails with `InvalidTransition` instead of returning the stored record.

use super::executor::{AttestationExecutor, authorize, ensure_permitted};
use crate::domain::guard::Action;
use crate::domain::notification::NotificationEvent;
use crate::domain::payment::{
    ActorId, Dispute, DisputeReason, PaymentId, PaymentRecord, PaymentState,
};
use crate::domain::ports::Mutation;
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};

pub struct DisputeHandler<'a> {
    executor: &'a AttestationExecutor,
}

impl<'a> DisputeHandler<'a> {
    pub fn new(executor: &'a AttestationExecutor) -> Self {
        Self { executor }
    }

    pub async fn file(
        &self,
        id: &PaymentId,
        actor: &ActorId,
        reason: DisputeReason,
    ) -> Result<PaymentRecord> {
        let apply = |record: &PaymentRecord| {
            dispute_transition(record, actor, self.executor.timestamp_after(record), reason)
        };
        let outcome = self
            .executor
            .transact(id, Action::FileDispute, &apply)
            .await?;

        if let Some(event) = NotificationEvent::dispute_filed(&outcome.record) {
            self.executor.notify(event);
        }
        Ok(outcome.record)
    }
}

fn dispute_transition(
    record: &PaymentRecord,
    actor: &ActorId,
    now: DateTime<Utc>,
    reason: DisputeReason,
) -> Result<Mutation> {
    authorize(record, actor, Action::FileDispute)?;
    // Also rejects an already disputed record.
    ensure_permitted(record, Action::FileDispute)?;

    let PaymentState::Sent(sent) = &record.state else {
        return Err(PaymentError::InvalidTransition {
            action: Action::FileDispute,
            current: record.status(),
        });
    };

    let mut next = record.clone();
    next.state = PaymentState::Disputed {
        sent: sent.clone(),
        dispute: Dispute {
            disputed_at: now,
            reason,
        },
    };
    Ok(Mutation::Write(next))
}
