use super::dispute::DisputeHandler;
use super::registration::{NewPayment, build_record};
use crate::config::EngineConfig;
use crate::domain::guard::{self, Action};
use crate::domain::money::AmountCents;
use crate::domain::notification::NotificationEvent;
use crate::domain::payment::{
    ActorId, Confirmation, DisputeReason, PaymentId, PaymentRecord, PaymentState,
    SentAttestation,
};
use crate::domain::ports::{
    ActorContext, Clock, Mutation, NotificationDispatcherRef, PaymentStoreBox, SystemClock,
    TransactionFn, TransactionOutcome,
};
use crate::domain::reconciliation::{ConfirmationPayload, build_confirmation};
use crate::domain::validation::InputValidator;
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Provider details the payer may attach when attesting a transfer.
#[derive(Debug, Clone, Default)]
pub struct SentDetails {
    pub provider_handle: Option<String>,
    pub provider_txn_reference: Option<String>,
}

/// Applies attestation transitions to payment records.
///
/// Every transition is a read-validate-write closure handed to the store's
/// optimistic transaction primitive. The closure re-checks authorization and
/// the status guard against the record read inside the transaction, so a
/// stale caller can never push a record into an illegal state. Conflicting
/// commits are retried up to `EngineConfig::max_attempts` times.
pub struct AttestationExecutor {
    store: PaymentStoreBox,
    notifier: NotificationDispatcherRef,
    clock: Arc<dyn Clock>,
    validator: InputValidator,
    config: EngineConfig,
    deliveries: Mutex<JoinSet<()>>,
}

impl AttestationExecutor {
    /// Creates an executor with the default configuration and the system clock.
    pub fn new(store: PaymentStoreBox, notifier: NotificationDispatcherRef) -> Self {
        let config = EngineConfig::default();
        Self {
            store,
            notifier,
            clock: Arc::new(SystemClock),
            validator: InputValidator::new(&config),
            config,
            deliveries: Mutex::new(JoinSet::new()),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.validator = InputValidator::new(&config);
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validates and stores a new payment in `CREATED` state.
    pub async fn register(&self, request: NewPayment) -> Result<PaymentRecord> {
        let record = build_record(request, &self.validator, self.clock.now())?;
        self.store.insert(record.clone()).await?;
        info!(payment = %record.id, payer = %record.payer_id, payee = %record.payee_id,
            amount = %record.expected_amount_cents, "payment registered");
        Ok(record)
    }

    /// Snapshot read for display. May be stale.
    pub async fn get(&self, id: &PaymentId) -> Result<PaymentRecord> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| PaymentError::NotFound(id.clone()))
    }

    pub async fn payments(&self) -> Result<Vec<PaymentRecord>> {
        self.store.all().await
    }

    /// Actions the actor may attempt, judged on a snapshot read.
    pub async fn allowed_actions(
        &self,
        id: &PaymentId,
        actor: &dyn ActorContext,
    ) -> Result<Vec<Action>> {
        let record = self.get(id).await?;
        Ok(guard::allowed_actions(&record, actor.current_actor_id()))
    }

    /// Computes what confirming with `confirmed_amount_cents` would record,
    /// without writing anything.
    pub async fn preview_confirmation(
        &self,
        id: &PaymentId,
        confirmed_amount_cents: Option<i64>,
    ) -> Result<ConfirmationPayload> {
        let record = self.get(id).await?;
        let amount = match confirmed_amount_cents {
            Some(cents) => self.validator.confirmed_amount(cents)?,
            None => record.expected_amount_cents,
        };
        Ok(build_confirmation(&record, amount))
    }

    /// The payer records that the money was sent.
    pub async fn attest_sent(
        &self,
        id: &PaymentId,
        actor: &dyn ActorContext,
        details: SentDetails,
    ) -> Result<PaymentRecord> {
        let actor = actor.current_actor_id();
        let provider_handle = self
            .validator
            .reference(details.provider_handle.as_deref(), "Provider handle")?;
        let provider_txn_reference = self.validator.reference(
            details.provider_txn_reference.as_deref(),
            "Provider transaction reference",
        )?;

        let apply = |record: &PaymentRecord| {
            attest_transition(
                record,
                actor,
                self.timestamp_after(record),
                &provider_handle,
                &provider_txn_reference,
            )
        };
        let outcome = self.transact(id, Action::AttestSent, &apply).await?;

        self.notify(NotificationEvent::payment_sent(&outcome.record));
        Ok(outcome.record)
    }

    /// The payee confirms the money arrived, optionally reporting the amount
    /// actually received. Repeating a successful confirmation returns the
    /// stored confirmation without writing.
    pub async fn confirm_receipt(
        &self,
        id: &PaymentId,
        actor: &dyn ActorContext,
        confirmed_amount_cents: Option<i64>,
    ) -> Result<PaymentRecord> {
        let actor = actor.current_actor_id();
        let confirmed_amount = confirmed_amount_cents
            .map(|cents| self.validator.confirmed_amount(cents))
            .transpose()?;

        let apply = |record: &PaymentRecord| {
            confirm_transition(record, actor, self.timestamp_after(record), confirmed_amount)
        };
        let outcome = self.transact(id, Action::ConfirmReceipt, &apply).await?;

        if outcome.written {
            if let Some(event) = NotificationEvent::receipt_confirmed(&outcome.record) {
                self.notify(event);
            }
        } else {
            debug!(payment = %id, "receipt already confirmed, nothing written");
        }
        Ok(outcome.record)
    }

    /// The payee disputes the transfer. See [`DisputeHandler`].
    pub async fn file_dispute(
        &self,
        id: &PaymentId,
        actor: &dyn ActorContext,
        reason: DisputeReason,
    ) -> Result<PaymentRecord> {
        DisputeHandler::new(self)
            .file(id, actor.current_actor_id(), reason)
            .await
    }

    /// Runs `apply` in a store transaction, retrying on commit conflicts.
    pub(crate) async fn transact(
        &self,
        id: &PaymentId,
        action: Action,
        apply: &TransactionFn<'_>,
    ) -> Result<TransactionOutcome> {
        let max_attempts = self.config.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            debug!(payment = %id, %action, attempt, "running transaction");
            match self.store.run_transaction(id, apply).await {
                Ok(outcome) => {
                    if outcome.written {
                        info!(payment = %id, %action, status = %outcome.record.status(), attempt,
                            "transition committed");
                    }
                    return Ok(outcome);
                }
                Err(e) if e.is_conflict() => {
                    warn!(payment = %id, %action, attempt, "transaction conflict");
                    if attempt < max_attempts {
                        tokio::time::sleep(self.config.retry_backoff * attempt).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Err(PaymentError::RetryExhausted {
            attempts: max_attempts,
        })
    }

    /// Queues `event` for delivery without waiting on it.
    pub(crate) fn notify(&self, event: NotificationEvent) {
        let notifier = Arc::clone(&self.notifier);
        let mut deliveries = self
            .deliveries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Reap finished deliveries so the set only holds pending ones.
        while deliveries.try_join_next().is_some() {}
        deliveries.spawn(async move {
            let payment = event.payment_id.clone();
            if let Err(e) = notifier.send(event).await {
                warn!(%payment, error = %e, "notification dispatch failed");
            }
        });
    }

    /// Waits for every queued notification to finish delivering.
    ///
    /// Call before shutting the runtime down; deliveries still pending when
    /// the runtime stops are cancelled.
    pub async fn drain_notifications(&self) {
        let mut pending = {
            let mut deliveries = self
                .deliveries
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::take(&mut *deliveries)
        };
        while let Some(joined) = pending.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "notification task did not complete");
            }
        }
    }

    /// Current time, clamped so it never precedes the record's last transition.
    pub(crate) fn timestamp_after(&self, record: &PaymentRecord) -> DateTime<Utc> {
        self.clock.now().max(record.last_transition_at())
    }
}

pub(crate) fn authorize(record: &PaymentRecord, actor: &ActorId, action: Action) -> Result<()> {
    if action.authorized_for(record, actor) {
        Ok(())
    } else {
        Err(PaymentError::Unauthorized {
            actor: actor.clone(),
            action,
        })
    }
}

pub(crate) fn ensure_permitted(record: &PaymentRecord, action: Action) -> Result<()> {
    if action.permitted_in(record.status()) {
        Ok(())
    } else {
        Err(PaymentError::InvalidTransition {
            action,
            current: record.status(),
        })
    }
}

fn attest_transition(
    record: &PaymentRecord,
    actor: &ActorId,
    now: DateTime<Utc>,
    provider_handle: &Option<String>,
    provider_txn_reference: &Option<String>,
) -> Result<Mutation> {
    authorize(record, actor, Action::AttestSent)?;
    ensure_permitted(record, Action::AttestSent)?;

    let mut next = record.clone();
    next.state = PaymentState::Sent(SentAttestation {
        sent_at: now,
        provider_handle: provider_handle.clone(),
        provider_txn_reference: provider_txn_reference.clone(),
    });
    Ok(Mutation::Write(next))
}

fn confirm_transition(
    record: &PaymentRecord,
    actor: &ActorId,
    now: DateTime<Utc>,
    confirmed_amount: Option<AmountCents>,
) -> Result<Mutation> {
    authorize(record, actor, Action::ConfirmReceipt)?;
    if matches!(record.state, PaymentState::Confirmed { .. }) {
        return Ok(Mutation::Unchanged);
    }
    ensure_permitted(record, Action::ConfirmReceipt)?;

    let PaymentState::Sent(sent) = &record.state else {
        return Err(PaymentError::InvalidTransition {
            action: Action::ConfirmReceipt,
            current: record.status(),
        });
    };
    let payload = build_confirmation(
        record,
        confirmed_amount.unwrap_or(record.expected_amount_cents),
    );

    let mut next = record.clone();
    next.state = PaymentState::Confirmed {
        sent: sent.clone(),
        confirmation: Confirmation {
            confirmed_at: now,
            confirmed_amount_cents: payload.confirmed_amount_cents,
            discrepancy_cents: payload.discrepancy_cents,
            discrepancy_flag: payload.discrepancy_flag,
        },
    };
    Ok(Mutation::Write(next))
}
