use super::notification::NotificationEvent;
use super::payment::{ActorId, PaymentId, PaymentRecord};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Outcome of applying a transition to the record read inside a transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Commit this record in place of the one that was read.
    Write(PaymentRecord),
    /// Leave the stored record untouched and return it as is.
    Unchanged,
}

/// Result of one committed (or read-only) transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionOutcome {
    pub record: PaymentRecord,
    /// `false` when `apply` returned [`Mutation::Unchanged`] and nothing was written.
    pub written: bool,
}

/// Transition logic run by [`PaymentStore::run_transaction`]. May be invoked
/// once per attempt, so it must not have side effects.
pub type TransactionFn<'a> = dyn Fn(&PaymentRecord) -> Result<Mutation> + Send + Sync + 'a;

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Snapshot read; may be stale by the time the caller acts on it.
    async fn get(&self, id: &PaymentId) -> Result<Option<PaymentRecord>>;

    /// Stores a new record. Fails with `AlreadyExists` if the id is taken.
    async fn insert(&self, record: PaymentRecord) -> Result<()>;

    /// Runs one optimistic read-apply-commit attempt.
    ///
    /// Fails with `NotFound` if the record does not exist, propagates any error
    /// returned by `apply` without writing, and fails with `StoreConflict` if
    /// the record was modified between the read and the commit. Returns the
    /// record as it stands after the attempt.
    async fn run_transaction(
        &self,
        id: &PaymentId,
        apply: &TransactionFn<'_>,
    ) -> Result<TransactionOutcome>;

    async fn all(&self) -> Result<Vec<PaymentRecord>>;
}

pub type PaymentStoreBox = Box<dyn PaymentStore>;

/// Supplies the identity of whoever is invoking an operation.
pub trait ActorContext: Send + Sync {
    fn current_actor_id(&self) -> &ActorId;
}

impl ActorContext for ActorId {
    fn current_actor_id(&self) -> &ActorId {
        self
    }
}

/// Best-effort delivery of notifications. Failures are reported to the caller
/// of `send` but never affect the transition that produced the event.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, event: NotificationEvent) -> Result<()>;
}

pub type NotificationDispatcherRef = Arc<dyn NotificationDispatcher>;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
