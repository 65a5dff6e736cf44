#![allow(dead_code)]

use async_trait::async_trait;
use paytrack::application::executor::{AttestationExecutor, SentDetails};
use paytrack::application::registration::NewPayment;
use paytrack::config::EngineConfig;
use paytrack::domain::notification::NotificationEvent;
use paytrack::domain::payment::{ActorId, PaymentId, PaymentRecord, Provider};
use paytrack::domain::ports::{NotificationDispatcher, PaymentStore, TransactionFn, TransactionOutcome};
use paytrack::error::{PaymentError, Result};
use paytrack::infrastructure::in_memory::InMemoryPaymentStore;
use paytrack::infrastructure::notifier::ChannelDispatcher;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

pub fn parent() -> ActorId {
    ActorId::new("parent")
}

pub fn child() -> ActorId {
    ActorId::new("child")
}

/// Counts committed writes of the wrapped in-memory store.
#[derive(Clone, Default)]
pub struct CountingStore {
    inner: InMemoryPaymentStore,
    writes: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentStore for CountingStore {
    async fn get(&self, id: &PaymentId) -> Result<Option<PaymentRecord>> {
        self.inner.get(id).await
    }

    async fn insert(&self, record: PaymentRecord) -> Result<()> {
        self.inner.insert(record).await
    }

    async fn run_transaction(
        &self,
        id: &PaymentId,
        apply: &TransactionFn<'_>,
    ) -> Result<TransactionOutcome> {
        let outcome = self.inner.run_transaction(id, apply).await?;
        if outcome.written {
            self.writes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(outcome)
    }

    async fn all(&self) -> Result<Vec<PaymentRecord>> {
        self.inner.all().await
    }
}

/// Reports a commit conflict for the first `conflicts` transactions, then
/// behaves like the wrapped store.
#[derive(Clone)]
pub struct ConflictingStore {
    inner: InMemoryPaymentStore,
    conflicts: Arc<AtomicU32>,
    attempts: Arc<AtomicU32>,
}

impl ConflictingStore {
    pub fn new(conflicts: u32) -> Self {
        Self {
            inner: InMemoryPaymentStore::new(),
            conflicts: Arc::new(AtomicU32::new(conflicts)),
            attempts: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentStore for ConflictingStore {
    async fn get(&self, id: &PaymentId) -> Result<Option<PaymentRecord>> {
        self.inner.get(id).await
    }

    async fn insert(&self, record: PaymentRecord) -> Result<()> {
        self.inner.insert(record).await
    }

    async fn run_transaction(
        &self,
        id: &PaymentId,
        apply: &TransactionFn<'_>,
    ) -> Result<TransactionOutcome> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.conflicts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.conflicts.store(remaining - 1, Ordering::SeqCst);
            // Run the transition anyway so validation errors still surface.
            apply(&self.inner.get(id).await?.ok_or_else(|| PaymentError::NotFound(id.clone()))?)?;
            return Err(PaymentError::StoreConflict);
        }
        self.inner.run_transaction(id, apply).await
    }

    async fn all(&self) -> Result<Vec<PaymentRecord>> {
        self.inner.all().await
    }
}

/// A dispatcher whose delivery always fails.
pub struct FailingDispatcher;

#[async_trait]
impl NotificationDispatcher for FailingDispatcher {
    async fn send(&self, _event: NotificationEvent) -> Result<()> {
        Err(PaymentError::InternalError(Box::new(std::io::Error::other(
            "push gateway unavailable",
        ))))
    }
}

pub fn fast_retries() -> EngineConfig {
    EngineConfig::default().with_retry_backoff(Duration::from_millis(1))
}

pub fn executor_with<S: PaymentStore + 'static>(
    store: S,
) -> (AttestationExecutor, UnboundedReceiver<NotificationEvent>) {
    let (notifier, events) = ChannelDispatcher::new();
    let executor =
        AttestationExecutor::new(Box::new(store), Arc::new(notifier)).with_config(fast_retries());
    (executor, events)
}

pub async fn register(executor: &AttestationExecutor, id: &str, cents: i64) -> PaymentId {
    executor
        .register(NewPayment {
            id: Some(PaymentId::new(id)),
            payer_id: parent(),
            payee_id: child(),
            provider: Provider::Venmo,
            expected_amount_cents: cents,
            note: "weekly allowance".to_string(),
            item: None,
        })
        .await
        .expect("register payment")
        .id
}

/// Registers a payment and has the payer attest it as sent.
pub async fn register_sent(executor: &AttestationExecutor, id: &str, cents: i64) -> PaymentId {
    let id = register(executor, id, cents).await;
    executor
        .attest_sent(&id, &parent(), SentDetails::default())
        .await
        .expect("attest sent");
    id
}
