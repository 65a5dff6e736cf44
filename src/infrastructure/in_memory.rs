use crate::domain::payment::{PaymentId, PaymentRecord};
use crate::domain::ports::{Mutation, PaymentStore, TransactionFn, TransactionOutcome};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct Versioned {
    version: u64,
    record: PaymentRecord,
}

/// A thread-safe in-memory store for payment records.
///
/// Each record carries a version bumped on every write. A transaction reads
/// the record and its version, applies the transition without holding any
/// lock, then commits only if the version is still the one it read.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<PaymentId, Versioned>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn get(&self, id: &PaymentId) -> Result<Option<PaymentRecord>> {
        let payments = self.payments.read().await;
        Ok(payments.get(id).map(|entry| entry.record.clone()))
    }

    async fn insert(&self, record: PaymentRecord) -> Result<()> {
        let mut payments = self.payments.write().await;
        if payments.contains_key(&record.id) {
            return Err(PaymentError::AlreadyExists(record.id));
        }
        payments.insert(record.id.clone(), Versioned { version: 0, record });
        Ok(())
    }

    async fn run_transaction(
        &self,
        id: &PaymentId,
        apply: &TransactionFn<'_>,
    ) -> Result<TransactionOutcome> {
        let (version, current) = {
            let payments = self.payments.read().await;
            let entry = payments
                .get(id)
                .ok_or_else(|| PaymentError::NotFound(id.clone()))?;
            (entry.version, entry.record.clone())
        };

        let next = match apply(&current)? {
            Mutation::Unchanged => {
                return Ok(TransactionOutcome {
                    record: current,
                    written: false,
                });
            }
            Mutation::Write(next) => next,
        };

        let mut payments = self.payments.write().await;
        let entry = payments
            .get_mut(id)
            .ok_or_else(|| PaymentError::NotFound(id.clone()))?;
        if entry.version != version {
            return Err(PaymentError::StoreConflict);
        }
        entry.version += 1;
        entry.record = next.clone();

        Ok(TransactionOutcome {
            record: next,
            written: true,
        })
    }

    async fn all(&self) -> Result<Vec<PaymentRecord>> {
        let payments = self.payments.read().await;
        Ok(payments.values().map(|entry| entry.record.clone()).collect())
    }
}
