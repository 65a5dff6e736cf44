use crate::domain::payment::{PaymentId, PaymentRecord};
use crate::domain::ports::{Mutation, PaymentStore, TransactionFn, TransactionOutcome};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, ErrorKind, OptimisticTransactionDB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing payment records.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent store implementation using RocksDB.
///
/// Records are stored as JSON in the `payments` Column Family, keyed by
/// payment id. Transitions run in RocksDB optimistic transactions: the record
/// is read with `get_for_update` and a commit that races another writer fails
/// with `Busy`. Busy, try-again and timed-out errors inside a transaction are
/// reported as `StoreConflict` so the executor retries them.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<OptimisticTransactionDB>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column family ("payments") exists.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());
        let db = OptimisticTransactionDB::open_cf_descriptors(&opts, path, vec![cf_payments])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn payments_cf(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_PAYMENTS).ok_or_else(|| {
            PaymentError::InternalError(Box::new(std::io::Error::other(
                "Payments column family not found",
            )))
        })
    }

    /// Errors a repeated transaction attempt can clear: write conflicts,
    /// lock timeouts and snapshot retries.
    fn is_transient(kind: ErrorKind) -> bool {
        matches!(kind, ErrorKind::Busy | ErrorKind::TryAgain | ErrorKind::TimedOut)
    }

    fn txn_error(e: rocksdb::Error) -> PaymentError {
        if Self::is_transient(e.kind()) {
            PaymentError::StoreConflict
        } else {
            PaymentError::from(e)
        }
    }

    fn try_insert(&self, record: &PaymentRecord) -> Result<()> {
        let cf = self.payments_cf()?;
        let key = record.id.as_str().as_bytes();
        let txn = self.db.transaction();
        if txn.get_for_update_cf(cf, key, true)?.is_some() {
            return Err(PaymentError::AlreadyExists(record.id.clone()));
        }
        txn.put_cf(cf, key, serde_json::to_vec(record)?)?;
        txn.commit().map_err(|e| match e.kind() {
            // Someone else created the same id concurrently.
            ErrorKind::Busy => PaymentError::AlreadyExists(record.id.clone()),
            _ => Self::txn_error(e),
        })
    }

    fn try_transaction(
        &self,
        id: &PaymentId,
        apply: &TransactionFn<'_>,
    ) -> Result<TransactionOutcome> {
        let cf = self.payments_cf()?;
        let key = id.as_str().as_bytes();
        let txn = self.db.transaction();

        let bytes = txn
            .get_for_update_cf(cf, key, true)
            .map_err(Self::txn_error)?
            .ok_or_else(|| PaymentError::NotFound(id.clone()))?;
        let current: PaymentRecord = serde_json::from_slice(&bytes)?;

        match apply(&current)? {
            Mutation::Unchanged => {
                txn.rollback().map_err(Self::txn_error)?;
                Ok(TransactionOutcome {
                    record: current,
                    written: false,
                })
            }
            Mutation::Write(next) => {
                txn.put_cf(cf, key, serde_json::to_vec(&next)?)
                    .map_err(Self::txn_error)?;
                txn.commit().map_err(Self::txn_error)?;
                Ok(TransactionOutcome {
                    record: next,
                    written: true,
                })
            }
        }
    }
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn get(&self, id: &PaymentId) -> Result<Option<PaymentRecord>> {
        let cf = self.payments_cf()?;
        match self.db.get_cf(cf, id.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, record: PaymentRecord) -> Result<()> {
        self.try_insert(&record)
    }

    async fn run_transaction(
        &self,
        id: &PaymentId,
        apply: &TransactionFn<'_>,
    ) -> Result<TransactionOutcome> {
        self.try_transaction(id, apply)
    }

    async fn all(&self) -> Result<Vec<PaymentRecord>> {
        let cf = self.payments_cf()?;
        let mut payments = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            payments.push(serde_json::from_slice(&value)?);
        }
        Ok(payments)
    }
}
