use crate::domain::payment::{NewPayment, Payment};
use crate::domain::ports::{PaymentFilter, PaymentStore};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Column Family holding payment documents keyed by id.
pub const CF_PAYMENTS: &str = "payments";

/// A persistent payment store backed by RocksDB.
///
/// Documents are stored as JSON under their id. There is no secondary index,
/// so every query is a full scan of the column family and ordered queries are
/// not offered; lookups against this store take the scan path.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbPaymentStore {
    db: Arc<DB>,
}

impl RocksDbPaymentStore {
    /// Opens or creates a RocksDB instance at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_payments])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_PAYMENTS).ok_or_else(|| {
            PaymentError::StoreUnavailable("Payments column family not found".to_string())
        })
    }

    fn put(&self, payment: &Payment) -> Result<()> {
        let cf = self.cf()?;
        let value = serde_json::to_vec(payment)?;
        self.db.put_cf(cf, payment.id.as_bytes(), value)?;
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for RocksDbPaymentStore {
    async fn create(&self, payment: NewPayment) -> Result<Payment> {
        let payment = payment.into_payment(Uuid::new_v4().to_string());
        self.put(&payment)?;
        Ok(payment)
    }

    async fn get(&self, id: &str) -> Result<Option<Payment>> {
        let cf = self.cf()?;
        match self.db.get_cf(cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn find(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        let cf = self.cf()?;
        let mut found = Vec::new();

        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            let payment: Payment = serde_json::from_slice(&value)?;
            if filter.matches(&payment) {
                found.push(payment);
            }
        }

        Ok(found)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let cf = self.cf()?;
        if self.db.get_pinned_cf(cf, id.as_bytes())?.is_none() {
            return Ok(false);
        }
        self.db.delete_cf(cf, id.as_bytes())?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{Amount, PaymentKey, PaymentStatus};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn new_payment(user: &str) -> NewPayment {
        let key = PaymentKey::parse(Some(user), Some("b1"), Some("book")).unwrap();
        NewPayment::pending(key, Amount::new(dec!(15.5)).unwrap(), "USD")
    }

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDbPaymentStore::open(dir.path()).expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_PAYMENTS).is_some());
        assert!(!store.supports_ordered_queries());
    }

    #[tokio::test]
    async fn test_rocksdb_payment_store() {
        let dir = tempdir().unwrap();
        let store = RocksDbPaymentStore::open(dir.path()).unwrap();

        let created = store.create(new_payment("u1")).await.unwrap();
        let mut confirmed = new_payment("u2");
        confirmed.status = PaymentStatus::Confirmed;
        store.create(confirmed).await.unwrap();

        let retrieved = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(retrieved, created);

        let pending = store.find(&PaymentFilter::pending()).await.unwrap();
        assert_eq!(pending, vec![created.clone()]);

        assert!(store.delete(&created.id).await.unwrap());
        assert!(!store.delete(&created.id).await.unwrap());
        assert!(store.get(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rocksdb_reopen_keeps_documents() {
        let dir = tempdir().unwrap();
        let id = {
            let store = RocksDbPaymentStore::open(dir.path()).unwrap();
            store.create(new_payment("u1")).await.unwrap().id
        };

        let store = RocksDbPaymentStore::open(dir.path()).unwrap();
        assert!(store.get(&id).await.unwrap().is_some());
    }
}
