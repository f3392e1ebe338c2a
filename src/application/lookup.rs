use crate::domain::payment::{Payment, PaymentKey, PaymentStatus};
use crate::domain::ports::{PaymentFilter, PaymentStore, SortOrder};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;

/// How the most recent pending payment for a key is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LookupStrategy {
    /// Use the indexed query when the store offers one, otherwise scan.
    #[default]
    Auto,
    Indexed,
    Scan,
}

/// One way of answering "which pending payment is the latest for this key".
///
/// Every implementation must return the same record for the same store
/// contents: the pending match with the greatest (`createdAt`, `id`).
#[async_trait]
pub trait PendingLookup: Send + Sync {
    async fn latest_pending(
        &self,
        store: &dyn PaymentStore,
        key: &PaymentKey,
    ) -> Result<Option<Payment>>;

    fn name(&self) -> &'static str;
}

/// Store-side ordering and limit; needs the composite index.
pub struct IndexedLookup;

#[async_trait]
impl PendingLookup for IndexedLookup {
    async fn latest_pending(
        &self,
        store: &dyn PaymentStore,
        key: &PaymentKey,
    ) -> Result<Option<Payment>> {
        let filter = PaymentFilter::for_key(key).with_status(PaymentStatus::Pending);
        let found = store
            .find_ordered(&filter, SortOrder::CreatedAtDesc, Some(1))
            .await?;
        Ok(found.into_iter().next())
    }

    fn name(&self) -> &'static str {
        "indexed"
    }
}

/// Plain equality query on the key, then filter and pick in memory.
pub struct ScanLookup;

#[async_trait]
impl PendingLookup for ScanLookup {
    async fn latest_pending(
        &self,
        store: &dyn PaymentStore,
        key: &PaymentKey,
    ) -> Result<Option<Payment>> {
        let found = store.find(&PaymentFilter::for_key(key)).await?;
        Ok(found
            .into_iter()
            .filter(Payment::is_pending)
            .max_by(|a, b| a.age_order(b)))
    }

    fn name(&self) -> &'static str {
        "scan"
    }
}

/// Picks the lookup for `store` according to `strategy`.
///
/// `Auto` probes the store's capability. Forcing `Indexed` on a store that
/// cannot order is rejected here rather than failing on the first request.
pub fn select(strategy: LookupStrategy, store: &dyn PaymentStore) -> Result<Box<dyn PendingLookup>> {
    match strategy {
        LookupStrategy::Auto if store.supports_ordered_queries() => Ok(Box::new(IndexedLookup)),
        LookupStrategy::Auto | LookupStrategy::Scan => Ok(Box::new(ScanLookup)),
        LookupStrategy::Indexed if store.supports_ordered_queries() => Ok(Box::new(IndexedLookup)),
        LookupStrategy::Indexed => Err(PaymentError::invalid(
            "indexed lookup requested but the store does not support ordered queries",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{Amount, NewPayment};
    use crate::infrastructure::in_memory::InMemoryPaymentStore;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn key() -> PaymentKey {
        PaymentKey::parse(Some("u1"), Some("c1"), Some("course")).unwrap()
    }

    fn payment(id: &str, secs: i64, status: PaymentStatus) -> Payment {
        let mut new = NewPayment::pending(key(), Amount::new(dec!(20)).unwrap(), "EUR");
        new.created_at = Utc.timestamp_opt(secs, 0).unwrap();
        new.status = status;
        new.into_payment(id.to_string())
    }

    async fn seeded(store: InMemoryPaymentStore) -> InMemoryPaymentStore {
        store.insert(payment("a", 1, PaymentStatus::Pending)).await;
        store.insert(payment("b", 3, PaymentStatus::Pending)).await;
        store.insert(payment("c", 3, PaymentStatus::Pending)).await;
        store.insert(payment("d", 9, PaymentStatus::Confirmed)).await;
        store
    }

    #[tokio::test]
    async fn test_indexed_and_scan_agree() {
        let indexed_store = seeded(InMemoryPaymentStore::new()).await;
        let scan_store = seeded(InMemoryPaymentStore::new().without_ordered_queries()).await;

        let via_index = IndexedLookup
            .latest_pending(&indexed_store, &key())
            .await
            .unwrap();
        let via_scan = ScanLookup.latest_pending(&scan_store, &key()).await.unwrap();

        assert_eq!(via_index, via_scan);
        // same createdAt as "b", higher id wins
        assert_eq!(via_index.unwrap().id, "c");
    }

    #[tokio::test]
    async fn test_lookup_ignores_other_keys_and_statuses() {
        let store = InMemoryPaymentStore::new();
        store.insert(payment("x", 5, PaymentStatus::Rejected)).await;
        for (id, user, product, kind) in [
            ("y", "u2", "c1", "course"),
            ("z", "u1", "c2", "course"),
            ("w", "u1", "c1", "book"),
        ] {
            let other = PaymentKey::parse(Some(user), Some(product), Some(kind)).unwrap();
            let mut new = NewPayment::pending(other, Amount::new(dec!(20)).unwrap(), "EUR");
            new.created_at = Utc.timestamp_opt(7, 0).unwrap();
            store.insert(new.into_payment(id.to_string())).await;
        }

        assert!(ScanLookup.latest_pending(&store, &key()).await.unwrap().is_none());
        assert!(IndexedLookup.latest_pending(&store, &key()).await.unwrap().is_none());
    }

    #[test]
    fn test_select_by_capability() {
        let indexed = InMemoryPaymentStore::new();
        let plain = InMemoryPaymentStore::new().without_ordered_queries();

        assert_eq!(select(LookupStrategy::Auto, &indexed).unwrap().name(), "indexed");
        assert_eq!(select(LookupStrategy::Auto, &plain).unwrap().name(), "scan");
        assert_eq!(select(LookupStrategy::Scan, &indexed).unwrap().name(), "scan");
        assert!(select(LookupStrategy::Indexed, &plain).is_err());
    }
}
