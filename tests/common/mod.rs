#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use payment_reconciler::application::lookup::LookupStrategy;
use payment_reconciler::application::reconciler::PaymentReconciler;
use payment_reconciler::domain::contact::ContactLinks;
use payment_reconciler::domain::payment::{
    Amount, NewPayment, Payment, PaymentKey, PaymentStatus,
};
use payment_reconciler::domain::ports::{PaymentFilter, PaymentStore, SortOrder};
use payment_reconciler::error::{PaymentError, Result};
use payment_reconciler::infrastructure::in_memory::InMemoryPaymentStore;
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn payment(
    id: &str,
    user: &str,
    product: &str,
    product_type: &str,
    created_secs: i64,
    status: PaymentStatus,
) -> Payment {
    let key = PaymentKey::parse(Some(user), Some(product), Some(product_type)).unwrap();
    let mut new = NewPayment::pending(key, Amount::new(dec!(100.0)).unwrap(), "EUR");
    new.created_at = Utc.timestamp_opt(created_secs, 0).unwrap();
    new.status = status;
    new.into_payment(id.to_string())
}

pub fn pending(id: &str, user: &str, product: &str, created_secs: i64) -> Payment {
    payment(id, user, product, "course", created_secs, PaymentStatus::Pending)
}

pub async fn seed(store: &InMemoryPaymentStore, payments: impl IntoIterator<Item = Payment>) {
    for p in payments {
        store.insert(p).await;
    }
}

pub fn reconciler_for(store: Arc<dyn PaymentStore>, strategy: LookupStrategy) -> PaymentReconciler {
    PaymentReconciler::new(store, strategy, ContactLinks::new("34600111222").unwrap()).unwrap()
}

/// Wraps the in-memory store with injected failures and call counting.
pub struct FlakyStore {
    pub inner: InMemoryPaymentStore,
    pub fail_deletes: HashSet<String>,
    pub fail_reads: bool,
    pub calls: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: InMemoryPaymentStore) -> Self {
        Self {
            inner,
            fail_deletes: HashSet::new(),
            fail_reads: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_delete(mut self, id: &str) -> Self {
        self.fail_deletes.insert(id.to_string());
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(PaymentError::StoreUnavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for FlakyStore {
    async fn create(&self, payment: NewPayment) -> Result<Payment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.create(payment).await
    }

    async fn get(&self, id: &str) -> Result<Option<Payment>> {
        self.touch()?;
        self.inner.get(id).await
    }

    async fn find(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        self.touch()?;
        self.inner.find(filter).await
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.contains(id) {
            return Err(PaymentError::StoreUnavailable(format!("delete {id} timed out")));
        }
        self.inner.delete(id).await
    }

    fn supports_ordered_queries(&self) -> bool {
        self.inner.supports_ordered_queries()
    }

    async fn find_ordered(
        &self,
        filter: &PaymentFilter,
        order: SortOrder,
        limit: Option<usize>,
    ) -> Result<Vec<Payment>> {
        self.touch()?;
        self.inner.find_ordered(filter, order, limit).await
    }
}
