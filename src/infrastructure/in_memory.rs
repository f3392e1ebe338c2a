use crate::domain::payment::{NewPayment, Payment};
use crate::domain::ports::{PaymentFilter, PaymentStore, SortOrder};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory payment store.
///
/// Uses `Arc<RwLock<HashMap<String, Payment>>>` to allow shared concurrent access.
/// Ordered queries behave like an indexed document store; they can be switched
/// off to mimic a store whose composite index is missing.
#[derive(Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<String, Payment>>>,
    ordered_queries: bool,
}

impl Default for InMemoryPaymentStore {
    fn default() -> Self {
        Self {
            payments: Arc::default(),
            ordered_queries: true,
        }
    }
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory store with ordered queries enabled.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_ordered_queries(mut self) -> Self {
        self.ordered_queries = false;
        self
    }

    /// Inserts a record as-is, keeping its id. Used to seed fixtures.
    pub async fn insert(&self, payment: Payment) {
        let mut payments = self.payments.write().await;
        payments.insert(payment.id.clone(), payment);
    }

    pub async fn len(&self) -> usize {
        self.payments.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.payments.read().await.is_empty()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn create(&self, payment: NewPayment) -> Result<Payment> {
        let payment = payment.into_payment(Uuid::new_v4().to_string());
        let mut payments = self.payments.write().await;
        payments.insert(payment.id.clone(), payment.clone());
        Ok(payment)
    }

    async fn get(&self, id: &str) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(id).cloned())
    }

    async fn find(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut payments = self.payments.write().await;
        Ok(payments.remove(id).is_some())
    }

    fn supports_ordered_queries(&self) -> bool {
        self.ordered_queries
    }

    async fn find_ordered(
        &self,
        filter: &PaymentFilter,
        order: SortOrder,
        limit: Option<usize>,
    ) -> Result<Vec<Payment>> {
        if !self.ordered_queries {
            return Err(PaymentError::IndexUnavailable);
        }

        let mut found = self.find(filter).await?;
        match order {
            SortOrder::CreatedAtAsc => found.sort_by(|a, b| a.age_order(b)),
            SortOrder::CreatedAtDesc => found.sort_by(|a, b| b.age_order(a)),
        }
        if let Some(limit) = limit {
            found.truncate(limit);
        }
        Ok(found)
    }
}
