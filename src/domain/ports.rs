use super::payment::{NewPayment, Payment, PaymentKey, PaymentStatus, ProductType};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Field-equality filter over payment records. `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentFilter {
    pub user_id: Option<String>,
    pub product_id: Option<String>,
    pub product_type: Option<ProductType>,
    pub status: Option<PaymentStatus>,
}

impl PaymentFilter {
    pub fn pending() -> Self {
        Self {
            status: Some(PaymentStatus::Pending),
            ..Self::default()
        }
    }

    pub fn for_key(key: &PaymentKey) -> Self {
        Self {
            user_id: Some(key.user_id.clone()),
            product_id: Some(key.product_id.clone()),
            product_type: Some(key.product_type),
            status: None,
        }
    }

    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, payment: &Payment) -> bool {
        self.user_id.as_ref().is_none_or(|v| *v == payment.user_id)
            && self.product_id.as_ref().is_none_or(|v| *v == payment.product_id)
            && self.product_type.is_none_or(|v| v == payment.product_type)
            && self.status.is_none_or(|v| v == payment.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    CreatedAtAsc,
    CreatedAtDesc,
}

/// The document store collaborator.
///
/// Implementations only need to guarantee single-document atomicity. Deleting
/// an id that no longer exists must succeed and report `false`.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn create(&self, payment: NewPayment) -> Result<Payment>;
    async fn get(&self, id: &str) -> Result<Option<Payment>>;
    async fn find(&self, filter: &PaymentFilter) -> Result<Vec<Payment>>;
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Whether `find_ordered` is backed by an index on this store.
    fn supports_ordered_queries(&self) -> bool {
        false
    }

    /// Store-side ordered query. Ties on `createdAt` are ordered by id in the
    /// same direction as the sort.
    async fn find_ordered(
        &self,
        _filter: &PaymentFilter,
        _order: SortOrder,
        _limit: Option<usize>,
    ) -> Result<Vec<Payment>> {
        Err(PaymentError::IndexUnavailable)
    }
}

pub type PaymentStoreRef = Arc<dyn PaymentStore>;
