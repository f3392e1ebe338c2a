use crate::application::lookup::{self, LookupStrategy, PendingLookup};
use crate::domain::contact::{ContactLinks, PaymentWithContact};
use crate::domain::payment::{Amount, NewPayment, Payment, PaymentKey};
use crate::domain::ports::{PaymentFilter, PaymentStoreRef};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{error, info, warn};

/// Outcome of one duplicate cleanup run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CleanupReport {
    /// Ids actually deleted by this run.
    pub removed: Vec<String>,
    /// Ids whose deletion raised a store error.
    pub failed: Vec<String>,
}

impl CleanupReport {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }
}

/// Raw purchase intent as received from a caller.
#[derive(Debug, Clone, Default)]
pub struct PurchaseIntent {
    pub user_id: Option<String>,
    pub product_id: Option<String>,
    pub product_type: Option<String>,
    pub product_title: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
}

/// Result of [`PaymentReconciler::create_pending`].
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOutcome {
    pub payment: PaymentWithContact,
    pub created: bool,
}

/// Keeps at most one pending payment per (user, product, product type).
///
/// Owns a shared handle to the store and the lookup chosen for it at
/// construction. Every operation runs sequentially within the caller's task.
pub struct PaymentReconciler {
    store: PaymentStoreRef,
    lookup: Box<dyn PendingLookup>,
    contacts: ContactLinks,
}

impl PaymentReconciler {
    /// Creates a reconciler, picking the pending lookup for `store`.
    pub fn new(
        store: PaymentStoreRef,
        strategy: LookupStrategy,
        contacts: ContactLinks,
    ) -> Result<Self> {
        let lookup = lookup::select(strategy, store.as_ref())?;
        info!(lookup = lookup.name(), "payment reconciler ready");
        Ok(Self {
            store,
            lookup,
            contacts,
        })
    }

    /// Returns the most recent pending payment for the key, if any.
    ///
    /// Parameters are validated before the store is touched. Store failures
    /// are propagated as-is.
    pub async fn find_active_pending(
        &self,
        user_id: Option<&str>,
        product_id: Option<&str>,
        product_type: Option<&str>,
    ) -> Result<Option<PaymentWithContact>> {
        let key = PaymentKey::parse(user_id, product_id, product_type)?;
        let found = self.latest_pending(&key).await?;
        Ok(found.map(|p| self.contacts.attach(p)))
    }

    async fn latest_pending(&self, key: &PaymentKey) -> Result<Option<Payment>> {
        self.lookup
            .latest_pending(self.store.as_ref(), key)
            .await
            .inspect_err(|e| {
                error!(
                    operation = "find_active_pending",
                    user_id = %key.user_id,
                    product_id = %key.product_id,
                    product_type = %key.product_type,
                    error = %e,
                    "pending payment lookup failed"
                )
            })
    }

    /// Deletes every pending payment that is not the oldest of its key group.
    ///
    /// Groups are ordered by `createdAt`, then by id, so ties resolve the same
    /// way on every run. A failed deletion is logged and skipped; only a failure
    /// to load the pending set aborts the run.
    pub async fn reconcile_duplicates(&self) -> Result<CleanupReport> {
        let pending = self
            .store
            .find(&PaymentFilter::pending())
            .await
            .inspect_err(|e| {
                error!(operation = "reconcile_duplicates", error = %e, "failed to load pending payments")
            })?;

        let mut groups: BTreeMap<PaymentKey, Vec<Payment>> = BTreeMap::new();
        for payment in pending.into_iter().filter(Payment::is_pending) {
            groups.entry(payment.key()).or_default().push(payment);
        }

        let mut report = CleanupReport::default();
        for (key, mut members) in groups {
            if members.len() < 2 {
                continue;
            }
            members.sort_by(|a, b| a.age_order(b));

            let keep = &members[0];
            info!(
                user_id = %key.user_id,
                product_id = %key.product_id,
                product_type = %key.product_type,
                kept = %keep.id,
                duplicates = members.len() - 1,
                "found duplicate pending payments"
            );

            for duplicate in &members[1..] {
                match self.store.delete(&duplicate.id).await {
                    Ok(true) => report.removed.push(duplicate.id.clone()),
                    // already gone, another run got there first
                    Ok(false) => {}
                    Err(e) => {
                        warn!(payment_id = %duplicate.id, error = %e, "failed to delete duplicate payment");
                        report.failed.push(duplicate.id.clone());
                    }
                }
            }
        }

        info!(
            removed = report.removed_count(),
            failed = report.failed.len(),
            "duplicate cleanup finished"
        );
        Ok(report)
    }

    /// Records a purchase intent as a pending payment.
    ///
    /// When the key already has a pending payment that one is returned and no
    /// record is written.
    pub async fn create_pending(&self, intent: PurchaseIntent) -> Result<CreateOutcome> {
        let key = PaymentKey::parse(
            intent.user_id.as_deref(),
            intent.product_id.as_deref(),
            intent.product_type.as_deref(),
        )?;
        let amount = intent
            .amount
            .ok_or_else(|| PaymentError::invalid("Missing amount"))
            .and_then(Amount::new)?;
        let currency = intent
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| PaymentError::invalid("Missing currency"))?
            .to_uppercase();

        if let Some(existing) = self.latest_pending(&key).await? {
            return Ok(CreateOutcome {
                payment: self.contacts.attach(existing),
                created: false,
            });
        }

        let mut new = NewPayment::pending(key, amount, currency);
        if let Some(title) = intent.product_title.filter(|t| !t.trim().is_empty()) {
            new = new.with_title(title);
        }

        let payment = self.store.create(new).await.inspect_err(|e| {
            error!(operation = "create_pending", error = %e, "failed to create payment")
        })?;
        info!(payment_id = %payment.id, user_id = %payment.user_id, "pending payment created");

        Ok(CreateOutcome {
            payment: self.contacts.attach(payment),
            created: true,
        })
    }
}
