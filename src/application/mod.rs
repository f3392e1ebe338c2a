//! Application layer containing the payment reconciliation logic.
//!
//! [`reconciler::PaymentReconciler`] is the entry point for every operation.
//! It holds a shared handle to a [`crate::domain::ports::PaymentStore`] and the
//! [`lookup::PendingLookup`] selected for that store.

pub mod lookup;
pub mod reconciler;
