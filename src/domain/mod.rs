//! Domain types and the storage port.
//!
//! Nothing in here performs I/O; adapters in `infrastructure` implement
//! [`ports::PaymentStore`] and the application layer drives them.

pub mod contact;
pub mod payment;
pub mod ports;
