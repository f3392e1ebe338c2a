use crate::application::lookup::LookupStrategy;
use crate::application::reconciler::PaymentReconciler;
use crate::domain::contact::ContactLinks;
use crate::domain::ports::PaymentStoreRef;
use crate::error::Result;
use crate::infrastructure::in_memory::InMemoryPaymentStore;
use clap::Args;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Where payments live.
#[derive(Debug, Clone, Default, Args)]
pub struct StoreArgs {
    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "DB_PATH")]
    pub db_path: Option<PathBuf>,
}

impl StoreArgs {
    /// Opens the configured store, falling back to memory when RocksDB support
    /// is not compiled in.
    pub fn open(&self) -> Result<PaymentStoreRef> {
        match &self.db_path {
            #[cfg(feature = "storage-rocksdb")]
            Some(path) => {
                let store = crate::infrastructure::rocksdb::RocksDbPaymentStore::open(path)?;
                Ok(Arc::new(store))
            }
            #[cfg(not(feature = "storage-rocksdb"))]
            Some(_) => {
                eprintln!(
                    "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
                );
                Ok(Arc::new(InMemoryPaymentStore::new()))
            }
            None => Ok(Arc::new(InMemoryPaymentStore::new())),
        }
    }
}

/// Options shared by every command that builds a reconciler.
#[derive(Debug, Clone, Args)]
pub struct ReconcilerArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// How the latest pending payment is looked up.
    #[arg(long, env = "LOOKUP_STRATEGY", value_enum, default_value_t = LookupStrategy::Auto)]
    pub lookup: LookupStrategy,

    /// Academy WhatsApp number used in contact links, digits only.
    #[arg(long, env = "CONTACT_PHONE", default_value = "0")]
    pub contact_phone: String,
}

impl ReconcilerArgs {
    pub fn build(&self) -> Result<PaymentReconciler> {
        let store = self.store.open()?;
        let contacts = ContactLinks::new(&self.contact_phone)?;
        PaymentReconciler::new(store, self.lookup, contacts)
    }
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub reconciler: ReconcilerArgs,

    /// Address the HTTP server binds to.
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,
}
