use std::sync::Arc;

use crate::session::SessionRegistry;
use crate::storage::{MemoryStorage, Storage};
use crate::transaction::TransactionBook;

pub const DEFAULT_NUM_DATABASES: usize = 16;

/// Shared server state: the multi-database keyspace plus the per-session
/// bookkeeping. Cloning is cheap and every clone sees the same state.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    storage: Box<dyn Storage>,
    sessions: SessionRegistry,
    transactions: TransactionBook,
}

impl Store {
    pub fn new() -> Store {
        Store::with_storage(Box::new(MemoryStorage::new(DEFAULT_NUM_DATABASES)))
    }

    /// Builds a store over a caller-supplied backend.
    pub fn with_storage(storage: Box<dyn Storage>) -> Store {
        Store {
            inner: Arc::new(StoreInner {
                storage,
                sessions: SessionRegistry::new(),
                transactions: TransactionBook::new(),
            }),
        }
    }

    pub fn storage(&self) -> &dyn Storage {
        self.inner.storage.as_ref()
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.inner.sessions
    }

    pub fn transactions(&self) -> &TransactionBook {
        &self.inner.transactions
    }

    /// The database index the session currently operates on.
    pub fn db_index(&self, session_id: &str) -> usize {
        self.inner.sessions.index(session_id)
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
