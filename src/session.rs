use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::store::Store;

/// Tracks which database index each live session has selected. Unknown
/// sessions read as database 0. Index bounds are enforced by the command
/// layer, not here.
#[derive(Default)]
pub struct SessionRegistry {
    indexes: RwLock<HashMap<String, usize>>,
}

impl SessionRegistry {
    pub fn new() -> SessionRegistry {
        SessionRegistry::default()
    }

    pub fn set_index(&self, session_id: &str, db_index: usize) {
        let mut indexes = self.indexes.write().unwrap();
        indexes.insert(session_id.to_string(), db_index);
    }

    pub fn index(&self, session_id: &str) -> usize {
        let indexes = self.indexes.read().unwrap();
        indexes.get(session_id).copied().unwrap_or(0)
    }

    pub fn remove(&self, session_id: &str) {
        let mut indexes = self.indexes.write().unwrap();
        indexes.remove(session_id);
    }
}

/// Scoped registration of one connection's session. Dropping the guard
/// discards any pending transaction and forgets the session, covering
/// every exit path of the connection task.
pub struct SessionGuard {
    store: Store,
    id: String,
}

impl SessionGuard {
    pub fn open(store: &Store, id: String) -> SessionGuard {
        store.sessions().set_index(&id, 0);
        SessionGuard {
            store: store.clone(),
            id,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let transactions = self.store.transactions();
        if transactions.in_transaction(&self.id) {
            let _ = transactions.discard(&self.id);
            debug!("discarded pending transaction for session {}", self.id);
        }
        self.store.sessions().remove(&self.id);
    }
}
