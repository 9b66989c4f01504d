use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("err transaction already in progress")]
    AlreadyInProgress,
    #[error("err no transaction in progress")]
    NotInProgress,
    #[error("discarding transaction due to above errors")]
    DiscardedDueToErrors,
    #[error("err SELECT is not allowed in transactions")]
    SelectInTransaction,
}

/// One command queued between MULTI and EXEC, kept as raw tokens so the
/// executor re-runs it exactly as received.
#[derive(Clone, Debug, PartialEq)]
pub struct QueuedCommand {
    pub name: String,
    pub args: Vec<String>,
}

/// Pending transaction state for one session.
#[derive(Debug)]
pub struct Transaction {
    pub commands: Vec<QueuedCommand>,
    /// Pre-images captured lazily on first mutation of each key during
    /// EXEC. `None` records that the key was absent.
    pub original_values: HashMap<String, Option<String>>,
    /// The session's database index at the moment of MULTI, frozen for the
    /// transaction's lifetime.
    pub db_index: usize,
    /// Set when a queued command failed validation; EXEC then refuses to
    /// run the batch.
    pub has_errors: bool,
}

impl Transaction {
    fn new(db_index: usize) -> Transaction {
        Transaction {
            commands: Vec::new(),
            original_values: HashMap::new(),
            db_index,
            has_errors: false,
        }
    }
}

/// The session-id → pending-transaction map. One mutex guards the map;
/// individual records are only ever touched by their owning session's task.
#[derive(Default)]
pub struct TransactionBook {
    entries: Mutex<HashMap<String, Transaction>>,
}

impl TransactionBook {
    pub fn new() -> TransactionBook {
        TransactionBook::default()
    }

    /// Opens a transaction for the session, capturing its current database
    /// index. At most one transaction may exist per session.
    pub fn start(&self, session_id: &str, db_index: usize) -> Result<(), Error> {
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(session_id) {
            return Err(Error::AlreadyInProgress);
        }
        entries.insert(session_id.to_string(), Transaction::new(db_index));
        Ok(())
    }

    pub fn queue(&self, session_id: &str, name: &str, args: Vec<String>) -> Result<(), Error> {
        let mut entries = self.entries.lock().unwrap();
        let transaction = entries.get_mut(session_id).ok_or(Error::NotInProgress)?;
        transaction.commands.push(QueuedCommand {
            name: name.to_string(),
            args,
        });
        Ok(())
    }

    pub fn discard(&self, session_id: &str) -> Result<(), Error> {
        let mut entries = self.entries.lock().unwrap();
        entries
            .remove(session_id)
            .map(|_| ())
            .ok_or(Error::NotInProgress)
    }

    /// Flags the transaction as poisoned by a validation error. No-op when
    /// the session has no transaction.
    pub fn mark_error(&self, session_id: &str) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(transaction) = entries.get_mut(session_id) {
            transaction.has_errors = true;
        }
    }

    pub fn in_transaction(&self, session_id: &str) -> bool {
        let entries = self.entries.lock().unwrap();
        entries.contains_key(session_id)
    }

    /// Snapshots the queued batch and captured database index for
    /// execution, releasing the book lock before any command runs. A
    /// poisoned transaction is removed here and never executes.
    pub fn begin_exec(&self, session_id: &str) -> Result<(Vec<QueuedCommand>, usize), Error> {
        let mut entries = self.entries.lock().unwrap();
        let transaction = entries.get(session_id).ok_or(Error::NotInProgress)?;
        if transaction.has_errors {
            entries.remove(session_id);
            return Err(Error::DiscardedDueToErrors);
        }
        Ok((transaction.commands.clone(), transaction.db_index))
    }

    /// Records the key's pre-image, once; later captures for the same key
    /// are ignored so rollback always restores the value seen before the
    /// batch's first mutation.
    pub fn save_original(&self, session_id: &str, key: &str, current: Option<String>) {
        let mut entries = self.entries.lock().unwrap();
        if let Some(transaction) = entries.get_mut(session_id) {
            transaction
                .original_values
                .entry(key.to_string())
                .or_insert(current);
        }
    }

    /// Removes and returns the session's transaction, if any.
    pub fn remove(&self, session_id: &str) -> Option<Transaction> {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(session_id)
    }
}
