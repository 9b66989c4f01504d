use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("err value is not an integer or out of range")]
    NotInteger,
    #[error("err increment or decrement would overflow")]
    Overflow,
}

/// Primitive keyspace operations over N independent databases, each
/// individually atomic. Pluggable so command execution can be driven
/// against a test double.
pub trait Storage: Send + Sync {
    fn set(&self, db_index: usize, key: &str, value: &str);
    fn get(&self, db_index: usize, key: &str) -> Option<String>;
    /// Returns 1 if the key existed, 0 otherwise.
    fn del(&self, db_index: usize, key: &str) -> i64;
    /// Adds `increment` to the integer stored at `key`, treating an absent
    /// key as 0. The result is stored as its canonical decimal string.
    fn incr_by(&self, db_index: usize, key: &str, increment: i64) -> Result<i64, Error>;
    /// A textual dump of one database as newline-joined `SET <key> <value>`
    /// lines. Empty string for an empty database; key order is unspecified.
    fn compact(&self, db_index: usize) -> String;
    fn num_databases(&self) -> usize;
}

/// In-memory backend: one map per database, one reader-writer lock per map.
pub struct MemoryStorage {
    databases: Vec<RwLock<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new(num_databases: usize) -> MemoryStorage {
        let databases = (0..num_databases).map(|_| RwLock::default()).collect();
        MemoryStorage { databases }
    }
}

impl Storage for MemoryStorage {
    fn set(&self, db_index: usize, key: &str, value: &str) {
        let mut database = self.databases[db_index].write().unwrap();
        database.insert(key.to_string(), value.to_string());
    }

    fn get(&self, db_index: usize, key: &str) -> Option<String> {
        let database = self.databases[db_index].read().unwrap();
        database.get(key).cloned()
    }

    fn del(&self, db_index: usize, key: &str) -> i64 {
        let mut database = self.databases[db_index].write().unwrap();
        match database.remove(key) {
            Some(_) => 1,
            None => 0,
        }
    }

    fn incr_by(&self, db_index: usize, key: &str, increment: i64) -> Result<i64, Error> {
        // One critical section for the whole read-modify-write, so
        // concurrent increments on the same key never lose updates.
        let mut database = self.databases[db_index].write().unwrap();

        let current = match database.get(key) {
            Some(value) => value.parse::<i64>().map_err(|_| Error::NotInteger)?,
            None => 0,
        };
        check_overflow(current, increment)?;

        let next = current + increment;
        database.insert(key.to_string(), next.to_string());
        Ok(next)
    }

    fn compact(&self, db_index: usize) -> String {
        let database = self.databases[db_index].read().unwrap();
        let lines: Vec<String> = database
            .iter()
            .map(|(key, value)| format!("SET {} {}", key, value))
            .collect();
        lines.join("\n")
    }

    fn num_databases(&self) -> usize {
        self.databases.len()
    }
}

/// Detects signed-64 overflow before the addition happens, so a failed
/// increment never wraps and never mutates the stored value.
fn check_overflow(current: i64, increment: i64) -> Result<(), Error> {
    if increment > 0 && current > i64::MAX - increment {
        return Err(Error::Overflow);
    }
    if increment < 0 && current < i64::MIN - increment {
        return Err(Error::Overflow);
    }
    Ok(())
}
