use crate::commands::executable::Executable;
use crate::commands::{CommandParser, Error};
use crate::response::Response;
use crate::storage;
use crate::store::Store;
use crate::transaction::{self, QueuedCommand};

/// Runs the session's queued batch serially against the database index
/// captured at MULTI. Each key's pre-image is saved before its first
/// mutation; any failure rolls every touched key back to its pre-EXEC
/// state and the whole batch reports a single error.
///
/// The batch is serial but not isolated: other sessions may interleave
/// between its steps, and rollback restores pre-EXEC values regardless of
/// such interleaved writes.
#[derive(Debug, PartialEq)]
pub struct Exec;

impl Executable for Exec {
    fn exec(self, store: &Store, session_id: &str) -> Result<Response, Error> {
        let (commands, db_index) = store.transactions().begin_exec(session_id)?;

        let mut results = Vec::with_capacity(commands.len());
        for command in &commands {
            match apply(store, session_id, db_index, command) {
                Ok(result) => results.push(result),
                Err(err) => {
                    rollback(store, session_id, db_index);
                    return Err(err);
                }
            }
        }

        store.transactions().remove(session_id);
        Ok(Response::Results(results))
    }
}

impl TryFrom<&mut CommandParser> for Exec {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.expect_arity(0)?;
        Ok(Self)
    }
}

/// Applies one queued command, returning its scalar result as text. The
/// queue only ever holds commands that passed validation, so a malformed
/// entry still reports a wrong-arity error rather than panicking.
fn apply(
    store: &Store,
    session_id: &str,
    db_index: usize,
    command: &QueuedCommand,
) -> Result<String, Error> {
    let storage = store.storage();

    match command.name.as_str() {
        "SET" => match command.args.as_slice() {
            [key, value] => {
                save_original(store, session_id, db_index, key);
                storage.set(db_index, key, value);
                Ok("OK".to_string())
            }
            _ => Err(Error::WrongArgCount("SET".to_string())),
        },
        "GET" => match command.args.as_slice() {
            [key] => Ok(storage
                .get(db_index, key)
                .unwrap_or_else(|| "nil".to_string())),
            _ => Err(Error::WrongArgCount("GET".to_string())),
        },
        "DEL" => match command.args.as_slice() {
            [key] => {
                save_original(store, session_id, db_index, key);
                Ok(storage.del(db_index, key).to_string())
            }
            _ => Err(Error::WrongArgCount("DEL".to_string())),
        },
        "INCR" => match command.args.as_slice() {
            [key] => {
                save_original(store, session_id, db_index, key);
                let value = storage.incr_by(db_index, key, 1)?;
                Ok(value.to_string())
            }
            _ => Err(Error::WrongArgCount("INCR".to_string())),
        },
        "INCRBY" => match command.args.as_slice() {
            [key, increment] => {
                let increment = increment
                    .parse::<i64>()
                    .map_err(|_| storage::Error::NotInteger)?;
                save_original(store, session_id, db_index, key);
                let value = storage.incr_by(db_index, key, increment)?;
                Ok(value.to_string())
            }
            _ => Err(Error::WrongArgCount("INCRBY".to_string())),
        },
        "COMPACT" => Ok(storage.compact(db_index)),
        "SELECT" => Err(transaction::Error::SelectInTransaction.into()),
        name => Err(Error::UnknownCommand(name.to_string())),
    }
}

fn save_original(store: &Store, session_id: &str, db_index: usize, key: &str) {
    let current = store.storage().get(db_index, key);
    store.transactions().save_original(session_id, key, current);
}

/// Restores every captured pre-image and removes the transaction. Keys
/// that were absent before the batch are deleted; everything else gets its
/// old value back.
fn rollback(store: &Store, session_id: &str, db_index: usize) {
    let Some(transaction) = store.transactions().remove(session_id) else {
        return;
    };
    let storage = store.storage();
    for (key, original) in transaction.original_values {
        match original {
            Some(value) => storage.set(db_index, &key, &value),
            None => {
                storage.del(db_index, &key);
            }
        }
    }
}
