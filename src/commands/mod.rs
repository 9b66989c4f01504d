pub mod compact;
pub mod del;
pub mod discard;
pub mod exec;
pub mod executable;
pub mod get;
pub mod incr;
pub mod incrby;
pub mod multi;
pub mod select;
pub mod set;

use std::vec;

use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::request::Request;
use crate::response::Response;
use crate::store::Store;
use crate::{storage, transaction};

use compact::Compact;
use del::Del;
use discard::Discard;
use exec::Exec;
use get::Get;
use incr::Incr;
use incrby::IncrBy;
use multi::Multi;
use select::Select;
use set::Set;

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("err unknown command: {0}")]
    UnknownCommand(String),
    #[error("wrong number of arguments for {0} command")]
    WrongArgCount(String),
    #[error("err DB index is out of range")]
    DbIndexOutOfRange,
    #[error(transparent)]
    Storage(#[from] storage::Error),
    #[error(transparent)]
    Transaction(#[from] transaction::Error),
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Set(Set),
    Get(Get),
    Del(Del),
    Incr(Incr),
    IncrBy(IncrBy),
    Compact(Compact),
    Select(Select),
    Multi(Multi),
    Exec(Exec),
    Discard(Discard),
}

/// MULTI, EXEC and DISCARD drive the transaction machine itself: they are
/// routed by name before queueing applies and are never queued themselves.
fn is_transaction_control(name: &str) -> bool {
    matches!(name, "MULTI" | "EXEC" | "DISCARD")
}

impl Executable for Command {
    fn exec(self, store: &Store, session_id: &str) -> Result<Response, Error> {
        match self {
            Command::Set(cmd) => cmd.exec(store, session_id),
            Command::Get(cmd) => cmd.exec(store, session_id),
            Command::Del(cmd) => cmd.exec(store, session_id),
            Command::Incr(cmd) => cmd.exec(store, session_id),
            Command::IncrBy(cmd) => cmd.exec(store, session_id),
            Command::Compact(cmd) => cmd.exec(store, session_id),
            Command::Select(cmd) => cmd.exec(store, session_id),
            Command::Multi(cmd) => cmd.exec(store, session_id),
            Command::Exec(cmd) => cmd.exec(store, session_id),
            Command::Discard(cmd) => cmd.exec(store, session_id),
        }
    }
}

impl TryFrom<Request> for Command {
    type Error = Error;

    /// Validation lives in the conversion: exact arity first, then the type
    /// sniff on integer arguments. A request that converts is safe to queue
    /// or run.
    fn try_from(request: Request) -> Result<Self, Self::Error> {
        let name = request.name.clone();
        let parser = &mut CommandParser::new(request);

        match name.as_str() {
            "SET" => Set::try_from(parser).map(Command::Set),
            "GET" => Get::try_from(parser).map(Command::Get),
            "DEL" => Del::try_from(parser).map(Command::Del),
            "INCR" => Incr::try_from(parser).map(Command::Incr),
            "INCRBY" => IncrBy::try_from(parser).map(Command::IncrBy),
            "COMPACT" => Compact::try_from(parser).map(Command::Compact),
            "SELECT" => Select::try_from(parser).map(Command::Select),
            "MULTI" => Multi::try_from(parser).map(Command::Multi),
            "EXEC" => Exec::try_from(parser).map(Command::Exec),
            "DISCARD" => Discard::try_from(parser).map(Command::Discard),
            _ => Err(Error::UnknownCommand(name)),
        }
    }
}

/// Consumes a request's argument tokens while converting into a typed
/// command. Arity mismatches report the command's own name.
pub struct CommandParser {
    name: String,
    parts: vec::IntoIter<String>,
}

impl CommandParser {
    fn new(request: Request) -> CommandParser {
        CommandParser {
            name: request.name,
            parts: request.args.into_iter(),
        }
    }

    /// Fails unless exactly `count` arguments remain. Checked up front so a
    /// malformed integer in an over-long call still reads as an arity error.
    pub fn expect_arity(&self, count: usize) -> Result<(), Error> {
        if self.parts.len() != count {
            return Err(Error::WrongArgCount(self.name.clone()));
        }
        Ok(())
    }

    pub fn next_string(&mut self) -> Result<String, Error> {
        self.parts
            .next()
            .ok_or_else(|| Error::WrongArgCount(self.name.clone()))
    }

    pub fn next_integer(&mut self) -> Result<i64, Error> {
        let token = self.next_string()?;
        token
            .parse::<i64>()
            .map_err(|_| storage::Error::NotInteger.into())
    }
}

/// Routes one parsed request for a session: transaction control runs
/// immediately, everything else is either queued (inside MULTI) or executed
/// against the session's current database. Every failure becomes a one-line
/// error reply.
pub fn dispatch(store: &Store, session_id: &str, request: Request) -> Response {
    match try_dispatch(store, session_id, request) {
        Ok(response) => response,
        Err(err) => Response::Error(err.to_string()),
    }
}

fn try_dispatch(store: &Store, session_id: &str, request: Request) -> Result<Response, Error> {
    let name = request.name.clone();
    let args = request.args.clone();
    let command = Command::try_from(request);

    if !is_transaction_control(&name) && store.transactions().in_transaction(session_id) {
        match &command {
            Ok(_) => {
                store.transactions().queue(session_id, &name, args)?;
                return Ok(Response::queued());
            }
            Err(_) => {
                // A command that fails validation poisons the transaction;
                // the error is surfaced but nothing is queued.
                store.transactions().mark_error(session_id);
            }
        }
    }

    command?.exec(store, session_id)
}
