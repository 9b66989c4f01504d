use crate::commands::executable::Executable;
use crate::commands::{CommandParser, Error};
use crate::response::Response;
use crate::store::Store;

/// Opens a transaction for the session, freezing its current database index
/// for the batch's lifetime. Nested MULTI is an error, not a reset.
#[derive(Debug, PartialEq)]
pub struct Multi;

impl Executable for Multi {
    fn exec(self, store: &Store, session_id: &str) -> Result<Response, Error> {
        let db_index = store.db_index(session_id);
        store.transactions().start(session_id, db_index)?;
        Ok(Response::ok())
    }
}

impl TryFrom<&mut CommandParser> for Multi {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.expect_arity(0)?;
        Ok(Self)
    }
}
