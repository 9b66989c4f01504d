use crate::commands::executable::Executable;
use crate::commands::{CommandParser, Error};
use crate::response::Response;
use crate::store::Store;

/// Increments the integer stored at `key` by one. An absent key counts
/// from zero.
#[derive(Debug, PartialEq)]
pub struct Incr {
    pub key: String,
}

impl Executable for Incr {
    fn exec(self, store: &Store, session_id: &str) -> Result<Response, Error> {
        let db_index = store.db_index(session_id);
        let value = store.storage().incr_by(db_index, &self.key, 1)?;
        Ok(Response::Integer(value))
    }
}

impl TryFrom<&mut CommandParser> for Incr {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.expect_arity(1)?;
        let key = parser.next_string()?;

        Ok(Self { key })
    }
}
