use crate::commands::executable::Executable;
use crate::commands::{CommandParser, Error};
use crate::response::Response;
use crate::store::Store;

/// Adds `increment` (which may be negative) to the integer stored at `key`.
#[derive(Debug, PartialEq)]
pub struct IncrBy {
    pub key: String,
    pub increment: i64,
}

impl Executable for IncrBy {
    fn exec(self, store: &Store, session_id: &str) -> Result<Response, Error> {
        let db_index = store.db_index(session_id);
        let value = store
            .storage()
            .incr_by(db_index, &self.key, self.increment)?;
        Ok(Response::Integer(value))
    }
}

impl TryFrom<&mut CommandParser> for IncrBy {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.expect_arity(2)?;
        let key = parser.next_string()?;
        let increment = parser.next_integer()?;

        Ok(Self { key, increment })
    }
}
