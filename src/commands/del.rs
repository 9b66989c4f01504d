use crate::commands::executable::Executable;
use crate::commands::{CommandParser, Error};
use crate::response::Response;
use crate::store::Store;

/// Removes `key`, replying 1 if it existed and 0 otherwise.
#[derive(Debug, PartialEq)]
pub struct Del {
    pub key: String,
}

impl Executable for Del {
    fn exec(self, store: &Store, session_id: &str) -> Result<Response, Error> {
        let db_index = store.db_index(session_id);
        let removed = store.storage().del(db_index, &self.key);
        Ok(Response::Integer(removed))
    }
}

impl TryFrom<&mut CommandParser> for Del {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.expect_arity(1)?;
        let key = parser.next_string()?;

        Ok(Self { key })
    }
}
