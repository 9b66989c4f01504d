use crate::commands::executable::Executable;
use crate::commands::{CommandParser, Error};
use crate::response::Response;
use crate::store::Store;

/// Switches the session to the zero-based database `index`. New sessions
/// always start on database 0.
#[derive(Debug, PartialEq)]
pub struct Select {
    pub index: i64,
}

impl Executable for Select {
    fn exec(self, store: &Store, session_id: &str) -> Result<Response, Error> {
        let num_databases = store.storage().num_databases() as i64;
        if self.index < 0 || self.index >= num_databases {
            return Err(Error::DbIndexOutOfRange);
        }
        store.sessions().set_index(session_id, self.index as usize);
        Ok(Response::ok())
    }
}

impl TryFrom<&mut CommandParser> for Select {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.expect_arity(1)?;
        let index = parser.next_integer()?;

        Ok(Self { index })
    }
}
