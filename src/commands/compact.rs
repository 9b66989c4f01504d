use crate::commands::executable::Executable;
use crate::commands::{CommandParser, Error};
use crate::response::Response;
use crate::store::Store;

/// Dumps the session's current database as `SET <key> <value>` lines. An
/// empty database replies with a bare empty line.
#[derive(Debug, PartialEq)]
pub struct Compact;

impl Executable for Compact {
    fn exec(self, store: &Store, session_id: &str) -> Result<Response, Error> {
        let db_index = store.db_index(session_id);
        Ok(Response::Value(store.storage().compact(db_index)))
    }
}

impl TryFrom<&mut CommandParser> for Compact {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.expect_arity(0)?;
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::request::Request;

    #[test]
    fn compact_empty_database() {
        let store = Store::new();
        let request = Request::parse("COMPACT").unwrap();
        let cmd = Command::try_from(request).unwrap();

        let response = cmd.exec(&store, "session-1").unwrap();

        assert_eq!(response, Response::Value(String::new()));
        assert_eq!(response.serialize(), b"\n");
    }

    #[test]
    fn compact_dumps_the_selected_database() {
        let store = Store::new();
        store.storage().set(2, "a", "1");
        store.storage().set(0, "other", "db");
        store.sessions().set_index("session-1", 2);
        let request = Request::parse("COMPACT").unwrap();
        let cmd = Command::try_from(request).unwrap();

        let response = cmd.exec(&store, "session-1").unwrap();

        assert_eq!(response, Response::Value("SET a 1".to_string()));
    }
}
