use crate::commands::executable::Executable;
use crate::commands::{CommandParser, Error};
use crate::response::Response;
use crate::store::Store;

/// Reads the value at `key`; absent keys reply with the `<nil>` sentinel.
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: String,
}

impl Executable for Get {
    fn exec(self, store: &Store, session_id: &str) -> Result<Response, Error> {
        let db_index = store.db_index(session_id);
        match store.storage().get(db_index, &self.key) {
            Some(value) => Ok(Response::Value(value)),
            None => Ok(Response::Nil),
        }
    }
}

impl TryFrom<&mut CommandParser> for Get {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.expect_arity(1)?;
        let key = parser.next_string()?;

        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::request::Request;

    #[test]
    fn get_existing_key() {
        let store = Store::new();
        store.storage().set(0, "name", "gandalf");
        let request = Request::parse("GET name").unwrap();
        let cmd = Command::try_from(request).unwrap();

        let response = cmd.exec(&store, "session-1").unwrap();

        assert_eq!(response, Response::Value("gandalf".to_string()));
    }

    #[test]
    fn get_missing_key_is_nil() {
        let store = Store::new();
        let request = Request::parse("GET missingkey").unwrap();
        let cmd = Command::try_from(request).unwrap();

        let response = cmd.exec(&store, "session-1").unwrap();

        assert_eq!(response, Response::Nil);
        assert_eq!(response.serialize(), b"<nil>\n");
    }

    #[test]
    fn get_reads_the_selected_database() {
        let store = Store::new();
        store.storage().set(1, "key", "value");
        store.sessions().set_index("session-1", 1);
        let request = Request::parse("GET key").unwrap();
        let cmd = Command::try_from(request).unwrap();

        let response = cmd.exec(&store, "session-1").unwrap();

        assert_eq!(response, Response::Value("value".to_string()));
    }
}
