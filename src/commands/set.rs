use crate::commands::executable::Executable;
use crate::commands::{CommandParser, Error};
use crate::response::Response;
use crate::store::Store;

/// Stores `value` at `key`, unconditionally overwriting.
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: String,
    pub value: String,
}

impl Executable for Set {
    fn exec(self, store: &Store, session_id: &str) -> Result<Response, Error> {
        let db_index = store.db_index(session_id);
        store.storage().set(db_index, &self.key, &self.value);
        Ok(Response::ok())
    }
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        parser.expect_arity(2)?;
        let key = parser.next_string()?;
        let value = parser.next_string()?;

        Ok(Self { key, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::request::Request;

    #[test]
    fn set_stores_the_value() {
        let store = Store::new();
        let request = Request::parse("SET name gandalf").unwrap();
        let cmd = Command::try_from(request).unwrap();

        let response = cmd.exec(&store, "session-1").unwrap();

        assert_eq!(response, Response::ok());
        assert_eq!(store.storage().get(0, "name"), Some("gandalf".to_string()));
    }

    #[test]
    fn set_overwrites_an_existing_value() {
        let store = Store::new();
        store.storage().set(0, "fruit", "apple");
        let request = Request::parse("SET fruit banana").unwrap();
        let cmd = Command::try_from(request).unwrap();

        cmd.exec(&store, "session-1").unwrap();

        assert_eq!(store.storage().get(0, "fruit"), Some("banana".to_string()));
    }

    #[test]
    fn set_targets_the_selected_database() {
        let store = Store::new();
        store.sessions().set_index("session-1", 3);
        let request = Request::parse("SET key value").unwrap();
        let cmd = Command::try_from(request).unwrap();

        cmd.exec(&store, "session-1").unwrap();

        assert_eq!(store.storage().get(3, "key"), Some("value".to_string()));
        assert_eq!(store.storage().get(0, "key"), None);
    }
}
