use crate::commands::executable::Executable;
use crate::commands::{CommandParser, Error};
use crate::response::Response;
use crate::store::Store;

/// Abandons the session's queued batch without applying any command.
#[derive(Debug, PartialEq)]
pub struct Discard;

impl Executable for Discard {
    fn exec(self, store: &Store, session_id: &str) -> Result<Response, Error> {
        store.transactions().discard(session_id)?;
        Ok(Response::ok())
    }
}

impl TryFrom<&mut CommandParser> for Discard {
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
    use crate::transaction;

    fn discard(store: &Store) -> Result<Response, Error> {
        let request = Request::parse("DISCARD").unwrap();
        Command::try_from(request).unwrap().exec(store, "session-1")
    }

    #[test]
    fn discard_drops_the_queued_batch() {
        let store = Store::new();
        store.transactions().start("session-1", 0).unwrap();
        store
            .transactions()
            .queue("session-1", "SET", vec!["a".into(), "1".into()])
            .unwrap();

        assert_eq!(discard(&store), Ok(Response::ok()));
        assert!(!store.transactions().in_transaction("session-1"));
        // Nothing from the batch was applied.
        assert_eq!(store.storage().get(0, "a"), None);
    }

    #[test]
    fn discard_without_a_transaction_is_an_error() {
        let store = Store::new();

        let err = discard(&store).unwrap_err();

        assert_eq!(err, Error::Transaction(transaction::Error::NotInProgress));
        assert_eq!(err.to_string(), "err no transaction in progress");
    }
}
