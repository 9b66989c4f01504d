use crate::commands::Error;
use crate::response::Response;
use crate::store::Store;

pub trait Executable {
    fn exec(self, store: &Store, session_id: &str) -> Result<Response, Error>;
}
