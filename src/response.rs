use std::fmt;

const LF: u8 = b'\n';

/// A single server reply, rendered as one LF-terminated payload.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    /// Protocol acknowledgements such as `OK` and `QUEUED`.
    Simple(String),
    /// A stored value or a database dump. May be empty, in which case the
    /// reply is a bare empty line.
    Value(String),
    /// The absent-value sentinel for a non-transactional GET.
    Nil,
    Integer(i64),
    /// EXEC's indexed result lines, one per queued command.
    Results(Vec<String>),
    Error(String),
}

impl Response {
    pub fn ok() -> Response {
        Response::Simple("OK".to_string())
    }

    pub fn queued() -> Response {
        Response::Simple("QUEUED".to_string())
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = match self {
            Response::Simple(s) | Response::Value(s) | Response::Error(s) => {
                s.as_bytes().to_vec()
            }
            Response::Nil => b"<nil>".to_vec(),
            Response::Integer(i) => i.to_string().into_bytes(),
            Response::Results(results) => {
                let lines: Vec<String> = results
                    .iter()
                    .enumerate()
                    .map(|(i, result)| format!("{}) {}", i + 1, result))
                    .collect();
                lines.join("\n").into_bytes()
            }
        };
        bytes.push(LF);
        bytes
    }
}

impl From<Response> for Vec<u8> {
    fn from(response: Response) -> Self {
        response.serialize()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Simple(s) | Response::Value(s) => write!(f, "{}", s),
            Response::Nil => write!(f, "<nil>"),
            Response::Integer(i) => write!(f, "{}", i),
            Response::Results(results) => write!(f, "{} results", results.len()),
            Response::Error(s) => write!(f, "{}", s),
        }
    }
}
