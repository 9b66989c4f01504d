use thiserror::Error as ThisError;

#[derive(Debug, ThisError, PartialEq)]
pub enum Error {
    #[error("ERR empty command")]
    EmptyCommand,
    #[error("ERR syntax, mismatched quotes")]
    MismatchedQuotes,
}

/// One parsed request line: an uppercased command name plus its literal
/// arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub name: String,
    pub args: Vec<String>,
}

impl Request {
    /// Tokenizes a single input line (newline already stripped).
    ///
    /// Whitespace separates tokens. A double quote toggles a quoted region
    /// in which whitespace is literal. A backslash escapes the next
    /// character, including a quote. Empty tokens are never produced, so a
    /// key or value can never be the empty string.
    pub fn parse(line: &str) -> Result<Request, Error> {
        let mut tokens: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut in_quotes = false;
        let mut escaped = false;

        for ch in line.chars() {
            if escaped {
                current.push(ch);
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_quotes = !in_quotes;
            } else if ch.is_whitespace() && !in_quotes {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            } else {
                current.push(ch);
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }

        if in_quotes {
            return Err(Error::MismatchedQuotes);
        }

        let mut parts = tokens.into_iter();
        match parts.next() {
            Some(name) => Ok(Request {
                name: name.to_uppercase(),
                args: parts.collect(),
            }),
            None => Err(Error::EmptyCommand),
        }
    }
}
