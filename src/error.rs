use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    InvalidInput(String),
    InvalidEntitySpan {
        label: String,
        start_char: usize,
        end_char: usize,
        text_len: usize,
    },
    InvariantViolation(String),
    Pdf(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Error::InvalidEntitySpan {
                label,
                start_char,
                end_char,
                text_len,
            } => write!(
                f,
                "Invalid entity span: {label} [{start_char}, {end_char}) in text of {text_len} chars"
            ),
            Error::InvariantViolation(msg) => write!(f, "Invariant violation: {msg}"),
            Error::Pdf(msg) => write!(f, "PDF error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}
