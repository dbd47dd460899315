use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failures caused by input that has the wrong shape for the requested
/// operation. These are reported before any partial work is performed, so the
/// caller can fix the input and retry.
#[derive(Debug)]
pub enum InvalidInput {
    EmptyInput,
    LengthMismatch,
    BadParameter(&'static str),
}

impl Display for InvalidInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for InvalidInput {}
