use super::Error;
use crate::region::Region;
use std::fmt::Display;

pub const UNMATCHED_DELIMITER: &str = "unmatched delimiter";
pub const UNBALANCED_BLOCK: &str = "unbalanced block";
pub const INVALID_SYNTAX: &str = "invalid syntax";
pub const INVALID_DELIMITERS: &str = "invalid delimiters";
pub const INCLUDE_CYCLE: &str = "include cycle";
pub const INCLUDE_DEPTH: &str = "include depth exceeded";
pub const MISSING_FILENAME: &str = "missing filename";
pub const REFERENCE_ERROR: &str = "reference error";
pub const TYPE_ERROR: &str = "type error";

/// Return an [`Error`] explaining that the end of the generated source was
/// not expected.
pub fn error_eof(source: &str) -> Error {
    Error::build(INVALID_SYNTAX)
        .with_pointer(source, Region::at(source.len()))
        .with_help("unexpected end of source, did you close every conditional, switch and block?")
}

/// Return an [`Error`] explaining that the write operation failed.
///
/// This is likely caused by a failure during a `write!` macro operation.
pub fn error_write() -> Error {
    Error::build("write failure").with_help("failed to write result of render, are you low on memory?")
}

/// Return an [`Error`] explaining that a filename is required.
pub fn error_missing_filename(action: &str) -> Error {
    Error::build(MISSING_FILENAME).with_help(format!(
        "{action} requires a filename, set one with `Options::with_filename`"
    ))
}

/// Return an [`Error`] explaining that an identifier could not be resolved.
pub fn error_not_defined<T>(name: T) -> Error
where
    T: Display,
{
    Error::build(format!("{REFERENCE_ERROR}: `{name}` is not defined"))
}

/// Return an [`Error`] explaining that a value had the wrong type.
pub fn error_type<T>(description: T) -> Error
where
    T: Display,
{
    Error::build(format!("{TYPE_ERROR}: {description}"))
}

/// Return a string describing an unexpected token.
pub fn expected<T, Y>(expected: T, received: Y) -> String
where
    T: Display,
    Y: Display,
{
    format!("expected {expected}, found {received}")
}
