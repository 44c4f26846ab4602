use super::Error;
use std::fmt::{Display, Formatter, Result};

/// Number of lines shown on either side of the failing line.
const SPREAD: usize = 3;

/// Name used in place of a missing template filename.
const ANONYMOUS: &str = "template";

/// A window of source lines around a failing line.
///
/// Each line is prefixed with its one indexed number, the failing line is
/// marked with `>>`:
///
/// ```text
///     2| <ul>
///  >> 3|   <li><%= user.name %></li>
///     4| </ul>
/// ```
#[derive(Debug, PartialEq)]
pub struct Window<'source> {
    /// The source text the window is taken from.
    source: &'source str,
    /// The one indexed line the window is centered on.
    line: usize,
}

impl<'source> Window<'source> {
    /// Create a new [`Window`] over `source`, centered on the one indexed `line`.
    pub fn new(source: &'source str, line: usize) -> Self {
        Self { source, line }
    }
}

impl Display for Window<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let lines: Vec<&str> = self.source.split('\n').collect();
        let first = self.line.saturating_sub(SPREAD).max(1);
        let last = (self.line + SPREAD).min(lines.len());

        for number in first..=last {
            let marker = if number == self.line { " >> " } else { "    " };
            let text = lines[number - 1].trim_end_matches('\r');
            if number != first {
                writeln!(f)?;
            }
            write!(f, "{marker}{number}| {text}")?;
        }

        Ok(())
    }
}

/// Rewrite the reason of `error` so that it carries the location of the
/// failure and a [`Window`] of the template source around it.
///
/// The new reason has the shape `<filename>:<line>\n<window>\n\n<reason>`.
/// An error that already carries a location, such as one raised inside an
/// included template, is returned unchanged.
pub fn rethrow(error: Error, source: &str, filename: Option<&str>, line: usize) -> Error {
    if error.is_located() {
        return error;
    }
    let name = filename.unwrap_or(ANONYMOUS);
    let window = Window::new(source, line);
    let reason = format!("{name}:{line}\n{window}\n\n{}", error.reason());

    error.with_reason(reason).or_name(filename).located()
}
